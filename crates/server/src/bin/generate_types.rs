//! Writes the TypeScript declarations of the API types to `shared/types.ts`.
//!
//! `generate_types --check` exits non-zero when the file is out of date.

use std::{env, fs, path::PathBuf};

use ts_rs::TS;

fn generate_types_content() -> String {
    let header = "// This file was generated by `generate_types`. Do not edit it by hand;\n\
                  // change the Rust types and re-run the generator.\n\n";

    let decls: Vec<String> = vec![
        utils::response::ApiResponse::<()>::decl(),
        utils::events::ChangeAction::decl(),
        utils::events::ChangeEvent::decl(),
        db::models::client::Client::decl(),
        db::models::client::CreateClient::decl(),
        db::models::client::UpdateClient::decl(),
        db::models::project::ProjectStatus::decl(),
        db::models::project::Project::decl(),
        db::models::project::CreateProject::decl(),
        db::models::project::UpdateProject::decl(),
        db::models::step::Step::decl(),
        db::models::step::CreateStep::decl(),
        db::models::step::UpdateStep::decl(),
        db::models::task::TaskStatus::decl(),
        db::models::task::TaskPriority::decl(),
        db::models::task::Task::decl(),
        db::models::task::CreateTask::decl(),
        db::models::task::UpdateTask::decl(),
        db::models::time_log::TimeLog::decl(),
        db::models::message::Message::decl(),
        db::models::career_application::ApplicationStatus::decl(),
        db::models::career_application::CareerApplication::decl(),
        db::models::career_application::CreateCareerApplication::decl(),
        db::models::career_application::UpdateCareerApplication::decl(),
        db::models::service_offering::ServiceOffering::decl(),
        db::models::service_offering::CreateServiceOffering::decl(),
        db::models::service_offering::UpdateServiceOffering::decl(),
        db::models::benefit::Benefit::decl(),
        db::models::benefit::CreateBenefit::decl(),
        db::models::benefit::UpdateBenefit::decl(),
        db::models::faq::Faq::decl(),
        db::models::faq::CreateFaq::decl(),
        db::models::faq::UpdateFaq::decl(),
        db::models::technology::Technology::decl(),
        db::models::technology::CreateTechnology::decl(),
        db::models::technology::UpdateTechnology::decl(),
        db::models::translation::Translation::decl(),
        db::models::translation::CreateTranslation::decl(),
        db::models::translation::UpdateTranslation::decl(),
        db::models::social_link::SocialLink::decl(),
        db::models::social_link::CreateSocialLink::decl(),
        db::models::social_link::UpdateSocialLink::decl(),
        db::models::whatsapp::MessageDirection::decl(),
        db::models::whatsapp::WhatsAppChat::decl(),
        db::models::whatsapp::WhatsAppMessage::decl(),
        db::models::bot_message::BotRole::decl(),
        db::models::bot_message::BotMessage::decl(),
        db::models::dashboard::DashboardCounts::decl(),
        services::services::pricing::ServiceOption::decl(),
        services::services::pricing::ScaleOption::decl(),
        services::services::pricing::FeatureOption::decl(),
        services::services::pricing::PricingOptions::decl(),
        services::services::pricing::QuoteRequest::decl(),
        services::services::pricing::Quote::decl(),
        services::services::schedule::DailySchedule::decl(),
        services::services::schedule::WeeklySchedule::decl(),
        services::services::timer::TimerStart::decl(),
        services::services::timer::TodaySummary::decl(),
        services::services::onboarding::OnboardingProject::decl(),
        services::services::onboarding::OnboardingRequest::decl(),
        services::services::onboarding::OnboardingResult::decl(),
        services::services::whatsapp::SendRequest::decl(),
        services::services::ai_chat::ChatRole::decl(),
        services::services::ai_chat::ChatTurn::decl(),
        services::services::ai_chat::ChatRequest::decl(),
        services::services::ai_chat::ChatReply::decl(),
        services::services::admin_token::AdminSession::decl(),
        server::routes::auth::LoginRequest::decl(),
        server::routes::translations::BulkTranslations::decl(),
        server::routes::messages::ContactForm::decl(),
        server::routes::time_logs::StartTimer::decl(),
        server::routes::whatsapp::SendResponse::decl(),
        server::routes::whatsapp::RelayError::decl(),
        server::routes::whatsapp::ChatWithMessages::decl(),
        server::routes::dashboard::DashboardSummary::decl(),
    ];

    let body = decls
        .into_iter()
        .map(|decl| {
            let trimmed = decl.trim_start();
            if trimmed.starts_with("export") {
                trimmed.to_string()
            } else {
                format!("export {trimmed}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!("{header}{body}\n")
}

fn main() {
    let check_mode = env::args().any(|arg| arg == "--check");

    let shared_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../shared")
        .join("types.ts");
    let generated = generate_types_content();

    if check_mode {
        let current = fs::read_to_string(&shared_path).unwrap_or_default();
        if current == generated {
            println!("shared/types.ts is up to date.");
            std::process::exit(0);
        }
        eprintln!("shared/types.ts is out of date. Run `cargo run --bin generate_types`.");
        std::process::exit(1);
    }

    if let Some(dir) = shared_path.parent()
        && let Err(e) = fs::create_dir_all(dir)
    {
        eprintln!("Failed to create {}: {e}", dir.display());
        std::process::exit(1);
    }

    if let Err(e) = fs::write(&shared_path, generated) {
        eprintln!("Failed to write {}: {e}", shared_path.display());
        std::process::exit(1);
    }
    println!("Wrote {}", shared_path.display());
}
