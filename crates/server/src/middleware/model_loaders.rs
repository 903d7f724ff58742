//! Path-parameter loaders: fetch the row named by `{id}` and hand it to the
//! handler as an `Extension`, answering 404 when it does not exist.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use db::models::{
    benefit::Benefit, career_application::CareerApplication, client::Client, faq::Faq,
    message::Message, project::Project, service_offering::ServiceOffering,
    social_link::SocialLink, step::Step, task::Task, technology::Technology,
    translation::Translation, whatsapp::WhatsAppChat,
};
use uuid::Uuid;

use crate::AppState;

async fn attach<T>(
    kind: &str,
    id: Uuid,
    found: Result<Option<T>, sqlx::Error>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode>
where
    T: Clone + Send + Sync + 'static,
{
    let model = match found {
        Ok(Some(model)) => model,
        Ok(None) => {
            tracing::warn!("{} {} not found", kind, id);
            return Err(StatusCode::NOT_FOUND);
        }
        Err(e) => {
            tracing::error!("Failed to fetch {} {}: {}", kind, id, e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    request.extensions_mut().insert(model);
    Ok(next.run(request).await)
}

pub async fn load_client_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Client::find_by_id(state.pool(), id).await;
    attach("Client", id, found, request, next).await
}

pub async fn load_project_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Project::find_by_id(state.pool(), id).await;
    attach("Project", id, found, request, next).await
}

pub async fn load_step_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Step::find_by_id(state.pool(), id).await;
    attach("Step", id, found, request, next).await
}

pub async fn load_task_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Task::find_by_id(state.pool(), id).await;
    attach("Task", id, found, request, next).await
}

pub async fn load_message_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Message::find_by_id(state.pool(), id).await;
    attach("Message", id, found, request, next).await
}

pub async fn load_application_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = CareerApplication::find_by_id(state.pool(), id).await;
    attach("Career application", id, found, request, next).await
}

pub async fn load_service_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = ServiceOffering::find_by_id(state.pool(), id).await;
    attach("Service", id, found, request, next).await
}

pub async fn load_benefit_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Benefit::find_by_id(state.pool(), id).await;
    attach("Benefit", id, found, request, next).await
}

pub async fn load_faq_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Faq::find_by_id(state.pool(), id).await;
    attach("FAQ", id, found, request, next).await
}

pub async fn load_technology_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Technology::find_by_id(state.pool(), id).await;
    attach("Technology", id, found, request, next).await
}

pub async fn load_translation_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = Translation::find_by_id(state.pool(), id).await;
    attach("Translation", id, found, request, next).await
}

pub async fn load_social_link_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = SocialLink::find_by_id(state.pool(), id).await;
    attach("Social link", id, found, request, next).await
}

pub async fn load_chat_middleware(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let found = WhatsAppChat::find_by_id(state.pool(), id).await;
    attach("WhatsApp chat", id, found, request, next).await
}
