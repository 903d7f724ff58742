//! Client onboarding against a real database.

use db::{
    models::{client::CreateClient, project::ProjectStatus, step::Step},
    test_utils::create_test_pool,
};
use services::services::onboarding::{
    OnboardingError, OnboardingProject, OnboardingRequest, onboard,
};

fn request(steps: &[&str]) -> OnboardingRequest {
    OnboardingRequest {
        client: CreateClient {
            name: "Acme".to_string(),
            email: Some("hello@acme.example".to_string()),
            phone: Some("+1 555 0100".to_string()),
            company: Some("Acme Corp".to_string()),
            notes: None,
        },
        project: OnboardingProject {
            name: "Online store".to_string(),
            description: Some("Shop with 200 products".to_string()),
            status: Some(ProjectStatus::Active),
            budget: Some(9000.0),
            start_date: None,
            deadline: None,
        },
        steps: steps.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn onboarding_creates_client_project_and_ordered_steps() {
    let (pool, _dir) = create_test_pool().await;
    let result = onboard(&pool, &request(&["Brief", "Design", "", "Launch"]))
        .await
        .unwrap();

    assert_eq!(result.client.name, "Acme");
    assert_eq!(result.project.client_id, result.client.id);
    assert_eq!(result.project.status, ProjectStatus::Active);

    let steps = Step::find_by_project_id(&pool, result.project.id).await.unwrap();
    let titles: Vec<_> = steps.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Brief", "Design", "Launch"]);
    assert_eq!(
        steps.iter().map(|s| s.position).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[tokio::test]
async fn invalid_onboarding_writes_nothing() {
    let (pool, _dir) = create_test_pool().await;
    let mut invalid = request(&["Brief"]);
    invalid.project.name = "  ".to_string();

    let err = onboard(&pool, &invalid).await.unwrap_err();
    assert!(matches!(err, OnboardingError::Validation(_)));

    let clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clients")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(clients, 0);
}
