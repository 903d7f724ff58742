//! New-client wizard: client, first project and its steps in one go.

use chrono::NaiveDate;
use db::models::{
    client::{Client, CreateClient},
    project::{CreateProject, Project, ProjectStatus},
    step::{CreateStep, Step},
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

#[derive(Debug, Error)]
pub enum OnboardingError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct OnboardingProject {
    pub name: String,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub budget: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct OnboardingRequest {
    pub client: CreateClient,
    pub project: OnboardingProject,
    #[serde(default)]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct OnboardingResult {
    pub client: Client,
    pub project: Project,
    pub steps: Vec<Step>,
}

fn validate(request: &OnboardingRequest) -> Result<Vec<String>, OnboardingError> {
    if request.client.name.trim().is_empty() {
        return Err(OnboardingError::Validation("Client name is required".into()));
    }
    if request.project.name.trim().is_empty() {
        return Err(OnboardingError::Validation("Project name is required".into()));
    }
    if let (Some(start), Some(deadline)) = (request.project.start_date, request.project.deadline)
        && deadline < start
    {
        return Err(OnboardingError::Validation(
            "Project deadline is before its start date".into(),
        ));
    }

    Ok(request
        .steps
        .iter()
        .map(|title| title.trim())
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect())
}

/// Create the client, its project and the ordered step list atomically.
/// Blank step titles are skipped.
pub async fn onboard(
    pool: &SqlitePool,
    request: &OnboardingRequest,
) -> Result<OnboardingResult, OnboardingError> {
    let step_titles = validate(request)?;

    let mut tx = pool.begin().await?;
    let client = Client::create(&mut *tx, &request.client).await?;

    let project = Project::create(
        &mut *tx,
        &CreateProject {
            client_id: client.id,
            name: request.project.name.trim().to_string(),
            description: request.project.description.clone(),
            status: request.project.status,
            budget: request.project.budget,
            start_date: request.project.start_date,
            deadline: request.project.deadline,
        },
    )
    .await?;

    let mut steps = Vec::with_capacity(step_titles.len());
    for (position, title) in step_titles.into_iter().enumerate() {
        let step = Step::create(
            &mut *tx,
            &CreateStep {
                project_id: project.id,
                title,
                description: None,
                position: Some(position as i64),
            },
        )
        .await?;
        steps.push(step);
    }

    tx.commit().await?;

    info!(
        client_id = %client.id,
        project_id = %project.id,
        steps = steps.len(),
        "Client onboarded"
    );
    Ok(OnboardingResult {
        client,
        project,
        steps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(client_name: &str, project_name: &str, steps: &[&str]) -> OnboardingRequest {
        OnboardingRequest {
            client: CreateClient {
                name: client_name.to_string(),
                email: None,
                phone: None,
                company: None,
                notes: None,
            },
            project: OnboardingProject {
                name: project_name.to_string(),
                description: None,
                status: None,
                budget: None,
                start_date: None,
                deadline: None,
            },
            steps: steps.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_validate_requires_names() {
        assert!(matches!(
            validate(&request(" ", "Site", &[])),
            Err(OnboardingError::Validation(_))
        ));
        assert!(matches!(
            validate(&request("Acme", "", &[])),
            Err(OnboardingError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_drops_blank_steps() {
        let titles = validate(&request("Acme", "Site", &["Brief", "  ", " Design "])).unwrap();
        assert_eq!(titles, vec!["Brief", "Design"]);
    }

    #[test]
    fn test_validate_rejects_deadline_before_start() {
        let mut req = request("Acme", "Site", &[]);
        req.project.start_date = NaiveDate::from_ymd_opt(2025, 5, 1);
        req.project.deadline = NaiveDate::from_ymd_opt(2025, 4, 1);
        assert!(matches!(
            validate(&req),
            Err(OnboardingError::Validation(_))
        ));
    }
}
