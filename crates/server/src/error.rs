use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    admin_token::AdminTokenError, ai_chat::ChatError, config::ConfigError,
    language::InvalidLanguage, onboarding::OnboardingError, pricing::PricingError,
    timer::TimerError, whatsapp::WhatsAppError,
};
use thiserror::Error;
use utils::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    WhatsApp(#[from] WhatsAppError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    AdminToken(#[from] AdminTokenError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error(transparent)]
    Language(#[from] InvalidLanguage),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Not found: {0}")]
    NotFound(String),
}

fn database_status(err: &sqlx::Error) -> StatusCode {
    match err {
        sqlx::Error::RowNotFound => StatusCode::NOT_FOUND,
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StatusCode::CONFLICT,
        sqlx::Error::Database(db_err)
            if db_err.is_foreign_key_violation() || db_err.is_check_violation() =>
        {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Database(err) => database_status(err),
            ApiError::Pricing(_) | ApiError::Language(_) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Timer(TimerError::TaskNotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Timer(TimerError::Database(err)) => database_status(err),
            ApiError::WhatsApp(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::WhatsApp(WhatsAppError::NotConfigured)
            | ApiError::Chat(ChatError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::WhatsApp(WhatsAppError::Database(err)) => database_status(err),
            ApiError::WhatsApp(_) | ApiError::Chat(_) => StatusCode::BAD_GATEWAY,
            ApiError::AdminToken(AdminTokenError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::AdminToken(AdminTokenError::Jwt(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::AdminToken(_) | ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Onboarding(OnboardingError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Onboarding(OnboardingError::Database(err)) => database_status(err),
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn public_message(&self, status: StatusCode) -> String {
        match self {
            ApiError::Database(sqlx::Error::RowNotFound) => "Record not found".to_string(),
            ApiError::Database(_) if status == StatusCode::CONFLICT => {
                "A record with the same key already exists".to_string()
            }
            ApiError::Database(_) if status == StatusCode::BAD_REQUEST => {
                "Request references a missing or invalid record".to_string()
            }
            _ if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE => {
                match self {
                    ApiError::WhatsApp(_) | ApiError::Chat(_) => self.to_string(),
                    _ => "Internal server error".to_string(),
                }
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let message = self.public_message(status);
        (status, Json(ApiResponse::<()>::error(&message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Database(sqlx::Error::RowNotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Pricing(PricingError::UnknownScale("huge".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Timer(TimerError::TaskNotFound(Uuid::nil())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::WhatsApp(WhatsAppError::InvalidRequest("chatId is required".into()))
                .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::WhatsApp(WhatsAppError::Timeout).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::AdminToken(AdminTokenError::InvalidCredentials).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Onboarding(OnboardingError::Validation("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err = ApiError::Database(sqlx::Error::PoolTimedOut);
        let status = err.status_code();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(status), "Internal server error");
    }
}
