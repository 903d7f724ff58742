pub mod auth;
pub mod model_loaders;

pub use auth::{require_admin, verify_webhook_secret};
pub use model_loaders::*;
