use std::sync::Arc;

use chrono::FixedOffset;
use db::DBService;
use services::services::{
    admin_token::AdminTokenService,
    ai_chat::{ChatError, DisabledGenerator, GeminiClient, TextGenerator},
    config::AppConfig,
    whatsapp::{DisabledGateway, HttpGateway, MessagingGateway, WhatsAppError},
};
use sqlx::SqlitePool;
use thiserror::Error;
use utils::events::EventBus;

#[derive(Debug, Error)]
pub enum StateError {
    #[error(transparent)]
    WhatsApp(#[from] WhatsAppError),
    #[error(transparent)]
    Chat(#[from] ChatError),
}

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    config: Arc<AppConfig>,
    events: EventBus,
    gateway: Arc<dyn MessagingGateway>,
    generator: Arc<dyn TextGenerator>,
    admin_tokens: Arc<AdminTokenService>,
}

impl AppState {
    pub fn new(
        db: DBService,
        config: AppConfig,
        gateway: Arc<dyn MessagingGateway>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let admin_tokens = Arc::new(AdminTokenService::new(config.admin.clone()));
        Self {
            db,
            config: Arc::new(config),
            events: EventBus::new(),
            gateway,
            generator,
            admin_tokens,
        }
    }

    /// Wire the real HTTP clients for whatever integrations are configured.
    pub fn from_config(db: DBService, config: AppConfig) -> Result<Self, StateError> {
        let gateway: Arc<dyn MessagingGateway> = match &config.whatsapp {
            Some(whatsapp) => Arc::new(HttpGateway::new(whatsapp)?),
            None => {
                tracing::info!("WHATSAPP_API_URL not set, WhatsApp relay disabled");
                Arc::new(DisabledGateway)
            }
        };
        let generator: Arc<dyn TextGenerator> = match &config.gemini {
            Some(gemini) => Arc::new(GeminiClient::new(gemini)?),
            None => {
                tracing::info!("GEMINI_API_KEY not set, chat assistant disabled");
                Arc::new(DisabledGenerator)
            }
        };
        if config.admin.is_none() {
            tracing::warn!("AGENCY_ADMIN_TOKEN not set, admin API is locked");
        }
        Ok(Self::new(db, config, gateway, generator))
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn gateway(&self) -> &dyn MessagingGateway {
        self.gateway.as_ref()
    }

    pub fn generator(&self) -> &dyn TextGenerator {
        self.generator.as_ref()
    }

    pub fn admin_tokens(&self) -> &AdminTokenService {
        &self.admin_tokens
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.config.utc_offset
    }
}
