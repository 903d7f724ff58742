//! Process configuration read from the environment.
//!
//! Everything optional degrades gracefully: without `AGENCY_ADMIN_TOKEN` the
//! admin login is disabled, without `WHATSAPP_API_URL` the relay answers with
//! an error, and without `GEMINI_API_KEY` the chat widget replies with a
//! "not configured" message.

use std::{path::PathBuf, str::FromStr};

use chrono::FixedOffset;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{0} must be set when AGENCY_ADMIN_TOKEN is set")]
    Missing(&'static str),
}

/// Admin login settings. Present only when an admin token is configured.
#[derive(Debug, Clone)]
pub struct AdminAuthConfig {
    pub admin_token: SecretString,
    pub jwt_secret: SecretString,
    pub session_ttl_hours: i64,
}

#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    pub api_url: String,
    pub api_token: Option<SecretString>,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: SecretString,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub admin: Option<AdminAuthConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
    pub webhook_secret: Option<SecretString>,
    pub gemini: Option<GeminiConfig>,
    /// Offset of the agency's wall clock from UTC; defines "today".
    pub utc_offset: FixedOffset,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values
    /// are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("BACKEND_PORT") {
            Some(value) => parse_value("BACKEND_PORT", value)?,
            None => parse_optional("PORT", get("PORT"))?.unwrap_or(DEFAULT_PORT),
        };

        let database_path = get("AGENCY_DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| utils::assets::asset_dir().join("agency.sqlite"));

        let admin = match get("AGENCY_ADMIN_TOKEN") {
            Some(token) => {
                let jwt_secret =
                    get("AGENCY_JWT_SECRET").ok_or(ConfigError::Missing("AGENCY_JWT_SECRET"))?;
                let session_ttl_hours =
                    parse_optional("AGENCY_SESSION_TTL_HOURS", get("AGENCY_SESSION_TTL_HOURS"))?
                        .unwrap_or(DEFAULT_SESSION_TTL_HOURS);
                if session_ttl_hours <= 0 {
                    return Err(ConfigError::Invalid {
                        key: "AGENCY_SESSION_TTL_HOURS",
                        value: session_ttl_hours.to_string(),
                    });
                }
                Some(AdminAuthConfig {
                    admin_token: SecretString::from(token),
                    jwt_secret: SecretString::from(jwt_secret),
                    session_ttl_hours,
                })
            }
            None => None,
        };

        let whatsapp = get("WHATSAPP_API_URL").map(|api_url| WhatsAppConfig {
            api_url,
            api_token: get("WHATSAPP_API_TOKEN").map(SecretString::from),
        });

        let gemini = get("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_key: SecretString::from(api_key),
            model: get("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            api_base: get("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
        });

        let offset_minutes: i32 =
            parse_optional("AGENCY_UTC_OFFSET_MINUTES", get("AGENCY_UTC_OFFSET_MINUTES"))?
                .unwrap_or(0);
        let utc_offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| ConfigError::Invalid {
                key: "AGENCY_UTC_OFFSET_MINUTES",
                value: offset_minutes.to_string(),
            })?;

        let cors_origins = get("AGENCY_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host,
            port,
            database_path,
            admin,
            whatsapp,
            webhook_secret: get("WHATSAPP_WEBHOOK_SECRET").map(SecretString::from),
            gemini,
            utc_offset,
            cors_origins,
        })
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_optional<T: FromStr>(
    key: &'static str,
    value: Option<String>,
) -> Result<Option<T>, ConfigError> {
    value.map(|value| parse_value(key, value)).transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("AGENCY_DATABASE_PATH", "/tmp/agency.sqlite")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_path, PathBuf::from("/tmp/agency.sqlite"));
        assert!(config.admin.is_none());
        assert!(config.whatsapp.is_none());
        assert!(config.gemini.is_none());
        assert_eq!(config.utc_offset.local_minus_utc(), 0);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_backend_port_takes_precedence() {
        let config = config_from(&[("PORT", "8080"), ("BACKEND_PORT", "9090")]).unwrap();
        assert_eq!(config.port, 9090);
        let config = config_from(&[("PORT", "8080")]).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_reported() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }

    #[test]
    fn test_admin_token_requires_jwt_secret() {
        let err = config_from(&[("AGENCY_ADMIN_TOKEN", "letmein")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("AGENCY_JWT_SECRET")));

        let config = config_from(&[
            ("AGENCY_ADMIN_TOKEN", "letmein"),
            ("AGENCY_JWT_SECRET", "jwt-secret"),
            ("AGENCY_SESSION_TTL_HOURS", "2"),
        ])
        .unwrap();
        let admin = config.admin.unwrap();
        assert_eq!(admin.admin_token.expose_secret(), "letmein");
        assert_eq!(admin.session_ttl_hours, 2);
    }

    #[test]
    fn test_gemini_defaults_and_base_trimming() {
        let config = config_from(&[
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_API_BASE", "http://localhost:9999/"),
        ])
        .unwrap();
        let gemini = config.gemini.unwrap();
        assert_eq!(gemini.model, "gemini-1.5-flash");
        assert_eq!(gemini.api_base, "http://localhost:9999");
    }

    #[test]
    fn test_offset_and_cors_origins() {
        let config = config_from(&[
            ("AGENCY_UTC_OFFSET_MINUTES", "-300"),
            (
                "AGENCY_CORS_ORIGINS",
                "https://agency.example, https://admin.agency.example,",
            ),
        ])
        .unwrap();
        assert_eq!(config.utc_offset.local_minus_utc(), -300 * 60);
        assert_eq!(
            config.cors_origins,
            vec!["https://agency.example", "https://admin.agency.example"]
        );
    }

    #[test]
    fn test_secrets_are_redacted_in_debug() {
        let config = config_from(&[
            ("AGENCY_ADMIN_TOKEN", "super-secret-token"),
            ("AGENCY_JWT_SECRET", "jwt-secret"),
        ])
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("jwt-secret"));
    }
}
