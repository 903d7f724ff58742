//! Project price calculator shown on the public pricing page.
//!
//! Three static tables drive the quote: a base price per service, a
//! multiplier per project scale and flat add-on fees. All amounts are in
//! cents and multipliers are stored in basis points, so every quote is
//! computed with exact integer arithmetic.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

const BASIS_POINTS: i64 = 10_000;

struct ServiceRate {
    id: &'static str,
    label: &'static str,
    base_cents: i64,
}

struct ScaleRate {
    id: &'static str,
    label: &'static str,
    multiplier_bp: i64,
}

struct FeatureRate {
    id: &'static str,
    label: &'static str,
    price_cents: i64,
}

const SERVICES: &[ServiceRate] = &[
    ServiceRate { id: "landing_page", label: "Landing page", base_cents: 80_000 },
    ServiceRate { id: "corporate_website", label: "Corporate website", base_cents: 200_000 },
    ServiceRate { id: "ecommerce", label: "E-commerce store", base_cents: 450_000 },
    ServiceRate { id: "web_application", label: "Web application", base_cents: 600_000 },
    ServiceRate { id: "mobile_application", label: "Mobile application", base_cents: 800_000 },
    ServiceRate { id: "ui_ux_design", label: "UI/UX design", base_cents: 150_000 },
];

const SCALES: &[ScaleRate] = &[
    ScaleRate { id: "small", label: "Small", multiplier_bp: 10_000 },
    ScaleRate { id: "medium", label: "Medium", multiplier_bp: 15_000 },
    ScaleRate { id: "large", label: "Large", multiplier_bp: 22_000 },
];

const FEATURES: &[FeatureRate] = &[
    FeatureRate { id: "seo", label: "SEO optimization", price_cents: 40_000 },
    FeatureRate { id: "cms", label: "Content management", price_cents: 60_000 },
    FeatureRate { id: "multilingual", label: "Multilingual support", price_cents: 50_000 },
    FeatureRate { id: "analytics", label: "Analytics setup", price_cents: 25_000 },
    FeatureRate { id: "payment_integration", label: "Payment integration", price_cents: 90_000 },
    FeatureRate { id: "crm_integration", label: "CRM integration", price_cents: 120_000 },
    FeatureRate { id: "maintenance", label: "Maintenance plan", price_cents: 30_000 },
    FeatureRate { id: "copywriting", label: "Copywriting", price_cents: 35_000 },
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Unknown service: {0}")]
    UnknownService(String),
    #[error("Unknown project scale: {0}")]
    UnknownScale(String),
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ServiceOption {
    pub id: String,
    pub label: String,
    pub base_cents: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct ScaleOption {
    pub id: String,
    pub label: String,
    pub multiplier_bp: i64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct FeatureOption {
    pub id: String,
    pub label: String,
    pub price_cents: i64,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct PricingOptions {
    pub services: Vec<ServiceOption>,
    pub scales: Vec<ScaleOption>,
    pub features: Vec<FeatureOption>,
}

#[derive(Debug, Clone, Deserialize, TS)]
pub struct QuoteRequest {
    pub service: String,
    pub scale: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct Quote {
    pub service: String,
    pub scale: String,
    pub base_cents: i64,
    pub multiplier: f64,
    pub scaled_cents: i64,
    pub features: Vec<FeatureOption>,
    pub features_cents: i64,
    pub total_cents: i64,
}

fn feature_option(rate: &FeatureRate) -> FeatureOption {
    FeatureOption {
        id: rate.id.to_string(),
        label: rate.label.to_string(),
        price_cents: rate.price_cents,
    }
}

fn multiplier(bp: i64) -> f64 {
    bp as f64 / BASIS_POINTS as f64
}

pub fn options() -> PricingOptions {
    PricingOptions {
        services: SERVICES
            .iter()
            .map(|s| ServiceOption {
                id: s.id.to_string(),
                label: s.label.to_string(),
                base_cents: s.base_cents,
            })
            .collect(),
        scales: SCALES
            .iter()
            .map(|s| ScaleOption {
                id: s.id.to_string(),
                label: s.label.to_string(),
                multiplier_bp: s.multiplier_bp,
                multiplier: multiplier(s.multiplier_bp),
            })
            .collect(),
        features: FEATURES.iter().map(feature_option).collect(),
    }
}

/// Price a project: `base × multiplier + Σ features`.
///
/// Repeated feature ids are charged once and the returned feature list
/// follows table order regardless of request order.
pub fn quote(request: &QuoteRequest) -> Result<Quote, PricingError> {
    let service = SERVICES
        .iter()
        .find(|s| s.id == request.service)
        .ok_or_else(|| PricingError::UnknownService(request.service.clone()))?;
    let scale = SCALES
        .iter()
        .find(|s| s.id == request.scale)
        .ok_or_else(|| PricingError::UnknownScale(request.scale.clone()))?;

    if let Some(unknown) = request
        .features
        .iter()
        .find(|id| !FEATURES.iter().any(|f| f.id == id.as_str()))
    {
        return Err(PricingError::UnknownFeature(unknown.clone()));
    }

    let features: Vec<FeatureOption> = FEATURES
        .iter()
        .filter(|f| request.features.iter().any(|id| id == f.id))
        .map(feature_option)
        .collect();

    let scaled_cents = service.base_cents * scale.multiplier_bp / BASIS_POINTS;
    let features_cents: i64 = features.iter().map(|f| f.price_cents).sum();

    Ok(Quote {
        service: service.id.to_string(),
        scale: scale.id.to_string(),
        base_cents: service.base_cents,
        multiplier: multiplier(scale.multiplier_bp),
        scaled_cents,
        features,
        features_cents,
        total_cents: scaled_cents + features_cents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(service: &str, scale: &str, features: &[&str]) -> QuoteRequest {
        QuoteRequest {
            service: service.to_string(),
            scale: scale.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_small_landing_page_without_features() {
        let quote = quote(&request("landing_page", "small", &[])).unwrap();
        assert_eq!(quote.base_cents, 80_000);
        assert_eq!(quote.scaled_cents, 80_000);
        assert_eq!(quote.features_cents, 0);
        assert_eq!(quote.total_cents, 80_000);
    }

    #[test]
    fn test_total_is_scaled_base_plus_features() {
        let quote = quote(&request("ecommerce", "large", &["seo", "payment_integration"])).unwrap();
        assert_eq!(quote.scaled_cents, 990_000);
        assert_eq!(quote.features_cents, 130_000);
        assert_eq!(quote.total_cents, 1_120_000);
        assert_eq!(quote.multiplier, 2.2);
    }

    #[test]
    fn test_every_combination_matches_formula() {
        for service in SERVICES {
            for scale in SCALES {
                let ids: Vec<&str> = FEATURES.iter().map(|f| f.id).collect();
                let quote = quote(&request(service.id, scale.id, &ids)).unwrap();
                let expected = service.base_cents * scale.multiplier_bp / BASIS_POINTS
                    + FEATURES.iter().map(|f| f.price_cents).sum::<i64>();
                assert_eq!(quote.total_cents, expected, "{} / {}", service.id, scale.id);
            }
        }
    }

    #[test]
    fn test_duplicate_features_are_charged_once_in_table_order() {
        let quote = quote(&request(
            "corporate_website",
            "medium",
            &["maintenance", "cms", "maintenance"],
        ))
        .unwrap();
        let ids: Vec<_> = quote.features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["cms", "maintenance"]);
        assert_eq!(quote.features_cents, 90_000);
        assert_eq!(quote.total_cents, 300_000 + 90_000);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        assert_eq!(
            quote(&request("blog", "small", &[])).unwrap_err(),
            PricingError::UnknownService("blog".to_string())
        );
        assert_eq!(
            quote(&request("landing_page", "huge", &[])).unwrap_err(),
            PricingError::UnknownScale("huge".to_string())
        );
        assert_eq!(
            quote(&request("landing_page", "small", &["seo", "blockchain"])).unwrap_err(),
            PricingError::UnknownFeature("blockchain".to_string())
        );
    }

    #[test]
    fn test_options_expose_all_tables() {
        let options = options();
        assert_eq!(options.services.len(), 6);
        assert_eq!(options.scales.len(), 3);
        assert_eq!(options.features.len(), 8);
        assert_eq!(options.scales[1].multiplier, 1.5);
    }
}
