use axum::{
    Router,
    http::{
        HeaderValue, Method, Request,
        header::{AUTHORIZATION, CONTENT_TYPE, HeaderName},
    },
    middleware::from_fn_with_state,
    routing::get,
};
use serde::Deserialize;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnFailure, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, field};

use crate::{AppState, middleware::require_admin};

pub mod auth;
pub mod benefits;
pub mod calculator;
pub mod careers;
pub mod chat;
pub mod clients;
pub mod dashboard;
pub mod events;
pub mod faqs;
pub mod health;
pub mod messages;
pub mod projects;
pub mod service_offerings;
pub mod socials;
pub mod steps;
pub mod tasks;
pub mod technologies;
pub mod time_logs;
pub mod translations;
pub mod whatsapp;

/// `?lang=` on the public content endpoints and the admin lists.
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    #[serde(default)]
    pub lang: Option<String>,
}

fn cors_layer(state: &AppState) -> CorsLayer {
    if cfg!(debug_assertions) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config()
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

pub fn router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .and_then(|id| id.header_value().to_str().ok());
            let span = tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = field::Empty
            );
            if let Some(request_id) = request_id {
                span.record("request_id", field::display(request_id));
            }
            span
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR));

    let public = Router::<AppState>::new()
        .route("/health", get(health::health_check))
        .merge(auth::router())
        .merge(calculator::router())
        .merge(service_offerings::public_router())
        .merge(benefits::public_router())
        .merge(faqs::public_router())
        .merge(technologies::public_router())
        .merge(translations::public_router())
        .merge(socials::public_router())
        .merge(messages::public_router())
        .merge(careers::public_router())
        .merge(chat::public_router())
        .merge(whatsapp::public_router());

    let admin = Router::<AppState>::new()
        .merge(dashboard::router())
        .merge(service_offerings::router(&state))
        .merge(benefits::router(&state))
        .merge(faqs::router(&state))
        .merge(technologies::router(&state))
        .merge(translations::router(&state))
        .merge(socials::router(&state))
        .merge(clients::router(&state))
        .merge(projects::router(&state))
        .merge(steps::router(&state))
        .merge(tasks::router(&state))
        .merge(time_logs::router())
        .merge(messages::router(&state))
        .merge(careers::router(&state))
        .merge(whatsapp::router(&state))
        .merge(chat::router())
        .merge(events::router());

    let protected = Router::<AppState>::new()
        .nest("/admin", admin)
        .merge(whatsapp::send_router())
        .layer(from_fn_with_state(state.clone(), require_admin));

    let cors = cors_layer(&state);

    Router::<AppState>::new()
        .nest("/api", public.merge(protected))
        .layer(cors)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            MakeRequestUuid,
        ))
        .with_state(state)
}
