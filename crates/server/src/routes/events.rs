use std::{convert::Infallible, time::Duration};

use axum::{
    Router,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
};
use futures::Stream;

use crate::AppState;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// GET /api/admin/events - Table change notifications as server-sent events
pub async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    tracing::debug!(
        listeners = state.events().receiver_count() + 1,
        "Admin event stream opened"
    );
    Sse::new(state.events().sse_stream())
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(stream_events))
}
