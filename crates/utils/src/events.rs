//! Change notifications for the admin dashboard.
//!
//! Every mutating endpoint publishes a [`ChangeEvent`]. Dashboard clients
//! subscribe over SSE and refetch the affected table; events carry no row
//! payload.

use std::convert::Infallible;

use axum::response::sse::Event;
use futures::{StreamExt, stream::BoxStream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{BroadcastStream, errors::BroadcastStreamRecvError};
use ts_rs::TS;
use uuid::Uuid;

pub const EV_CHANGE: &str = "change";
pub const EV_REFRESH_REQUIRED: &str = "refresh_required";

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct ChangeEvent {
    pub table: String,
    pub action: ChangeAction,
    pub id: Option<Uuid>,
}

impl ChangeEvent {
    pub fn new(table: &str, action: ChangeAction, id: Option<Uuid>) -> Self {
        Self {
            table: table.to_string(),
            action,
            id,
        }
    }

    pub fn to_sse_event(&self) -> Event {
        let data = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        Event::default().event(EV_CHANGE).data(data)
    }
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish to live listeners. Nobody listening is not an error.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(table = %event.table, action = ?event.action, "change event");
        let _ = self.sender.send(event);
    }

    pub fn inserted(&self, table: &str, id: Uuid) {
        self.publish(ChangeEvent::new(table, ChangeAction::Insert, Some(id)));
    }

    pub fn updated(&self, table: &str, id: Uuid) {
        self.publish(ChangeEvent::new(table, ChangeAction::Update, Some(id)));
    }

    pub fn deleted(&self, table: &str, id: Uuid) {
        self.publish(ChangeEvent::new(table, ChangeAction::Delete, Some(id)));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Live stream mapped to SSE events. A lagged receiver gets a
    /// `refresh_required` event instead of the dropped changes.
    pub fn sse_stream(&self) -> BoxStream<'static, Result<Event, Infallible>> {
        BroadcastStream::new(self.subscribe())
            .map(|res| {
                let event = match res {
                    Ok(change) => change.to_sse_event(),
                    Err(BroadcastStreamRecvError::Lagged(skipped)) => Event::default()
                        .event(EV_REFRESH_REQUIRED)
                        .data(format!("lagged by {skipped} events")),
                };
                Ok(event)
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        let id = Uuid::new_v4();

        bus.inserted("clients", id);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.table, "clients");
        assert_eq!(event.action, ChangeAction::Insert);
        assert_eq!(event.id, Some(id));
    }

    #[test]
    fn publish_without_listeners_is_silent() {
        let bus = EventBus::new();
        bus.deleted("tasks", Uuid::new_v4());
        assert_eq!(bus.receiver_count(), 0);
    }

    #[test]
    fn change_event_serializes_snake_case_action() {
        let event = ChangeEvent::new("time_logs", ChangeAction::Update, None);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "update");
        assert_eq!(json["table"], "time_logs");
    }
}
