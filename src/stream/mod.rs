//! Event stream client: the push channel that keeps a result set live.

pub mod ws;

pub use ws::WsEventStreamClient;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::Row;

/// Result type for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors surfaced when opening a stream channel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error("invalid stream address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
}

/// A discriminated push message delivered over the subscription channel.
///
/// The two non-data variants carry no state transition by design: the
/// controller logs them and moves on (see `ExplorerController`).
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A newly arrived row matching the active query.
    Event(Row),
    /// The server-side stream reported a failure.
    Failed(String),
    /// The server-side stream completed.
    Completed,
}

/// Wire shape of an inbound stream message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawStreamMessage {
    event_type: String,
    #[serde(default)]
    payload: Option<Row>,
    #[serde(default)]
    failure_message: Option<String>,
}

/// Parse one inbound message. Unknown discriminants and malformed frames
/// are dropped here and never reach the controller.
pub(crate) fn parse_stream_message(text: &str) -> Option<StreamEvent> {
    let raw: RawStreamMessage = match serde_json::from_str(text) {
        Ok(raw) => raw,
        Err(e) => {
            debug!("discarding unparseable stream message: {}", e);
            return None;
        }
    };
    match raw.event_type.as_str() {
        "STREAM_EVENT" => match raw.payload {
            Some(row) => Some(StreamEvent::Event(row)),
            None => {
                debug!("discarding stream event without a payload");
                None
            }
        },
        "STREAM_FAILED_EVENT" => Some(StreamEvent::Failed(
            raw.failure_message.unwrap_or_default(),
        )),
        "STREAM_COMPLETED_EVENT" => Some(StreamEvent::Completed),
        other => {
            debug!("ignoring stream message with event type '{}'", other);
            None
        }
    }
}

/// Opens push channels keyed by dataset identity.
#[async_trait]
pub trait EventStreamClient: Send + Sync {
    /// Open a channel scoped to `topic`. The handle is returned immediately;
    /// the underlying connection is established in the background and its
    /// readiness is logged on open confirmation.
    async fn open(&self, topic: &str) -> StreamResult<StreamHandle>;
}

/// Owned handle to an open event-stream channel.
///
/// At most one of these exists per controller. Dropping the handle aborts
/// the background reader; its completion is ignored.
pub struct StreamHandle {
    topic: String,
    events: mpsc::UnboundedReceiver<StreamEvent>,
    reader: JoinHandle<()>,
}

impl StreamHandle {
    pub fn new(
        topic: String,
        events: mpsc::UnboundedReceiver<StreamEvent>,
        reader: JoinHandle<()>,
    ) -> Self {
        Self {
            topic,
            events,
            reader,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Receive the next event. `None` means the channel has shut down.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stream_event_carries_its_payload_row() {
        let event = parse_stream_message(r#"{"eventType":"STREAM_EVENT","payload":{"x":5}}"#);
        assert_eq!(event, Some(StreamEvent::Event(json!({"x": 5}))));
    }

    #[test]
    fn failed_event_carries_the_failure_message() {
        let event = parse_stream_message(
            r#"{"eventType":"STREAM_FAILED_EVENT","failureMessage":"cursor died"}"#,
        );
        assert_eq!(event, Some(StreamEvent::Failed("cursor died".to_string())));
    }

    #[test]
    fn completed_event_parses_without_extras() {
        let event = parse_stream_message(r#"{"eventType":"STREAM_COMPLETED_EVENT"}"#);
        assert_eq!(event, Some(StreamEvent::Completed));
    }

    #[test]
    fn unknown_discriminants_are_dropped() {
        assert_eq!(
            parse_stream_message(r#"{"eventType":"HEARTBEAT","payload":{"x":1}}"#),
            None
        );
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert_eq!(parse_stream_message("not json"), None);
        assert_eq!(parse_stream_message(r#"{"payload":{"x":1}}"#), None);
        assert_eq!(parse_stream_message(r#"{"eventType":"STREAM_EVENT"}"#), None);
    }
}
