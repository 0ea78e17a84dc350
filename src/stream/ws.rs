//! WebSocket implementation of the event stream client.

use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info};

use super::{
    parse_stream_message, EventStreamClient, StreamError, StreamEvent, StreamHandle, StreamResult,
};

/// Frame sent to scope the channel to one topic once the socket opens.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientFrame {
    Register { address: String },
}

/// Event stream client speaking the service's WebSocket bridge.
pub struct WsEventStreamClient {
    stream_url: String,
}

impl WsEventStreamClient {
    pub fn new(stream_url: impl Into<String>) -> Self {
        Self {
            stream_url: stream_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl EventStreamClient for WsEventStreamClient {
    async fn open(&self, topic: &str) -> StreamResult<StreamHandle> {
        let url = self.stream_url.clone();
        if !url.starts_with("ws://") && !url.starts_with("wss://") {
            return Err(StreamError::InvalidAddress {
                address: url,
                reason: "expected a ws:// or wss:// url".to_string(),
            });
        }

        // The handle is usable immediately; the connection is established by
        // the reader task and failures there are logged, not surfaced.
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(run_channel(url, topic.to_string(), tx));
        Ok(StreamHandle::new(topic.to_string(), rx, reader))
    }
}

/// Connect, register for the topic and forward typed events until the
/// socket closes or the receiving side goes away.
async fn run_channel(url: String, topic: String, events: mpsc::UnboundedSender<StreamEvent>) {
    let (ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("failed to open event stream at {}: {}", url, e);
            return;
        }
    };
    info!("event stream open for topic {}", topic);

    let (mut write, mut read) = ws.split();

    let register = ClientFrame::Register {
        address: topic.clone(),
    };
    let frame = match serde_json::to_string(&register) {
        Ok(frame) => frame,
        Err(e) => {
            error!("failed to serialize register frame: {}", e);
            return;
        }
    };
    if let Err(e) = write.send(Message::Text(frame.into())).await {
        error!("failed to register for topic {}: {}", topic, e);
        return;
    }

    while let Some(message) = read.next().await {
        let message = match message {
            Ok(message) => message,
            Err(e) => {
                error!("event stream error on topic {}: {}", topic, e);
                break;
            }
        };
        match message {
            Message::Text(text) => {
                if let Some(event) = parse_stream_message(&text) {
                    if events.send(event).is_err() {
                        debug!("event receiver dropped, closing channel for {}", topic);
                        break;
                    }
                }
            }
            Message::Close(_) => {
                info!("event stream closed for topic {}", topic);
                break;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    async fn recv(handle: &mut StreamHandle) -> Option<StreamEvent> {
        timeout(Duration::from_secs(5), handle.recv())
            .await
            .expect("timed out waiting for a stream event")
    }

    #[tokio::test]
    async fn rejects_a_non_websocket_address() {
        let client = WsEventStreamClient::new("http://localhost:8080/eventbus");
        let result = client.open("orders").await;
        assert!(matches!(result, Err(StreamError::InvalidAddress { .. })));
    }

    #[tokio::test]
    async fn registers_for_the_topic_and_delivers_typed_events() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();

            // first frame scopes the channel to the topic
            let frame = ws.next().await.unwrap().unwrap();
            let text = match frame {
                Message::Text(text) => text,
                other => panic!("expected a text frame, got {:?}", other),
            };
            let register: serde_json::Value = serde_json::from_str(&text).unwrap();
            assert_eq!(register["type"], "register");
            assert_eq!(register["address"], "orders");

            ws.send(Message::text(r#"{"eventType":"HEARTBEAT"}"#))
                .await
                .unwrap();
            ws.send(Message::text(
                r#"{"eventType":"STREAM_EVENT","payload":{"x":5}}"#,
            ))
            .await
            .unwrap();
            ws.send(Message::text(
                r#"{"eventType":"STREAM_FAILED_EVENT","failureMessage":"boom"}"#,
            ))
            .await
            .unwrap();
            ws.send(Message::text(r#"{"eventType":"STREAM_COMPLETED_EVENT"}"#))
                .await
                .unwrap();
        });

        let client = WsEventStreamClient::new(format!("ws://{}", addr));
        let mut handle = client.open("orders").await.unwrap();
        assert_eq!(handle.topic(), "orders");

        // the heartbeat frame is filtered out by the parse layer
        assert_eq!(
            recv(&mut handle).await,
            Some(StreamEvent::Event(json!({"x": 5})))
        );
        assert_eq!(
            recv(&mut handle).await,
            Some(StreamEvent::Failed("boom".to_string()))
        );
        assert_eq!(recv(&mut handle).await, Some(StreamEvent::Completed));

        server.await.unwrap();
    }

    #[tokio::test]
    async fn channel_shuts_down_when_the_server_goes_away() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(socket).await.unwrap();
            let _register = ws.next().await.unwrap().unwrap();
            ws.close(None).await.unwrap();
        });

        let client = WsEventStreamClient::new(format!("ws://{}", addr));
        let mut handle = client.open("orders").await.unwrap();

        assert_eq!(recv(&mut handle).await, None);
        server.await.unwrap();
    }
}
