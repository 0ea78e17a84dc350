//! Datalens: a client for browsing, querying and live-tailing datasets
//! exposed by a remote dataset service.
//!
//! - `models`: datasets, query criteria and the displayed result buffer
//! - `gateway`: request/response boundary to the service (HTTP)
//! - `stream`: push event channel that keeps a result set live (WebSocket)
//! - `explorer`: the query-and-subscription controller tying it together
//! - `config`: environment-driven client configuration
//! - `cli`: operator-facing command tree

pub mod cli;
pub mod config;
pub mod explorer;
pub mod gateway;
pub mod models;
pub mod stream;

pub use config::ClientConfig;
pub use explorer::{ExplorerController, ExplorerError, ExplorerResult};
pub use gateway::{DatasetGateway, GatewayError, GatewayResult, HttpDatasetGateway};
pub use models::{Dataset, QueryCriteria, ResultBuffer, Row, ServiceHealth};
pub use stream::{
    EventStreamClient, StreamError, StreamEvent, StreamHandle, StreamResult, WsEventStreamClient,
};
