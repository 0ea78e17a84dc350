//! Remote data gateway: the request/response boundary to the dataset
//! service.

pub mod http;

pub use http::HttpDatasetGateway;

use async_trait::async_trait;

use crate::models::{Dataset, Row, ServiceHealth};

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors surfaced by the remote data gateway.
///
/// Variants carry owned data so a recorded error can outlive the transport
/// object that produced it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with an error payload.
    #[error("service error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Asynchronous request/response operations consumed by the explorer.
///
/// Implementations surface failures verbatim and never retry; the operator
/// re-triggers the action.
#[async_trait]
pub trait DatasetGateway: Send + Sync {
    async fn list_datasets(&self) -> GatewayResult<Vec<Dataset>>;

    async fn get_dataset(&self, id: &str) -> GatewayResult<Dataset>;

    async fn create_dataset(&self, dataset: &Dataset) -> GatewayResult<Dataset>;

    async fn delete_dataset(&self, id: &str) -> GatewayResult<()>;

    /// An unfiltered snapshot of representative rows.
    async fn sample(&self, id: &str) -> GatewayResult<Vec<Row>>;

    /// Query the dataset's content. With `subscribe` set the service also
    /// starts pushing rows matching the criteria onto the event stream.
    async fn content(
        &self,
        id: &str,
        select: &str,
        where_clause: &str,
        order_by: &str,
        subscribe: bool,
    ) -> GatewayResult<Vec<Row>>;

    /// Tear down server-side subscription resources for a dataset.
    async fn end_subscription(&self, id: &str) -> GatewayResult<()>;

    async fn health(&self) -> GatewayResult<ServiceHealth>;
}
