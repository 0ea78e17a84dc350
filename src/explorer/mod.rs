//! The dataset query-and-subscription controller.

pub mod controller;

pub use controller::ExplorerController;

use crate::gateway::GatewayError;
use crate::stream::StreamError;

/// Result type for explorer operations.
pub type ExplorerResult<T> = Result<T, ExplorerError>;

/// Errors surfaced by explorer operations.
///
/// Cloneable so the most recent failure can be both returned to the caller
/// and retained in the controller's error slot.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExplorerError {
    /// An operation that needs active criteria was invoked without any.
    #[error("no dataset is being explored")]
    NoActiveCriteria,

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Stream(#[from] StreamError),
}
