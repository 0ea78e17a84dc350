//! The subscription state machine at the heart of the client.
//!
//! `ExplorerController` owns the active query criteria, the displayed result
//! buffer and the live-subscription state, and mediates between the remote
//! data gateway and the event stream client. All state is mutated through
//! `&mut self` from a single owning task; the background stream reader only
//! communicates through the handle's channel, so no locking is needed.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{ExplorerError, ExplorerResult};
use crate::gateway::DatasetGateway;
use crate::models::{Dataset, QueryCriteria, ResultBuffer, Row};
use crate::stream::{EventStreamClient, StreamEvent, StreamHandle};

pub struct ExplorerController {
    gateway: Arc<dyn DatasetGateway>,
    stream_client: Arc<dyn EventStreamClient>,
    datasets: Vec<Dataset>,
    criteria: Option<QueryCriteria>,
    results: Option<ResultBuffer>,
    subscribed: bool,
    /// At most one open channel. A failed content fetch while subscribed
    /// leaves this in place with `subscribed` already false; the stale
    /// handle is replaced wholesale on the next subscribe.
    channel: Option<StreamHandle>,
    /// Most recent failure, retained for display until the next operation
    /// clears or overwrites it.
    last_error: Option<ExplorerError>,
}

impl ExplorerController {
    pub fn new(
        gateway: Arc<dyn DatasetGateway>,
        stream_client: Arc<dyn EventStreamClient>,
    ) -> Self {
        Self {
            gateway,
            stream_client,
            datasets: Vec::new(),
            criteria: None,
            results: None,
            subscribed: false,
            channel: None,
            last_error: None,
        }
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn criteria(&self) -> Option<&QueryCriteria> {
        self.criteria.as_ref()
    }

    pub fn results(&self) -> Option<&ResultBuffer> {
        self.results.as_ref()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn has_open_channel(&self) -> bool {
        self.channel.is_some()
    }

    pub fn last_error(&self) -> Option<&ExplorerError> {
        self.last_error.as_ref()
    }

    /// Clear the error slot.
    pub fn discard_error(&mut self) {
        self.last_error = None;
    }

    /// Refresh the known datasets. Any displayed results are discarded; the
    /// criteria and subscription state are left untouched.
    pub async fn refresh_datasets(&mut self) -> ExplorerResult<()> {
        self.last_error = None;
        match self.gateway.list_datasets().await {
            Ok(datasets) => {
                self.datasets = datasets;
                self.results = None;
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Begin exploring `dataset`: fresh criteria with empty clauses and an
    /// unfiltered sample of its rows.
    pub async fn start_sampling(&mut self, dataset: Dataset) -> ExplorerResult<()> {
        self.last_error = None;
        self.criteria = Some(QueryCriteria::sampling(dataset));
        self.fetch_sample().await
    }

    /// Replace the clauses on the active criteria. No validation happens
    /// here; the service is the authority on query syntax.
    pub fn set_clauses(
        &mut self,
        select: &str,
        where_clause: &str,
        order_by: &str,
    ) -> ExplorerResult<()> {
        match self.criteria.as_mut() {
            Some(criteria) => {
                criteria.select = select.to_string();
                criteria.where_clause = where_clause.to_string();
                criteria.order_by = order_by.to_string();
                Ok(())
            }
            None => Err(self.record(ExplorerError::NoActiveCriteria)),
        }
    }

    /// Clear the clauses on the active criteria and grab a fresh sample.
    /// The subscription flag is left untouched.
    pub async fn reset_criteria(&mut self) -> ExplorerResult<()> {
        self.last_error = None;
        match self.criteria.as_mut() {
            Some(criteria) => criteria.reset(),
            None => return Err(self.record(ExplorerError::NoActiveCriteria)),
        }
        self.fetch_sample().await
    }

    /// Drop the criteria and the displayed results.
    pub fn hide_results(&mut self) {
        self.criteria = None;
        self.results = None;
    }

    /// Fetch an unfiltered sample for the active dataset, replacing the
    /// displayed results.
    pub async fn fetch_sample(&mut self) -> ExplorerResult<()> {
        self.last_error = None;
        let dataset_id = match self.criteria.as_ref() {
            Some(criteria) => criteria.dataset.id.clone(),
            None => return Err(self.record(ExplorerError::NoActiveCriteria)),
        };
        match self.gateway.sample(&dataset_id).await {
            Ok(rows) => {
                self.replace_results(rows);
                Ok(())
            }
            Err(e) => Err(self.record(e)),
        }
    }

    /// Fetch content for the active criteria, replacing the displayed
    /// results. A failure while subscribed forces the subscription flag off
    /// without touching the channel handle.
    pub async fn fetch_contents(&mut self) -> ExplorerResult<()> {
        self.last_error = None;
        let (dataset_id, select, where_clause, order_by) = match self.criteria.as_ref() {
            Some(criteria) => (
                criteria.dataset.id.clone(),
                criteria.select.clone(),
                criteria.where_clause.clone(),
                criteria.order_by.clone(),
            ),
            None => return Err(self.record(ExplorerError::NoActiveCriteria)),
        };
        match self
            .gateway
            .content(&dataset_id, &select, &where_clause, &order_by, self.subscribed)
            .await
        {
            Ok(rows) => {
                self.replace_results(rows);
                Ok(())
            }
            Err(e) => {
                if self.subscribed {
                    warn!(
                        "content fetch failed while subscribed, dropping subscription for {}",
                        dataset_id
                    );
                    self.subscribed = false;
                }
                Err(self.record(e))
            }
        }
    }

    /// Toggle the live subscription for the active criteria.
    ///
    /// Turning it on opens an event-stream channel for the dataset and
    /// re-fetches content as of now. Turning it off drops the local handle
    /// and flips the flag immediately, then notifies the gateway; a teardown
    /// failure is surfaced but never blocks the local state change.
    pub async fn toggle_subscription(&mut self) -> ExplorerResult<()> {
        self.last_error = None;
        let dataset_id = match self.criteria.as_ref() {
            Some(criteria) => criteria.dataset.id.clone(),
            None => return Err(self.record(ExplorerError::NoActiveCriteria)),
        };

        if self.subscribed {
            info!("unsubscribing from {}", dataset_id);
            self.subscribed = false;
            self.channel = None;
            if let Err(e) = self.gateway.end_subscription(&dataset_id).await {
                return Err(self.record(e));
            }
            Ok(())
        } else {
            info!("subscribing to {}", dataset_id);
            let handle = match self.stream_client.open(&dataset_id).await {
                Ok(handle) => handle,
                Err(e) => return Err(self.record(e)),
            };
            self.channel = Some(handle);
            self.subscribed = true;
            // content as of now; a failure in here forces the flag back off
            self.fetch_contents().await
        }
    }

    /// Await the next event from the open channel. `None` when no channel is
    /// open or the channel has shut down.
    pub async fn next_stream_event(&mut self) -> Option<StreamEvent> {
        match self.channel.as_mut() {
            Some(channel) => channel.recv().await,
            None => None,
        }
    }

    /// Dispatch one delivered stream event.
    ///
    /// Events arriving while unsubscribed (an abandoned channel can linger,
    /// see `channel`) are dropped. The failure and completion arms leave the
    /// subscription state and the buffer untouched on purpose; they only
    /// restamp the receipt timestamp.
    pub fn apply_stream_event(&mut self, event: StreamEvent) {
        if !self.subscribed {
            debug!("dropping stream event received while unsubscribed");
            return;
        }
        match event {
            StreamEvent::Event(row) => self.append_row(row),
            StreamEvent::Failed(reason) => {
                warn!("subscription stream reported a failure: {}", reason);
                self.stamp_results();
            }
            StreamEvent::Completed => {
                info!("subscription stream completed");
                self.stamp_results();
            }
        }
    }

    fn append_row(&mut self, row: Row) {
        match self.results.as_mut() {
            Some(results) => results.append(row),
            None => {
                // a push can outrun the initial content fetch
                let mut results = ResultBuffer::default();
                results.append(row);
                self.results = Some(results);
            }
        }
    }

    fn replace_results(&mut self, rows: Vec<Row>) {
        let mut results = self.results.take().unwrap_or_default();
        results.replace(rows);
        self.results = Some(results);
    }

    fn stamp_results(&mut self) {
        if let Some(results) = self.results.as_mut() {
            results.stamp();
        }
    }

    fn record(&mut self, error: impl Into<ExplorerError>) -> ExplorerError {
        let error = error.into();
        self.last_error = Some(error.clone());
        error
    }
}
