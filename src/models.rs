//! Data model shared by the gateway, the stream client and the explorer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row returned by the service.
///
/// Rows are schemaless JSON documents; the client displays them but never
/// inspects their fields.
pub type Row = serde_json::Value;

/// A named, owned data source the service can sample and query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Opaque identifier assigned by the service.
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub owner: String,
    /// Source descriptor, e.g. a database address or an HTTP location.
    pub source: String,
    /// Field the service uses to window live subscription updates.
    #[serde(default)]
    pub subscription_control_field: String,
    /// Pattern applied to the subscription control field.
    #[serde(default)]
    pub subscription_control_field_pattern: String,
}

/// The active select/where/orderBy clauses plus target dataset.
///
/// Exactly one of these is active at a time; it exists from the moment a
/// dataset is opened for sampling until the results are hidden.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryCriteria {
    pub dataset: Dataset,
    pub select: String,
    pub where_clause: String,
    pub order_by: String,
}

impl QueryCriteria {
    /// Fresh criteria for a dataset, all clauses empty.
    pub fn sampling(dataset: Dataset) -> Self {
        Self {
            dataset,
            select: String::new(),
            where_clause: String::new(),
            order_by: String::new(),
        }
    }

    /// Clear all clauses, keeping the dataset.
    pub fn reset(&mut self) {
        self.select.clear();
        self.where_clause.clear();
        self.order_by.clear();
    }

    pub fn has_clauses(&self) -> bool {
        !(self.select.is_empty() && self.where_clause.is_empty() && self.order_by.is_empty())
    }
}

/// The in-memory sequence of rows currently displayed.
///
/// While a subscription is active the buffer is append-only; while
/// unsubscribed it is wholly replaced on each fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultBuffer {
    pub rows: Vec<Row>,
    /// Stamped on every replace and on every delivered stream event.
    pub last_updated: Option<DateTime<Utc>>,
}

impl ResultBuffer {
    pub fn replace(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.stamp();
    }

    pub fn append(&mut self, row: Row) {
        self.rows.push(row);
        self.stamp();
    }

    pub fn stamp(&mut self) {
        self.last_updated = Some(Utc::now());
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Health report returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn dataset_parses_the_service_wire_shape() {
        let dataset: Dataset = serde_json::from_value(json!({
            "id": "65a1",
            "name": "orders",
            "owner": "ops",
            "source": "mongo://orders",
            "subscriptionControlField": "updatedAt",
            "subscriptionControlFieldPattern": "yyyy-MM-dd"
        }))
        .unwrap();

        assert_eq!(dataset.id, "65a1");
        assert_eq!(dataset.subscription_control_field, "updatedAt");
    }

    #[test]
    fn dataset_control_fields_default_when_absent() {
        let dataset: Dataset = serde_json::from_value(json!({
            "name": "orders",
            "owner": "ops",
            "source": "mongo://orders"
        }))
        .unwrap();

        assert!(dataset.id.is_empty());
        assert!(dataset.subscription_control_field.is_empty());
    }

    #[test]
    fn reset_clears_clauses_but_keeps_the_dataset() {
        let dataset: Dataset = serde_json::from_value(json!({
            "id": "d1", "name": "n", "owner": "o", "source": "s"
        }))
        .unwrap();

        let mut criteria = QueryCriteria::sampling(dataset.clone());
        criteria.select = "a, b".to_string();
        criteria.where_clause = "a > 1".to_string();
        criteria.order_by = "b desc".to_string();
        assert!(criteria.has_clauses());

        criteria.reset();

        assert!(!criteria.has_clauses());
        assert_eq!(criteria.dataset, dataset);
    }
}
