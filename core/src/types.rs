//! DTOs for the item store's JSON contract.
//!
//! # Design
//! These mirror the server's schema but are defined independently, so the
//! client never links against axum. The integration test catches drift
//! between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Absent on seed records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Request payload for creating an item. Doubles as the shell's pending form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItem {
    pub name: String,
    pub description: String,
}

impl NewItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub total_items: usize,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "OK"
    }
}

/// Body of `GET /api/data`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemList {
    pub success: bool,
    pub data: Vec<Item>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Created {
    pub data: Item,
}

/// `{success, message}` envelope used by delete and by every error.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope {
    #[allow(dead_code)]
    pub success: bool,
    pub message: String,
}
