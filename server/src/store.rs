//! In-memory item collection.
//!
//! # Design
//! `ItemStore` is a plain owned value with no interior locking. The HTTP
//! layer wraps the single instance in one `RwLock` and hands it to handlers
//! as axum state, so every create/delete runs to completion under the write
//! lock and no partially applied mutation is ever observable.
//!
//! Insertion order is the only ordering. Records are appended on create and
//! never updated in place.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single item held in the collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Unset on seed records.
    #[serde(default, skip_serializing_if = "Option::is_none", with = "millis")]
    pub created_at: Option<DateTime<Utc>>,
}

/// RFC 3339 in UTC with exactly three fractional digits and a `Z` suffix.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod millis {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match at {
            Some(at) => serializer.serialize_str(&super::iso_timestamp(at)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<DateTime<Utc>>::deserialize(deserializer)
    }
}

/// How a newly created item gets its id.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum IdStrategy {
    /// `id = len + 1`. Can hand out an id still held by a surviving record
    /// once something has been deleted.
    #[default]
    Length,
    /// Strictly increasing counter; ids are never reused within a process.
    Sequential,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("name and description are required")]
    MissingFields,

    #[error("no item with id {0}")]
    NotFound(u64),
}

#[derive(Debug)]
pub struct ItemStore {
    items: Vec<Item>,
    strategy: IdStrategy,
    next_id: u64,
}

impl ItemStore {
    /// Store holding the three seed records present at every start.
    pub fn seeded(strategy: IdStrategy) -> Self {
        let items: Vec<Item> = (1..=3)
            .map(|n| Item {
                id: n,
                name: format!("Item {n}"),
                description: format!("Description for item {n}"),
                created_at: None,
            })
            .collect();
        Self::with_items(items, strategy)
    }

    pub fn with_items(items: Vec<Item>, strategy: IdStrategy) -> Self {
        let next_id = items.iter().map(|item| item.id).max().unwrap_or(0) + 1;
        Self {
            items,
            strategy,
            next_id,
        }
    }

    pub fn list(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append a new item. Both fields must be present and non-empty; on
    /// failure the collection is left untouched.
    pub fn create(
        &mut self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Item, StoreError> {
        let (name, description) = match (name, description) {
            (Some(name), Some(description)) if !name.is_empty() && !description.is_empty() => {
                (name, description)
            }
            _ => return Err(StoreError::MissingFields),
        };

        let id = match self.strategy {
            IdStrategy::Length => self.items.len() as u64 + 1,
            IdStrategy::Sequential => self.next_id,
        };
        self.next_id = self.next_id.max(id) + 1;

        let item = Item {
            id,
            name,
            description,
            created_at: Some(Utc::now().trunc_subsecs(3)),
        };
        self.items.push(item.clone());
        Ok(item)
    }

    /// Remove the record with `id`. Under `IdStrategy::Length` duplicates
    /// can exist, in which case all of them go.
    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() < before {
            Ok(())
        } else {
            Err(StoreError::NotFound(id))
        }
    }
}

impl Default for ItemStore {
    fn default() -> Self {
        Self::seeded(IdStrategy::default())
    }
}
