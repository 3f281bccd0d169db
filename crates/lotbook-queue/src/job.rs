//! Propagation job payloads
//!
//! A job is a name plus ordered arguments. The serde tag keeps the wire
//! shape stable (`{"job": "rename_key", ...}`) for any broker that carries
//! JSON payloads.

use serde::{Deserialize, Serialize};

/// A unit of schema-propagation work
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "job", rename_all = "snake_case")]
pub enum Job {
    /// Add `key` (null-valued) to every item document in the category
    AddKeyForCategory { category_id: i64, key: String },
    /// Move the value under `old_key` to `new_key` in every document of the
    /// scoped categories
    RenameKey {
        old_key: String,
        new_key: String,
        category_ids: Vec<i64>,
    },
    /// Drop `key` from every document of the scoped categories
    RemoveKey {
        key: String,
        category_ids: Vec<i64>,
    },
}

impl Job {
    /// Stable job name, usable as a broker routing key
    pub fn name(&self) -> &'static str {
        match self {
            Job::AddKeyForCategory { .. } => "add_key_for_category",
            Job::RenameKey { .. } => "rename_key",
            Job::RemoveKey { .. } => "remove_key",
        }
    }

    /// Human-readable scope description for terminal-failure logs
    pub fn describe(&self) -> String {
        match self {
            Job::AddKeyForCategory { category_id, key } => {
                format!("add key '{}' for category {}", key, category_id)
            }
            Job::RenameKey {
                old_key,
                new_key,
                category_ids,
            } => format!(
                "rename key '{}' -> '{}' in categories {:?}",
                old_key, new_key, category_ids
            ),
            Job::RemoveKey { key, category_ids } => {
                format!("remove key '{}' in categories {:?}", key, category_ids)
            }
        }
    }
}
