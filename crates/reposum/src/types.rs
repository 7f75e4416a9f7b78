//! Records returned by a [`DataSource`](crate::DataSource) and the summaries
//! produced from them.
//!
//! Both types are plain immutable values. Field names on the wire follow the
//! GitLab GraphQL schema (`forksCount`), and summaries render as the same
//! camel-cased JSON object.

use core::fmt;
use serde::{Deserialize, Serialize};

/// A single repository as reported by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRecord {
    pub name: String,
    pub forks_count: u64,
}

impl RepositoryRecord {
    pub fn new(name: impl Into<String>, forks_count: u64) -> Self {
        Self {
            name: name.into(),
            forks_count,
        }
    }
}

/// The reduced result of one request: every repository name joined in
/// source order, and the total number of forks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositorySummary {
    pub joined_names: String,
    pub total_forks: u64,
}

impl fmt::Display for RepositorySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
