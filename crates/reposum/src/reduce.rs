//! Reduction of fetched records into a [`RepositorySummary`].
//!
//! The reducer is the business rule run by each worker. It is a pure
//! in-memory computation and cannot fail.

use crate::{RepositoryRecord, RepositorySummary};

/// Combines an ordered sequence of records into one summary.
///
/// Implementations must be cheap to share across workers; the pool holds a
/// single instance behind an `Arc`.
pub trait Reducer: Send + Sync + 'static {
    fn reduce(&self, records: &[RepositoryRecord]) -> RepositorySummary;
}

/// Joins names with a fixed separator and sums fork counts.
///
/// Record order is preserved. An empty input yields an empty name and a
/// total of zero.
#[derive(Debug, Clone)]
pub struct JoinReducer {
    separator: String,
}

impl JoinReducer {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Reducer for JoinReducer {
    fn reduce(&self, records: &[RepositoryRecord]) -> RepositorySummary {
        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        let total_forks = records.iter().map(|r| r.forks_count).sum();

        RepositorySummary {
            joined_names: names.join(&self.separator),
            total_forks,
        }
    }
}
