//! Data sources selectable from the command line.
//!
//! - [`gitlab`] - GitLab GraphQL API.
//! - `synthetic` - [`reposum::SequenceSource`], no network access.

pub mod gitlab;

use crate::config::{RunConfig, SourceKind};
use reposum::{DataSource, SequenceSource};
use std::sync::Arc;

/// Builds the data source selected in `config`.
pub fn build_source(config: &RunConfig) -> anyhow::Result<Arc<dyn DataSource>> {
    Ok(match config.source {
        SourceKind::Gitlab => Arc::new(gitlab::GitlabSource::new(&config.api_url)?),
        SourceKind::Synthetic => Arc::new(SequenceSource::new(config.max_delay)),
    })
}
