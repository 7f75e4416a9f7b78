use crate::{Error, Result};

/// Default separator placed between repository names.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Default ceiling on concurrent fetches.
pub const DEFAULT_MAX_CONNECTIONS: usize = 10;

/// Default number of summary workers.
pub const DEFAULT_NUM_WORKERS: usize = 3;

/// Construction parameters of a [`SummaryService`](crate::SummaryService).
///
/// Both ceilings are fixed for the lifetime of the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Separator placed between repository names in a summary.
    pub separator: String,
    /// Maximum number of fetches in flight at once.
    pub max_connections: usize,
    /// Number of workers reducing fetched records.
    pub num_workers: usize,
}

impl ServiceConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if either ceiling is zero.
    pub fn new(
        separator: impl Into<String>,
        max_connections: usize,
        num_workers: usize,
    ) -> Result<Self> {
        let config = Self {
            separator: separator.into(),
            max_connections,
            num_workers,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the constraints [`new`](Self::new) enforces. Useful when the
    /// struct was assembled by hand.
    pub fn validate(&self) -> Result<()> {
        if self.max_connections == 0 {
            return Err(Error::InvalidConfig {
                reason: "max_connections must be greater than 0".to_string(),
            });
        }
        if self.num_workers == 0 {
            return Err(Error::InvalidConfig {
                reason: "num_workers must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            num_workers: DEFAULT_NUM_WORKERS,
        }
    }
}
