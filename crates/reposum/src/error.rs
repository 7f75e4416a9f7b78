//! Error types for the summary service.
//!
//! Every failure path of [`SummaryService::create_summary`] surfaces as one of
//! the variants below, so a caller can always tell a shutdown apart from a
//! failed fetch.
//!
//! ## Error Cases
//! - `Terminated`: The request arrived at or after shutdown, or shutdown
//!   preempted it while it was waiting.
//! - `FetchFailed`: The [`DataSource`] returned an error. The source error is
//!   kept as-is and exposed through [`core::error::Error::source`].
//! - `InvalidConfig`: A [`ServiceConfig`] was rejected at construction.
//!
//! [`SummaryService::create_summary`]: crate::SummaryService::create_summary
//! [`DataSource`]: crate::DataSource
//! [`ServiceConfig`]: crate::ServiceConfig

/// Error currency of a [`DataSource`](crate::DataSource) fetch.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the summary service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The service is shut down or shutting down. Not retryable.
    #[error("Service terminated")]
    Terminated,

    /// The data source failed for this request. No partial result exists.
    #[error("Fetch failed: {0}")]
    FetchFailed(#[source] BoxError),

    /// The service configuration violated a constraint.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Returns `true` if the request was rejected or abandoned due to
    /// shutdown.
    pub const fn is_terminated(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns `true` if the data source failed for this request.
    pub const fn is_fetch_failed(&self) -> bool {
        matches!(self, Self::FetchFailed(_))
    }
}
