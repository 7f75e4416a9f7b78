//! Public service surface and its supporting types.
//!
//! ## Structure
//!
//! - [`handler`] - The orchestrator (`SummaryService`).
//! - [`config`] - Validated construction parameters.
//! - [`stats`] - Request counters.

pub mod config;
pub mod handler;
pub mod stats;

#[cfg(test)]
mod tests;
