//! Fixed-size worker pool reducing fetched records into summaries.
//!
//! ## Structure
//!
//! - [`task`] - Unit of work and its single-use result slot.
//! - [`worker`] - The loop each worker runs.
//! - [`manager`] - Pool construction, dispatch and shutdown.

pub mod manager;
pub mod task;
pub mod worker;
