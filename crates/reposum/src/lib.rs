#![doc = include_str!("../README.md")]

mod error;
mod limiter;
pub mod pool;
mod reduce;
pub mod service;
mod shutdown;
mod source;
mod types;

pub use crate::error::*;
pub use crate::limiter::*;
pub use crate::pool::{manager::WorkerPool, task::SummaryTask};
pub use crate::reduce::*;
pub use crate::service::{
    config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_NUM_WORKERS, DEFAULT_SEPARATOR, ServiceConfig},
    handler::SummaryService,
    stats::StatsSnapshot,
};
pub use crate::shutdown::*;
pub use crate::source::*;
pub use crate::types::*;
