//! Platform-agnostic core: activity model, aggregation pipeline, settings and data access.

pub mod activity;
pub mod error;
pub mod format;
pub mod page;
pub mod platform;
pub mod progress;
pub mod session;
pub mod settings;
pub mod source;

pub use error::{ProgressError, Result};
