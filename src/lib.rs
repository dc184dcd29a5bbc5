//! Sorts Google Takeout style photo exports using their JSON sidecars.

pub mod config;
pub mod date;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod relocator;
pub mod scanner;

pub use config::{Config, MediaKind, MediaRule};
pub use error::{DateError, Error, Result};
pub use pipeline::{RunSummary, run};
pub use relocator::{FsTimestampSetter, TimestampSetter};
