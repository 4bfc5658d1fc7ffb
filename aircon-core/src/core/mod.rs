//! Shared infrastructure: configuration, errors, bounded values and data sources.

pub mod config;
pub mod error;
pub mod range;
pub mod seed;
pub mod storage;

pub use config::{AppConfig, BpConfig, ComfortConfig, PsoConfig, SiteConfig};
pub use error::{AirconError, Result};
pub use range::RangeValue;
