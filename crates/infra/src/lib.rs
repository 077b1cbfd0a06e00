//! `restock-infra`
//!
//! Adapters around the pure session crates:
//! - `source`: where the base item list comes from (HTTP or in-memory)
//! - `controller`: owns the live session and runs load/train/predict work on
//!   background threads, feeding outcomes back as session commands
//! - `config`: environment-driven settings

pub mod config;
pub mod controller;
pub mod source;

pub use config::{Config, ConfigError};
pub use controller::{ControllerSettings, SessionController};
pub use source::{
    FailingProductSource, HttpProductSource, ProductSource, SourceError, StaticProductSource,
};
