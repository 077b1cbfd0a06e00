//! `restock-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no IO, no threads, no HTTP).

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{Aggregate, AggregateRoot};
pub use error::DomainError;
pub use id::{ModelId, SessionId};
