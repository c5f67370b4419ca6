//! # folio-core
//!
//! Core types, traits, and abstractions for folio.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other folio crates depend on: the manuscript data
//! model, the partition store contract, the personalization repository
//! traits, and an in-memory partition implementation used by tests and
//! ephemeral deployments.

pub mod error;
pub mod logging;
pub mod memory;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use memory::{MemoryBookmarkStore, MemoryHistoryStore, MemoryPartition};
pub use models::*;
pub use traits::*;
