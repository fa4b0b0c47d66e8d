//! oriana/crates/ori-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Oriana.

pub mod draft;
pub mod error;
pub mod models;
pub mod query;
pub mod services;
pub mod stats;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use query::{MediaFilter, SortSpec};
pub use services::{MediaService, UserService};
pub use stats::LibraryStats;
pub use traits::*;
