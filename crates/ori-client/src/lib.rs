//! # ori-client
//!
//! Client side of the Oriana HTTP contract: a typed API client and the
//! local library state a front-end renders from.

pub mod api;
pub mod library;

pub use api::{ApiClient, ClientError, ListQuery};
pub use library::{Library, PendingToggle};
