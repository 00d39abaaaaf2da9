//! SQLite backend for mailroll contacts, lists, and subscriptions.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements both
//! [`SubscriptionStore`](mailroll_core::store::SubscriptionStore) and
//! [`ActivityTracker`](mailroll_core::store::ActivityTracker).

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{NewMailingList, SqliteStore};

#[cfg(test)]
mod tests;
