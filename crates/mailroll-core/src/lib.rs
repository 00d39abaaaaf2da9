//! Core types and collaborator traits for the mailroll subscription engine.
//!
//! No database, SMTP, or templating code lives here. The engine
//! (`mailroll-forms`) and every adapter depend on this crate.

// Adapters implement the collaborator traits with native `async fn`.
#![allow(async_fn_in_trait)]

pub mod contact;
pub mod error;
pub mod hooks;
pub mod mail;
pub mod mailing_list;
pub mod render;
pub mod site;
pub mod store;

pub use error::{BoxError, Error, Result};
