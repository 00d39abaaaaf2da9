//! Error types for `mailroll-core`.

use thiserror::Error;

use crate::hooks::Hook;

/// A type-erased error raised by a collaborator (store, observer, renderer).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// Recording an interaction or saving a contact failed.
  #[error("element persistence error: {0}")]
  ElementPersistence(#[source] BoxError),

  /// The mail transport could not be constructed.
  #[error("mailer unavailable: {0}")]
  MailerUnavailable(String),

  /// A before-hook observer vetoed the operation. Nothing was mutated.
  #[error("operation aborted by {0} observer")]
  HookAborted(Hook),

  #[error("{hook} observer failed: {source}")]
  Observer {
    hook:   Hook,
    #[source]
    source: BoxError,
  },

  /// The template renderer failed with something other than a template
  /// fault.
  #[error("render error: {0}")]
  Render(#[source] BoxError),

  #[error("no base URL configured for site {0}")]
  UnknownSite(i64),

  #[error("invalid url: {0}")]
  InvalidUrl(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
