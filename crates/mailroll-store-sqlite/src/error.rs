//! Error type for `mailroll-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown subscription status: {0:?}")]
  UnknownStatus(String),

  #[error("contact not found: {0}")]
  ContactNotFound(i64),

  #[error("mailing list not found: {0}")]
  MailingListNotFound(i64),

  #[error("email address already in use: {0}")]
  DuplicateEmail(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
