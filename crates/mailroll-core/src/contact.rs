//! Contacts and pending contacts.
//!
//! A contact is owned by the persistence layer. The engine only ever holds a
//! borrowed reference or an owned snapshot handed to hook observers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A confirmed mailing-list contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
  pub id:            i64,
  /// Public identifier used in links.
  pub cid:           String,
  /// Secret token proving ownership of the address in unsubscribe links.
  pub uid:           Uuid,
  pub email:         String,
  pub last_activity: Option<DateTime<Utc>>,
}

impl Contact {
  /// A contact with freshly generated `cid` and `uid`, not yet persisted
  /// anywhere.
  pub fn new(id: i64, email: impl Into<String>) -> Self {
    Self {
      id,
      cid: Uuid::new_v4().simple().to_string(),
      uid: Uuid::new_v4(),
      email: email.into(),
      last_activity: None,
    }
  }
}

/// An unconfirmed subscription request awaiting email verification.
///
/// Promotion to a [`Contact`] happens outside the engine once the `pid` link
/// is followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingContact {
  /// Unique pending identifier carried by the verification link.
  pub pid:             String,
  pub email:           String,
  pub mailing_list_id: i64,
  pub source:          String,
  pub created_at:      DateTime<Utc>,
}

impl PendingContact {
  pub fn new(email: impl Into<String>, mailing_list_id: i64) -> Self {
    Self {
      pid: Uuid::new_v4().simple().to_string(),
      email: email.into(),
      mailing_list_id,
      source: String::new(),
      created_at: Utc::now(),
    }
  }
}
