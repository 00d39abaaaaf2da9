//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings.

use chrono::{DateTime, Utc};
use mailroll_core::{
  contact::{Contact, PendingContact},
  mailing_list::{InteractionKind, MailingList, MailingListType, Subscription},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── InteractionKind ──────────────────────────────────────────────────────────

pub fn encode_status(kind: InteractionKind) -> &'static str { kind.as_str() }

pub fn decode_status(s: &str) -> Result<InteractionKind> {
  match s {
    "subscribed" => Ok(InteractionKind::Subscribed),
    "unsubscribed" => Ok(InteractionKind::Unsubscribed),
    other => Err(Error::UnknownStatus(other.to_owned())),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `contacts` row.
pub struct RawContact {
  pub id:            i64,
  pub cid:           String,
  pub uid:           String,
  pub email:         String,
  pub last_activity: Option<String>,
}

impl RawContact {
  pub const COLUMNS: &'static str = "id, cid, uid, email, last_activity";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      cid:           row.get(1)?,
      uid:           row.get(2)?,
      email:         row.get(3)?,
      last_activity: row.get(4)?,
    })
  }

  pub fn into_contact(self) -> Result<Contact> {
    Ok(Contact {
      id:            self.id,
      cid:           self.cid,
      uid:           decode_uuid(&self.uid)?,
      email:         self.email,
      last_activity: decode_opt_dt(self.last_activity)?,
    })
  }
}

/// Raw values read directly from a `mailing_lists` row.
pub struct RawMailingList {
  pub id:                         i64,
  pub mlid:                       String,
  pub site_id:                    i64,
  pub title:                      String,
  pub verify_email_subject:       Option<String>,
  pub verify_email_template:      Option<String>,
  pub unsubscribe_email_subject:  Option<String>,
  pub unsubscribe_email_template: Option<String>,
}

impl RawMailingList {
  pub const COLUMNS: &'static str = "id, mlid, site_id, title, \
                                     verify_email_subject, verify_email_template, \
                                     unsubscribe_email_subject, unsubscribe_email_template";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                         row.get(0)?,
      mlid:                       row.get(1)?,
      site_id:                    row.get(2)?,
      title:                      row.get(3)?,
      verify_email_subject:       row.get(4)?,
      verify_email_template:      row.get(5)?,
      unsubscribe_email_subject:  row.get(6)?,
      unsubscribe_email_template: row.get(7)?,
    })
  }

  pub fn into_mailing_list(self) -> MailingList {
    MailingList {
      id:                self.id,
      mlid:              self.mlid,
      site_id:           self.site_id,
      title:             self.title,
      mailing_list_type: MailingListType {
        verify_email_subject:       self.verify_email_subject,
        verify_email_template:      self.verify_email_template,
        unsubscribe_email_subject:  self.unsubscribe_email_subject,
        unsubscribe_email_template: self.unsubscribe_email_template,
      },
    }
  }
}

/// Raw values read directly from a `contact_mailing_lists` row.
pub struct RawSubscription {
  pub contact_id:          i64,
  pub mailing_list_id:     i64,
  pub subscription_status: String,
  pub source_type:         String,
  pub source:              String,
  pub subscribed:          Option<String>,
  pub unsubscribed:        Option<String>,
  pub verified:            Option<String>,
}

impl RawSubscription {
  pub const COLUMNS: &'static str = "contact_id, mailing_list_id, subscription_status, \
                                     source_type, source, subscribed, unsubscribed, verified";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      contact_id:          row.get(0)?,
      mailing_list_id:     row.get(1)?,
      subscription_status: row.get(2)?,
      source_type:         row.get(3)?,
      source:              row.get(4)?,
      subscribed:          row.get(5)?,
      unsubscribed:        row.get(6)?,
      verified:            row.get(7)?,
    })
  }

  pub fn into_subscription(self) -> Result<Subscription> {
    Ok(Subscription {
      contact_id:      self.contact_id,
      mailing_list_id: self.mailing_list_id,
      status:          decode_status(&self.subscription_status)?,
      source_type:     self.source_type,
      source:          self.source,
      subscribed:      decode_opt_dt(self.subscribed)?,
      unsubscribed:    decode_opt_dt(self.unsubscribed)?,
      verified:        decode_opt_dt(self.verified)?,
    })
  }
}

/// Raw values read directly from a `pending_contacts` row.
pub struct RawPendingContact {
  pub pid:             String,
  pub email:           String,
  pub mailing_list_id: i64,
  pub source:          String,
  pub created_at:      String,
}

impl RawPendingContact {
  pub const COLUMNS: &'static str = "pid, email, mailing_list_id, source, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      pid:             row.get(0)?,
      email:           row.get(1)?,
      mailing_list_id: row.get(2)?,
      source:          row.get(3)?,
      created_at:      row.get(4)?,
    })
  }

  pub fn into_pending_contact(self) -> Result<PendingContact> {
    Ok(PendingContact {
      pid:             self.pid,
      email:           self.email,
      mailing_list_id: self.mailing_list_id,
      source:          self.source,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}
