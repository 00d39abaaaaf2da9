//! Mailing lists, their type configuration, and interaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Mailing list ────────────────────────────────────────────────────────────

/// Per-type overrides for the transactional emails a list sends.
///
/// An empty string is treated exactly like `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingListType {
  pub verify_email_subject:       Option<String>,
  pub verify_email_template:      Option<String>,
  pub unsubscribe_email_subject:  Option<String>,
  pub unsubscribe_email_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailingList {
  pub id:                i64,
  /// Public identifier used in links.
  pub mlid:              String,
  pub site_id:           i64,
  pub title:             String,
  pub mailing_list_type: MailingListType,
}

/// Collapse `Some("")` to `None`.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
  value.filter(|v| !v.is_empty())
}

// ─── Interactions ────────────────────────────────────────────────────────────

/// The transition an interaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionKind {
  Subscribed,
  Unsubscribed,
}

impl InteractionKind {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Subscribed => "subscribed",
      Self::Unsubscribed => "unsubscribed",
    }
  }
}

impl std::fmt::Display for InteractionKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Input to [`crate::store::SubscriptionStore::record_interaction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
  pub kind:        InteractionKind,
  /// Provenance category, e.g. "form" or "import". Empty when unknown.
  pub source_type: String,
  /// Free-text provenance, e.g. the page the form lives on.
  pub source:      String,
  /// Whether the contact's address has been verified by this interaction.
  pub verify:      bool,
}

impl Interaction {
  pub fn subscribed(
    source_type: impl Into<String>,
    source: impl Into<String>,
    verify: bool,
  ) -> Self {
    Self {
      kind: InteractionKind::Subscribed,
      source_type: source_type.into(),
      source: source.into(),
      verify,
    }
  }

  pub fn unsubscribed() -> Self {
    Self {
      kind:        InteractionKind::Unsubscribed,
      source_type: String::new(),
      source:      String::new(),
      verify:      false,
    }
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// The persisted state of one contact on one list, as reported by adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
  pub contact_id:      i64,
  pub mailing_list_id: i64,
  pub status:          InteractionKind,
  pub source_type:     String,
  pub source:          String,
  pub subscribed:      Option<DateTime<Utc>>,
  pub unsubscribed:    Option<DateTime<Utc>>,
  pub verified:        Option<DateTime<Utc>>,
}
