//! Outbound mail collaborator traits and the messages that flow through them.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::Result;

/// A composed notification, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
  pub subject: String,
  /// Used verbatim for both the HTML and plain-text parts.
  pub body:    String,
  pub to:      String,
  pub site_id: i64,
}

/// The sender identity for a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromNameEmail {
  pub name:     String,
  pub email:    String,
  #[serde(default)]
  pub reply_to: Option<String>,
}

/// Resolves who a site's mail is sent from.
pub trait SenderDirectory: Send + Sync {
  fn from_name_email(&self, site_id: i64) -> FromNameEmail;
}

/// A message under construction. Setters consume and return the builder so
/// calls chain.
pub trait MessageBuilder: Send + Sized {
  fn set_from(self, email: &str, name: &str) -> Self;
  fn set_to(self, email: &str) -> Self;
  fn set_subject(self, subject: &str) -> Self;
  fn set_html_body(self, body: &str) -> Self;
  fn set_text_body(self, body: &str) -> Self;
  fn set_reply_to(self, email: &str) -> Self;

  /// Hand the message to the transport. `false` means it was not accepted.
  fn send(self) -> impl Future<Output = bool> + Send;
}

pub trait Mailer: Send + Sync {
  type Message: MessageBuilder;

  fn compose(&self) -> Self::Message;
}

/// Constructs a [`Mailer`] per send. Fails with
/// [`crate::Error::MailerUnavailable`] when the transport is misconfigured.
pub trait MailerFactory: Send + Sync {
  type Mailer: Mailer;

  fn create_mailer(&self) -> Result<Self::Mailer>;
}
