//! [`MailSettings`] — sender identities, deserialised from the `mail` config
//! table.

use mailroll_core::mail::{FromNameEmail, SenderDirectory};
use serde::Deserialize;

/// A sender that applies to one site only.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteSender {
  pub site_id:  i64,
  pub name:     String,
  pub email:    String,
  #[serde(default)]
  pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
  pub from_name:  String,
  pub from_email: String,
  #[serde(default)]
  pub reply_to:   Option<String>,
  /// Site-specific senders; the first entry for a site wins.
  #[serde(default)]
  pub senders:    Vec<SiteSender>,
}

impl SenderDirectory for MailSettings {
  fn from_name_email(&self, site_id: i64) -> FromNameEmail {
    match self.senders.iter().find(|s| s.site_id == site_id) {
      Some(sender) => FromNameEmail {
        name:     sender.name.clone(),
        email:    sender.email.clone(),
        reply_to: sender.reply_to.clone(),
      },
      None => FromNameEmail {
        name:     self.from_name.clone(),
        email:    self.from_email.clone(),
        reply_to: self.reply_to.clone(),
      },
    }
  }
}
