//! Verification and unsubscribe-confirmation email flows.
//!
//! Both flows share one shape: build a link on the mailing list's site,
//! compose with the list type's overrides, dispatch from that site's sender.
//! The site is always passed explicitly; nothing here depends on a "current"
//! site.

use std::sync::Arc;

use mailroll_core::{
  Result,
  contact::{Contact, PendingContact},
  mail::{MailerFactory, NotificationMessage},
  mailing_list::MailingList,
  render::RenderContext,
  site::UrlBuilder,
};
use serde_json::json;

use crate::{
  compose::{NotificationComposer, NotificationTemplate},
  dispatch::MailDispatcher,
};

pub const VERIFY_SUBJECT: &str = "Verify your email address";
pub const VERIFY_BODY: &str = "Thank you for subscribing to the mailing list. \
                               Please verify your email address by clicking \
                               on the following link:";

pub const UNSUBSCRIBE_SUBJECT: &str = "Confirm unsubscribe";
pub const UNSUBSCRIBE_BODY: &str = "Please confirm that you would like to \
                                    unsubscribe from the mailing list by \
                                    clicking on the following link:";

pub const DEFAULT_ACTION_TRIGGER: &str = "actions";

pub struct Notifications<F> {
  composer:       NotificationComposer,
  dispatcher:     MailDispatcher<F>,
  urls:           Arc<dyn UrlBuilder>,
  action_trigger: String,
}

impl<F: MailerFactory> Notifications<F> {
  pub fn new(
    composer: NotificationComposer,
    dispatcher: MailDispatcher<F>,
    urls: Arc<dyn UrlBuilder>,
  ) -> Self {
    Self {
      composer,
      dispatcher,
      urls,
      action_trigger: DEFAULT_ACTION_TRIGGER.to_owned(),
    }
  }

  /// Override the path segment that prefixes action routes.
  pub fn with_action_trigger(mut self, trigger: impl Into<String>) -> Self {
    self.action_trigger = trigger.into();
    self
  }

  fn action_path(&self, action: &str) -> String {
    format!(
      "{}/mailroll/forms/{action}",
      self.action_trigger.trim_matches('/')
    )
  }

  /// Send the verify-your-address email for a pending subscription.
  pub async fn send_verification_email(
    &self,
    pending_contact: &PendingContact,
    mailing_list: &MailingList,
  ) -> Result<bool> {
    let url = self.urls.site_url(
      &self.action_path("verify-email"),
      &[("pid", pending_contact.pid.as_str())],
      mailing_list.site_id,
    )?;

    let mut context = RenderContext::new();
    context.insert("message".into(), json!(VERIFY_BODY));
    context.insert("url".into(), json!(url));
    context.insert("mailingList".into(), serde_json::to_value(mailing_list)?);
    context.insert(
      "pendingContact".into(),
      serde_json::to_value(pending_contact)?,
    );

    let list_type = &mailing_list.mailing_list_type;
    let composed = self.composer.compose(
      NotificationTemplate {
        default_subject:  VERIFY_SUBJECT,
        default_body:     VERIFY_BODY,
        subject_override: list_type.verify_email_subject.as_deref(),
        template:         list_type.verify_email_template.as_deref(),
      },
      &url,
      &context,
    )?;

    self
      .dispatcher
      .send(&NotificationMessage {
        subject: composed.subject,
        body:    composed.body,
        to:      pending_contact.email.clone(),
        site_id: mailing_list.site_id,
      })
      .await
  }

  /// Send the confirm-unsubscribe email for a contact on a list.
  pub async fn send_unsubscribe_email(
    &self,
    contact: &Contact,
    mailing_list: &MailingList,
  ) -> Result<bool> {
    let uid = contact.uid.to_string();
    let url = self.urls.site_url(
      &self.action_path("unsubscribe-email"),
      &[
        ("cid", contact.cid.as_str()),
        ("uid", uid.as_str()),
        ("mlid", mailing_list.mlid.as_str()),
      ],
      mailing_list.site_id,
    )?;

    let mut context = RenderContext::new();
    context.insert("message".into(), json!(UNSUBSCRIBE_BODY));
    context.insert("url".into(), json!(url));
    context.insert("mailingList".into(), serde_json::to_value(mailing_list)?);
    context.insert("contact".into(), serde_json::to_value(contact)?);

    let list_type = &mailing_list.mailing_list_type;
    let composed = self.composer.compose(
      NotificationTemplate {
        default_subject:  UNSUBSCRIBE_SUBJECT,
        default_body:     UNSUBSCRIBE_BODY,
        subject_override: list_type.unsubscribe_email_subject.as_deref(),
        template:         list_type.unsubscribe_email_template.as_deref(),
      },
      &url,
      &context,
    )?;

    self
      .dispatcher
      .send(&NotificationMessage {
        subject: composed.subject,
        body:    composed.body,
        to:      contact.email.clone(),
        site_id: mailing_list.site_id,
      })
      .await
  }
}
