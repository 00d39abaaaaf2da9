//! Hands a composed notification to the mail transport.

use std::sync::Arc;

use mailroll_core::{
  Result,
  mail::{
    Mailer, MailerFactory, MessageBuilder, NotificationMessage, SenderDirectory,
  },
  mailing_list::non_empty,
};

pub struct MailDispatcher<F> {
  mailers: Arc<F>,
  senders: Arc<dyn SenderDirectory>,
}

impl<F> Clone for MailDispatcher<F> {
  fn clone(&self) -> Self {
    Self {
      mailers: Arc::clone(&self.mailers),
      senders: Arc::clone(&self.senders),
    }
  }
}

impl<F: MailerFactory> MailDispatcher<F> {
  pub fn new(mailers: Arc<F>, senders: Arc<dyn SenderDirectory>) -> Self {
    Self { mailers, senders }
  }

  /// Send `message` from its site's configured sender.
  ///
  /// Returns the transport's verdict. Fails only when no mailer can be
  /// built.
  pub async fn send(&self, message: &NotificationMessage) -> Result<bool> {
    let mailer = self.mailers.create_mailer()?;
    let from = self.senders.from_name_email(message.site_id);

    let mut builder = mailer
      .compose()
      .set_from(&from.email, &from.name)
      .set_to(&message.to)
      .set_subject(&message.subject)
      .set_html_body(&message.body)
      .set_text_body(&message.body);

    if let Some(reply_to) = non_empty(from.reply_to.as_deref()) {
      builder = builder.set_reply_to(reply_to);
    }

    let sent = builder.send().await;
    if sent {
      tracing::debug!(to = %message.to, site = message.site_id, "notification sent");
    } else {
      tracing::warn!(to = %message.to, site = message.site_id, "transport rejected notification");
    }
    Ok(sent)
  }
}
