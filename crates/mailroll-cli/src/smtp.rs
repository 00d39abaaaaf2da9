//! SMTP transport adapter over `lettre`.

use lettre::{
  Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
  message::{Mailbox, MultiPart},
  transport::smtp::authentication::Credentials,
};
use mailroll_core::{
  Error, Result,
  mail::{Mailer, MailerFactory, MessageBuilder},
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  pub host:     String,
  #[serde(default)]
  pub port:     Option<u16>,
  #[serde(default)]
  pub username: Option<String>,
  #[serde(default)]
  pub password: Option<String>,
}

/// Builds a relay transport from [`SmtpConfig`] on every send.
pub struct SmtpMailers {
  config: SmtpConfig,
}

impl SmtpMailers {
  pub fn new(config: SmtpConfig) -> Self { Self { config } }
}

impl MailerFactory for SmtpMailers {
  type Mailer = SmtpMailer;

  fn create_mailer(&self) -> Result<SmtpMailer> {
    if self.config.host.is_empty() {
      return Err(Error::MailerUnavailable("smtp.host is not set".into()));
    }

    let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
      .map_err(|e| Error::MailerUnavailable(format!("failed to create SMTP transport: {e}")))?;
    if let Some(port) = self.config.port {
      builder = builder.port(port);
    }
    if let (Some(user), Some(password)) =
      (&self.config.username, &self.config.password)
    {
      builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
    }

    Ok(SmtpMailer { transport: builder.build() })
  }
}

pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl Mailer for SmtpMailer {
  type Message = SmtpMessage;

  fn compose(&self) -> SmtpMessage {
    SmtpMessage {
      transport: self.transport.clone(),
      from:      None,
      to:        None,
      subject:   String::new(),
      html_body: String::new(),
      text_body: String::new(),
      reply_to:  None,
    }
  }
}

/// Collects message parts; the `lettre` message is only built on send, where
/// address parse errors can be reported.
pub struct SmtpMessage {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from:      Option<(String, String)>,
  to:        Option<String>,
  subject:   String,
  html_body: String,
  text_body: String,
  reply_to:  Option<String>,
}

impl SmtpMessage {
  fn build(&self) -> std::result::Result<Message, String> {
    let (from_email, from_name) = self.from.as_ref().ok_or("missing sender")?;
    let to = self.to.as_deref().ok_or("missing recipient")?;

    let from = Mailbox::new(Some(from_name.clone()), parse_address(from_email)?);
    let mut builder = Message::builder()
      .from(from)
      .to(Mailbox::new(None, parse_address(to)?))
      .subject(self.subject.clone());

    if let Some(reply_to) = &self.reply_to {
      builder = builder.reply_to(Mailbox::new(None, parse_address(reply_to)?));
    }

    builder
      .multipart(MultiPart::alternative_plain_html(
        self.text_body.clone(),
        self.html_body.clone(),
      ))
      .map_err(|e| format!("failed to build email: {e}"))
  }
}

fn parse_address(s: &str) -> std::result::Result<Address, String> {
  s.parse::<Address>()
    .map_err(|e| format!("invalid address {s:?}: {e}"))
}

impl MessageBuilder for SmtpMessage {
  fn set_from(mut self, email: &str, name: &str) -> Self {
    self.from = Some((email.to_owned(), name.to_owned()));
    self
  }

  fn set_to(mut self, email: &str) -> Self {
    self.to = Some(email.to_owned());
    self
  }

  fn set_subject(mut self, subject: &str) -> Self {
    self.subject = subject.to_owned();
    self
  }

  fn set_html_body(mut self, body: &str) -> Self {
    self.html_body = body.to_owned();
    self
  }

  fn set_text_body(mut self, body: &str) -> Self {
    self.text_body = body.to_owned();
    self
  }

  fn set_reply_to(mut self, email: &str) -> Self {
    self.reply_to = Some(email.to_owned());
    self
  }

  async fn send(self) -> bool {
    let message = match self.build() {
      Ok(message) => message,
      Err(e) => {
        tracing::warn!(error = %e, "refusing to send malformed email");
        return false;
      }
    };

    match self.transport.send(message).await {
      Ok(_) => true,
      Err(e) => {
        tracing::warn!(error = %e, "failed to send email");
        false
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn mailers(host: &str) -> SmtpMailers {
    SmtpMailers::new(SmtpConfig {
      host:     host.into(),
      port:     Some(2525),
      username: None,
      password: None,
    })
  }

  #[test]
  fn empty_host_is_unavailable() {
    let err = mailers("").create_mailer().err().unwrap();
    assert!(matches!(err, Error::MailerUnavailable(_)));
  }

  #[tokio::test]
  async fn builds_multipart_message_with_reply_to() {
    let message = mailers("smtp.example.com")
      .create_mailer()
      .unwrap()
      .compose()
      .set_from("news@example.com", "News")
      .set_to("b@y.com")
      .set_subject("Verify your email address")
      .set_html_body("body")
      .set_text_body("body")
      .set_reply_to("help@example.com");

    let formatted = String::from_utf8(message.build().unwrap().formatted()).unwrap();
    assert!(formatted.contains("From: News <news@example.com>"));
    assert!(formatted.contains("To: b@y.com"));
    assert!(formatted.contains("Reply-To: help@example.com"));
    assert!(formatted.contains("Subject: Verify your email address"));
    assert!(formatted.contains("multipart/alternative"));
  }

  #[tokio::test]
  async fn invalid_recipient_is_not_sent() {
    let sent = mailers("smtp.example.com")
      .create_mailer()
      .unwrap()
      .compose()
      .set_from("news@example.com", "News")
      .set_to("not an address")
      .send()
      .await;
    assert!(!sent);
  }
}
