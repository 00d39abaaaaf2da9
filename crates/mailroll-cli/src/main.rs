//! mailroll command-line front end.
//!
//! Wires the SQLite store, the template directory, and the SMTP transport
//! into the subscription engine and runs one operation per invocation.
//!
//! ```text
//! mailroll --config mailroll.toml add-list --title Weekly --site 1
//! mailroll subscribe --email a@example.com --list 1 --source-type form
//! mailroll send-verification --email b@example.com --list 1
//! ```

mod config;
mod smtp;
mod templates;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use mailroll_core::{
  contact::{Contact, PendingContact},
  hooks::{Hook, HookBus, HookPayload, ObserverResult, Signal},
  mailing_list::{MailingList, MailingListType},
};
use mailroll_forms::{
  MailDispatcher, NotificationComposer, Notifications, SiteUrls,
  SubscriptionService,
};
use mailroll_store_sqlite::{NewMailingList, SqliteStore};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{config::AppConfig, smtp::SmtpMailers, templates::TemplateDir};

#[derive(Parser)]
#[command(author, version, about = "Mailing list subscription manager")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "mailroll.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Create a mailing list on a site.
  AddList {
    #[arg(long)]
    title:                String,
    #[arg(long)]
    site:                 i64,
    #[arg(long)]
    verify_subject:       Option<String>,
    #[arg(long)]
    verify_template:      Option<String>,
    #[arg(long)]
    unsubscribe_subject:  Option<String>,
    #[arg(long)]
    unsubscribe_template: Option<String>,
  },
  /// Subscribe an address to a list, creating the contact if needed.
  Subscribe {
    #[arg(long)]
    email:       String,
    #[arg(long)]
    list:        i64,
    #[arg(long)]
    source_type: Option<String>,
    #[arg(long)]
    source:      Option<String>,
    /// Mark the subscription as verified.
    #[arg(long)]
    verify:      bool,
  },
  /// Unsubscribe an address from one list, or from every list.
  Unsubscribe {
    #[arg(long)]
    email: String,
    #[arg(long)]
    list:  Option<i64>,
  },
  /// Save a contact, optionally changing its address.
  UpdateContact {
    #[arg(long)]
    email:     String,
    #[arg(long)]
    new_email: Option<String>,
  },
  /// Record a pending subscription and email its verification link.
  SendVerification {
    #[arg(long)]
    email:  String,
    #[arg(long)]
    list:   i64,
    #[arg(long)]
    source: Option<String>,
  },
  /// Email a contact the confirm-unsubscribe link for a list.
  SendUnsubscribe {
    #[arg(long)]
    email: String,
    #[arg(long)]
    list:  i64,
  },
  /// Print a contact and its subscriptions as JSON.
  Status {
    #[arg(long)]
    email: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let cfg = AppConfig::load(&cli.config)?;

  let store = Arc::new(
    SqliteStore::open(&cfg.store_path)
      .await
      .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?,
  );

  match cli.command {
    Command::AddList {
      title,
      site,
      verify_subject,
      verify_template,
      unsubscribe_subject,
      unsubscribe_template,
    } => {
      let list = store
        .add_mailing_list(NewMailingList {
          site_id: site,
          title,
          mailing_list_type: MailingListType {
            verify_email_subject: verify_subject,
            verify_email_template: verify_template,
            unsubscribe_email_subject: unsubscribe_subject,
            unsubscribe_email_template: unsubscribe_template,
          },
        })
        .await?;
      println!("{}", serde_json::to_string_pretty(&list)?);
    }

    Command::Subscribe { email, list, source_type, source, verify } => {
      let service = subscriptions(&store);
      let list = mailing_list(&store, list).await?;
      let contact = match store.get_contact_by_email(&email).await? {
        Some(contact) => contact,
        None => store.add_contact(&email).await?,
      };
      service
        .subscribe(
          &contact,
          &list,
          source_type.as_deref(),
          source.as_deref(),
          Some(verify),
        )
        .await?;
      tracing::info!(email = %contact.email, list = list.id, "subscribed");
    }

    Command::Unsubscribe { email, list } => {
      let service = subscriptions(&store);
      let contact = contact(&store, &email).await?;
      let list = match list {
        Some(id) => Some(mailing_list(&store, id).await?),
        None => None,
      };
      service.unsubscribe(&contact, list.as_ref()).await?;
      tracing::info!(email = %contact.email, "unsubscribed");
    }

    Command::UpdateContact { email, new_email } => {
      let service = subscriptions(&store);
      let mut contact = contact(&store, &email).await?;
      if let Some(new_email) = new_email {
        contact.email = new_email;
      }
      if !service.update_contact_profile(&contact).await? {
        bail!("failed to save contact {}", contact.id);
      }
      tracing::info!(email = %contact.email, "contact updated");
    }

    Command::SendVerification { email, list, source } => {
      let notifications = notifications(&cfg)?;
      let list = mailing_list(&store, list).await?;
      let mut pending = PendingContact::new(email, list.id);
      if let Some(source) = source {
        pending.source = source;
      }
      store.add_pending_contact(&pending).await?;
      if !notifications.send_verification_email(&pending, &list).await? {
        bail!("verification email to {} was not sent", pending.email);
      }
      tracing::info!(email = %pending.email, pid = %pending.pid, "verification email sent");
    }

    Command::SendUnsubscribe { email, list } => {
      let notifications = notifications(&cfg)?;
      let contact = contact(&store, &email).await?;
      let list = mailing_list(&store, list).await?;
      if !notifications.send_unsubscribe_email(&contact, &list).await? {
        bail!("unsubscribe email to {} was not sent", contact.email);
      }
      tracing::info!(email = %contact.email, "unsubscribe email sent");
    }

    Command::Status { email } => {
      let contact = contact(&store, &email).await?;
      let subscriptions = store.subscriptions(contact.id).await?;
      let status = serde_json::json!({
        "contact": contact,
        "subscriptions": subscriptions,
      });
      println!("{}", serde_json::to_string_pretty(&status)?);
    }
  }

  Ok(())
}

// ─── Wiring ──────────────────────────────────────────────────────────────────

fn subscriptions(
  store: &Arc<SqliteStore>,
) -> SubscriptionService<SqliteStore, SqliteStore> {
  let mut hooks = HookBus::new();
  hooks.register_all(Arc::new(log_hook));
  SubscriptionService::new(store.clone(), store.clone(), Arc::new(hooks))
}

fn notifications(cfg: &AppConfig) -> anyhow::Result<Notifications<SmtpMailers>> {
  let composer =
    NotificationComposer::new(Arc::new(TemplateDir::new(&cfg.templates_dir)));
  let dispatcher = MailDispatcher::new(
    Arc::new(SmtpMailers::new(cfg.smtp.clone())),
    Arc::new(cfg.mail.clone()),
  );
  let urls = SiteUrls::new(&cfg.sites).context("invalid site configuration")?;

  Ok(
    Notifications::new(composer, dispatcher, Arc::new(urls))
      .with_action_trigger(cfg.action_trigger.clone()),
  )
}

fn log_hook(hook: Hook, payload: &HookPayload) -> ObserverResult {
  tracing::debug!(%hook, contact = payload.contact().id, "hook fired");
  Ok(Signal::Continue)
}

// ─── Lookups ─────────────────────────────────────────────────────────────────

async fn contact(store: &SqliteStore, email: &str) -> anyhow::Result<Contact> {
  store
    .get_contact_by_email(email)
    .await?
    .with_context(|| format!("no contact with email {email}"))
}

async fn mailing_list(store: &SqliteStore, id: i64) -> anyhow::Result<MailingList> {
  store
    .get_mailing_list(id)
    .await?
    .with_context(|| format!("no mailing list with id {id}"))
}
