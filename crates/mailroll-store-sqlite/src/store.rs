//! [`SqliteStore`] — the SQLite implementation of [`SubscriptionStore`] and
//! [`ActivityTracker`].

use std::path::Path;

use chrono::Utc;
use mailroll_core::{
  contact::{Contact, PendingContact},
  mailing_list::{
    Interaction, InteractionKind, MailingList, MailingListType, Subscription,
  },
  store::{ActivityTracker, SubscriptionStore},
};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RawContact, RawMailingList, RawPendingContact, RawSubscription, encode_dt,
    encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`SqliteStore::add_mailing_list`]. `mlid` is generated.
#[derive(Debug, Clone)]
pub struct NewMailingList {
  pub site_id:           i64,
  pub title:             String,
  pub mailing_list_type: MailingListType,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A mailroll store backed by a single SQLite file.
///
/// Cheap to clone; clones share one background connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory database.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Contacts ──────────────────────────────────────────────────────────────

  /// Create a contact with fresh `cid`/`uid` tokens.
  pub async fn add_contact(&self, email: &str) -> Result<Contact> {
    let template = Contact::new(0, email);
    let cid = template.cid.clone();
    let uid_str = encode_uuid(template.uid);
    let email_str = template.email.clone();

    let inserted = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT INTO contacts (cid, uid, email) VALUES (?1, ?2, ?3)
           ON CONFLICT(email) DO NOTHING",
          rusqlite::params![cid, uid_str, email_str],
        )?;
        Ok((changed > 0).then(|| conn.last_insert_rowid()))
      })
      .await?;

    match inserted {
      Some(id) => Ok(Contact { id, ..template }),
      None => Err(Error::DuplicateEmail(template.email)),
    }
  }

  pub async fn get_contact(&self, id: i64) -> Result<Option<Contact>> {
    let sql = format!("SELECT {} FROM contacts WHERE id = ?1", RawContact::COLUMNS);
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  pub async fn get_contact_by_email(&self, email: &str) -> Result<Option<Contact>> {
    let sql = format!(
      "SELECT {} FROM contacts WHERE email = ?1",
      RawContact::COLUMNS
    );
    let email = email.to_owned();
    let raw: Option<RawContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![email], RawContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContact::into_contact).transpose()
  }

  // ── Mailing lists ─────────────────────────────────────────────────────────

  pub async fn add_mailing_list(&self, input: NewMailingList) -> Result<MailingList> {
    let mlid = Uuid::new_v4().simple().to_string();
    let list_type = input.mailing_list_type.clone();
    let mlid_str = mlid.clone();
    let title = input.title.clone();
    let site_id = input.site_id;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO mailing_lists (
             mlid, site_id, title,
             verify_email_subject, verify_email_template,
             unsubscribe_email_subject, unsubscribe_email_template
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            mlid_str,
            site_id,
            title,
            list_type.verify_email_subject,
            list_type.verify_email_template,
            list_type.unsubscribe_email_subject,
            list_type.unsubscribe_email_template,
          ],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(MailingList {
      id,
      mlid,
      site_id: input.site_id,
      title: input.title,
      mailing_list_type: input.mailing_list_type,
    })
  }

  pub async fn get_mailing_list(&self, id: i64) -> Result<Option<MailingList>> {
    let sql = format!(
      "SELECT {} FROM mailing_lists WHERE id = ?1",
      RawMailingList::COLUMNS
    );
    let raw: Option<RawMailingList> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id], RawMailingList::from_row)
            .optional()?,
        )
      })
      .await?;

    Ok(raw.map(RawMailingList::into_mailing_list))
  }

  // ── Pending contacts ──────────────────────────────────────────────────────

  pub async fn add_pending_contact(&self, pending: &PendingContact) -> Result<()> {
    let pid = pending.pid.clone();
    let email = pending.email.clone();
    let list_id = pending.mailing_list_id;
    let source = pending.source.clone();
    let created_at = encode_dt(pending.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO pending_contacts (pid, email, mailing_list_id, source, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![pid, email, list_id, source, created_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  pub async fn get_pending_contact(&self, pid: &str) -> Result<Option<PendingContact>> {
    let sql = format!(
      "SELECT {} FROM pending_contacts WHERE pid = ?1",
      RawPendingContact::COLUMNS
    );
    let pid = pid.to_owned();
    let raw: Option<RawPendingContact> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![pid], RawPendingContact::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPendingContact::into_pending_contact).transpose()
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  /// Every list the contact has ever interacted with, ordered by list id.
  pub async fn subscriptions(&self, contact_id: i64) -> Result<Vec<Subscription>> {
    let sql = format!(
      "SELECT {} FROM contact_mailing_lists WHERE contact_id = ?1
       ORDER BY mailing_list_id",
      RawSubscription::COLUMNS
    );
    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![contact_id], RawSubscription::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn record_on_list(
    &self,
    contact_id: i64,
    list_id: i64,
    interaction: &Interaction,
  ) -> Result<()> {
    let status = encode_status(interaction.kind);
    let source_type = interaction.source_type.clone();
    let source = interaction.source.clone();
    let verify = interaction.verify;
    let now = encode_dt(Utc::now());

    let previous: Option<String> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let previous: Option<String> = tx
          .query_row(
            "SELECT subscription_status FROM contact_mailing_lists
             WHERE contact_id = ?1 AND mailing_list_id = ?2",
            rusqlite::params![contact_id, list_id],
            |r| r.get(0),
          )
          .optional()?;

        if previous.is_none() {
          tx.execute(
            "INSERT INTO contact_mailing_lists
               (contact_id, mailing_list_id, subscription_status)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![contact_id, list_id, status],
          )?;
        }

        // Timestamps and provenance only move when the status changes.
        if previous.as_deref() != Some(status) {
          let stamp_column = match status {
            "subscribed" => "subscribed",
            _ => "unsubscribed",
          };
          tx.execute(
            &format!(
              "UPDATE contact_mailing_lists
               SET subscription_status = ?3, {stamp_column} = ?4
               WHERE contact_id = ?1 AND mailing_list_id = ?2"
            ),
            rusqlite::params![contact_id, list_id, status, now],
          )?;

          if status == "subscribed" {
            tx.execute(
              "UPDATE contact_mailing_lists SET source_type = ?3, source = ?4
               WHERE contact_id = ?1 AND mailing_list_id = ?2",
              rusqlite::params![contact_id, list_id, source_type, source],
            )?;
          }
        }

        if verify {
          tx.execute(
            "UPDATE contact_mailing_lists SET verified = ?3
             WHERE contact_id = ?1 AND mailing_list_id = ?2 AND verified IS NULL",
            rusqlite::params![contact_id, list_id, now],
          )?;
        }

        tx.commit()?;
        Ok(previous)
      })
      .await?;

    if previous.as_deref() == Some(status) {
      tracing::debug!(contact_id, list_id, status, "subscription status unchanged");
    }
    Ok(())
  }

  /// Unsubscribe from every list the contact is currently subscribed to.
  async fn unsubscribe_everywhere(&self, contact_id: i64) -> Result<usize> {
    let now = encode_dt(Utc::now());
    let unsubscribed = encode_status(InteractionKind::Unsubscribed);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contact_mailing_lists
           SET subscription_status = ?2, unsubscribed = ?3
           WHERE contact_id = ?1 AND subscription_status != ?2",
          rusqlite::params![contact_id, unsubscribed, now],
        )?)
      })
      .await?;
    Ok(changed)
  }

  async fn contact_exists(&self, id: i64) -> Result<bool> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM contacts WHERE id = ?1",
                rusqlite::params![id],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?,
    )
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn record_interaction(
    &self,
    contact: &Contact,
    mailing_list: Option<&MailingList>,
    interaction: &Interaction,
  ) -> Result<()> {
    if !self.contact_exists(contact.id).await? {
      return Err(Error::ContactNotFound(contact.id));
    }

    match mailing_list {
      Some(list) => {
        if self.get_mailing_list(list.id).await?.is_none() {
          return Err(Error::MailingListNotFound(list.id));
        }
        self.record_on_list(contact.id, list.id, interaction).await
      }
      None => {
        let changed = self.unsubscribe_everywhere(contact.id).await?;
        tracing::debug!(contact = contact.id, lists = changed, "unsubscribed from all lists");
        Ok(())
      }
    }
  }

  async fn save_contact(&self, contact: &Contact) -> Result<()> {
    let id = contact.id;
    let email = contact.email.clone();
    let last_activity = contact.last_activity.map(encode_dt);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contacts SET email = ?2, last_activity = COALESCE(?3, last_activity)
           WHERE id = ?1",
          rusqlite::params![id, email, last_activity],
        )?)
      })
      .await
      .map_err(|e| match e {
        tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(f, _))
          if f.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
          Error::DuplicateEmail(contact.email.clone())
        }
        other => Error::Database(other),
      })?;

    if changed == 0 {
      return Err(Error::ContactNotFound(contact.id));
    }
    Ok(())
  }
}

// ─── ActivityTracker impl ────────────────────────────────────────────────────

impl ActivityTracker for SqliteStore {
  async fn touch(&self, contact: &Contact) {
    let id = contact.id;
    let now = encode_dt(Utc::now());

    let result = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE contacts SET last_activity = ?2 WHERE id = ?1",
          rusqlite::params![id, now],
        )?;
        Ok(())
      })
      .await;

    if let Err(e) = result {
      tracing::warn!(contact = id, error = %e, "failed to update contact activity");
    }
  }
}
