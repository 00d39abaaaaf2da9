//! [`SubscriptionService`] — the subscribe/unsubscribe/update state machine.
//!
//! Every operation runs the same sequence:
//!
//! ```text
//! before-hook ─► persist ─► touch activity ─► after-hook
//! ```
//!
//! The sequence runs in full even when the store treats the transition as a
//! no-op. A before-hook abort or observer error ends the operation before
//! anything is persisted.

use std::sync::Arc;

use mailroll_core::{
  Error, Result,
  contact::Contact,
  hooks::{
    Hook, HookBus, HookPayload, SubscribeEvent, UnsubscribeEvent, UpdateEvent,
  },
  mailing_list::{Interaction, MailingList},
  store::{ActivityTracker, SubscriptionStore},
};

pub struct SubscriptionService<S, A> {
  store:    Arc<S>,
  activity: Arc<A>,
  hooks:    Arc<HookBus>,
}

impl<S, A> Clone for SubscriptionService<S, A> {
  fn clone(&self) -> Self {
    Self {
      store:    Arc::clone(&self.store),
      activity: Arc::clone(&self.activity),
      hooks:    Arc::clone(&self.hooks),
    }
  }
}

impl<S, A> SubscriptionService<S, A>
where
  S: SubscriptionStore,
  A: ActivityTracker,
{
  pub fn new(store: Arc<S>, activity: Arc<A>, hooks: Arc<HookBus>) -> Self {
    Self { store, activity, hooks }
  }

  /// Subscribe `contact` to `mailing_list`.
  ///
  /// `source_type` and `source` default to the empty string, `verify` to
  /// `false`.
  pub async fn subscribe(
    &self,
    contact: &Contact,
    mailing_list: &MailingList,
    source_type: Option<&str>,
    source: Option<&str>,
    verify: Option<bool>,
  ) -> Result<()> {
    let source_type = source_type.unwrap_or_default();
    let source = source.unwrap_or_default();
    let verify = verify.unwrap_or(false);

    let payload = HookPayload::Subscribe(SubscribeEvent {
      contact:      contact.clone(),
      mailing_list: mailing_list.clone(),
      source_type:  source_type.to_owned(),
      source:       source.to_owned(),
    });
    self.before(Hook::BeforeSubscribe, &payload)?;

    let interaction = Interaction::subscribed(source_type, source, verify);
    self.record(contact, Some(mailing_list), &interaction).await?;

    self.activity.touch(contact).await;

    self.after(Hook::AfterSubscribe, &payload)?;

    tracing::debug!(
      contact = contact.id,
      mailing_list = mailing_list.id,
      source_type,
      source,
      verify,
      "contact subscribed"
    );
    Ok(())
  }

  /// Unsubscribe `contact` from `mailing_list`, or from every list when
  /// `mailing_list` is `None`.
  ///
  /// The after-hook only fires when a list is given. Activity is touched
  /// either way.
  pub async fn unsubscribe(
    &self,
    contact: &Contact,
    mailing_list: Option<&MailingList>,
  ) -> Result<()> {
    let payload = HookPayload::Unsubscribe(UnsubscribeEvent {
      contact:      contact.clone(),
      mailing_list: mailing_list.cloned(),
    });
    self.before(Hook::BeforeUnsubscribe, &payload)?;

    self
      .record(contact, mailing_list, &Interaction::unsubscribed())
      .await?;

    if mailing_list.is_some() {
      self.after(Hook::AfterUnsubscribe, &payload)?;
    }

    self.activity.touch(contact).await;

    tracing::debug!(
      contact = contact.id,
      mailing_list = mailing_list.map(|l| l.id),
      "contact unsubscribed"
    );
    Ok(())
  }

  /// Save `contact`'s profile.
  ///
  /// Returns `Ok(false)` when the store rejects the save; in that case
  /// activity is not touched and the after-hook does not fire. Hook failures
  /// still surface as `Err`.
  pub async fn update_contact_profile(&self, contact: &Contact) -> Result<bool> {
    let payload = HookPayload::Update(UpdateEvent {
      contact: contact.clone(),
    });
    self.before(Hook::BeforeUpdate, &payload)?;

    if let Err(e) = self.store.save_contact(contact).await {
      tracing::warn!(contact = contact.id, error = %e, "failed to save contact");
      return Ok(false);
    }

    self.activity.touch(contact).await;

    self.after(Hook::AfterUpdate, &payload)?;
    Ok(true)
  }

  // ── Helpers ─────────────────────────────────────────────────────────────

  async fn record(
    &self,
    contact: &Contact,
    mailing_list: Option<&MailingList>,
    interaction: &Interaction,
  ) -> Result<()> {
    self
      .store
      .record_interaction(contact, mailing_list, interaction)
      .await
      .map_err(|e| Error::ElementPersistence(Box::new(e)))
  }

  fn before(&self, hook: Hook, payload: &HookPayload) -> Result<()> {
    if self.hooks.emit(hook, payload)?.is_aborted() {
      return Err(Error::HookAborted(hook));
    }
    Ok(())
  }

  /// After-hooks cannot veto anything; an abort only stops later observers.
  fn after(&self, hook: Hook, payload: &HookPayload) -> Result<()> {
    self.hooks.emit(hook, payload)?;
    Ok(())
  }
}
