//! Persistence and activity collaborator traits.
//!
//! Implemented by storage backends (e.g. `mailroll-store-sqlite`). The
//! subscription service depends on these abstractions, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  contact::Contact,
  mailing_list::{Interaction, MailingList},
};

/// Records interactions and saves contacts on behalf of the engine.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Record `interaction` for the contact on `mailing_list`.
  ///
  /// `mailing_list` is `None` only for unsubscribe-from-every-list; the
  /// backend applies the interaction to each list the contact belongs to.
  /// Recording must be idempotent: repeating a transition is not an error.
  fn record_interaction<'a>(
    &'a self,
    contact: &'a Contact,
    mailing_list: Option<&'a MailingList>,
    interaction: &'a Interaction,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Persist the current state of `contact`.
  fn save_contact<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Receives a touch whenever a contact's engagement changes.
///
/// Fire-and-forget: implementations log their own failures.
pub trait ActivityTracker: Send + Sync {
  fn touch<'a>(
    &'a self,
    contact: &'a Contact,
  ) -> impl Future<Output = ()> + Send + 'a;
}
