//! Lifecycle hooks fired around every state-changing operation.
//!
//! A [`HookBus`] is built up front, then shared immutably with the
//! subscription service. Observers run synchronously, in registration order,
//! on the caller's task:
//!
//! ```text
//! emit(hook, payload)
//!   ├─► observer 1 ─► Continue
//!   ├─► observer 2 ─► Abort ──────► Emission::Aborted (observer 3 never runs)
//!   └─► observer 3
//! ```
//!
//! An observer that returns `Err` ends the emission the same way and the
//! error is handed back to the caller untouched.

use std::{collections::HashMap, fmt, sync::Arc};

use serde::Serialize;

use crate::{
  BoxError, Error, Result, contact::Contact, mailing_list::MailingList,
};

// ─── Hook names ──────────────────────────────────────────────────────────────

/// Every extension point the engine fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Hook {
  BeforeSubscribe,
  AfterSubscribe,
  BeforeUnsubscribe,
  AfterUnsubscribe,
  BeforeUpdate,
  AfterUpdate,
}

impl Hook {
  pub const ALL: [Hook; 6] = [
    Hook::BeforeSubscribe,
    Hook::AfterSubscribe,
    Hook::BeforeUnsubscribe,
    Hook::AfterUnsubscribe,
    Hook::BeforeUpdate,
    Hook::AfterUpdate,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::BeforeSubscribe => "before-subscribe",
      Self::AfterSubscribe => "after-subscribe",
      Self::BeforeUnsubscribe => "before-unsubscribe",
      Self::AfterUnsubscribe => "after-unsubscribe",
      Self::BeforeUpdate => "before-update",
      Self::AfterUpdate => "after-update",
    }
  }
}

impl fmt::Display for Hook {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Payloads ────────────────────────────────────────────────────────────────

/// Snapshot handed to subscribe observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeEvent {
  pub contact:      Contact,
  pub mailing_list: MailingList,
  pub source_type:  String,
  pub source:       String,
}

/// Snapshot handed to unsubscribe observers. `mailing_list` is `None` when
/// the contact is leaving every list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsubscribeEvent {
  pub contact:      Contact,
  pub mailing_list: Option<MailingList>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateEvent {
  pub contact: Contact,
}

/// The payload carried by an emission. Observers receive a shared reference,
/// so they cannot change a transition that has already been decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HookPayload {
  Subscribe(SubscribeEvent),
  Unsubscribe(UnsubscribeEvent),
  Update(UpdateEvent),
}

impl HookPayload {
  pub fn contact(&self) -> &Contact {
    match self {
      Self::Subscribe(e) => &e.contact,
      Self::Unsubscribe(e) => &e.contact,
      Self::Update(e) => &e.contact,
    }
  }
}

// ─── Observers ───────────────────────────────────────────────────────────────

/// What an observer wants the emission to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
  Continue,
  Abort,
}

/// Result of a whole emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
  Continued,
  Aborted,
}

impl Emission {
  pub fn is_aborted(self) -> bool { matches!(self, Self::Aborted) }
}

pub type ObserverResult = std::result::Result<Signal, BoxError>;

/// A hook observer.
///
/// Any `Fn(Hook, &HookPayload) -> ObserverResult` closure implements this
/// trait.
pub trait Observer: Send + Sync {
  fn observe(&self, hook: Hook, payload: &HookPayload) -> ObserverResult;
}

impl<F> Observer for F
where
  F: Fn(Hook, &HookPayload) -> ObserverResult + Send + Sync,
{
  fn observe(&self, hook: Hook, payload: &HookPayload) -> ObserverResult {
    self(hook, payload)
  }
}

// ─── Bus ─────────────────────────────────────────────────────────────────────

/// Explicit, per-instance registry of hook observers.
#[derive(Default, Clone)]
pub struct HookBus {
  observers: HashMap<Hook, Vec<Arc<dyn Observer>>>,
}

impl HookBus {
  pub fn new() -> Self { Self::default() }

  /// Append a closure observer to the list for `hook`.
  pub fn register<F>(&mut self, hook: Hook, observer: F) -> &mut Self
  where
    F: Fn(Hook, &HookPayload) -> ObserverResult + Send + Sync + 'static,
  {
    self.register_observer(hook, Arc::new(observer))
  }

  pub fn register_observer(
    &mut self,
    hook: Hook,
    observer: Arc<dyn Observer>,
  ) -> &mut Self {
    self.observers.entry(hook).or_default().push(observer);
    self
  }

  /// Register the same observer on every hook.
  pub fn register_all(&mut self, observer: Arc<dyn Observer>) -> &mut Self {
    for hook in Hook::ALL {
      self.register_observer(hook, Arc::clone(&observer));
    }
    self
  }

  pub fn has_observers(&self, hook: Hook) -> bool {
    self.observers.get(&hook).is_some_and(|o| !o.is_empty())
  }

  /// Run every observer registered for `hook`, in order.
  ///
  /// Stops at the first observer that aborts or fails. A failure is returned
  /// as [`Error::Observer`].
  pub fn emit(&self, hook: Hook, payload: &HookPayload) -> Result<Emission> {
    let Some(observers) = self.observers.get(&hook) else {
      return Ok(Emission::Continued);
    };

    for (index, observer) in observers.iter().enumerate() {
      match observer.observe(hook, payload) {
        Ok(Signal::Continue) => {}
        Ok(Signal::Abort) => {
          tracing::debug!(%hook, observer = index, "observer aborted emission");
          return Ok(Emission::Aborted);
        }
        Err(source) => return Err(Error::Observer { hook, source }),
      }
    }

    Ok(Emission::Continued)
  }
}

impl fmt::Debug for HookBus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut map = f.debug_map();
    for hook in Hook::ALL {
      if let Some(observers) = self.observers.get(&hook) {
        map.entry(&hook.as_str(), &observers.len());
      }
    }
    map.finish()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use super::*;

  fn payload() -> HookPayload {
    HookPayload::Update(UpdateEvent {
      contact: Contact::new(1, "a@x.com"),
    })
  }

  #[test]
  fn emit_without_observers_continues() {
    let bus = HookBus::new();
    assert!(!bus.has_observers(Hook::BeforeUpdate));
    let emission = bus.emit(Hook::BeforeUpdate, &payload()).unwrap();
    assert_eq!(emission, Emission::Continued);
  }

  #[test]
  fn observers_run_in_registration_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let mut bus = HookBus::new();
    for n in 0..3 {
      let calls = Arc::clone(&calls);
      bus.register(Hook::AfterUpdate, move |_, _| {
        calls.lock().unwrap().push(n);
        Ok(Signal::Continue)
      });
    }

    bus.emit(Hook::AfterUpdate, &payload()).unwrap();
    assert_eq!(*calls.lock().unwrap(), vec![0, 1, 2]);
  }

  #[test]
  fn abort_stops_remaining_observers() {
    let ran_last = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&ran_last);
    let mut bus = HookBus::new();
    bus
      .register(Hook::BeforeUpdate, |_, _| Ok(Signal::Abort))
      .register(Hook::BeforeUpdate, move |_, _| {
        *flag.lock().unwrap() = true;
        Ok(Signal::Continue)
      });

    let emission = bus.emit(Hook::BeforeUpdate, &payload()).unwrap();
    assert!(emission.is_aborted());
    assert!(!*ran_last.lock().unwrap());
  }

  #[test]
  fn observer_error_is_propagated_with_hook_name() {
    let mut bus = HookBus::new();
    bus.register(Hook::BeforeUpdate, |_, _| Err("boom".into()));

    let err = bus.emit(Hook::BeforeUpdate, &payload()).unwrap_err();
    match err {
      Error::Observer { hook, source } => {
        assert_eq!(hook, Hook::BeforeUpdate);
        assert_eq!(source.to_string(), "boom");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn observers_are_scoped_to_their_hook() {
    let mut bus = HookBus::new();
    bus.register(Hook::BeforeSubscribe, |_, _| Ok(Signal::Abort));

    let emission = bus.emit(Hook::AfterSubscribe, &payload()).unwrap();
    assert_eq!(emission, Emission::Continued);
  }

  #[test]
  fn register_all_covers_every_hook() {
    struct Quiet;
    impl Observer for Quiet {
      fn observe(&self, _: Hook, _: &HookPayload) -> ObserverResult {
        Ok(Signal::Continue)
      }
    }

    let mut bus = HookBus::new();
    bus.register_all(Arc::new(Quiet));
    assert!(Hook::ALL.iter().all(|h| bus.has_observers(*h)));
  }
}
