//! Integration tests for `SqliteStore` against an in-memory database.

use mailroll_core::{
  contact::PendingContact,
  mailing_list::{Interaction, InteractionKind, MailingList, MailingListType},
  store::{ActivityTracker, SubscriptionStore},
};

use crate::{Error, NewMailingList, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn list(s: &SqliteStore, site_id: i64) -> MailingList {
  s.add_mailing_list(NewMailingList {
    site_id,
    title: "Weekly".into(),
    mailing_list_type: MailingListType::default(),
  })
  .await
  .unwrap()
}

// ─── Contacts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_contact() {
  let s = store().await;

  let contact = s.add_contact("a@x.com").await.unwrap();
  assert!(contact.id > 0);
  assert!(contact.last_activity.is_none());

  let fetched = s.get_contact(contact.id).await.unwrap().unwrap();
  assert_eq!(fetched, contact);

  let by_email = s.get_contact_by_email("a@x.com").await.unwrap().unwrap();
  assert_eq!(by_email.id, contact.id);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
  let s = store().await;
  s.add_contact("a@x.com").await.unwrap();

  let err = s.add_contact("a@x.com").await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail(e) if e == "a@x.com"));
}

#[tokio::test]
async fn save_contact_updates_email() {
  let s = store().await;
  let mut contact = s.add_contact("a@x.com").await.unwrap();

  contact.email = "new@x.com".into();
  s.save_contact(&contact).await.unwrap();

  let fetched = s.get_contact(contact.id).await.unwrap().unwrap();
  assert_eq!(fetched.email, "new@x.com");
}

#[tokio::test]
async fn save_contact_missing_is_an_error() {
  let s = store().await;
  let ghost = mailroll_core::contact::Contact::new(404, "ghost@x.com");

  let err = s.save_contact(&ghost).await.unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(404)));
}

#[tokio::test]
async fn save_contact_email_collision_is_an_error() {
  let s = store().await;
  s.add_contact("taken@x.com").await.unwrap();
  let mut contact = s.add_contact("a@x.com").await.unwrap();

  contact.email = "taken@x.com".into();
  let err = s.save_contact(&contact).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateEmail(_)));
}

#[tokio::test]
async fn touch_stamps_last_activity() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();

  s.touch(&contact).await;

  let fetched = s.get_contact(contact.id).await.unwrap().unwrap();
  assert!(fetched.last_activity.is_some());
}

// ─── Mailing lists ───────────────────────────────────────────────────────────

#[tokio::test]
async fn mailing_list_round_trips_type_overrides() {
  let s = store().await;
  let created = s
    .add_mailing_list(NewMailingList {
      site_id: 3,
      title: "Launches".into(),
      mailing_list_type: MailingListType {
        verify_email_subject: Some("Confirm".into()),
        unsubscribe_email_template: Some("emails/bye".into()),
        ..Default::default()
      },
    })
    .await
    .unwrap();

  let fetched = s.get_mailing_list(created.id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
  assert!(s.get_mailing_list(created.id + 1).await.unwrap().is_none());
}

// ─── Interactions ────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_creates_subscription() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let weekly = list(&s, 1).await;

  s.record_interaction(
    &contact,
    Some(&weekly),
    &Interaction::subscribed("form", "homepage", false),
  )
  .await
  .unwrap();

  let subs = s.subscriptions(contact.id).await.unwrap();
  assert_eq!(subs.len(), 1);
  let sub = &subs[0];
  assert_eq!(sub.mailing_list_id, weekly.id);
  assert_eq!(sub.status, InteractionKind::Subscribed);
  assert_eq!(sub.source_type, "form");
  assert_eq!(sub.source, "homepage");
  assert!(sub.subscribed.is_some());
  assert!(sub.unsubscribed.is_none());
  assert!(sub.verified.is_none());
}

#[tokio::test]
async fn repeated_subscribe_is_idempotent() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let weekly = list(&s, 1).await;

  s.record_interaction(
    &contact,
    Some(&weekly),
    &Interaction::subscribed("form", "homepage", false),
  )
  .await
  .unwrap();
  let first = s.subscriptions(contact.id).await.unwrap();

  s.record_interaction(
    &contact,
    Some(&weekly),
    &Interaction::subscribed("import", "csv", false),
  )
  .await
  .unwrap();
  let second = s.subscriptions(contact.id).await.unwrap();

  assert_eq!(first, second);
}

#[tokio::test]
async fn verify_stamps_verified_once() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let weekly = list(&s, 1).await;

  s.record_interaction(
    &contact,
    Some(&weekly),
    &Interaction::subscribed("", "", true),
  )
  .await
  .unwrap();

  let subs = s.subscriptions(contact.id).await.unwrap();
  assert!(subs[0].verified.is_some());
}

#[tokio::test]
async fn unsubscribe_then_resubscribe() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let weekly = list(&s, 1).await;

  s.record_interaction(&contact, Some(&weekly), &Interaction::subscribed("", "", false))
    .await
    .unwrap();
  s.record_interaction(&contact, Some(&weekly), &Interaction::unsubscribed())
    .await
    .unwrap();

  let subs = s.subscriptions(contact.id).await.unwrap();
  assert_eq!(subs[0].status, InteractionKind::Unsubscribed);
  assert!(subs[0].unsubscribed.is_some());

  s.record_interaction(&contact, Some(&weekly), &Interaction::subscribed("", "", false))
    .await
    .unwrap();
  let subs = s.subscriptions(contact.id).await.unwrap();
  assert_eq!(subs[0].status, InteractionKind::Subscribed);
}

#[tokio::test]
async fn unsubscribe_without_list_leaves_every_list() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let weekly = list(&s, 1).await;
  let monthly = list(&s, 2).await;

  for l in [&weekly, &monthly] {
    s.record_interaction(&contact, Some(l), &Interaction::subscribed("", "", false))
      .await
      .unwrap();
  }

  s.record_interaction(&contact, None, &Interaction::unsubscribed())
    .await
    .unwrap();

  let subs = s.subscriptions(contact.id).await.unwrap();
  assert_eq!(subs.len(), 2);
  assert!(subs.iter().all(|s| s.status == InteractionKind::Unsubscribed));
}

#[tokio::test]
async fn interaction_for_unknown_contact_fails() {
  let s = store().await;
  let weekly = list(&s, 1).await;
  let ghost = mailroll_core::contact::Contact::new(99, "ghost@x.com");

  let err = s
    .record_interaction(&ghost, Some(&weekly), &Interaction::unsubscribed())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ContactNotFound(99)));
}

#[tokio::test]
async fn interaction_for_unknown_list_fails() {
  let s = store().await;
  let contact = s.add_contact("a@x.com").await.unwrap();
  let mut ghost = list(&s, 1).await;
  ghost.id += 100;

  let err = s
    .record_interaction(&contact, Some(&ghost), &Interaction::unsubscribed())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MailingListNotFound(_)));
}

// ─── Pending contacts ────────────────────────────────────────────────────────

#[tokio::test]
async fn pending_contact_round_trip() {
  let s = store().await;
  let weekly = list(&s, 1).await;
  let mut pending = PendingContact::new("b@y.com", weekly.id);
  pending.source = "footer".into();

  s.add_pending_contact(&pending).await.unwrap();

  let fetched = s.get_pending_contact(&pending.pid).await.unwrap().unwrap();
  assert_eq!(fetched.email, "b@y.com");
  assert_eq!(fetched.mailing_list_id, weekly.id);
  assert_eq!(fetched.source, "footer");
  assert!(s.get_pending_contact("nope").await.unwrap().is_none());
}
