//! Contract Test: New Listing Detection
//!
//! Constraints verified:
//! - Only identities absent from the seen set are notified
//! - A changed details link alone is not a new listing
//! - New listings are notified in page order
//! - Delivery failures never roll back seen state
//! - One failing sink does not stop delivery to the others

mod common;

use common::*;
use halkarz_core::engine::{EngineEvent, TickOutcome};
use halkarz_core::state::MemorySeenStore;

#[tokio::test]
async fn exactly_one_notification_for_the_new_listing() {
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[A, B]))
        .then_page(listing_page(&[A, B, C]));
    let notifier = RecordingNotifier::new("recording");
    let store = MemorySeenStore::new();

    let (mut engine, mut events) =
        engine_with(&source, vec![Box::new(notifier.clone())], Box::new(store.clone())).await;

    engine.tick().await;
    let outcome = engine.tick().await;

    assert_eq!(outcome, TickOutcome::Checked { listings: 3, new_listings: 1 });
    assert_eq!(notifier.notified(), vec![identity(C)]);

    let seen = engine.seen();
    assert_eq!(seen.len(), 3);
    for listing in [A, B, C] {
        assert!(seen.contains(&identity(listing)));
    }
    assert_eq!(store.snapshot().await, seen.clone());

    let events = drain_events(&mut events);
    assert!(events.contains(&EngineEvent::NewListing { identity: identity(C) }));
}

#[tokio::test]
async fn unchanged_page_notifies_nothing_and_skips_persist() {
    let source = ScriptedPageSource::new().then_page(listing_page(&[A, B]));
    let notifier = RecordingNotifier::new("recording");
    let store = MemorySeenStore::new();

    let (mut engine, _events) =
        engine_with(&source, vec![Box::new(notifier.clone())], Box::new(store.clone())).await;

    engine.tick().await;
    let persists_after_baseline = store.persist_count();

    for _ in 0..3 {
        assert_eq!(
            engine.tick().await,
            TickOutcome::Checked { listings: 2, new_listings: 0 }
        );
    }

    assert_eq!(notifier.notification_count(), 0);
    assert_eq!(store.persist_count(), persists_after_baseline);
    assert_eq!(engine.stats().checks, 3);
}

#[tokio::test]
async fn moved_details_link_is_not_new() {
    let moved_a = (A.0, A.1, "/alfa-holding-a-s-yeni-link/");
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[A]))
        .then_page(listing_page(&[moved_a]));
    let notifier = RecordingNotifier::new("recording");

    let (mut engine, _events) =
        engine_with(&source, vec![Box::new(notifier.clone())], Box::new(MemorySeenStore::new()))
            .await;

    engine.tick().await;
    engine.tick().await;

    assert_eq!(notifier.notification_count(), 0);
    assert_eq!(engine.seen().len(), 1);
}

#[tokio::test]
async fn multiple_new_listings_notified_in_page_order() {
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[B]))
        .then_page(listing_page(&[D, B, A, C]));
    let notifier = RecordingNotifier::new("recording");

    let (mut engine, _events) =
        engine_with(&source, vec![Box::new(notifier.clone())], Box::new(MemorySeenStore::new()))
            .await;

    engine.tick().await;
    engine.tick().await;

    assert_eq!(
        notifier.notified(),
        vec![identity(D), identity(A), identity(C)]
    );
    assert_eq!(engine.stats().new_listings, 3);
}

#[tokio::test]
async fn duplicate_items_on_one_page_notify_once() {
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[A]))
        .then_page(listing_page(&[A, C, C]));
    let notifier = RecordingNotifier::new("recording");

    let (mut engine, _events) =
        engine_with(&source, vec![Box::new(notifier.clone())], Box::new(MemorySeenStore::new()))
            .await;

    engine.tick().await;
    engine.tick().await;

    assert_eq!(notifier.notified(), vec![identity(C)]);
}

#[tokio::test]
async fn delivery_failure_keeps_listing_seen() {
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[A]))
        .then_page(listing_page(&[A, B]));
    let failing = RecordingNotifier::failing("webhook");
    let store = MemorySeenStore::new();

    let (mut engine, mut events) =
        engine_with(&source, vec![Box::new(failing.clone())], Box::new(store.clone())).await;

    engine.tick().await;
    engine.tick().await;

    assert_eq!(failing.notified(), vec![identity(B)]);
    assert!(engine.seen().contains(&identity(B)));
    assert!(store.snapshot().await.contains(&identity(B)));
    assert_eq!(engine.stats().delivery_failures, 1);

    // The same page again: no second attempt
    engine.tick().await;
    assert_eq!(failing.notification_count(), 1);

    let events = drain_events(&mut events);
    assert!(events.iter().any(|e| matches!(
        e,
        EngineEvent::DeliveryFailed { sink, .. } if sink == "webhook"
    )));
}

#[tokio::test]
async fn failing_sink_does_not_block_other_sinks() {
    let source = ScriptedPageSource::new()
        .then_page(listing_page(&[A]))
        .then_page(listing_page(&[A, B, C]));
    let failing = RecordingNotifier::failing("webhook");
    let console = RecordingNotifier::new("console");

    let (mut engine, _events) = engine_with(
        &source,
        vec![Box::new(failing.clone()), Box::new(console.clone())],
        Box::new(MemorySeenStore::new()),
    )
    .await;

    engine.tick().await;
    engine.tick().await;

    assert_eq!(failing.notified(), vec![identity(B), identity(C)]);
    assert_eq!(console.notified(), vec![identity(B), identity(C)]);

    let stats = engine.stats();
    assert_eq!(stats.deliveries, 2);
    assert_eq!(stats.delivery_failures, 2);
}
