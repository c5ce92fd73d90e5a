//! Cross-process convergence tests
//!
//! The bus is a latency optimization only: a subscriber that receives
//! events converges fast, and a subscriber whose events are dropped
//! entirely converges on its next poll. Either way the store's row is
//! what everyone ends up with.

use chrono::{NaiveDate, Utc};
use order_store::{OrderLifecycle, OrderStore, TransitionAction};
use order_sync::{EventBus, SyncReconciler, ORDER_EVENTS_CHANNEL};
use rust_decimal::Decimal;
use std::sync::Arc;
use types::curve::{CurvePoint, ForwardCurve};
use types::ids::UserId;
use types::metal::Metal;
use types::order::OrderStatus;
use types::spread::{Direction, Spread, SpreadLeg};
use valuation::{CurveConvention, CurveStore, ValuationEngine};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn setup() -> (OrderLifecycle, Arc<OrderStore>, EventBus) {
    let curves = Arc::new(CurveStore::new());
    curves.put(
        ForwardCurve::new(
            Metal::Zinc,
            vec![
                CurvePoint::new(d(1), Decimal::from(100)),
                CurvePoint::new(d(31), Decimal::from(102)),
            ],
            Utc::now(),
        )
        .unwrap(),
    );
    let store = Arc::new(OrderStore::ephemeral());
    let bus = EventBus::new();
    let lifecycle = OrderLifecycle::new(
        Arc::clone(&store),
        curves,
        ValuationEngine::new(CurveConvention::OutrightPrices),
        bus.clone(),
    );
    (lifecycle, store, bus)
}

fn zinc_spread() -> Spread {
    Spread::new(
        Metal::Zinc,
        vec![
            SpreadLeg::new(d(1), d(16), Direction::Borrow, 10),
            SpreadLeg::new(d(16), d(31), Direction::Lend, 10),
        ],
    )
    .unwrap()
}

#[test]
fn subscriber_converges_via_fast_path() {
    let (lifecycle, store, bus) = setup();

    let mut viewer = SyncReconciler::new(Arc::clone(&store));
    let mut sub = bus.subscribe(ORDER_EVENTS_CHANNEL);

    let order = lifecycle
        .submit(zinc_spread(), UserId::new("bushy"), None)
        .unwrap();

    // Creation event: unknown order, discovered on poll
    let creation = sub.try_recv().unwrap().unwrap();
    viewer.apply_event(&creation);
    viewer.poll().unwrap();
    assert_eq!(viewer.get(order.id).unwrap().status, OrderStatus::Submitted);

    let accepted = lifecycle
        .propose(
            order.id,
            order.version,
            TransitionAction::Accept {
                by: UserId::new("marketmaker"),
            },
        )
        .unwrap();

    // Transition event applies in place, no poll needed
    let event = sub.try_recv().unwrap().unwrap();
    viewer.apply_event(&event);
    assert_eq!(viewer.dirty_count(), 0);
    let cached = viewer.get(order.id).unwrap();
    assert_eq!(cached.status, OrderStatus::Accepted);
    assert_eq!(cached.version, accepted.version);
}

#[test]
fn dropped_accept_event_converges_on_next_poll() {
    let (lifecycle, store, _bus) = setup();

    // This process never subscribes: every event is "dropped"
    let mut viewer = SyncReconciler::new(Arc::clone(&store));

    let order = lifecycle
        .submit(zinc_spread(), UserId::new("bushy"), None)
        .unwrap();
    viewer.resync().unwrap();
    assert_eq!(viewer.get(order.id).unwrap().status, OrderStatus::Submitted);

    lifecycle
        .propose(
            order.id,
            order.version,
            TransitionAction::Accept {
                by: UserId::new("marketmaker"),
            },
        )
        .unwrap();

    // No event arrived; the periodic full re-read is the backstop
    viewer.resync().unwrap();
    let cached = viewer.get(order.id).unwrap();
    assert_eq!(cached.status, OrderStatus::Accepted);
    assert_eq!(cached.version, 2);
}

#[test]
fn two_viewers_converge_on_the_same_final_state() {
    let (lifecycle, store, bus) = setup();

    let mut with_events = SyncReconciler::new(Arc::clone(&store));
    let mut poll_only = SyncReconciler::new(Arc::clone(&store));
    let mut sub = bus.subscribe(ORDER_EVENTS_CHANNEL);

    let order = lifecycle
        .submit(zinc_spread(), UserId::new("bushy"), Some(Decimal::from(5000)))
        .unwrap();
    with_events.resync().unwrap();
    poll_only.resync().unwrap();

    let countered = lifecycle
        .propose(
            order.id,
            order.version,
            TransitionAction::Counter {
                price: order.valuation_at_submission + Decimal::from(100),
                proposer: UserId::new("marketmaker"),
                message: None,
            },
        )
        .unwrap();
    lifecycle
        .propose(
            order.id,
            countered.version,
            TransitionAction::Accept {
                by: UserId::new("bushy"),
            },
        )
        .unwrap();

    // Fast-path viewer folds in both events (counter forces a re-read
    // for the proposal payload), then polls
    while let Some(event) = sub.try_recv().unwrap() {
        with_events.apply_event(&event);
    }
    with_events.poll().unwrap();

    // Poll-only viewer just resyncs
    poll_only.resync().unwrap();

    let a = with_events.get(order.id).unwrap();
    let b = poll_only.get(order.id).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.status, OrderStatus::Accepted);
    assert_eq!(a.version, 3);
    assert_eq!(a.counter_history.len(), 1);
}
