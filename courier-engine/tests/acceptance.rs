mod common;

use common::{engine, engine_with_rules, force_expire, funded_customer, payload, verified_trip};
use uuid::Uuid;

use courier_booking::capacity::CapacityError;
use courier_booking::lifecycle::RequestError;
use courier_booking::models::{DeliveryStatus, RequestStatus};
use courier_core::identity::Actor;
use courier_engine::{Decision, EngineError};
use courier_store::app_config::BusinessRules;
use courier_wallet::WalletError;

#[tokio::test]
async fn accept_creates_booking_and_auto_declines_siblings() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;

    let alice = funded_customer(&engine, 10_000).await;
    let bob = funded_customer(&engine, 10_000).await;
    let winning = engine
        .submit_request(alice, payload(trip.id, 3.0, 1_000))
        .await
        .unwrap();
    let losing = engine
        .submit_request(bob, payload(trip.id, 1.5, 800))
        .await
        .unwrap();

    let booking = engine
        .decide_request(winning.id, Decision::Accept, carrier)
        .await
        .unwrap()
        .expect("accept must yield a booking");

    assert_eq!(booking.request_id, winning.id);
    assert_eq!(booking.requester_id, alice.account_id);
    assert_eq!(booking.carrier_id, carrier.account_id);
    assert_eq!(booking.weight_kg, 3.0);
    assert_eq!(booking.delivery_status, DeliveryStatus::Confirmed);

    // Capacity consumed, competing request retired
    assert_eq!(engine.remaining_capacity(trip.id).await.unwrap(), 2.0);
    let statuses = engine
        .store()
        .read(|state| {
            (
                state.requests[&winning.id].status,
                state.requests[&losing.id].status,
            )
        })
        .await
        .unwrap();
    assert_eq!(statuses.0, RequestStatus::Accepted);
    assert_eq!(statuses.1, RequestStatus::AutoDeclined);

    // Reward moved from available to held
    let balance = engine.wallet_balance(alice.account_id).await.unwrap();
    assert_eq!(balance.available_cents, 9_000);
    assert_eq!(balance.held_cents, 1_000);
}

#[tokio::test]
async fn decline_retires_request_without_booking() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 2.0, 500))
        .await
        .unwrap();

    let booking = engine
        .decide_request(request.id, Decision::Decline, carrier)
        .await
        .unwrap();
    assert!(booking.is_none());

    assert_eq!(engine.remaining_capacity(trip.id).await.unwrap(), 5.0);
    let status = engine
        .store()
        .read(|state| state.requests[&request.id].status)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Declined);
    // Nothing held
    let balance = engine.wallet_balance(alice.account_id).await.unwrap();
    assert_eq!(balance.available_cents, 5_000);
    assert_eq!(balance.held_cents, 0);
}

#[tokio::test]
async fn decided_request_cannot_be_decided_again() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 2.0, 500))
        .await
        .unwrap();

    engine
        .decide_request(request.id, Decision::Accept, carrier)
        .await
        .unwrap();
    let second = engine
        .decide_request(request.id, Decision::Accept, carrier)
        .await;
    assert!(matches!(
        second,
        Err(EngineError::Request(RequestError::AlreadyDecided(_)))
    ));
}

#[tokio::test]
async fn insufficient_funds_aborts_the_whole_acceptance() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;

    let broke = funded_customer(&engine, 300).await;
    let request = engine
        .submit_request(broke, payload(trip.id, 2.0, 1_000))
        .await
        .unwrap();

    let result = engine
        .decide_request(request.id, Decision::Accept, carrier)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Wallet(WalletError::InsufficientFunds {
            requested: 1_000,
            available: 300
        }))
    ));

    // Nothing committed: no booking, capacity untouched, request still pending
    let (bookings, status) = engine
        .store()
        .read(|state| (state.bookings.len(), state.requests[&request.id].status))
        .await
        .unwrap();
    assert_eq!(bookings, 0);
    assert_eq!(status, RequestStatus::Pending);
    assert_eq!(engine.remaining_capacity(trip.id).await.unwrap(), 5.0);
    assert_eq!(
        engine
            .wallet_balance(broke.account_id)
            .await
            .unwrap()
            .available_cents,
        300
    );
}

#[tokio::test]
async fn oversized_request_rejected_at_submission() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;

    let result = engine
        .submit_request(alice, payload(trip.id, 6.0, 500))
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Capacity(CapacityError::Exceeded { .. }))
    ));
}

#[tokio::test]
async fn unusable_sliver_rejected_but_exact_fit_allowed() {
    let mut rules = BusinessRules::default();
    rules.capacity_floor_kg = 0.5;
    let engine = engine_with_rules(&rules);
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let bob = funded_customer(&engine, 5_000).await;

    // Would strand 0.2kg, below the floor
    let sliver = engine
        .submit_request(alice, payload(trip.id, 4.8, 500))
        .await;
    assert!(matches!(
        sliver,
        Err(EngineError::Capacity(CapacityError::UnusableRemainder { .. }))
    ));

    // Exact fit leaves zero, which is fine
    assert!(engine
        .submit_request(bob, payload(trip.id, 5.0, 500))
        .await
        .is_ok());
}

#[tokio::test]
async fn duplicate_pending_request_rejected() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;

    engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();
    let second = engine
        .submit_request(alice, payload(trip.id, 2.0, 700))
        .await;
    assert!(matches!(
        second,
        Err(EngineError::Request(RequestError::DuplicateRequest(_)))
    ));
}

#[tokio::test]
async fn stale_pending_request_does_not_block_resubmission() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;

    let first = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();
    force_expire(&engine, first.id).await;

    // Lazy expiry flips the stale request on the way in
    let second = engine
        .submit_request(alice, payload(trip.id, 2.0, 700))
        .await
        .unwrap();
    assert_ne!(second.id, first.id);

    let status = engine
        .store()
        .read(|state| state.requests[&first.id].status)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Expired);
}

#[tokio::test]
async fn unverified_trip_rejects_requests() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = engine
        .create_trip(
            carrier,
            courier_engine::NewTrip {
                total_capacity_kg: 5.0,
                departure_date: chrono::Utc::now() + chrono::Duration::days(7),
            },
        )
        .await
        .unwrap();
    let alice = funded_customer(&engine, 5_000).await;

    let result = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Request(RequestError::TripNotOpen(_)))
    ));
}

#[tokio::test]
async fn carrier_cannot_request_own_trip() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    engine.deposit(carrier, 5_000).await.unwrap();

    let result = engine
        .submit_request(carrier, payload(trip.id, 1.0, 500))
        .await;
    assert!(matches!(result, Err(EngineError::Validation(_))));
}

#[tokio::test]
async fn only_trip_owner_decides() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();

    let stranger = Actor::customer(Uuid::new_v4());
    let result = engine
        .decide_request(request.id, Decision::Accept, stranger)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Request(RequestError::Forbidden(_)))
    ));
}

#[tokio::test]
async fn deciding_a_stale_request_flips_it_to_expired() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();
    force_expire(&engine, request.id).await;

    let result = engine
        .decide_request(request.id, Decision::Accept, carrier)
        .await;
    assert!(matches!(
        result,
        Err(EngineError::Request(RequestError::Expired(_)))
    ));

    // The flip committed even though the decision failed
    let status = engine
        .store()
        .read(|state| state.requests[&request.id].status)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Expired);

    // A later decide sees the terminal state, not another expiry
    let again = engine
        .decide_request(request.id, Decision::Decline, carrier)
        .await;
    assert!(matches!(
        again,
        Err(EngineError::Request(RequestError::AlreadyDecided(_)))
    ));
}

#[tokio::test]
async fn requester_cancels_pending_request() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();

    engine.cancel_request(request.id, alice).await.unwrap();
    let status = engine
        .store()
        .read(|state| state.requests[&request.id].status)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Cancelled);

    let decide = engine
        .decide_request(request.id, Decision::Accept, carrier)
        .await;
    assert!(matches!(
        decide,
        Err(EngineError::Request(RequestError::AlreadyDecided(_)))
    ));
}

#[tokio::test]
async fn expired_but_unflagged_request_is_still_cancellable() {
    let engine = engine();
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;
    let alice = funded_customer(&engine, 5_000).await;
    let request = engine
        .submit_request(alice, payload(trip.id, 1.0, 500))
        .await
        .unwrap();
    force_expire(&engine, request.id).await;

    engine.cancel_request(request.id, alice).await.unwrap();
    let status = engine
        .store()
        .read(|state| state.requests[&request.id].status)
        .await
        .unwrap();
    assert_eq!(status, RequestStatus::Cancelled);
}

#[tokio::test]
async fn concurrent_accepts_produce_exactly_one_booking() {
    let engine = std::sync::Arc::new(engine());
    let carrier = Actor::customer(Uuid::new_v4());
    let trip = verified_trip(&engine, carrier, 5.0).await;

    let mut request_ids = Vec::new();
    for _ in 0..8 {
        let requester = funded_customer(&engine, 10_000).await;
        let request = engine
            .submit_request(requester, payload(trip.id, 3.0, 1_000))
            .await
            .unwrap();
        request_ids.push(request.id);
    }

    let mut handles = Vec::new();
    for request_id in request_ids {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            engine
                .decide_request(request_id, Decision::Accept, carrier)
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    // Accepting one retires all competitors; no oversell is possible
    assert_eq!(successes, 1);
    assert_eq!(engine.remaining_capacity(trip.id).await.unwrap(), 2.0);
}
