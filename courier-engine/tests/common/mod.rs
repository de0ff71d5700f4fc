#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use courier_booking::models::{PriorityTier, Trip};
use courier_core::identity::Actor;
use courier_core::notify::NullDispatcher;
use courier_engine::{BookingEngine, NewRequest, NewTrip};
use courier_store::app_config::BusinessRules;
use courier_store::memory::MemStore;

pub fn engine() -> BookingEngine {
    engine_with_rules(&BusinessRules::default())
}

pub fn engine_with_rules(rules: &BusinessRules) -> BookingEngine {
    BookingEngine::new(MemStore::new(rules), rules, Arc::new(NullDispatcher))
}

/// Create a trip for the carrier and verify it, so it accepts requests.
pub async fn verified_trip(engine: &BookingEngine, carrier: Actor, capacity_kg: f64) -> Trip {
    let trip = engine
        .create_trip(
            carrier,
            NewTrip {
                total_capacity_kg: capacity_kg,
                departure_date: Utc::now() + Duration::days(7),
            },
        )
        .await
        .unwrap();
    engine
        .verify_trip(trip.id, Actor::admin(Uuid::new_v4()))
        .await
        .unwrap()
}

pub fn payload(trip_id: Uuid, weight_kg: f64, reward_cents: i64) -> NewRequest {
    NewRequest {
        trip_id,
        weight_kg,
        reward_cents,
        item_value_cents: 0,
        tier: PriorityTier::Standard,
    }
}

/// A fresh customer with the given balance already deposited.
pub async fn funded_customer(engine: &BookingEngine, cents: i64) -> Actor {
    let actor = Actor::customer(Uuid::new_v4());
    engine.deposit(actor, cents).await.unwrap();
    actor
}

/// Rewind a pending request's expiry so lazy expiry sees it as stale.
pub async fn force_expire(engine: &BookingEngine, request_id: Uuid) {
    engine
        .store()
        .transaction(|state| -> Result<(), ()> {
            let request = state.requests.get_mut(&request_id).unwrap();
            request.expires_at = Utc::now() - Duration::hours(1);
            Ok(())
        })
        .await
        .unwrap()
        .unwrap();
}
