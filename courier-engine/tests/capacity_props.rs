mod common;

use common::{engine, funded_customer, payload, verified_trip};
use proptest::prelude::*;
use uuid::Uuid;

use courier_booking::capacity::EPSILON_KG;
use courier_core::identity::Actor;
use courier_engine::{Decision, EngineError};
use courier_store::app_config::BusinessRules;

const TRIP_CAPACITY_KG: f64 = 10.0;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any sequence of submit-then-accept rounds keeps the trip within its
    /// capacity and never strands an unusable sliver.
    #[test]
    fn capacity_is_never_oversold(weights in proptest::collection::vec(0.2f64..4.0, 1..12)) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (accepted_kg, remaining_kg) = rt.block_on(async move {
            let engine = engine();
            let carrier = Actor::customer(Uuid::new_v4());
            let trip = verified_trip(&engine, carrier, TRIP_CAPACITY_KG).await;

            let mut accepted_kg = 0.0;
            for weight in weights {
                let requester = funded_customer(&engine, 10_000).await;
                match engine
                    .submit_request(requester, payload(trip.id, weight, 1_000))
                    .await
                {
                    Ok(request) => {
                        engine
                            .decide_request(request.id, Decision::Accept, carrier)
                            .await
                            .unwrap();
                        accepted_kg += weight;
                    }
                    Err(EngineError::Capacity(_)) => {}
                    Err(other) => panic!("unexpected submission failure: {other:?}"),
                }
            }

            let remaining_kg = engine.remaining_capacity(trip.id).await.unwrap();
            (accepted_kg, remaining_kg)
        });

        let floor = BusinessRules::default().capacity_floor_kg;
        prop_assert!(accepted_kg <= TRIP_CAPACITY_KG + EPSILON_KG);
        prop_assert!(remaining_kg >= -EPSILON_KG);
        // Remaining capacity is either usable or effectively zero
        prop_assert!(
            remaining_kg >= floor - EPSILON_KG || remaining_kg <= EPSILON_KG,
            "stranded sliver of {remaining_kg}kg below the {floor}kg floor"
        );
    }
}
