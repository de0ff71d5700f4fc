use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_booking::capacity::CapacityLedger;
use courier_booking::lifecycle::{self, ExpiryWindows, RequestError};
use courier_booking::models::{
    Booking, BookingRequest, DeliveryStatus, PriorityTier, RequestStatus, Trip, TripStatus,
};
use courier_booking::state_machine::{self, TransitionStep};
use courier_core::identity::Actor;
use courier_core::notify::NotificationDispatcher;
use courier_shared::events::{
    BookingStateChangedEvent, EscrowSettledEvent, NotificationEvent, RequestDecidedEvent,
};
use courier_store::app_config::BusinessRules;
use courier_store::memory::{MemStore, StoreState};
use courier_wallet::models::{EscrowStatus, WalletBalance};

use crate::error::EngineError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTrip {
    pub total_capacity_kg: f64,
    pub departure_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    pub trip_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    pub item_value_cents: i64,
    pub tier: PriorityTier,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Accept,
    Decline,
}

/// Result of the decide transaction before it is mapped to the caller.
enum DecideOutcome {
    Accepted(Booking, Vec<NotificationEvent>),
    Declined(Vec<NotificationEvent>),
    /// The request was past its expiry; the flip to `Expired` commits even
    /// though the decision itself fails.
    ExpiredFlipped(Uuid),
}

/// Orchestrates the booking core: request lifecycle, the acceptance
/// transaction, the delivery state machine, and escrow settlement.
///
/// Every mutation runs inside one serializable store transaction;
/// notifications are queued during the transaction and dispatched only
/// after it commits.
pub struct BookingEngine {
    store: MemStore,
    capacity: CapacityLedger,
    windows: ExpiryWindows,
    notifier: Arc<dyn NotificationDispatcher>,
}

impl BookingEngine {
    pub fn new(
        store: MemStore,
        rules: &BusinessRules,
        notifier: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            capacity: CapacityLedger::new(rules.capacity_floor_kg),
            windows: rules.expiry_windows(),
            notifier,
        }
    }

    pub fn store(&self) -> &MemStore {
        &self.store
    }

    async fn tx<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        self.store.transaction(f).await?
    }

    /// Fire-and-forget: failures are logged, never surfaced, never retried.
    async fn dispatch_all(&self, events: Vec<NotificationEvent>) {
        for event in events {
            if let Err(e) = self.notifier.dispatch(event).await {
                tracing::warn!(error = %e, "notification dispatch failed");
            }
        }
    }

    // ------------------------------------------------------------------
    // Wallet administration
    // ------------------------------------------------------------------

    pub async fn open_account(&self, actor: Actor) -> Result<WalletBalance, EngineError> {
        self.tx(move |state| {
            state.escrow.open_account(actor.account_id);
            state
                .escrow
                .balance(&actor.account_id)
                .ok_or_else(|| EngineError::NotFound(format!("account {}", actor.account_id)))
        })
        .await
    }

    pub async fn deposit(&self, actor: Actor, amount_cents: i64) -> Result<i64, EngineError> {
        let available = self
            .tx(move |state| Ok(state.escrow.deposit(actor.account_id, amount_cents)?))
            .await?;
        tracing::info!(
            account = %actor.account_id,
            amount = amount_cents,
            available,
            "deposit applied"
        );
        Ok(available)
    }

    pub async fn withdraw(&self, actor: Actor, amount_cents: i64) -> Result<i64, EngineError> {
        let available = self
            .tx(move |state| Ok(state.escrow.withdraw(actor.account_id, amount_cents)?))
            .await?;
        tracing::info!(
            account = %actor.account_id,
            amount = amount_cents,
            available,
            "withdrawal applied"
        );
        Ok(available)
    }

    pub async fn wallet_balance(&self, account_id: Uuid) -> Result<WalletBalance, EngineError> {
        self.store
            .read(|state| state.escrow.balance(&account_id))
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("account {account_id}")))
    }

    // ------------------------------------------------------------------
    // Trip administration
    // ------------------------------------------------------------------

    pub async fn create_trip(&self, actor: Actor, spec: NewTrip) -> Result<Trip, EngineError> {
        let trip = Trip::new(actor.account_id, spec.total_capacity_kg, spec.departure_date)?;
        self.tx(move |state| {
            state.trips.insert(trip.id, trip.clone());
            Ok(trip)
        })
        .await
    }

    /// Admin-only: mark a draft trip as verified and open it for requests.
    pub async fn verify_trip(&self, trip_id: Uuid, actor: Actor) -> Result<Trip, EngineError> {
        if !actor.is_admin() {
            return Err(EngineError::Forbidden(actor.account_id));
        }
        self.tx(move |state| {
            let trip = state
                .trips
                .get_mut(&trip_id)
                .ok_or_else(|| EngineError::NotFound(format!("trip {trip_id}")))?;
            if trip.status != TripStatus::Draft {
                return Err(EngineError::Validation(
                    "only draft trips can be verified".into(),
                ));
            }
            trip.verified = true;
            trip.update_status(TripStatus::Verified);
            Ok(trip.clone())
        })
        .await
    }

    /// Owner-only. A trip with bookings still in flight cannot be cancelled.
    pub async fn cancel_trip(&self, trip_id: Uuid, actor: Actor) -> Result<Trip, EngineError> {
        self.tx(move |state| {
            let trip = state
                .trips
                .get(&trip_id)
                .ok_or_else(|| EngineError::NotFound(format!("trip {trip_id}")))?;
            if trip.owner_id != actor.account_id {
                return Err(EngineError::Forbidden(actor.account_id));
            }
            if matches!(trip.status, TripStatus::Cancelled | TripStatus::Completed) {
                return Err(EngineError::Validation("trip already closed".into()));
            }
            let active = state
                .bookings
                .values()
                .any(|b| b.trip_id == trip_id && !b.delivery_status.is_terminal());
            if active {
                return Err(EngineError::Validation(
                    "trip has bookings still in flight".into(),
                ));
            }
            let trip = state
                .trips
                .get_mut(&trip_id)
                .ok_or_else(|| EngineError::NotFound(format!("trip {trip_id}")))?;
            trip.update_status(TripStatus::Cancelled);
            Ok(trip.clone())
        })
        .await
    }

    /// Owner-only: close out a verified trip after the fact.
    pub async fn complete_trip(&self, trip_id: Uuid, actor: Actor) -> Result<Trip, EngineError> {
        self.tx(move |state| {
            let trip = state
                .trips
                .get_mut(&trip_id)
                .ok_or_else(|| EngineError::NotFound(format!("trip {trip_id}")))?;
            if trip.owner_id != actor.account_id {
                return Err(EngineError::Forbidden(actor.account_id));
            }
            if trip.status != TripStatus::Verified {
                return Err(EngineError::Validation(
                    "only verified trips can be completed".into(),
                ));
            }
            trip.update_status(TripStatus::Completed);
            Ok(trip.clone())
        })
        .await
    }

    pub async fn remaining_capacity(&self, trip_id: Uuid) -> Result<f64, EngineError> {
        let capacity = self.capacity;
        self.store
            .read(move |state| state.trips.get(&trip_id).map(|t| capacity.remaining(t)))
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("trip {trip_id}")))
    }

    // ------------------------------------------------------------------
    // Request lifecycle
    // ------------------------------------------------------------------

    /// Submit a request against a trip's remaining capacity.
    pub async fn submit_request(
        &self,
        actor: Actor,
        payload: NewRequest,
    ) -> Result<BookingRequest, EngineError> {
        let capacity = self.capacity;
        let windows = self.windows;
        self.tx(move |state| {
            let now = Utc::now();
            let trip = state
                .trips
                .get(&payload.trip_id)
                .cloned()
                .ok_or_else(|| EngineError::NotFound(format!("trip {}", payload.trip_id)))?;
            if !trip.is_open() {
                return Err(RequestError::TripNotOpen(trip.id).into());
            }
            if trip.owner_id == actor.account_id {
                return Err(EngineError::Validation(
                    "carriers cannot request their own trip".into(),
                ));
            }

            // Lazy expiry: flip stale pending requests on this trip before
            // checking for duplicates, so a dead request never blocks a new one.
            for request in state
                .requests
                .values_mut()
                .filter(|r| r.trip_id == trip.id)
            {
                if lifecycle::is_expired(request, now) {
                    request.status = RequestStatus::Expired;
                }
            }

            let duplicate = state.requests.values().any(|r| {
                r.trip_id == trip.id
                    && r.requester_id == actor.account_id
                    && r.status == RequestStatus::Pending
            });
            if duplicate {
                return Err(RequestError::DuplicateRequest(trip.id).into());
            }

            capacity.check(&trip, payload.weight_kg)?;

            let request = BookingRequest::new(
                actor.account_id,
                trip.id,
                payload.weight_kg,
                payload.reward_cents,
                payload.item_value_cents,
                payload.tier,
                windows.expires_at(payload.tier, now),
            )?;
            state.requests.insert(request.id, request.clone());
            Ok(request)
        })
        .await
    }

    /// Owner decision on a pending request. Accepting runs the full
    /// acceptance transaction; both paths retire the request.
    pub async fn decide_request(
        &self,
        request_id: Uuid,
        decision: Decision,
        actor: Actor,
    ) -> Result<Option<Booking>, EngineError> {
        let capacity = self.capacity;
        let outcome = self
            .tx(move |state| {
                let now = Utc::now();
                let request = state
                    .requests
                    .get(&request_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound(format!("request {request_id}")))?;
                let trip = state
                    .trips
                    .get(&request.trip_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound(format!("trip {}", request.trip_id)))?;

                match lifecycle::ensure_decidable(&request, trip.owner_id, actor.account_id, now) {
                    Ok(()) => {}
                    Err(RequestError::Expired(id)) => {
                        // The flip is a committed side effect of the failed decide
                        if let Some(r) = state.requests.get_mut(&id) {
                            r.status = RequestStatus::Expired;
                        }
                        return Ok(DecideOutcome::ExpiredFlipped(id));
                    }
                    Err(e) => return Err(e.into()),
                }

                match decision {
                    Decision::Decline => {
                        let r = state
                            .requests
                            .get_mut(&request_id)
                            .ok_or_else(|| EngineError::NotFound(format!("request {request_id}")))?;
                        r.status = RequestStatus::Declined;
                        let events = vec![request_decided_event(r, actor.account_id)];
                        Ok(DecideOutcome::Declined(events))
                    }
                    Decision::Accept => {
                        Self::accept_request(state, capacity, &request, actor, now)
                    }
                }
            })
            .await?;

        match outcome {
            DecideOutcome::ExpiredFlipped(id) => Err(RequestError::Expired(id).into()),
            DecideOutcome::Declined(events) => {
                self.dispatch_all(events).await;
                Ok(None)
            }
            DecideOutcome::Accepted(booking, events) => {
                tracing::info!(
                    booking = %booking.id,
                    request = %booking.request_id,
                    trip = %booking.trip_id,
                    reward = booking.reward_cents,
                    "acceptance committed"
                );
                self.dispatch_all(events).await;
                Ok(Some(booking))
            }
        }
    }

    /// The acceptance transaction. Runs entirely inside one store
    /// transaction: either every step below commits together or the staged
    /// state is discarded and nothing is observable.
    fn accept_request(
        state: &mut StoreState,
        capacity: CapacityLedger,
        request: &BookingRequest,
        actor: Actor,
        _now: DateTime<Utc>,
    ) -> Result<DecideOutcome, EngineError> {
        // 1. Re-validate the trip inside the atomic unit
        let trip = state
            .trips
            .get_mut(&request.trip_id)
            .ok_or_else(|| EngineError::NotFound(format!("trip {}", request.trip_id)))?;
        if !trip.is_open() {
            return Err(RequestError::TripNotOpen(trip.id).into());
        }

        // 2. Check-and-reserve capacity in the same unit
        capacity.reserve(trip, request.weight_kg)?;
        let carrier_id = trip.owner_id;

        // 3. Create the booking, confirmed and awaiting pickup
        let booking = Booking::from_accepted(request, carrier_id);

        // 4. Escrow hold; InsufficientFunds aborts the whole transaction,
        //    leaving the capacity reservation unstaged and the request pending
        state
            .escrow
            .hold(request.requester_id, request.reward_cents, booking.id)?;

        let mut events = Vec::new();

        // 5. Retire the source request
        let r = state
            .requests
            .get_mut(&request.id)
            .ok_or_else(|| EngineError::NotFound(format!("request {}", request.id)))?;
        r.status = RequestStatus::Accepted;
        events.push(request_decided_event(r, actor.account_id));

        // 6. Accepting one proposal retires all competing proposals
        for sibling in state.requests.values_mut().filter(|r| {
            r.trip_id == request.trip_id
                && r.id != request.id
                && r.status == RequestStatus::Pending
        }) {
            sibling.status = RequestStatus::AutoDeclined;
            events.push(request_decided_event(sibling, actor.account_id));
        }

        events.push(booking_state_event(&booking, actor.account_id));
        state.bookings.insert(booking.id, booking.clone());
        Ok(DecideOutcome::Accepted(booking, events))
    }

    /// Requester-side cancellation of a still-pending request.
    pub async fn cancel_request(&self, request_id: Uuid, actor: Actor) -> Result<(), EngineError> {
        let events = self
            .tx(move |state| {
                let request = state
                    .requests
                    .get_mut(&request_id)
                    .ok_or_else(|| EngineError::NotFound(format!("request {request_id}")))?;
                lifecycle::ensure_cancellable(request, actor.account_id)?;
                request.status = RequestStatus::Cancelled;
                Ok(vec![request_decided_event(request, actor.account_id)])
            })
            .await?;
        self.dispatch_all(events).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Delivery state machine
    // ------------------------------------------------------------------

    /// Advance a booking along the delivery lifecycle.
    ///
    /// Terminal transitions settle escrow inside the same transaction:
    /// `Cancelled` refunds the requester and returns the trip capacity,
    /// `Completed` releases the hold to the carrier. A replayed non-terminal
    /// transition is a no-op; a replayed terminal one runs into the wallet's
    /// settlement guard and surfaces `NoActiveHold`.
    pub async fn advance_booking(
        &self,
        booking_id: Uuid,
        target: DeliveryStatus,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<DeliveryStatus, EngineError> {
        let capacity = self.capacity;
        let (status, events) = self
            .tx(move |state| {
                let booking = state
                    .bookings
                    .get(&booking_id)
                    .cloned()
                    .ok_or_else(|| EngineError::NotFound(format!("booking {booking_id}")))?;

                let step = state_machine::check_transition(
                    &booking,
                    target,
                    actor.account_id,
                    reason.as_deref(),
                )?;

                if step == TransitionStep::Replay {
                    let mut events = Vec::new();
                    if target.is_terminal() {
                        // Replayed settlement: the wallet guard decides
                        events.push(Self::settle(state, &booking, target, actor.account_id)?);
                    }
                    return Ok((booking.delivery_status, events));
                }

                let mut events = Vec::new();
                if target.is_terminal()
                    && state.escrow.settlement_status(&booking.id) == Some(EscrowStatus::Held)
                {
                    events.push(Self::settle(state, &booking, target, actor.account_id)?);
                }
                if target == DeliveryStatus::Cancelled {
                    let trip = state
                        .trips
                        .get_mut(&booking.trip_id)
                        .ok_or_else(|| EngineError::NotFound(format!("trip {}", booking.trip_id)))?;
                    capacity.release(trip, booking.weight_kg);
                }

                let b = state
                    .bookings
                    .get_mut(&booking_id)
                    .ok_or_else(|| EngineError::NotFound(format!("booking {booking_id}")))?;
                b.record_transition(target);
                if target == DeliveryStatus::Cancelled {
                    b.cancellation_reason = reason.clone();
                }
                events.push(booking_state_event(b, actor.account_id));
                Ok((target, events))
            })
            .await?;

        self.dispatch_all(events).await;
        Ok(status)
    }

    /// Move the held funds for a terminal transition. `Completed` credits
    /// the carrier, `Cancelled` refunds the requester.
    fn settle(
        state: &mut StoreState,
        booking: &Booking,
        target: DeliveryStatus,
        actor_id: Uuid,
    ) -> Result<NotificationEvent, EngineError> {
        let (settlement, account_id, amount) = match target {
            DeliveryStatus::Completed => {
                let amount = state.escrow.release(booking.id, booking.carrier_id)?;
                ("RELEASE", booking.carrier_id, amount)
            }
            DeliveryStatus::Cancelled => {
                let (payer, amount) = state.escrow.refund(booking.id)?;
                ("REFUND", payer, amount)
            }
            _ => {
                return Err(EngineError::Validation(format!(
                    "{target} is not a settling state"
                )))
            }
        };
        tracing::info!(
            booking = %booking.id,
            settlement,
            amount,
            actor = %actor_id,
            "escrow settled"
        );
        Ok(NotificationEvent::EscrowSettled(EscrowSettledEvent {
            booking_id: booking.id,
            settlement: settlement.to_string(),
            amount_cents: amount,
            account_id,
            settled_at: Utc::now().timestamp(),
        }))
    }
}

fn request_decided_event(request: &BookingRequest, actor_id: Uuid) -> NotificationEvent {
    NotificationEvent::RequestDecided(RequestDecidedEvent {
        request_id: request.id,
        trip_id: request.trip_id,
        new_status: request.status.to_string(),
        actor_id,
        decided_at: Utc::now().timestamp(),
    })
}

fn booking_state_event(booking: &Booking, actor_id: Uuid) -> NotificationEvent {
    NotificationEvent::BookingStateChanged(BookingStateChangedEvent {
        booking_id: booking.id,
        trip_id: booking.trip_id,
        new_state: booking.delivery_status.to_string(),
        actor_id,
        changed_at: Utc::now().timestamp(),
    })
}
