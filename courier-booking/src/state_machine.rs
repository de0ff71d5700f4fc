use uuid::Uuid;

use crate::models::{Booking, DeliveryStatus};

#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("invalid transition from {from} to {to}")]
    Invalid {
        from: DeliveryStatus,
        to: DeliveryStatus,
    },

    #[error("account {0} is not allowed to perform this transition")]
    Forbidden(Uuid),

    #[error("cancellation requires a reason")]
    MissingReason,
}

/// Who may drive a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionGate {
    CarrierOnly,
    EitherParty,
}

/// The delivery transition table. Anything not listed here is invalid.
pub fn transition_allowed(from: DeliveryStatus, to: DeliveryStatus) -> bool {
    use DeliveryStatus::*;
    matches!(
        (from, to),
        (Confirmed, PickedUp)
            | (Confirmed, Cancelled)
            | (PickedUp, InTransit)
            | (PickedUp, Cancelled)
            | (InTransit, Arrived)
            | (Arrived, Delivered)
            | (Delivered, Completed)
    )
}

pub fn gate_for(target: DeliveryStatus) -> TransitionGate {
    use DeliveryStatus::*;
    match target {
        PickedUp | InTransit | Arrived | Delivered => TransitionGate::CarrierOnly,
        Completed | Cancelled | Confirmed => TransitionGate::EitherParty,
    }
}

/// Outcome of validating a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionStep {
    /// The booking is already in the target state; replaying is a no-op at
    /// the state-machine level. For terminal targets the caller still runs
    /// the escrow guard so double settlement surfaces as `NoActiveHold`.
    Replay,
    /// The transition is valid and should be applied.
    Apply,
}

/// Validate a transition request against the table and the actor gate.
pub fn check_transition(
    booking: &Booking,
    target: DeliveryStatus,
    actor_id: Uuid,
    reason: Option<&str>,
) -> Result<TransitionStep, TransitionError> {
    if !booking.involves(actor_id) {
        return Err(TransitionError::Forbidden(actor_id));
    }
    if booking.delivery_status == target {
        return Ok(TransitionStep::Replay);
    }
    if !transition_allowed(booking.delivery_status, target) {
        return Err(TransitionError::Invalid {
            from: booking.delivery_status,
            to: target,
        });
    }
    if gate_for(target) == TransitionGate::CarrierOnly && actor_id != booking.carrier_id {
        return Err(TransitionError::Forbidden(actor_id));
    }
    if target == DeliveryStatus::Cancelled && reason.map_or(true, |r| r.trim().is_empty()) {
        return Err(TransitionError::MissingReason);
    }
    Ok(TransitionStep::Apply)
}
