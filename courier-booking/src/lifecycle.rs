use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::models::{BookingRequest, PriorityTier, RequestStatus};

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("requester already has a pending request on trip {0}")]
    DuplicateRequest(Uuid),

    #[error("request {0} has expired")]
    Expired(Uuid),

    #[error("request {0} was already decided")]
    AlreadyDecided(Uuid),

    #[error("account {0} is not allowed to perform this operation")]
    Forbidden(Uuid),

    #[error("trip {0} is not open for requests")]
    TripNotOpen(Uuid),
}

/// Per-tier decision windows. Higher urgency, shorter window.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryWindows {
    pub standard_hours: i64,
    pub urgent_hours: i64,
    pub express_hours: i64,
}

impl Default for ExpiryWindows {
    fn default() -> Self {
        Self {
            standard_hours: 48,
            urgent_hours: 12,
            express_hours: 4,
        }
    }
}

impl ExpiryWindows {
    pub fn expires_at(&self, tier: PriorityTier, now: DateTime<Utc>) -> DateTime<Utc> {
        let hours = match tier {
            PriorityTier::Standard => self.standard_hours,
            PriorityTier::Urgent => self.urgent_hours,
            PriorityTier::Express => self.express_hours,
        };
        now + Duration::hours(hours)
    }
}

/// Expiry is a pure function of (now, expires_at), evaluated lazily at
/// decision/read time. There is no background sweep in the core.
pub fn is_expired(request: &BookingRequest, now: DateTime<Utc>) -> bool {
    request.status == RequestStatus::Pending && now > request.expires_at
}

/// Validate that the trip owner may decide this request right now.
///
/// Does not mutate the request: the caller flips a stale request to
/// `Expired` inside its own transaction when this returns `Expired`.
pub fn ensure_decidable(
    request: &BookingRequest,
    owner_id: Uuid,
    actor_id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), RequestError> {
    if actor_id != owner_id {
        return Err(RequestError::Forbidden(actor_id));
    }
    if request.status.is_terminal() {
        return Err(RequestError::AlreadyDecided(request.id));
    }
    if is_expired(request, now) {
        return Err(RequestError::Expired(request.id));
    }
    Ok(())
}

/// Validate that the requester may cancel this request right now.
///
/// Cancellation is allowed while the request is pending, including past its
/// expiry when no one has flipped it to `Expired` yet.
pub fn ensure_cancellable(request: &BookingRequest, actor_id: Uuid) -> Result<(), RequestError> {
    if actor_id != request.requester_id {
        return Err(RequestError::Forbidden(actor_id));
    }
    if request.status.is_terminal() {
        return Err(RequestError::AlreadyDecided(request.id));
    }
    Ok(())
}
