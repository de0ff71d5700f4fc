use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("capacity must be positive, got {0}")]
    NonPositiveCapacity(f64),

    #[error("weight must be positive, got {0}")]
    NonPositiveWeight(f64),

    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(i64),
}

/// Trip lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Draft,
    Verified,
    Cancelled,
    Completed,
}

/// A scheduled carrying opportunity with finite capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub total_capacity_kg: f64,
    pub consumed_kg: f64,
    pub status: TripStatus,
    pub departure_date: DateTime<Utc>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(
        owner_id: Uuid,
        total_capacity_kg: f64,
        departure_date: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if !(total_capacity_kg > 0.0) {
            return Err(ModelError::NonPositiveCapacity(total_capacity_kg));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            total_capacity_kg,
            consumed_kg: 0.0,
            status: TripStatus::Draft,
            departure_date,
            verified: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// A trip accepts new requests only once verified and still open.
    pub fn is_open(&self) -> bool {
        self.verified && self.status == TripStatus::Verified
    }

    pub fn update_status(&mut self, status: TripStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

/// Urgency tier of a request. Higher urgency means a shorter decision window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityTier {
    Standard,
    Urgent,
    Express,
}

/// Booking request status. Every non-pending status is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Declined,
    AutoDeclined,
    Expired,
    Cancelled,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        *self != RequestStatus::Pending
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Declined => "DECLINED",
            RequestStatus::AutoDeclined => "AUTO_DECLINED",
            RequestStatus::Expired => "EXPIRED",
            RequestStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// A proposal from a requester to use part of a trip's remaining capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub trip_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    pub item_value_cents: i64,
    pub tier: PriorityTier,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BookingRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        requester_id: Uuid,
        trip_id: Uuid,
        weight_kg: f64,
        reward_cents: i64,
        item_value_cents: i64,
        tier: PriorityTier,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, ModelError> {
        if !(weight_kg > 0.0) {
            return Err(ModelError::NonPositiveWeight(weight_kg));
        }
        if reward_cents <= 0 {
            return Err(ModelError::NonPositiveAmount(reward_cents));
        }
        if item_value_cents < 0 {
            return Err(ModelError::NonPositiveAmount(item_value_cents));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            requester_id,
            trip_id,
            weight_kg,
            reward_cents,
            item_value_cents,
            tier,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            expires_at,
        })
    }
}

/// Delivery lifecycle of a confirmed booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
    Confirmed,
    PickedUp,
    InTransit,
    Arrived,
    Delivered,
    Completed,
    Cancelled,
}

impl DeliveryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DeliveryStatus::Completed | DeliveryStatus::Cancelled)
    }

    pub const ALL: [DeliveryStatus; 7] = [
        DeliveryStatus::Confirmed,
        DeliveryStatus::PickedUp,
        DeliveryStatus::InTransit,
        DeliveryStatus::Arrived,
        DeliveryStatus::Delivered,
        DeliveryStatus::Completed,
        DeliveryStatus::Cancelled,
    ];
}

impl std::fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeliveryStatus::Confirmed => "CONFIRMED",
            DeliveryStatus::PickedUp => "PICKED_UP",
            DeliveryStatus::InTransit => "IN_TRANSIT",
            DeliveryStatus::Arrived => "ARRIVED",
            DeliveryStatus::Delivered => "DELIVERED",
            DeliveryStatus::Completed => "COMPLETED",
            DeliveryStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// The confirmed, escrow-backed agreement created from one accepted request.
///
/// The escrow position is not stored here; it is derived from the wallet
/// ledger's transaction history for this booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub request_id: Uuid,
    pub trip_id: Uuid,
    pub requester_id: Uuid,
    pub carrier_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    pub delivery_status: DeliveryStatus,
    pub cancellation_reason: Option<String>,
    pub confirmed_at: DateTime<Utc>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub in_transit_at: Option<DateTime<Utc>>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Create the booking for an accepted request. Called exactly once per
    /// request, inside the acceptance transaction.
    pub fn from_accepted(request: &BookingRequest, carrier_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request_id: request.id,
            trip_id: request.trip_id,
            requester_id: request.requester_id,
            carrier_id,
            weight_kg: request.weight_kg,
            reward_cents: request.reward_cents,
            delivery_status: DeliveryStatus::Confirmed,
            cancellation_reason: None,
            confirmed_at: now,
            picked_up_at: None,
            in_transit_at: None,
            arrived_at: None,
            delivered_at: None,
            completed_at: None,
            cancelled_at: None,
            updated_at: now,
        }
    }

    /// Apply an already-validated transition, stamping its timestamp.
    pub fn record_transition(&mut self, target: DeliveryStatus) {
        let now = Utc::now();
        match target {
            DeliveryStatus::Confirmed => {}
            DeliveryStatus::PickedUp => self.picked_up_at = Some(now),
            DeliveryStatus::InTransit => self.in_transit_at = Some(now),
            DeliveryStatus::Arrived => self.arrived_at = Some(now),
            DeliveryStatus::Delivered => self.delivered_at = Some(now),
            DeliveryStatus::Completed => self.completed_at = Some(now),
            DeliveryStatus::Cancelled => self.cancelled_at = Some(now),
        }
        self.delivery_status = target;
        self.updated_at = now;
    }

    /// Whether the given account is a party to this booking.
    pub fn involves(&self, account_id: Uuid) -> bool {
        self.requester_id == account_id || self.carrier_id == account_id
    }
}
