use uuid::Uuid;

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct RequestDecidedEvent {
    pub request_id: Uuid,
    pub trip_id: Uuid,
    pub new_status: String,
    pub actor_id: Uuid,
    pub decided_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct BookingStateChangedEvent {
    pub booking_id: Uuid,
    pub trip_id: Uuid,
    pub new_state: String,
    pub actor_id: Uuid,
    pub changed_at: i64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
pub struct EscrowSettledEvent {
    pub booking_id: Uuid,
    pub settlement: String,
    pub amount_cents: i64,
    pub account_id: Uuid,
    pub settled_at: i64,
}

/// Outbound notification payloads. These are queued during a store
/// transaction and dispatched only after the transaction commits.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    RequestDecided(RequestDecidedEvent),
    BookingStateChanged(BookingStateChangedEvent),
    EscrowSettled(EscrowSettledEvent),
}

impl NotificationEvent {
    /// Stable topic name for routing on the transport side.
    pub fn topic(&self) -> &'static str {
        match self {
            NotificationEvent::RequestDecided(_) => "requests.decided",
            NotificationEvent::BookingStateChanged(_) => "bookings.state_changed",
            NotificationEvent::EscrowSettled(_) => "escrow.settled",
        }
    }
}
