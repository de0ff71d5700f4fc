pub mod capacity;
pub mod lifecycle;
pub mod models;
pub mod repository;
pub mod state_machine;

pub use capacity::{CapacityError, CapacityLedger};
pub use lifecycle::{ExpiryWindows, RequestError};
pub use models::{
    Booking, BookingRequest, DeliveryStatus, ModelError, PriorityTier, RequestStatus, Trip,
    TripStatus,
};
pub use state_machine::{TransitionError, TransitionGate};
