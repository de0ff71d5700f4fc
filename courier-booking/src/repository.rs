use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Booking, BookingRequest, Trip};

/// Repository trait for trip reads.
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn get_trip(
        &self,
        id: Uuid,
    ) -> Result<Option<Trip>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_trips_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<Trip>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for booking-request reads.
#[async_trait]
pub trait RequestRepository: Send + Sync {
    async fn get_request(
        &self,
        id: Uuid,
    ) -> Result<Option<BookingRequest>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_requests_for_trip(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<BookingRequest>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for booking reads.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>>;

    async fn list_bookings_for_trip(
        &self,
        trip_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>>;
}
