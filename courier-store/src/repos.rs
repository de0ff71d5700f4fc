use async_trait::async_trait;
use uuid::Uuid;

use courier_booking::models::{Booking, BookingRequest, Trip};
use courier_booking::repository::{BookingRepository, RequestRepository, TripRepository};
use courier_wallet::models::{EscrowTransaction, WalletBalance};
use courier_wallet::repository::WalletRepository;

use crate::memory::MemStore;

type RepoError = Box<dyn std::error::Error + Send + Sync>;

#[async_trait]
impl TripRepository for MemStore {
    async fn get_trip(&self, id: Uuid) -> Result<Option<Trip>, RepoError> {
        Ok(self.read(|state| state.trips.get(&id).cloned()).await?)
    }

    async fn list_trips_by_owner(&self, owner_id: Uuid) -> Result<Vec<Trip>, RepoError> {
        Ok(self
            .read(|state| {
                let mut trips: Vec<Trip> = state
                    .trips
                    .values()
                    .filter(|t| t.owner_id == owner_id)
                    .cloned()
                    .collect();
                trips.sort_by_key(|t| t.created_at);
                trips
            })
            .await?)
    }
}

#[async_trait]
impl RequestRepository for MemStore {
    async fn get_request(&self, id: Uuid) -> Result<Option<BookingRequest>, RepoError> {
        Ok(self.read(|state| state.requests.get(&id).cloned()).await?)
    }

    async fn list_requests_for_trip(&self, trip_id: Uuid) -> Result<Vec<BookingRequest>, RepoError> {
        Ok(self
            .read(|state| {
                let mut requests: Vec<BookingRequest> = state
                    .requests
                    .values()
                    .filter(|r| r.trip_id == trip_id)
                    .cloned()
                    .collect();
                requests.sort_by_key(|r| r.created_at);
                requests
            })
            .await?)
    }
}

#[async_trait]
impl BookingRepository for MemStore {
    async fn get_booking(&self, id: Uuid) -> Result<Option<Booking>, RepoError> {
        Ok(self.read(|state| state.bookings.get(&id).cloned()).await?)
    }

    async fn list_bookings_for_trip(&self, trip_id: Uuid) -> Result<Vec<Booking>, RepoError> {
        Ok(self
            .read(|state| {
                let mut bookings: Vec<Booking> = state
                    .bookings
                    .values()
                    .filter(|b| b.trip_id == trip_id)
                    .cloned()
                    .collect();
                bookings.sort_by_key(|b| b.confirmed_at);
                bookings
            })
            .await?)
    }
}

#[async_trait]
impl WalletRepository for MemStore {
    async fn balance(&self, account_id: Uuid) -> Result<Option<WalletBalance>, RepoError> {
        Ok(self
            .read(|state| state.escrow.balance(&account_id))
            .await?)
    }

    async fn escrow_history(&self, booking_id: Uuid) -> Result<Vec<EscrowTransaction>, RepoError> {
        Ok(self
            .read(|state| state.escrow.history(&booking_id).to_vec())
            .await?)
    }
}
