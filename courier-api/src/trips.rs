use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_booking::models::{Trip, TripStatus};
use courier_core::identity::Actor;
use courier_engine::NewTrip;

use crate::error::AppError;
use crate::requests::RequestResponse;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct TripResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub total_capacity_kg: f64,
    pub consumed_kg: f64,
    pub remaining_kg: f64,
    pub status: TripStatus,
    pub departure_date: chrono::DateTime<chrono::Utc>,
    pub verified: bool,
}

impl From<Trip> for TripResponse {
    fn from(trip: Trip) -> Self {
        Self {
            id: trip.id,
            owner_id: trip.owner_id,
            remaining_kg: (trip.total_capacity_kg - trip.consumed_kg).max(0.0),
            total_capacity_kg: trip.total_capacity_kg,
            consumed_kg: trip.consumed_kg,
            status: trip.status,
            departure_date: trip.departure_date,
            verified: trip.verified,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTripRequest {
    pub total_capacity_kg: f64,
    pub departure_date: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct CapacityResponse {
    pub trip_id: Uuid,
    pub remaining_kg: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/trips
pub async fn create_trip(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(req): Json<CreateTripRequest>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state
        .engine
        .create_trip(
            actor,
            NewTrip {
                total_capacity_kg: req.total_capacity_kg,
                departure_date: req.departure_date,
            },
        )
        .await?;
    Ok(Json(trip.into()))
}

/// GET /v1/trips
pub async fn list_my_trips(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<TripResponse>>, AppError> {
    let trips = state
        .trip_repo
        .list_trips_by_owner(actor.account_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
    Ok(Json(trips.into_iter().map(Into::into).collect()))
}

/// GET /v1/trips/:id
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state
        .trip_repo
        .get_trip(trip_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?
        .ok_or_else(|| {
            AppError::Engine(courier_engine::EngineError::NotFound(format!(
                "trip {trip_id}"
            )))
        })?;
    Ok(Json(trip.into()))
}

/// POST /v1/trips/:id/verify (admin)
pub async fn verify_trip(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.engine.verify_trip(trip_id, actor).await?;
    Ok(Json(trip.into()))
}

/// POST /v1/trips/:id/cancel
pub async fn cancel_trip(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.engine.cancel_trip(trip_id, actor).await?;
    Ok(Json(trip.into()))
}

/// POST /v1/trips/:id/complete
pub async fn complete_trip(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripResponse>, AppError> {
    let trip = state.engine.complete_trip(trip_id, actor).await?;
    Ok(Json(trip.into()))
}

/// GET /v1/trips/:id/capacity
pub async fn remaining_capacity(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<CapacityResponse>, AppError> {
    let remaining_kg = state.engine.remaining_capacity(trip_id).await?;
    Ok(Json(CapacityResponse {
        trip_id,
        remaining_kg,
    }))
}

/// GET /v1/trips/:id/requests
pub async fn list_requests(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<RequestResponse>>, AppError> {
    let requests = state
        .request_repo
        .list_requests_for_trip(trip_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
    Ok(Json(requests.into_iter().map(Into::into).collect()))
}

/// GET /v1/trips/:id/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Vec<crate::bookings::BookingResponse>>, AppError> {
    let bookings = state
        .booking_repo
        .list_bookings_for_trip(trip_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
    Ok(Json(bookings.into_iter().map(Into::into).collect()))
}
