use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_booking::models::{Booking, DeliveryStatus};
use courier_core::identity::Actor;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub trip_id: Uuid,
    pub requester_id: Uuid,
    pub carrier_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    pub delivery_status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub confirmed_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            request_id: b.request_id,
            trip_id: b.trip_id,
            requester_id: b.requester_id,
            carrier_id: b.carrier_id,
            weight_kg: b.weight_kg,
            reward_cents: b.reward_cents,
            delivery_status: b.delivery_status,
            cancellation_reason: b.cancellation_reason,
            confirmed_at: b.confirmed_at,
            updated_at: b.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdvanceBody {
    pub target: DeliveryStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AdvanceResponse {
    pub booking_id: Uuid,
    pub delivery_status: DeliveryStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings/:id/advance
pub async fn advance_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
    Json(body): Json<AdvanceBody>,
) -> Result<Json<AdvanceResponse>, AppError> {
    let delivery_status = state
        .engine
        .advance_booking(booking_id, body.target, actor, body.reason)
        .await?;
    Ok(Json(AdvanceResponse {
        booking_id,
        delivery_status,
    }))
}

/// GET /v1/bookings/:id
///
/// Only the two parties to the booking may read it.
pub async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .booking_repo
        .get_booking(booking_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?
        .ok_or_else(|| {
            AppError::Engine(courier_engine::EngineError::NotFound(format!(
                "booking {booking_id}"
            )))
        })?;
    if !booking.involves(actor.account_id) && !actor.is_admin() {
        return Err(AppError::Engine(courier_engine::EngineError::Forbidden(
            actor.account_id,
        )));
    }
    Ok(Json(booking.into()))
}
