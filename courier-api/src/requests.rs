use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_booking::models::{BookingRequest, PriorityTier, RequestStatus};
use courier_core::identity::Actor;
use courier_engine::{Decision, NewRequest};

use crate::bookings::BookingResponse;
use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct RequestResponse {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub trip_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    pub item_value_cents: i64,
    pub tier: PriorityTier,
    pub status: RequestStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl From<BookingRequest> for RequestResponse {
    fn from(r: BookingRequest) -> Self {
        Self {
            id: r.id,
            requester_id: r.requester_id,
            trip_id: r.trip_id,
            weight_kg: r.weight_kg,
            reward_cents: r.reward_cents,
            item_value_cents: r.item_value_cents,
            tier: r.tier,
            status: r.status,
            created_at: r.created_at,
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequestBody {
    pub trip_id: Uuid,
    pub weight_kg: f64,
    pub reward_cents: i64,
    #[serde(default)]
    pub item_value_cents: i64,
    pub tier: PriorityTier,
}

#[derive(Debug, Deserialize)]
pub struct DecideBody {
    pub decision: Decision,
}

/// Declines carry no booking; accepts carry the one they created.
#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub request_id: Uuid,
    pub decision: Decision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingResponse>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/requests
pub async fn submit_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<SubmitRequestBody>,
) -> Result<Json<RequestResponse>, AppError> {
    let request = state
        .engine
        .submit_request(
            actor,
            NewRequest {
                trip_id: body.trip_id,
                weight_kg: body.weight_kg,
                reward_cents: body.reward_cents,
                item_value_cents: body.item_value_cents,
                tier: body.tier,
            },
        )
        .await?;
    Ok(Json(request.into()))
}

/// GET /v1/requests/:id
pub async fn get_request(
    State(state): State<AppState>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, AppError> {
    let request = state
        .request_repo
        .get_request(request_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?
        .ok_or_else(|| {
            AppError::Engine(courier_engine::EngineError::NotFound(format!(
                "request {request_id}"
            )))
        })?;
    Ok(Json(request.into()))
}

/// POST /v1/requests/:id/decide
pub async fn decide_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<DecideBody>,
) -> Result<Json<DecisionResponse>, AppError> {
    let booking = state
        .engine
        .decide_request(request_id, body.decision, actor)
        .await?;
    Ok(Json(DecisionResponse {
        request_id,
        decision: body.decision,
        booking: booking.map(Into::into),
    }))
}

/// POST /v1/requests/:id/cancel
pub async fn cancel_request(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.engine.cancel_request(request_id, actor).await?;
    Ok(Json(serde_json::json!({
        "request_id": request_id,
        "status": "CANCELLED",
    })))
}
