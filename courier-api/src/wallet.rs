use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use courier_core::identity::Actor;
use courier_wallet::models::{EscrowTransaction, WalletBalance};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub available_cents: i64,
    pub held_cents: i64,
}

impl BalanceResponse {
    fn new(account_id: Uuid, balance: WalletBalance) -> Self {
        Self {
            account_id,
            available_cents: balance.available_cents,
            held_cents: balance.held_cents,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountBody {
    pub amount_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub account_id: Uuid,
    pub available_cents: i64,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/wallet/open
pub async fn open_account(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.engine.open_account(actor).await?;
    Ok(Json(BalanceResponse::new(actor.account_id, balance)))
}

/// GET /v1/wallet
pub async fn get_balance(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<BalanceResponse>, AppError> {
    let balance = state.engine.wallet_balance(actor.account_id).await?;
    Ok(Json(BalanceResponse::new(actor.account_id, balance)))
}

/// POST /v1/wallet/deposit
pub async fn deposit(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<AmountBody>,
) -> Result<Json<MovementResponse>, AppError> {
    let available_cents = state.engine.deposit(actor, body.amount_cents).await?;
    Ok(Json(MovementResponse {
        account_id: actor.account_id,
        available_cents,
    }))
}

/// POST /v1/wallet/withdraw
pub async fn withdraw(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<AmountBody>,
) -> Result<Json<MovementResponse>, AppError> {
    let available_cents = state.engine.withdraw(actor, body.amount_cents).await?;
    Ok(Json(MovementResponse {
        account_id: actor.account_id,
        available_cents,
    }))
}

/// GET /v1/wallet/escrow/:booking_id
pub async fn escrow_history(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<Vec<EscrowTransaction>>, AppError> {
    let history = state
        .wallet_repo
        .escrow_history(booking_id)
        .await
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!(e)))?;
    Ok(Json(history))
}
