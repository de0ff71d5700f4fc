use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One ledger account per user. Only the available balance is stored; the
/// held balance is derived from active escrow transactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletAccount {
    pub id: Uuid,
    pub available_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WalletAccount {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            available_cents: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Escrow transaction kind. Per booking, the history is one `Hold` followed
/// by at most one of `Release` or `Refund`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowKind {
    Hold,
    Release,
    Refund,
}

/// Escrow position of a booking, derived from its transaction history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Held,
    Released,
    Refunded,
}

/// A single money movement tied to exactly one booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowTransaction {
    pub id: Uuid,
    pub booking_id: Uuid,
    /// For holds: the payer. For release/refund: the credited account.
    pub account_id: Uuid,
    pub kind: EscrowKind,
    pub amount_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl EscrowTransaction {
    pub fn new(booking_id: Uuid, account_id: Uuid, kind: EscrowKind, amount_cents: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            account_id,
            kind,
            amount_cents,
            created_at: Utc::now(),
        }
    }
}

/// Snapshot of an account's position, as exposed to callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WalletBalance {
    pub available_cents: i64,
    pub held_cents: i64,
}
