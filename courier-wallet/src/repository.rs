use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{EscrowTransaction, WalletBalance};

/// Repository trait for wallet reads.
#[async_trait]
pub trait WalletRepository: Send + Sync {
    async fn balance(
        &self,
        account_id: Uuid,
    ) -> Result<Option<WalletBalance>, Box<dyn std::error::Error + Send + Sync>>;

    async fn escrow_history(
        &self,
        booking_id: Uuid,
    ) -> Result<Vec<EscrowTransaction>, Box<dyn std::error::Error + Send + Sync>>;
}
