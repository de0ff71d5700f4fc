use uuid::Uuid;

use courier_booking::capacity::CapacityError;
use courier_booking::lifecycle::RequestError;
use courier_booking::models::ModelError;
use courier_booking::state_machine::TransitionError;
use courier_store::StoreError;
use courier_wallet::WalletError;

/// Every business outcome a core operation can surface. Infrastructure
/// failures end up as `Unavailable` after the store's bounded retries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("account {0} is not allowed to perform this operation")]
    Forbidden(Uuid),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error(transparent)]
    Unavailable(#[from] StoreError),
}
