pub mod ledger;
pub mod models;
pub mod repository;

pub use ledger::{EscrowLedger, WalletError};
pub use models::{EscrowKind, EscrowStatus, EscrowTransaction, WalletAccount, WalletBalance};
pub use repository::WalletRepository;
