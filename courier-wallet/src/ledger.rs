use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{EscrowKind, EscrowStatus, EscrowTransaction, WalletAccount, WalletBalance};

#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("wallet account not found: {0}")]
    AccountNotFound(Uuid),

    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    #[error("no active escrow hold for booking {0}")]
    NoActiveHold(Uuid),

    #[error("escrow hold already exists for booking {0}")]
    HoldExists(Uuid),

    #[error("invalid amount: {0}")]
    InvalidAmount(i64),
}

/// Per-account balances and per-booking escrow histories.
///
/// This is the only component that moves money. Callers mutate it inside a
/// store transaction, so every operation here is all-or-nothing with the
/// rest of that transaction.
#[derive(Debug, Clone, Default)]
pub struct EscrowLedger {
    accounts: HashMap<Uuid, WalletAccount>,
    /// Transaction history keyed by booking, in application order.
    transactions: HashMap<Uuid, Vec<EscrowTransaction>>,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the account if it does not exist yet.
    pub fn open_account(&mut self, account_id: Uuid) -> &WalletAccount {
        self.accounts
            .entry(account_id)
            .or_insert_with(|| WalletAccount::new(account_id))
    }

    pub fn account(&self, account_id: &Uuid) -> Option<&WalletAccount> {
        self.accounts.get(account_id)
    }

    /// Credit an account's available balance from an external source.
    pub fn deposit(&mut self, account_id: Uuid, amount_cents: i64) -> Result<i64, WalletError> {
        if amount_cents <= 0 {
            return Err(WalletError::InvalidAmount(amount_cents));
        }
        self.open_account(account_id);
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(WalletError::AccountNotFound(account_id))?;
        account.available_cents += amount_cents;
        account.updated_at = chrono::Utc::now();
        Ok(account.available_cents)
    }

    /// Debit an account's available balance towards an external sink.
    pub fn withdraw(&mut self, account_id: Uuid, amount_cents: i64) -> Result<i64, WalletError> {
        if amount_cents <= 0 {
            return Err(WalletError::InvalidAmount(amount_cents));
        }
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(WalletError::AccountNotFound(account_id))?;
        if account.available_cents < amount_cents {
            return Err(WalletError::InsufficientFunds {
                requested: amount_cents,
                available: account.available_cents,
            });
        }
        account.available_cents -= amount_cents;
        account.updated_at = chrono::Utc::now();
        Ok(account.available_cents)
    }

    /// Escrow position of a booking, folded from its transaction history.
    pub fn settlement_status(&self, booking_id: &Uuid) -> Option<EscrowStatus> {
        let history = self.transactions.get(booking_id)?;
        let mut status = None;
        for tx in history {
            status = Some(match tx.kind {
                EscrowKind::Hold => EscrowStatus::Held,
                EscrowKind::Release => EscrowStatus::Released,
                EscrowKind::Refund => EscrowStatus::Refunded,
            });
        }
        status
    }

    /// Full escrow history for a booking, in application order.
    pub fn history(&self, booking_id: &Uuid) -> &[EscrowTransaction] {
        self.transactions
            .get(booking_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sum of this account's holds that have not been released or refunded.
    pub fn held_for(&self, account_id: &Uuid) -> i64 {
        self.transactions
            .values()
            .filter_map(|history| {
                let hold = history
                    .iter()
                    .find(|tx| tx.kind == EscrowKind::Hold && tx.account_id == *account_id)?;
                let settled = history
                    .iter()
                    .any(|tx| matches!(tx.kind, EscrowKind::Release | EscrowKind::Refund));
                (!settled).then_some(hold.amount_cents)
            })
            .sum()
    }

    pub fn balance(&self, account_id: &Uuid) -> Option<WalletBalance> {
        let account = self.accounts.get(account_id)?;
        Some(WalletBalance {
            available_cents: account.available_cents,
            held_cents: self.held_for(account_id),
        })
    }

    /// Earmark funds from the payer for one booking.
    ///
    /// Atomic with the surrounding transaction: the available balance check,
    /// the debit and the hold record are a single mutation.
    pub fn hold(
        &mut self,
        from_account: Uuid,
        amount_cents: i64,
        booking_id: Uuid,
    ) -> Result<(), WalletError> {
        if amount_cents <= 0 {
            return Err(WalletError::InvalidAmount(amount_cents));
        }
        if self.settlement_status(&booking_id).is_some() {
            return Err(WalletError::HoldExists(booking_id));
        }
        let account = self
            .accounts
            .get_mut(&from_account)
            .ok_or(WalletError::AccountNotFound(from_account))?;
        if account.available_cents < amount_cents {
            return Err(WalletError::InsufficientFunds {
                requested: amount_cents,
                available: account.available_cents,
            });
        }
        account.available_cents -= amount_cents;
        account.updated_at = chrono::Utc::now();
        self.transactions
            .entry(booking_id)
            .or_default()
            .push(EscrowTransaction::new(
                booking_id,
                from_account,
                EscrowKind::Hold,
                amount_cents,
            ));
        Ok(())
    }

    /// Release the held amount to the carrier on successful completion.
    ///
    /// Guarded by the one-terminal-transaction-per-booking rule: a second
    /// settlement attempt observes `NoActiveHold` instead of double-crediting.
    pub fn release(&mut self, booking_id: Uuid, to_account: Uuid) -> Result<i64, WalletError> {
        let amount = self.active_hold_amount(&booking_id)?;
        self.open_account(to_account);
        let account = self
            .accounts
            .get_mut(&to_account)
            .ok_or(WalletError::AccountNotFound(to_account))?;
        account.available_cents += amount;
        account.updated_at = chrono::Utc::now();
        self.transactions
            .entry(booking_id)
            .or_default()
            .push(EscrowTransaction::new(
                booking_id,
                to_account,
                EscrowKind::Release,
                amount,
            ));
        Ok(amount)
    }

    /// Return the held amount to the original payer on cancellation.
    pub fn refund(&mut self, booking_id: Uuid) -> Result<(Uuid, i64), WalletError> {
        let amount = self.active_hold_amount(&booking_id)?;
        let payer = self
            .transactions
            .get(&booking_id)
            .and_then(|h| h.iter().find(|tx| tx.kind == EscrowKind::Hold))
            .map(|tx| tx.account_id)
            .ok_or(WalletError::NoActiveHold(booking_id))?;
        let account = self
            .accounts
            .get_mut(&payer)
            .ok_or(WalletError::AccountNotFound(payer))?;
        account.available_cents += amount;
        account.updated_at = chrono::Utc::now();
        self.transactions
            .entry(booking_id)
            .or_default()
            .push(EscrowTransaction::new(
                booking_id,
                payer,
                EscrowKind::Refund,
                amount,
            ));
        Ok((payer, amount))
    }

    /// Amount of the booking's hold, failing unless the hold is still active.
    fn active_hold_amount(&self, booking_id: &Uuid) -> Result<i64, WalletError> {
        match self.settlement_status(booking_id) {
            Some(EscrowStatus::Held) => Ok(self
                .transactions
                .get(booking_id)
                .and_then(|h| h.iter().find(|tx| tx.kind == EscrowKind::Hold))
                .map(|tx| tx.amount_cents)
                .unwrap_or(0)),
            _ => Err(WalletError::NoActiveHold(*booking_id)),
        }
    }
}
