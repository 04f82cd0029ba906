use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    accounts::{AccountStore, Transaction},
    error::AppError,
    state::AppState,
};

/// The only code path that mutates a user's credit balance.
///
/// A debit never produces a negative balance; a balance that is already
/// negative can be read but not debited further.
#[derive(Clone)]
pub struct CreditLedger {
    store: Arc<dyn AccountStore>,
}

impl FromRef<AppState> for CreditLedger {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }
}

impl CreditLedger {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub async fn balance(&self, user_id: Uuid) -> Result<i64, AppError> {
        self.store
            .find_user(user_id)
            .await?
            .map(|u| u.credit_balance)
            .ok_or(AppError::NotFound("User not found"))
    }

    #[instrument(skip(self))]
    pub async fn debit(&self, user_id: Uuid, amount: i64) -> Result<i64, AppError> {
        ensure_positive(amount)?;
        match self.store.try_debit(user_id, amount).await? {
            Some(balance) => {
                info!(%user_id, amount, balance, "credits debited");
                Ok(balance)
            }
            None => {
                let balance = self.balance(user_id).await?;
                warn!(%user_id, amount, balance, "debit refused");
                Err(AppError::InsufficientCredit { balance })
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn credit(&self, user_id: Uuid, amount: i64) -> Result<i64, AppError> {
        ensure_positive(amount)?;
        let balance = self
            .store
            .credit(user_id, amount)
            .await?
            .ok_or(AppError::NotFound("User not found"))?;
        info!(%user_id, amount, balance, "credits added");
        Ok(balance)
    }

    /// Applies a purchase to its owner's balance exactly once.
    #[instrument(skip(self, tx), fields(tx_id = %tx.id, user_id = %tx.user_id))]
    pub async fn settle(&self, tx: &Transaction, payment_id: Option<&str>) -> Result<i64, AppError> {
        if tx.settled {
            return Err(AppError::AlreadySettled);
        }
        match self.store.settle_transaction(tx.id, payment_id).await? {
            Some(balance) => {
                info!(credits = tx.credits, balance, "transaction settled");
                Ok(balance)
            }
            None => {
                warn!("transaction already settled");
                Err(AppError::AlreadySettled)
            }
        }
    }
}

fn ensure_positive(amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::Validation("Credit amount must be positive".into()));
    }
    Ok(())
}
