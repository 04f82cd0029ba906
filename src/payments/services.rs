use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    plans::find_plan,
    provider::{Checkout, Order},
};
use crate::{accounts::NewTransaction, credits::CreditLedger, error::AppError, state::AppState};

lazy_static! {
    static ref ORDER_ID_RE: Regex = Regex::new(r"^order_[A-Za-z0-9]+$").unwrap();
}

#[derive(Debug)]
pub enum Purchase {
    /// Pending until the gateway reports the order paid.
    Pending { tx_id: Uuid, order: Order },
    /// Settled at checkout (demo gateway).
    Settled { tx_id: Uuid, credits: i64, credit_balance: i64 },
}

#[derive(Debug)]
pub struct Settlement {
    pub tx_id: Uuid,
    pub user_id: Uuid,
    pub credits: i64,
    pub credit_balance: i64,
}

#[instrument(skip(st))]
pub async fn start_purchase(st: &AppState, user_id: Uuid, plan_id: &str) -> Result<Purchase, AppError> {
    let plan_id = plan_id.trim();
    if plan_id.is_empty() {
        return Err(AppError::Validation("Missing Details".into()));
    }
    let plan = find_plan(plan_id)?;

    if st.store.find_user(user_id).await?.is_none() {
        return Err(AppError::NotFound("User not found"));
    }
    st.payments.ready()?;

    let tx = st
        .store
        .create_transaction(NewTransaction {
            user_id,
            plan: plan.id.to_string(),
            credits: plan.credits,
            amount: plan.price,
        })
        .await?;
    info!(tx_id = %tx.id, plan = plan.id, credits = plan.credits, "transaction created");

    match st.payments.checkout(&tx).await? {
        Checkout::Order(order) => {
            st.store.attach_order(tx.id, &order.id).await?;
            Ok(Purchase::Pending { tx_id: tx.id, order })
        }
        Checkout::Settled { payment_id } => {
            let credit_balance = CreditLedger::from_ref(st)
                .settle(&tx, Some(&payment_id))
                .await?;
            Ok(Purchase::Settled {
                tx_id: tx.id,
                credits: tx.credits,
                credit_balance,
            })
        }
    }
}

/// Trusted-callback path: no caller identity, so the order reference is
/// checked against the stored pending transaction instead.
#[instrument(skip(st))]
pub async fn verify_order(st: &AppState, order_id: &str) -> Result<Settlement, AppError> {
    let order_id = order_id.trim();
    if order_id.is_empty() {
        return Err(AppError::Validation("Order reference is required".into()));
    }
    if !ORDER_ID_RE.is_match(order_id) {
        warn!(order_id, "malformed order reference");
        return Err(AppError::Validation("Invalid order reference".into()));
    }

    let order = st.payments.fetch_order(order_id).await?;
    if !order.is_paid() {
        info!(order_id, status = %order.status, "order not paid");
        return Err(AppError::PaymentIncomplete);
    }

    let tx = st
        .store
        .find_transaction_by_order(order_id)
        .await?
        .ok_or(AppError::NotFound("Transaction not found"))?;

    let expected_receipt = tx.id.to_string();
    if order.receipt.as_deref() != Some(expected_receipt.as_str()) {
        warn!(order_id, tx_id = %tx.id, receipt = ?order.receipt, "order receipt mismatch");
        return Err(AppError::Validation(
            "Order does not match any pending transaction".into(),
        ));
    }

    let credit_balance = CreditLedger::from_ref(st).settle(&tx, None).await?;
    Ok(Settlement {
        tx_id: tx.id,
        user_id: tx.user_id,
        credits: tx.credits,
        credit_balance,
    })
}
