use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use super::dto::{CreditOwner, CreditsResponse, TransactionsResponse};
use crate::{auth::extractors::AuthUser, error::AppError, state::AppState};

pub fn credit_routes() -> Router<AppState> {
    Router::new()
        .route("/credits", get(get_credits))
        .route("/transactions", get(list_transactions))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_credits(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<CreditsResponse>, AppError> {
    let user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(CreditsResponse {
        success: true,
        credit_balance: user.credit_balance,
        user: CreditOwner {
            id: user.id,
            name: user.name,
            email: user.email,
        },
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn list_transactions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<TransactionsResponse>, AppError> {
    let rows = state.store.list_transactions(auth.id).await?;
    Ok(Json(TransactionsResponse {
        success: true,
        transactions: rows.into_iter().map(Into::into).collect(),
    }))
}
