use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{PlansResponse, PurchaseRequest, PurchaseResponse, VerifyRequest, VerifyResponse},
    plans::PLANS,
    services::{start_purchase, verify_order, Purchase},
};
use crate::{
    auth::AuthUser,
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans))
        .route("/pay-razor", post(pay_razorpay))
}

/// Reached by the gateway redirect, so there is no bearer token here.
pub fn callback_routes() -> Router<AppState> {
    Router::new().route("/verify-razor", post(verify_razorpay))
}

pub async fn list_plans() -> Json<PlansResponse> {
    Json(PlansResponse {
        success: true,
        plans: &PLANS,
    })
}

#[instrument(skip(state, auth, body), fields(user_id = %auth.id))]
pub async fn pay_razorpay(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    let resp = match start_purchase(&state, auth.id, &body.plan_id).await? {
        Purchase::Pending { tx_id, order } => {
            info!(%tx_id, order_id = %order.id, "order handed to client");
            PurchaseResponse::Order {
                success: true,
                order,
            }
        }
        Purchase::Settled {
            tx_id,
            credits,
            credit_balance,
        } => {
            info!(%tx_id, credits, "demo purchase settled");
            PurchaseResponse::Demo {
                success: true,
                message: format!("{credits} credits added successfully!"),
                demo_mode: true,
                credits_added: credits,
                credit_balance,
            }
        }
    };
    Ok(Json(resp))
}

#[instrument(skip(state, body))]
pub async fn verify_razorpay(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<VerifyRequest>,
) -> Result<Json<VerifyResponse>, AppError> {
    let settled = verify_order(&state, &body.razorpay_order_id).await?;
    info!(tx_id = %settled.tx_id, user_id = %settled.user_id, credits = settled.credits, "payment verified");
    Ok(Json(VerifyResponse {
        success: true,
        message: "Credits Added Successfully",
        credit_balance: settled.credit_balance,
    }))
}
