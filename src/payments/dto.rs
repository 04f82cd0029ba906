use serde::{Deserialize, Serialize};

use super::{plans::Plan, provider::Order};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(default)]
    pub plan_id: String,
}

/// Body the gateway redirect (or webhook relay) posts back.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub razorpay_order_id: String,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PurchaseResponse {
    Order {
        success: bool,
        order: Order,
    },
    #[serde(rename_all = "camelCase")]
    Demo {
        success: bool,
        message: String,
        demo_mode: bool,
        credits_added: i64,
        credit_balance: i64,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub success: bool,
    pub message: &'static str,
    pub credit_balance: i64,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: &'static [Plan],
}
