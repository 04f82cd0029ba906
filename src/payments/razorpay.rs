use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode, Url};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::provider::{Checkout, Order, PaymentProvider};
use crate::{
    accounts::Transaction,
    config::RazorpayConfig,
    error::{AppError, UpstreamError},
};

const SERVICE: &str = "payment gateway";
const NOT_CONFIGURED: &str = "Payment service not configured. Please contact administrator.";

/// Which Orders API call a response belongs to. Only a lookup can miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderCall {
    Create,
    Fetch,
}

#[derive(Debug, Serialize)]
struct CreateOrder<'a> {
    amount: i64,
    currency: &'a str,
    receipt: String,
    notes: OrderNotes<'a>,
}

#[derive(Debug, Serialize)]
struct OrderNotes<'a> {
    plan: &'a str,
    user_id: String,
}

/// Razorpay Orders API.
#[derive(Clone)]
pub struct RazorpayGateway {
    http: reqwest::Client,
    api_base: String,
    currency: String,
    credentials: Option<(String, String)>,
}

impl RazorpayGateway {
    pub fn new(http: reqwest::Client, cfg: &RazorpayConfig) -> Self {
        Self {
            http,
            api_base: cfg.api_base.trim_end_matches('/').to_string(),
            currency: cfg.currency.clone(),
            credentials: cfg
                .credentials()
                .map(|(id, secret)| (id.to_string(), secret.to_string())),
        }
    }

    fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder, AppError> {
        let (id, secret) = self
            .credentials
            .as_ref()
            .ok_or(AppError::ServiceMisconfigured(NOT_CONFIGURED))?;
        Ok(req.basic_auth(id, Some(secret)))
    }

    /// `{api_base}/orders[/{id}]`. The id is pushed as one percent-encoded
    /// path segment, so `/`, `..` and `?` in it cannot leave the orders path.
    fn orders_url(&self, order_id: Option<&str>) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.api_base).map_err(|e| {
            error!(error = %e, api_base = %self.api_base, "invalid razorpay api base");
            AppError::ServiceMisconfigured(NOT_CONFIGURED)
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                error!(api_base = %self.api_base, "razorpay api base cannot carry a path");
                AppError::ServiceMisconfigured(NOT_CONFIGURED)
            })?;
            segments.pop_if_empty().push("orders");
            if let Some(id) = order_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn send(&self, req: RequestBuilder, call: OrderCall) -> Result<Order, AppError> {
        let resp = self.authed(req)?.send().await.map_err(|e| {
            warn!(error = %e, "razorpay request failed");
            if e.is_connect() {
                UpstreamError::Unreachable(SERVICE)
            } else {
                UpstreamError::Failed("Payment gateway request failed".into())
            }
        })?;

        match resp.status() {
            s if s.is_success() => resp.json::<Order>().await.map_err(|e| {
                warn!(error = %e, "razorpay returned unreadable order");
                AppError::from(UpstreamError::Failed(
                    "Payment gateway returned an invalid order".into(),
                ))
            }),
            StatusCode::UNAUTHORIZED => {
                error!("razorpay rejected credentials");
                Err(AppError::ServiceMisconfigured(NOT_CONFIGURED))
            }
            StatusCode::TOO_MANY_REQUESTS => Err(UpstreamError::RateLimited.into()),
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND if call == OrderCall::Fetch => {
                Err(AppError::NotFound("Order not found"))
            }
            s => {
                warn!(status = %s, ?call, "razorpay error status");
                Err(UpstreamError::Failed("Payment gateway request failed".into()).into())
            }
        }
    }
}

#[async_trait]
impl PaymentProvider for RazorpayGateway {
    fn ready(&self) -> Result<(), AppError> {
        if self.credentials.is_none() {
            error!("razorpay credentials missing");
            return Err(AppError::ServiceMisconfigured(NOT_CONFIGURED));
        }
        Ok(())
    }

    #[instrument(skip(self, tx), fields(tx_id = %tx.id))]
    async fn checkout(&self, tx: &Transaction) -> Result<Checkout, AppError> {
        let body = CreateOrder {
            amount: tx.amount * 100,
            currency: &self.currency,
            receipt: tx.id.to_string(),
            notes: OrderNotes {
                plan: &tx.plan,
                user_id: tx.user_id.to_string(),
            },
        };
        let req = self.http.post(self.orders_url(None)?).json(&body);
        let order = self.send(req, OrderCall::Create).await?;
        info!(order_id = %order.id, amount = order.amount, "razorpay order created");
        Ok(Checkout::Order(order))
    }

    #[instrument(skip(self))]
    async fn fetch_order(&self, order_id: &str) -> Result<Order, AppError> {
        let req = self.http.get(self.orders_url(Some(order_id))?);
        self.send(req, OrderCall::Fetch).await
    }
}
