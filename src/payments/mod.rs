use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod plans;
pub mod provider;
pub mod razorpay;
pub mod services;

pub use provider::{DemoGateway, PaymentProvider};
pub use razorpay::RazorpayGateway;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::payment_routes())
        .merge(handlers::callback_routes())
}
