use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod ledger;

pub use ledger::CreditLedger;

pub fn router() -> Router<AppState> {
    handlers::credit_routes()
}
