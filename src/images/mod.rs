use crate::state::AppState;
use axum::Router;

pub mod client;
pub mod dto;
pub mod handlers;
pub mod services;

pub use client::{ClipDropClient, ImageGenerator};

pub fn router() -> Router<AppState> {
    handlers::image_routes()
}
