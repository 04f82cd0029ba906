use axum::{extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::{
    dto::{GenerateImageRequest, GenerateImageResponse},
    services::generate_for_user,
};
use crate::{
    auth::AuthUser,
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn image_routes() -> Router<AppState> {
    Router::new().route("/generate-image", post(generate_image))
}

#[instrument(skip(state, auth, body), fields(user_id = %auth.id))]
pub async fn generate_image(
    State(state): State<AppState>,
    auth: AuthUser,
    ApiJson(body): ApiJson<GenerateImageRequest>,
) -> Result<Json<GenerateImageResponse>, AppError> {
    let generated = generate_for_user(&state, auth.id, &body.prompt).await?;
    Ok(Json(GenerateImageResponse {
        success: true,
        credit_balance: generated.credit_balance,
        result_image: generated.data_url,
    }))
}
