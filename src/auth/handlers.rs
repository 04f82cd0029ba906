use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    accounts::NewUser,
    auth::{
        dto::{AuthResponse, LoginRequest, ProfileResponse, PublicUser, RegisterRequest},
        extractors::AuthUser,
        password::{hash_password, verify_password},
        services::{is_valid_email, is_valid_name, is_valid_password, JwtKeys},
    },
    error::{ApiJson, AppError},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let name = payload.name.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("All fields are required".into()));
    }
    if !is_valid_name(&name) {
        return Err(AppError::Validation(
            "Name must be between 2 and 50 characters long".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation(
            "Please enter a valid email address".into(),
        ));
    }
    if !is_valid_password(&payload.password) {
        return Err(AppError::Validation(
            "Password must be at least 6 characters long and contain at least one letter and one number"
                .into(),
        ));
    }

    // Ensure email is not taken; the unique index still backs this up.
    if state.store.find_user_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::Conflict(
            "User already exists with this email".into(),
        ));
    }

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        AppError::Internal(e)
    })?;

    let user = state
        .store
        .create_user(NewUser {
            name,
            email,
            password_hash,
        })
        .await?;

    let token = JwtKeys::from_ref(&state).issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully",
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = payload.email.trim().to_lowercase();

    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required".into(),
        ));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::Validation(
            "Please enter a valid email address".into(),
        ));
    }

    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(invalid());
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(invalid());
    }

    if !user.is_active {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(AppError::Unauthorized("Account is disabled".into()));
    }

    state.store.record_login(user.id).await?;
    let token = JwtKeys::from_ref(&state).issue(user.id, &user.email)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful",
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, auth), fields(user_id = %auth.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .store
        .find_user(auth.id)
        .await?
        .ok_or(AppError::NotFound("User not found"))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: PublicUser::from(user),
    }))
}
