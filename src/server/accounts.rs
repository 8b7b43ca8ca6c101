use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::{RequireUser, TokenGenerator, hash_password, verify_password};
use crate::server::AppState;
use crate::server::dto::{AuthResponse, LoginRequest, RegisterRequest, UserResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{validate_email, validate_password};
use crate::types::{Token, User};

fn issue_token(state: &AppState, user_id: &str) -> Result<String, ApiError> {
    let generator = TokenGenerator::new();
    let (raw_token, lookup, hash) = generator
        .generate()
        .map_err(|_| ApiError::internal("Failed to issue token"))?;

    let token = Token {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        user_id: user_id.to_string(),
        created_at: Utc::now(),
        expires_at: None,
        last_used_at: None,
    };
    state
        .store
        .create_token(&token)
        .api_err("Failed to store token")?;

    Ok(raw_token)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Name cannot be empty"));
    }

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        password_hash,
        name: req.name,
        is_creator: false,
        created_at: now,
        updated_at: now,
    };

    // The unique email constraint surfaces as Conflict.
    state.store.create_user(&user).map_err(ApiError::from)?;

    let raw_token = issue_token(&state, &user.id)?;

    Ok::<_, ApiError>((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthResponse {
            token: raw_token,
            user: user.into(),
        })),
    ))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    // Unknown email and wrong password are indistinguishable to the caller.
    let user = state
        .store
        .get_user_by_email(&req.email)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let valid = verify_password(&req.password, &user.password_hash)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    let raw_token = issue_token(&state, &user.id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(AuthResponse {
        token: raw_token,
        user: user.into(),
    })))
}

pub async fn me(auth: RequireUser) -> impl IntoResponse {
    Json(ApiResponse::success(UserResponse::from(auth.user)))
}

pub async fn become_creator(
    auth: RequireUser,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    if auth.user.is_creator {
        return Err(ApiError::bad_request("User is already a creator"));
    }

    state
        .store
        .set_user_creator(&auth.user.id)
        .api_err("Failed to update user")?;

    let user = User {
        is_creator: true,
        ..auth.user
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(UserResponse::from(user))))
}
