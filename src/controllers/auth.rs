use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::errors::{is_unique_violation, ApiError};
use crate::middleware::issue_token;
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

#[derive(Debug, Serialize)]
struct UserPayload {
    id: i64,
    username: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    user: UserPayload,
    access: String,
}

impl AuthResponse {
    fn for_user(user: &User, access: String) -> Self {
        AuthResponse {
            user: UserPayload {
                id: user.id,
                username: user.username.clone(),
                email: user.email.clone(),
            },
            access,
        }
    }
}

/* ---------- SIGNUP ---------- */

// POST /api/signup
#[derive(Debug, Deserialize, Validate)]
struct SignupRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3-32 characters"))]
    username: String,
    #[validate(email(message = "Email must be a valid address"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
}

async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let password_hash =
        User::hash_password(&req.password).map_err(|e| ApiError::Internal(e.into()))?;

    let user = User::create(&state.db.pool, &req.username, &req.email, &password_hash)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Validation("Username or email is already taken".to_string())
            } else {
                e.into()
            }
        })?;

    let access =
        issue_token(user.id, &user.username, &state.config.jwt).map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!("new user {} registered", user.username);
    Ok((StatusCode::CREATED, Json(AuthResponse::for_user(&user, access))))
}

/* ---------- LOGIN ---------- */

// POST /api/login
#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::find_by_username(&state.db.pool, &req.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.verify_password(&req.password) {
        return Err(ApiError::Unauthorized);
    }

    let access =
        issue_token(user.id, &user.username, &state.config.jwt).map_err(|e| ApiError::Internal(e.into()))?;

    Ok((StatusCode::OK, Json(AuthResponse::for_user(&user, access))))
}
