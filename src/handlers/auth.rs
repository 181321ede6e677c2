use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::ROLE_CUSTOMER;
use crate::models::user::{PublicUser, User};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
struct LoginPayload {
    token: String,
    user: PublicUser,
}

const USER_COLUMNS: &str = "id, email, password, role, created_at";

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::ValidationError(
            "Email and password are required".to_string(),
        ));
    }

    let existing: Option<User> =
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(&body.email)
            .fetch_optional(&state.pool)
            .await?;

    if existing.is_some() {
        return Err(AppError::ValidationError(
            "This email is already registered".to_string(),
        ));
    }

    let hashed = bcrypt::hash(&body.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))?;

    let user: User = sqlx::query_as(&format!(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
    ))
    .bind(&body.email)
    .bind(&hashed)
    .bind(ROLE_CUSTOMER)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(user_id = user.id, "New user registered");

    Ok(created(PublicUser::from(&user), "Registration successful").into_response())
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let user: User = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
        .bind(&body.email)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Email does not exist".to_string()))?;

    let valid = bcrypt::verify(&body.password, &user.password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))?;

    if !valid {
        return Err(AppError::AuthError("Incorrect password".to_string()));
    }

    let token = state.jwt.issue(user.id, &user.role)?;

    let payload = LoginPayload {
        token,
        user: PublicUser::from(&user),
    };

    Ok(success(payload, "Login successful").into_response())
}
