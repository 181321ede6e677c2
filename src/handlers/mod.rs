use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod auth;
pub mod categories;
pub mod events;
pub mod orders;
pub mod tickets;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    let payload = HealthPayload {
        status: "ok",
        service: "ticketbox-api",
    };

    Ok(success(payload, "Health check successful").into_response())
}

pub async fn root() -> &'static str {
    "Welcome to the Ticketbox backend API!"
}
