use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::models::ticket::Ticket;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

const TICKET_COLUMNS: &str = "id, event_id, type, price, quantity_available";

#[derive(Debug, Deserialize)]
pub struct TicketRequest {
    pub event_id: i32,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity_available: i32,
}

pub async fn list_event_tickets(
    State(state): State<AppState>,
    Path(event_id): Path<i32>,
) -> Result<Response, AppError> {
    let tickets: Vec<Ticket> = sqlx::query_as(&format!(
        "SELECT {TICKET_COLUMNS} FROM tickets WHERE event_id = $1 ORDER BY price ASC"
    ))
    .bind(event_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(success(tickets, "Tickets retrieved").into_response())
}

pub async fn create_ticket(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Json(body): Json<TicketRequest>,
) -> Result<Response, AppError> {
    if body.ticket_type.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Ticket type is required".to_string(),
        ));
    }
    if body.quantity_available < 0 {
        return Err(AppError::ValidationError(
            "Quantity available cannot be negative".to_string(),
        ));
    }

    let ticket: Ticket = sqlx::query_as(&format!(
        "INSERT INTO tickets (event_id, type, price, quantity_available) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {TICKET_COLUMNS}"
    ))
    .bind(body.event_id)
    .bind(&body.ticket_type)
    .bind(body.price)
    .bind(body.quantity_available)
    .fetch_one(&state.pool)
    .await?;

    Ok(created(ticket, "Ticket created").into_response())
}
