use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::models::order::PurchaseRecord;
use crate::services::purchase::purchase;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub ticket_id: i32,
    pub quantity: i32,
}

#[derive(Serialize)]
struct PurchasePayload {
    order_id: i32,
}

/// `POST /api/orders` — buy tickets as the authenticated user.
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<PurchaseRequest>,
) -> Result<Response, AppError> {
    let order_id = purchase(&state.pool, user.user_id, body.ticket_id, body.quantity).await?;

    Ok(created(PurchasePayload { order_id }, "Ticket purchase completed").into_response())
}

/// `GET /api/orders/mine` — the authenticated user's purchase history, most
/// recent first.
pub async fn my_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let records: Vec<PurchaseRecord> = sqlx::query_as(
        r#"
        SELECT
            o.id AS order_id,
            o.order_date,
            e.title AS event_title,
            e.event_date,
            e.location,
            e.image_url,
            t.type AS ticket_type,
            t.price,
            oi.quantity_ordered AS quantity
        FROM orders o
        JOIN order_items oi ON o.id = oi.order_id
        JOIN tickets t ON oi.ticket_id = t.id
        JOIN events e ON t.event_id = e.id
        WHERE o.user_id = $1
        ORDER BY o.order_date DESC
        "#,
    )
    .bind(user.user_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(success(records, "Order history retrieved").into_response())
}
