use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A completed purchase. Created exactly once per successful purchase
/// transaction and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub user_id: i32,
    pub status: String,
    pub order_date: DateTime<Utc>,
}

/// Line item within an order. `price_at_purchase` is a snapshot of the ticket
/// price at transaction time and never tracks later catalog changes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i32,
    pub order_id: i32,
    pub ticket_id: i32,
    pub quantity_ordered: i32,
    pub price_at_purchase: Decimal,
}

/// One row of a user's order history, joined across orders, order items,
/// tickets, and events.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseRecord {
    pub order_id: i32,
    pub order_date: DateTime<Utc>,
    pub event_title: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub image_url: Option<String>,
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity: i32,
}
