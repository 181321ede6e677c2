use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A purchasable ticket type for one event.
///
/// `quantity_available` is the only field mutated under contention; the
/// purchase engine decrements it while holding a row lock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: i32,
    pub event_id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub ticket_type: String,
    pub price: Decimal,
    pub quantity_available: i32,
}
