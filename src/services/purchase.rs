//! Ticket purchase transaction engine.
//!
//! All state transitions of a purchase (stock decrement, order row, line item)
//! happen inside one database transaction. Concurrent buyers of the same
//! ticket type are serialized by a `SELECT ... FOR UPDATE` row lock on the
//! ticket, which is what prevents overselling: whoever acquires the lock first
//! evaluates stock against its own snapshot, and later waiters only proceed
//! after that transaction commits.
//!
//! The per-user quota is re-derived from order history on every attempt and
//! checked before the stock lock is taken, so a user already at the cap is
//! rejected without contending for the lock. Two simultaneous requests from
//! the same user can both pass the quota check before either commits; the
//! stock lock still rules out oversell, and the cap overshoot is bounded by
//! the requested quantity. See DESIGN.md.

use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use thiserror::Error;

/// Lifetime cap on tickets of one type a single user may buy.
pub const MAX_TICKETS_PER_USER: i64 = 2;

#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    #[error("user already bought {purchased} of {cap} allowed tickets")]
    QuotaExceeded { purchased: i64, cap: i64 },

    #[error("ticket does not exist")]
    TicketNotFound,

    #[error("only {available} ticket(s) left in stock")]
    InsufficientStock { available: i32 },

    #[error("database temporarily unavailable")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error during purchase")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for PurchaseError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            // Pool exhaustion is a retryable condition for the caller, keep it
            // distinct from ordinary database failures.
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => PurchaseError::Unavailable(e),
            other => PurchaseError::Database(other),
        }
    }
}

/// Ticket fields read under the row lock. The price recorded on the order
/// item must come from this snapshot, never from a re-fetch.
#[derive(FromRow)]
struct LockedTicket {
    price: Decimal,
    quantity_available: i32,
}

/// Buy `quantity` tickets of one type for a user. Returns the new order id.
///
/// Runs as a single transaction; every failure path rolls back before the
/// error is surfaced, so partial effects (decremented stock without an order,
/// an order without its item) never persist.
pub async fn purchase(
    pool: &PgPool,
    user_id: i32,
    ticket_id: i32,
    quantity: i32,
) -> Result<i32, PurchaseError> {
    if quantity <= 0 {
        return Err(PurchaseError::InvalidQuantity);
    }

    let mut tx = pool.begin().await?;

    match run_purchase(&mut tx, user_id, ticket_id, quantity).await {
        Ok(order_id) => {
            tx.commit().await?;
            tracing::info!(user_id, ticket_id, quantity, order_id, "Purchase committed");
            Ok(order_id)
        }
        Err(err) => {
            // Rollback explicitly so no dangling transaction survives this
            // call; Drop on the transaction is only a backstop.
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(error = ?rollback_err, "Rollback failed after purchase error");
            }
            Err(err)
        }
    }
}

async fn run_purchase(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i32,
    ticket_id: i32,
    quantity: i32,
) -> Result<i32, PurchaseError> {
    // Lifetime quota: everything this user ever bought of this ticket type.
    let purchased: i64 = sqlx::query_scalar(
        r#"
        SELECT COALESCE(SUM(oi.quantity_ordered), 0)
        FROM order_items oi
        JOIN orders o ON oi.order_id = o.id
        WHERE o.user_id = $1 AND oi.ticket_id = $2
        "#,
    )
    .bind(user_id)
    .bind(ticket_id)
    .fetch_one(&mut **tx)
    .await?;

    if purchased + i64::from(quantity) > MAX_TICKETS_PER_USER {
        return Err(PurchaseError::QuotaExceeded {
            purchased,
            cap: MAX_TICKETS_PER_USER,
        });
    }

    // Exclusive row lock: serializes concurrent purchases of this ticket type
    // until commit/rollback.
    let ticket: LockedTicket = sqlx::query_as(
        r#"
        SELECT price, quantity_available
        FROM tickets
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(&mut **tx)
    .await?
    .ok_or(PurchaseError::TicketNotFound)?;

    if ticket.quantity_available < quantity {
        return Err(PurchaseError::InsufficientStock {
            available: ticket.quantity_available,
        });
    }

    sqlx::query("UPDATE tickets SET quantity_available = quantity_available - $1 WHERE id = $2")
        .bind(quantity)
        .bind(ticket_id)
        .execute(&mut **tx)
        .await?;

    let order_id: i32 =
        sqlx::query_scalar("INSERT INTO orders (user_id, status) VALUES ($1, 'completed') RETURNING id")
            .bind(user_id)
            .fetch_one(&mut **tx)
            .await?;

    // Price from the locked snapshot, not re-fetched.
    sqlx::query(
        r#"
        INSERT INTO order_items (order_id, ticket_id, quantity_ordered, price_at_purchase)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(order_id)
    .bind(ticket_id)
    .bind(quantity)
    .bind(ticket.price)
    .execute(&mut **tx)
    .await?;

    Ok(order_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/ticketbox_test")
            .expect("lazy pool")
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_any_io() {
        let pool = lazy_pool();
        let result = purchase(&pool, 1, 1, 0).await;
        assert!(matches!(result, Err(PurchaseError::InvalidQuantity)));
    }

    #[tokio::test]
    async fn test_negative_quantity_rejected_before_any_io() {
        let pool = lazy_pool();
        let result = purchase(&pool, 1, 1, -3).await;
        assert!(matches!(result, Err(PurchaseError::InvalidQuantity)));
    }

    #[test]
    fn test_pool_timeout_maps_to_unavailable() {
        let err: PurchaseError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, PurchaseError::Unavailable(_)));

        let err: PurchaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, PurchaseError::Database(_)));
    }

    #[test]
    fn test_quota_error_carries_counts() {
        let err = PurchaseError::QuotaExceeded {
            purchased: 2,
            cap: MAX_TICKETS_PER_USER,
        };
        assert_eq!(
            err.to_string(),
            "user already bought 2 of 2 allowed tickets"
        );
    }
}
