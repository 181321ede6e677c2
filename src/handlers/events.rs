use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::auth::RequireAdmin;
use crate::models::event::{Event, EventWithCategory};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

const EVENT_WITH_CATEGORY_COLUMNS: &str = r#"
    events.id,
    events.title,
    events.description,
    events.image_url,
    events.event_date,
    events.end_date,
    events.location,
    events.category_id,
    categories.name AS category_name,
    events.organizer,
    events.is_featured,
    events.admin_id
"#;

const EVENT_COLUMNS: &str = "id, title, description, image_url, event_date, end_date, \
     location, category_id, organizer, is_featured, admin_id";

#[derive(Debug, Deserialize)]
pub struct EventFilter {
    pub category_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub category_id: i32,
    pub organizer: Option<String>,
    #[serde(default)]
    pub is_featured: bool,
}

impl EventRequest {
    fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() || self.location.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Missing title, date or location".to_string(),
            ));
        }
        Ok(())
    }
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Response, AppError> {
    let events: Vec<EventWithCategory> = match filter.category_id {
        Some(category_id) => {
            sqlx::query_as(&format!(
                "SELECT {EVENT_WITH_CATEGORY_COLUMNS} FROM events \
                 JOIN categories ON events.category_id = categories.id \
                 WHERE events.category_id = $1 \
                 ORDER BY events.event_date DESC"
            ))
            .bind(category_id)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {EVENT_WITH_CATEGORY_COLUMNS} FROM events \
                 JOIN categories ON events.category_id = categories.id \
                 ORDER BY events.event_date DESC"
            ))
            .fetch_all(&state.pool)
            .await?
        }
    };

    Ok(success(events, "Events retrieved").into_response())
}

pub async fn featured_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events: Vec<EventWithCategory> = sqlx::query_as(&format!(
        "SELECT {EVENT_WITH_CATEGORY_COLUMNS} FROM events \
         JOIN categories ON events.category_id = categories.id \
         WHERE events.is_featured = TRUE \
         ORDER BY events.event_date DESC \
         LIMIT 6"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Featured events retrieved").into_response())
}

pub async fn upcoming_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events: Vec<EventWithCategory> = sqlx::query_as(&format!(
        "SELECT {EVENT_WITH_CATEGORY_COLUMNS} FROM events \
         JOIN categories ON events.category_id = categories.id \
         WHERE events.event_date > NOW() \
         ORDER BY events.event_date ASC \
         LIMIT 6"
    ))
    .fetch_all(&state.pool)
    .await?;

    Ok(success(events, "Upcoming events retrieved").into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let event: EventWithCategory = sqlx::query_as(&format!(
        "SELECT {EVENT_WITH_CATEGORY_COLUMNS} FROM events \
         JOIN categories ON events.category_id = categories.id \
         WHERE events.id = $1"
    ))
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    Ok(success(event, "Event retrieved").into_response())
}

pub async fn create_event(
    State(state): State<AppState>,
    admin: RequireAdmin,
    Json(body): Json<EventRequest>,
) -> Result<Response, AppError> {
    body.validate()?;

    let event: Event = sqlx::query_as(&format!(
        "INSERT INTO events \
         (title, description, image_url, event_date, end_date, location, category_id, organizer, is_featured, admin_id) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.image_url)
    .bind(body.event_date)
    .bind(body.end_date)
    .bind(&body.location)
    .bind(body.category_id)
    .bind(&body.organizer)
    .bind(body.is_featured)
    .bind(admin.0.user_id)
    .fetch_one(&state.pool)
    .await?;

    tracing::info!(event_id = event.id, "Event created");

    Ok(created(event, "Event created").into_response())
}

pub async fn update_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
    Json(body): Json<EventRequest>,
) -> Result<Response, AppError> {
    body.validate()?;

    let event: Event = sqlx::query_as(&format!(
        "UPDATE events \
         SET title = $1, description = $2, image_url = $3, event_date = $4, end_date = $5, \
             location = $6, category_id = $7, organizer = $8, is_featured = $9 \
         WHERE id = $10 \
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.image_url)
    .bind(body.event_date)
    .bind(body.end_date)
    .bind(&body.location)
    .bind(body.category_id)
    .bind(&body.organizer)
    .bind(body.is_featured)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

    tracing::info!(event_id = event.id, "Event updated");

    Ok(success(event, "Event updated").into_response())
}

pub async fn delete_event(
    State(state): State<AppState>,
    _admin: RequireAdmin,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    // Tickets reference the event, remove them together with it.
    let mut tx = state.pool.begin().await?;

    sqlx::query("DELETE FROM tickets WHERE event_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let deleted = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if deleted.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::NotFound("Event not found".to_string()));
    }

    tx.commit().await?;

    Ok(empty_success("Event deleted").into_response())
}
