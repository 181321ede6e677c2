use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub category_id: i32,
    pub organizer: Option<String>,
    pub is_featured: bool,
    pub admin_id: i32,
}

/// Event joined with its category name, as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventWithCategory {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub event_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    pub category_id: i32,
    pub category_name: String,
    pub organizer: Option<String>,
    pub is_featured: bool,
    pub admin_id: i32,
}
