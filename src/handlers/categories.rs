use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::models::category::Category;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub name: String,
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CategoryRequest>,
) -> Result<Response, AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Category name is required".to_string(),
        ));
    }

    let category: Category =
        sqlx::query_as("INSERT INTO categories (name) VALUES ($1) RETURNING id, name")
            .bind(&body.name)
            .fetch_one(&state.pool)
            .await?;

    Ok(created(category, "Category created").into_response())
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories: Vec<Category> =
        sqlx::query_as("SELECT id, name FROM categories ORDER BY id ASC")
            .fetch_all(&state.pool)
            .await?;

    Ok(success(categories, "Categories retrieved").into_response())
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let category: Category = sqlx::query_as("SELECT id, name FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(success(category, "Category retrieved").into_response())
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CategoryRequest>,
) -> Result<Response, AppError> {
    let category: Category =
        sqlx::query_as("UPDATE categories SET name = $1 WHERE id = $2 RETURNING id, name")
            .bind(&body.name)
            .bind(id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(success(category, "Category updated").into_response())
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let deleted = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if deleted.rows_affected() == 0 {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    Ok(empty_success("Category deleted").into_response())
}
