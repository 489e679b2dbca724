/// Expense category CRUD.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::filters::{SqlFilter, SqlUpdate};
use crate::validators::is_valid_name;

const COLUMNS: &str = "id, name, is_active, is_deleted, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryListFilter {
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

/// GET /api/categories
pub async fn list_categories(
    filter: web::Query<CategoryListFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut query = SqlFilter::new(format!("SELECT {} FROM categories", COLUMNS));
    query
        .eq("is_deleted", filter.is_deleted)
        .push(" ORDER BY created_at");

    let categories = query
        .builder()
        .build_query_as::<Category>()
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(categories))
}

/// POST /api/categories
pub async fn create_category(
    form: web::Json<CreateCategoryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, name, is_active, is_deleted, created_at, updated_at) \
         VALUES ($1, $2, true, false, now(), now()) RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(category))
}

/// PATCH /api/categories/{id}
pub async fn update_category(
    path: web::Path<Uuid>,
    form: web::Json<UpdateCategoryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = match &form.name {
        Some(name) => Some(is_valid_name(name)?),
        None => None,
    };

    let mut update = SqlUpdate::new("categories");
    update
        .set("name", name)
        .set("is_active", form.is_active)
        .set("is_deleted", form.is_deleted);

    let category = update
        .where_id(path.into_inner(), COLUMNS)
        .build_query_as::<Category>()
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(category))
}

/// DELETE /api/categories/{id}
pub async fn delete_category(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "DELETE FROM categories WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(category))
}
