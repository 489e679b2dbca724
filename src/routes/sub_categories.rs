/// Sub-category CRUD. A sub-category belongs to a category.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::filters::{SqlFilter, SqlUpdate};
use crate::validators::is_valid_name;

const COLUMNS: &str = "id, name, category_id, is_active, is_deleted, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct SubCategory {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubCategoryListFilter {
    pub is_deleted: Option<bool>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSubCategoryRequest {
    pub name: String,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSubCategoryRequest {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_deleted: Option<bool>,
}

/// GET /api/sub-categories
pub async fn list_sub_categories(
    filter: web::Query<SubCategoryListFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut query = SqlFilter::new(format!("SELECT {} FROM sub_categories", COLUMNS));
    query
        .eq("is_deleted", filter.is_deleted)
        .eq("category_id", filter.category_id)
        .push(" ORDER BY created_at");

    let sub_categories = query
        .builder()
        .build_query_as::<SubCategory>()
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(sub_categories))
}

/// POST /api/sub-categories
pub async fn create_sub_category(
    form: web::Json<CreateSubCategoryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;

    let sub_category = sqlx::query_as::<_, SubCategory>(&format!(
        "INSERT INTO sub_categories (id, name, category_id, is_active, is_deleted, created_at, updated_at) \
         VALUES ($1, $2, $3, true, false, now(), now()) RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(form.category_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(sub_category))
}

/// PATCH /api/sub-categories/{id}
pub async fn update_sub_category(
    path: web::Path<Uuid>,
    form: web::Json<UpdateSubCategoryRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = match &form.name {
        Some(name) => Some(is_valid_name(name)?),
        None => None,
    };

    let mut update = SqlUpdate::new("sub_categories");
    update
        .set("name", name)
        .set("is_active", form.is_active)
        .set("is_deleted", form.is_deleted);

    let sub_category = update
        .where_id(path.into_inner(), COLUMNS)
        .build_query_as::<SubCategory>()
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Sub-category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(sub_category))
}

/// DELETE /api/sub-categories/{id}
pub async fn delete_sub_category(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let sub_category = sqlx::query_as::<_, SubCategory>(&format!(
        "DELETE FROM sub_categories WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Sub-category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(sub_category))
}
