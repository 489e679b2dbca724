/// Measurement unit catalogue: list, create, delete.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::validators::is_valid_name;

const COLUMNS: &str = "id, name, is_active, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct UnitType {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateUnitTypeRequest {
    pub name: String,
}

/// GET /api/unit-types
pub async fn list_unit_types(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let unit_types = sqlx::query_as::<_, UnitType>(&format!(
        "SELECT {} FROM unit_types ORDER BY name",
        COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(unit_types))
}

/// POST /api/unit-types
pub async fn create_unit_type(
    form: web::Json<CreateUnitTypeRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;

    let unit_type = sqlx::query_as::<_, UnitType>(&format!(
        "INSERT INTO unit_types (id, name, is_active, created_at, updated_at) \
         VALUES ($1, $2, true, now(), now()) RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(unit_type))
}

/// DELETE /api/unit-types/{id}
pub async fn delete_unit_type(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let unit_type = sqlx::query_as::<_, UnitType>(&format!(
        "DELETE FROM unit_types WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Unit type not found".to_string()))?;

    Ok(HttpResponse::Ok().json(unit_type))
}
