/// Labour types and the per-day labour work log.
///
/// Work entries are recorded in bulk (one row per labour type per day)
/// and deleted by day, so those two operations report row counts
/// instead of entities.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::filters::{SqlFilter, SqlUpdate};
use crate::validators::is_valid_name;

const TYPE_COLUMNS: &str = "id, name, amount, is_active, created_at, updated_at";
const WORK_COLUMNS: &str =
    "id, labour_type_id, worker_count, worked_on, is_active, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LabourType {
    pub id: Uuid,
    pub name: String,
    pub amount: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct LabourWork {
    pub id: Uuid,
    pub labour_type_id: Uuid,
    pub worker_count: f64,
    pub worked_on: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLabourTypeRequest {
    pub name: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct LabourWorkListFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLabourWorkRequest {
    pub labour_type_id: Uuid,
    pub worker_count: f64,
    pub worked_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLabourWorkRequest {
    pub worker_count: f64,
}

#[derive(Debug, Deserialize)]
pub struct LabourWorkDayQuery {
    pub date: NaiveDate,
}

/// GET /api/labour-types
pub async fn list_labour_types(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let labour_types = sqlx::query_as::<_, LabourType>(&format!(
        "SELECT {} FROM labour_types ORDER BY name",
        TYPE_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(labour_types))
}

/// POST /api/labour-types
pub async fn create_labour_type(
    form: web::Json<CreateLabourTypeRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let name = is_valid_name(&form.name)?;

    let labour_type = sqlx::query_as::<_, LabourType>(&format!(
        "INSERT INTO labour_types (id, name, amount, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, true, now(), now()) RETURNING {}",
        TYPE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&name)
    .bind(form.amount)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(labour_type))
}

/// DELETE /api/labour-types/{id}
pub async fn delete_labour_type(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let labour_type = sqlx::query_as::<_, LabourType>(&format!(
        "DELETE FROM labour_types WHERE id = $1 RETURNING {}",
        TYPE_COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Labour type not found".to_string()))?;

    Ok(HttpResponse::Ok().json(labour_type))
}

/// GET /api/labour-works
///
/// `start_date`/`end_date` bound the `worked_on` day inclusively;
/// either side may be omitted.
pub async fn list_labour_works(
    filter: web::Query<LabourWorkListFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut query = SqlFilter::new(format!("SELECT {} FROM labour_works", WORK_COLUMNS));
    query
        .gte("worked_on", filter.start_date)
        .lte("worked_on", filter.end_date)
        .push(" ORDER BY worked_on");

    let works = query
        .builder()
        .build_query_as::<LabourWork>()
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(works))
}

/// POST /api/labour-works
///
/// Bulk insert; responds with the number of rows created.
pub async fn create_labour_works(
    form: web::Json<Vec<CreateLabourWorkRequest>>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    if form.is_empty() {
        return Ok(HttpResponse::Created().json(json!({ "count": 0 })));
    }

    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO labour_works \
         (id, labour_type_id, worker_count, worked_on, is_active, created_at, updated_at) ",
    );
    builder.push_values(form.iter(), |mut row, work| {
        row.push_bind(Uuid::new_v4())
            .push_bind(work.labour_type_id)
            .push_bind(work.worker_count)
            .push_bind(work.worked_on)
            .push("true")
            .push("now()")
            .push("now()");
    });

    let count = builder
        .build()
        .execute(pool.get_ref())
        .await?
        .rows_affected();

    Ok(HttpResponse::Created().json(json!({ "count": count })))
}

/// PATCH /api/labour-works/{id}
pub async fn update_labour_work(
    path: web::Path<Uuid>,
    form: web::Json<UpdateLabourWorkRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut update = SqlUpdate::new("labour_works");
    update.set("worker_count", Some(form.worker_count));

    let work = update
        .where_id(path.into_inner(), WORK_COLUMNS)
        .build_query_as::<LabourWork>()
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Labour work not found".to_string()))?;

    Ok(HttpResponse::Ok().json(work))
}

/// DELETE /api/labour-works?date=YYYY-MM-DD
///
/// Removes every work entry recorded for the given day; responds with
/// the number of rows deleted.
pub async fn delete_labour_works(
    query: web::Query<LabourWorkDayQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let count = sqlx::query("DELETE FROM labour_works WHERE worked_on = $1")
        .bind(query.date)
        .execute(pool.get_ref())
        .await?
        .rows_affected();

    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}
