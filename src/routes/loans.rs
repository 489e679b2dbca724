/// Loan records: list, create, delete.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};

const COLUMNS: &str = "id, amount, release_date, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Loan {
    pub id: Uuid,
    pub amount: f64,
    pub release_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateLoanRequest {
    pub amount: f64,
    pub release_date: Option<NaiveDate>,
}

/// GET /api/loans
pub async fn list_loans(pool: web::Data<PgPool>) -> Result<HttpResponse, AppError> {
    let loans = sqlx::query_as::<_, Loan>(&format!(
        "SELECT {} FROM loans ORDER BY created_at",
        COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(loans))
}

/// POST /api/loans
pub async fn create_loan(
    form: web::Json<CreateLoanRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let loan = sqlx::query_as::<_, Loan>(&format!(
        "INSERT INTO loans (id, amount, release_date, created_at, updated_at) \
         VALUES ($1, $2, $3, now(), now()) RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(form.amount)
    .bind(form.release_date)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(loan))
}

/// DELETE /api/loans/{id}
pub async fn delete_loan(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let loan = sqlx::query_as::<_, Loan>(&format!(
        "DELETE FROM loans WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Loan not found".to_string()))?;

    Ok(HttpResponse::Ok().json(loan))
}
