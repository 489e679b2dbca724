/// Expense CRUD. Mutations publish change events on the in-process bus
/// after the row is persisted and before the response is produced.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, DatabaseError};
use crate::events::{EventBus, EXPENSE_CREATED, EXPENSE_DELETED, EXPENSE_UPDATED};
use crate::filters::{SqlFilter, SqlUpdate};

const COLUMNS: &str = "id, sub_category_id, amount, quantity, extra, unit_type, comment, \
                       purchase_date, is_loan, is_active, is_deleted, created_at, updated_at";

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub sub_category_id: Uuid,
    pub amount: f64,
    pub quantity: f64,
    pub extra: f64,
    pub unit_type: Option<String>,
    pub comment: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub is_loan: bool,
    pub is_active: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ExpenseListFilter {
    pub is_loan: Option<bool>,
    pub sub_category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    pub amount: f64,
    pub sub_category_id: Uuid,
    pub is_loan: bool,
    pub quantity: f64,
    pub extra: f64,
    pub unit_type: Option<String>,
    pub comment: Option<String>,
    pub purchase_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    pub amount: Option<f64>,
    pub sub_category_id: Option<Uuid>,
    pub is_loan: Option<bool>,
    pub quantity: Option<f64>,
    pub extra: Option<f64>,
    pub unit_type: Option<String>,
    pub comment: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// GET /api/expenses
pub async fn list_expenses(
    filter: web::Query<ExpenseListFilter>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let mut query = SqlFilter::new(format!("SELECT {} FROM expenses", COLUMNS));
    query
        .eq("is_loan", filter.is_loan)
        .eq("sub_category_id", filter.sub_category_id)
        .push(" ORDER BY created_at");

    let expenses = query
        .builder()
        .build_query_as::<Expense>()
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(expenses))
}

/// GET /api/expenses/{id}
pub async fn get_expense(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let expense = sqlx::query_as::<_, Expense>(&format!(
        "SELECT {} FROM expenses WHERE id = $1",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Expense not found".to_string()))?;

    Ok(HttpResponse::Ok().json(expense))
}

/// POST /api/expenses
pub async fn create_expense(
    form: web::Json<CreateExpenseRequest>,
    pool: web::Data<PgPool>,
    events: web::Data<EventBus>,
) -> Result<HttpResponse, AppError> {
    let expense = sqlx::query_as::<_, Expense>(&format!(
        "INSERT INTO expenses (id, sub_category_id, amount, quantity, extra, unit_type, comment, \
         purchase_date, is_loan, is_active, is_deleted, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, true, false, now(), now()) RETURNING {}",
        COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(form.sub_category_id)
    .bind(form.amount)
    .bind(form.quantity)
    .bind(form.extra)
    .bind(&form.unit_type)
    .bind(&form.comment)
    .bind(form.purchase_date)
    .bind(form.is_loan)
    .fetch_one(pool.get_ref())
    .await?;

    events.publish(EXPENSE_CREATED, serde_json::to_value(&expense)?);

    Ok(HttpResponse::Created().json(expense))
}

/// PATCH /api/expenses/{id}
pub async fn update_expense(
    path: web::Path<Uuid>,
    form: web::Json<UpdateExpenseRequest>,
    pool: web::Data<PgPool>,
    events: web::Data<EventBus>,
) -> Result<HttpResponse, AppError> {
    let mut update = SqlUpdate::new("expenses");
    update
        .set("amount", form.amount)
        .set("sub_category_id", form.sub_category_id)
        .set("is_loan", form.is_loan)
        .set("quantity", form.quantity)
        .set("extra", form.extra)
        .set("unit_type", form.unit_type.clone())
        .set("comment", form.comment.clone())
        .set("purchase_date", form.purchase_date)
        .set("is_active", form.is_active);

    let expense = update
        .where_id(path.into_inner(), COLUMNS)
        .build_query_as::<Expense>()
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or_else(|| DatabaseError::NotFound("Expense not found".to_string()))?;

    events.publish(EXPENSE_UPDATED, serde_json::to_value(&expense)?);

    Ok(HttpResponse::Ok().json(expense))
}

/// DELETE /api/expenses/{id}
pub async fn delete_expense(
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    events: web::Data<EventBus>,
) -> Result<HttpResponse, AppError> {
    let expense = sqlx::query_as::<_, Expense>(&format!(
        "DELETE FROM expenses WHERE id = $1 RETURNING {}",
        COLUMNS
    ))
    .bind(path.into_inner())
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| DatabaseError::NotFound("Expense not found".to_string()))?;

    events.publish(EXPENSE_DELETED, serde_json::to_value(&expense)?);

    Ok(HttpResponse::Ok().json(expense))
}
