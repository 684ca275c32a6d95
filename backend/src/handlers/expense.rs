//! HTTP handlers for expense bookkeeping endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::Expense;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::expense::{
    CreateExpenseInput, ExpenseFilter, ExpenseService, UpdateExpenseInput,
};
use crate::AppState;

/// Record an expense
pub async fn create_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateExpenseInput>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    require_manager(&current_user)?;
    let service = ExpenseService::new(state.db);
    let expense = service
        .create_expense(current_user.0.user_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// Get an expense
pub async fn get_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<Json<Expense>> {
    require_manager(&current_user)?;
    let service = ExpenseService::new(state.db);
    let expense = service.get_expense(expense_id).await?;
    Ok(Json(expense))
}

/// List expenses
pub async fn list_expenses(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<ExpenseFilter>,
) -> AppResult<Json<Vec<Expense>>> {
    require_manager(&current_user)?;
    let service = ExpenseService::new(state.db);
    let expenses = service.list_expenses(filter).await?;
    Ok(Json(expenses))
}

/// Update an expense
pub async fn update_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
    Json(input): Json<UpdateExpenseInput>,
) -> AppResult<Json<Expense>> {
    require_manager(&current_user)?;
    let service = ExpenseService::new(state.db);
    let expense = service.update_expense(expense_id, input).await?;
    Ok(Json(expense))
}

/// Delete an expense
pub async fn delete_expense(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(expense_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_manager(&current_user)?;
    let service = ExpenseService::new(state.db);
    service.delete_expense(expense_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_manager(current_user: &CurrentUser) -> AppResult<()> {
    if current_user.0.is_manager() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
