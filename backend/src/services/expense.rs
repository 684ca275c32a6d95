//! Expense service: business expense bookkeeping

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::Expense;

use crate::error::{AppError, AppResult};

/// Expense service
#[derive(Clone)]
pub struct ExpenseService {
    db: PgPool,
}

/// Input for recording an expense
#[derive(Debug, Deserialize)]
pub struct CreateExpenseInput {
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
}

/// Input for updating an expense; absent fields are left unchanged
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExpenseInput {
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
}

/// Filter options for listing expenses
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseFilter {
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ExpenseService {
    /// Create a new ExpenseService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record an expense
    pub async fn create_expense(
        &self,
        user_id: Uuid,
        input: CreateExpenseInput,
    ) -> AppResult<Expense> {
        Self::validate_fields(&input.category, input.amount)?;

        let expense = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (category, description, amount, expense_date, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, category, description, amount, expense_date, user_id, created_at
            "#,
        )
        .bind(input.category.trim())
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.expense_date)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(expense)
    }

    /// Get an expense by id
    pub async fn get_expense(&self, id: Uuid) -> AppResult<Expense> {
        sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount, expense_date, user_id, created_at
            FROM expenses
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    /// List expenses matching a filter, newest expense date first
    pub async fn list_expenses(&self, filter: ExpenseFilter) -> AppResult<Vec<Expense>> {
        let pagination = shared::Pagination::clamped(filter.limit, filter.offset);

        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount, expense_date, user_id, created_at
            FROM expenses
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::date IS NULL OR expense_date >= $2)
              AND ($3::date IS NULL OR expense_date <= $3)
            ORDER BY expense_date DESC, created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&filter.category)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(expenses)
    }

    /// Update an expense
    pub async fn update_expense(&self, id: Uuid, input: UpdateExpenseInput) -> AppResult<Expense> {
        if let Some(category) = &input.category {
            if category.trim().is_empty() {
                return Err(AppError::Validation {
                    field: "category".to_string(),
                    message: "Expense category must not be empty".to_string(),
                });
            }
        }
        if let Some(amount) = input.amount {
            if amount <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "amount".to_string(),
                    message: "Expense amount must be greater than zero".to_string(),
                });
            }
        }

        sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
            SET category = COALESCE($1, category),
                description = COALESCE($2, description),
                amount = COALESCE($3, amount),
                expense_date = COALESCE($4, expense_date)
            WHERE id = $5
            RETURNING id, category, description, amount, expense_date, user_id, created_at
            "#,
        )
        .bind(input.category.as_deref().map(str::trim))
        .bind(&input.description)
        .bind(input.amount)
        .bind(input.expense_date)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense".to_string()))
    }

    /// Delete an expense
    pub async fn delete_expense(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense".to_string()));
        }

        Ok(())
    }

    fn validate_fields(category: &str, amount: Decimal) -> AppResult<()> {
        if category.trim().is_empty() {
            return Err(AppError::Validation {
                field: "category".to_string(),
                message: "Expense category must not be empty".to_string(),
            });
        }
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation {
                field: "amount".to_string(),
                message: "Expense amount must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
