//! Reporting service: sales and financial aggregates
//!
//! All sales figures count completed orders only, bucketed by completion
//! time. Reports are plain read models computed from orders, order items and
//! expenses; the daily and top-selling reports are cached and invalidated by
//! the order lifecycle on completion and on cancellation of a completed
//! order.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use shared::Expense;

use crate::cache::Cache;
use crate::error::{AppError, AppResult};

const DAILY_REPORT_TTL: Duration = Duration::from_secs(60 * 60);
const TOP_ITEMS_TTL: Duration = Duration::from_secs(30 * 60);
const DEFAULT_TOP_ITEMS_LIMIT: i64 = 10;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
    cache: Arc<dyn Cache>,
}

/// An inclusive date range
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// One row of the top-selling-items breakdown
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TopSellingItem {
    pub menu_item_name: String,
    pub total_quantity_sold: i64,
    pub total_revenue: Decimal,
}

/// One row of the sales-by-category breakdown
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategorySales {
    pub category_name: String,
    pub items_sold: i64,
    pub total_quantity: i64,
    pub total_revenue: Decimal,
}

/// Sales aggregate for a single day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySalesReport {
    pub date: NaiveDate,
    pub total_orders: i64,
    pub total_sales: Decimal,
    pub average_order_value: Decimal,
    pub top_selling_items: Vec<TopSellingItem>,
}

/// Top selling items over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopSellingItemsReport {
    pub period: ReportPeriod,
    pub limit: i64,
    pub top_selling_items: Vec<TopSellingItem>,
}

/// Sales grouped by category over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesByCategoryReport {
    pub period: ReportPeriod,
    pub sales_by_category: Vec<CategorySales>,
}

/// Sales, expenses and profit over a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialSummaryReport {
    pub period: ReportPeriod,
    pub total_sales: Decimal,
    pub total_expenses: Decimal,
    pub total_profit: Decimal,
    pub sales_by_category: Vec<CategorySales>,
    pub expenses: Vec<Expense>,
}

impl ReportService {
    /// Create a new ReportService instance
    pub fn new(db: PgPool, cache: Arc<dyn Cache>) -> Self {
        Self { db, cache }
    }

    /// Sales aggregate for one calendar day, cached for an hour.
    ///
    /// A day with no completed orders yields a zero-valued report, not an
    /// error.
    pub async fn daily_sales_report(&self, date: NaiveDate) -> AppResult<DailySalesReport> {
        let cache_key = format!("daily_sales_report:{}", date);

        if let Some(report) = self.cache.get::<DailySalesReport>(&cache_key).await {
            return Ok(report);
        }

        let (total_orders, total_sales) = sqlx::query_as::<_, (i64, Decimal)>(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM orders
            WHERE status = 'completed' AND completed_at::date = $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        let average_order_value = if total_orders > 0 {
            total_sales / Decimal::from(total_orders)
        } else {
            Decimal::ZERO
        };

        let top_selling_items = self
            .top_selling_items(date, date, DEFAULT_TOP_ITEMS_LIMIT)
            .await?;

        let report = DailySalesReport {
            date,
            total_orders,
            total_sales,
            average_order_value,
            top_selling_items,
        };

        self.cache.set(&cache_key, &report, DAILY_REPORT_TTL).await;

        Ok(report)
    }

    /// Top selling items over an inclusive date range, cached for 30
    /// minutes
    pub async fn top_selling_items_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: Option<i64>,
    ) -> AppResult<TopSellingItemsReport> {
        Self::validate_period(start_date, end_date)?;
        let limit = match limit {
            Some(n) if n > 0 => n,
            _ => DEFAULT_TOP_ITEMS_LIMIT,
        };

        let cache_key = format!(
            "top_selling_items:from:{}:to:{}:limit:{}",
            start_date, end_date, limit
        );

        if let Some(report) = self.cache.get::<TopSellingItemsReport>(&cache_key).await {
            return Ok(report);
        }

        let top_selling_items = self.top_selling_items(start_date, end_date, limit).await?;

        let report = TopSellingItemsReport {
            period: ReportPeriod {
                start_date,
                end_date,
            },
            limit,
            top_selling_items,
        };

        self.cache.set(&cache_key, &report, TOP_ITEMS_TTL).await;

        Ok(report)
    }

    /// Sales grouped by category over an inclusive date range
    pub async fn sales_by_category_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<SalesByCategoryReport> {
        Self::validate_period(start_date, end_date)?;

        let sales_by_category = self.sales_by_category(start_date, end_date).await?;

        Ok(SalesByCategoryReport {
            period: ReportPeriod {
                start_date,
                end_date,
            },
            sales_by_category,
        })
    }

    /// Financial summary (sales, expenses, profit) over an inclusive date
    /// range
    pub async fn financial_summary_report(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<FinancialSummaryReport> {
        Self::validate_period(start_date, end_date)?;

        let total_sales = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM orders
            WHERE status = 'completed'
              AND completed_at::date >= $1 AND completed_at::date <= $2
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_one(&self.db)
        .await?;

        // Unpaginated on purpose; the summary must cover the whole range
        let expenses = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, category, description, amount, expense_date, user_id, created_at
            FROM expenses
            WHERE expense_date >= $1 AND expense_date <= $2
            ORDER BY expense_date DESC, created_at DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();
        let total_profit = total_sales - total_expenses;

        let sales_by_category = self.sales_by_category(start_date, end_date).await?;

        Ok(FinancialSummaryReport {
            period: ReportPeriod {
                start_date,
                end_date,
            },
            total_sales,
            total_expenses,
            total_profit,
            sales_by_category,
            expenses,
        })
    }

    async fn top_selling_items(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        limit: i64,
    ) -> AppResult<Vec<TopSellingItem>> {
        let items = sqlx::query_as::<_, TopSellingItem>(
            r#"
            SELECT m.name as menu_item_name,
                   SUM(oi.quantity)::bigint as total_quantity_sold,
                   SUM(oi.total_price) as total_revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE o.status = 'completed'
              AND o.completed_at::date >= $1 AND o.completed_at::date <= $2
            GROUP BY m.name
            ORDER BY total_quantity_sold DESC
            LIMIT $3
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        Ok(items)
    }

    async fn sales_by_category(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> AppResult<Vec<CategorySales>> {
        let rows = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT c.name as category_name,
                   COUNT(DISTINCT oi.menu_item_id)::bigint as items_sold,
                   SUM(oi.quantity)::bigint as total_quantity,
                   SUM(oi.total_price) as total_revenue
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN menu_items m ON m.id = oi.menu_item_id
            JOIN categories c ON c.id = m.category_id
            WHERE o.status = 'completed'
              AND o.completed_at::date >= $1 AND o.completed_at::date <= $2
            GROUP BY c.name
            ORDER BY total_revenue DESC
            "#,
        )
        .bind(start_date)
        .bind(end_date)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    fn validate_period(start_date: NaiveDate, end_date: NaiveDate) -> AppResult<()> {
        if start_date > end_date {
            return Err(AppError::ValidationError(
                "Start date must not be after end date".to_string(),
            ));
        }
        Ok(())
    }
}
