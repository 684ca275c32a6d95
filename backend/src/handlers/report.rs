//! HTTP handlers for reporting endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::report::{
    DailySalesReport, FinancialSummaryReport, ReportService, SalesByCategoryReport,
    TopSellingItemsReport,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DailyReportQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct TopItemsQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub limit: Option<i64>,
}

/// Daily sales report endpoint handler
pub async fn daily_sales_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DailyReportQuery>,
) -> AppResult<Json<DailySalesReport>> {
    require_manager(&current_user)?;
    let service = ReportService::new(state.db, state.cache);
    let report = service.daily_sales_report(query.date).await?;
    Ok(Json(report))
}

/// Top selling items report endpoint handler
pub async fn top_selling_items_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<TopItemsQuery>,
) -> AppResult<Json<TopSellingItemsReport>> {
    require_manager(&current_user)?;
    let service = ReportService::new(state.db, state.cache);
    let report = service
        .top_selling_items_report(query.start_date, query.end_date, query.limit)
        .await?;
    Ok(Json(report))
}

/// Sales by category report endpoint handler
pub async fn sales_by_category_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<SalesByCategoryReport>> {
    require_manager(&current_user)?;
    let service = ReportService::new(state.db, state.cache);
    let report = service
        .sales_by_category_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(report))
}

/// Financial summary report endpoint handler
pub async fn financial_summary_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<FinancialSummaryReport>> {
    require_manager(&current_user)?;
    let service = ReportService::new(state.db, state.cache);
    let report = service
        .financial_summary_report(query.start_date, query.end_date)
        .await?;
    Ok(Json(report))
}

fn require_manager(current_user: &CurrentUser) -> AppResult<()> {
    if current_user.0.is_manager() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
