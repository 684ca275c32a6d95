//! HTTP handlers for inventory and stock ledger endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use shared::{InventoryWithItem, StockTransaction};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::inventory::{
    InventoryFilter, InventoryService, StockTransactionFilter, UpdateStockInput,
};
use crate::AppState;

/// Manually adjust stock for a menu item
pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateStockInput>,
) -> AppResult<Json<InventoryWithItem>> {
    if !current_user.0.is_manager() {
        return Err(AppError::InsufficientPermissions);
    }
    let service = InventoryService::new(state.db);
    let inventory = service.update_stock(current_user.0.user_id, input).await?;
    Ok(Json(inventory))
}

/// Get inventory for a menu item
pub async fn get_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(menu_item_id): Path<Uuid>,
) -> AppResult<Json<InventoryWithItem>> {
    let service = InventoryService::new(state.db);
    let inventory = service.get_inventory_by_menu_item(menu_item_id).await?;
    Ok(Json(inventory))
}

/// List inventory, optionally only low-stock rows
pub async fn list_inventory(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<InventoryFilter>,
) -> AppResult<Json<Vec<InventoryWithItem>>> {
    let service = InventoryService::new(state.db);
    let inventory = service.list_inventory(filter).await?;
    Ok(Json(inventory))
}

/// List stock ledger entries
pub async fn list_stock_transactions(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<StockTransactionFilter>,
) -> AppResult<Json<Vec<StockTransaction>>> {
    let service = InventoryService::new(state.db);
    let transactions = service.list_stock_transactions(filter).await?;
    Ok(Json(transactions))
}
