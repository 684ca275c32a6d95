//! HTTP handlers for menu catalog endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use shared::{Category, MenuItem, MenuItemWithCategory};

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::menu::{
    CreateCategoryInput, CreateMenuItemInput, MenuItemFilter, MenuService, UpdateCategoryInput,
    UpdateMenuItemInput,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryListQuery {
    #[serde(default)]
    pub active_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Create a category
pub async fn create_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateCategoryInput>,
) -> AppResult<(StatusCode, Json<Category>)> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    let category = service.create_category(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Get a category
pub async fn get_category(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<Json<Category>> {
    let service = MenuService::new(state.db, state.cache);
    let category = service.get_category(category_id).await?;
    Ok(Json(category))
}

/// List categories
pub async fn list_categories(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<CategoryListQuery>,
) -> AppResult<Json<Vec<Category>>> {
    let service = MenuService::new(state.db, state.cache);
    let categories = service
        .list_categories(query.active_only, query.limit, query.offset)
        .await?;
    Ok(Json(categories))
}

/// Update a category
pub async fn update_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(input): Json<UpdateCategoryInput>,
) -> AppResult<Json<Category>> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    let category = service.update_category(category_id, input).await?;
    Ok(Json(category))
}

/// Deactivate a category
pub async fn delete_category(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    service.delete_category(category_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a menu item
pub async fn create_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateMenuItemInput>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    let item = service.create_menu_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Get a menu item
pub async fn get_menu_item(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<Json<MenuItem>> {
    let service = MenuService::new(state.db, state.cache);
    let item = service.get_menu_item(item_id).await?;
    Ok(Json(item))
}

/// List menu items
pub async fn list_menu_items(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<MenuItemFilter>,
) -> AppResult<Json<Vec<MenuItemWithCategory>>> {
    let service = MenuService::new(state.db, state.cache);
    let items = service.list_menu_items(filter).await?;
    Ok(Json(items))
}

/// Update a menu item
pub async fn update_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
    Json(input): Json<UpdateMenuItemInput>,
) -> AppResult<Json<MenuItem>> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    let item = service.update_menu_item(item_id, input).await?;
    Ok(Json(item))
}

/// Make a menu item unavailable
pub async fn delete_menu_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_manager(&current_user)?;
    let service = MenuService::new(state.db, state.cache);
    service.delete_menu_item(item_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn require_manager(current_user: &CurrentUser) -> AppResult<()> {
    if current_user.0.is_manager() {
        Ok(())
    } else {
        Err(AppError::InsufficientPermissions)
    }
}
