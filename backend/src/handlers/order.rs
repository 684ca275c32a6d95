//! HTTP handlers for order lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use shared::{Order, OrderWithItems};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::order::{
    CancelOrderInput, CompleteOrderInput, CreateOrderInput, OrderFilter, OrderItemInput,
    OrderService,
};
use crate::AppState;

/// Create a draft order
pub async fn create_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOrderInput>,
) -> AppResult<(StatusCode, Json<OrderWithItems>)> {
    let service = OrderService::new(state.db, state.cache);
    let order = service.create_order(current_user.0.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get an order with its lines
pub async fn get_order(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db, state.cache);
    let order = service.get_order(order_id).await?;
    Ok(Json(order))
}

/// List orders
pub async fn list_orders(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(filter): Query<OrderFilter>,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.db, state.cache);
    let orders = service.list_orders(filter).await?;
    Ok(Json(orders))
}

/// Add a line to a draft order
pub async fn add_item_to_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<OrderItemInput>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db, state.cache);
    let order = service
        .add_item_to_order(order_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(order))
}

/// Complete an order (takes payment, decrements inventory)
pub async fn complete_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CompleteOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db, state.cache);
    let order = service
        .complete_order(order_id, current_user.0.user_id, input)
        .await?;
    Ok(Json(order))
}

/// Cancel an order.
///
/// Cancelling an already completed order is a manager-level action since it
/// leaves the inventory decrement in place; the service enforces this under
/// the order row lock.
pub async fn cancel_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
    Json(input): Json<CancelOrderInput>,
) -> AppResult<Json<OrderWithItems>> {
    let service = OrderService::new(state.db, state.cache);
    let order = service
        .cancel_order(
            order_id,
            current_user.0.user_id,
            current_user.0.is_manager(),
            input,
        )
        .await?;
    Ok(Json(order))
}
