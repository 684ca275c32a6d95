//! Route definitions for the cafe POS backend

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public + protected profile)
        .nest("/auth", auth_routes())
        // Protected routes - menu catalog
        .nest("/categories", category_routes())
        .nest("/menu-items", menu_item_routes())
        // Protected routes - order lifecycle
        .nest("/orders", order_routes())
        // Protected routes - inventory and stock ledger
        .nest("/inventory", inventory_routes())
        // Protected routes - expense bookkeeping
        .nest("/expenses", expense_routes())
        // Protected routes - reporting
        .nest("/reports", report_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route(
            "/me",
            get(handlers::me).route_layer(middleware::from_fn(auth_middleware)),
        )
}

/// Category management routes (protected)
fn category_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_categories).post(handlers::create_category),
        )
        .route(
            "/:category_id",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Menu item management routes (protected)
fn menu_item_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_menu_items).post(handlers::create_menu_item),
        )
        .route(
            "/:item_id",
            get(handlers::get_menu_item)
                .put(handlers::update_menu_item)
                .delete(handlers::delete_menu_item),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Order lifecycle routes (protected)
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::create_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/items", post(handlers::add_item_to_order))
        .route("/:order_id/complete", post(handlers::complete_order))
        .route("/:order_id/cancel", post(handlers::cancel_order))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Inventory management routes (protected)
fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_inventory))
        .route("/stock", put(handlers::update_stock))
        .route("/transactions", get(handlers::list_stock_transactions))
        .route("/:menu_item_id", get(handlers::get_inventory))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Expense bookkeeping routes (protected)
fn expense_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_expenses).post(handlers::create_expense),
        )
        .route(
            "/:expense_id",
            get(handlers::get_expense)
                .put(handlers::update_expense)
                .delete(handlers::delete_expense),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Reporting routes (protected)
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/daily-sales", get(handlers::daily_sales_report))
        .route("/top-selling", get(handlers::top_selling_items_report))
        .route(
            "/sales-by-category",
            get(handlers::sales_by_category_report),
        )
        .route(
            "/financial-summary",
            get(handlers::financial_summary_report),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}
