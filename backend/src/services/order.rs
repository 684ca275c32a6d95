//! Order service: order lifecycle orchestration
//!
//! Owns the order state machine (draft/pending -> completed | cancelled) and
//! every multi-entity mutation around it. Each mutation runs inside one
//! transaction so the observable outcome is all-or-nothing: order creation
//! persists the header and all lines together, and completion writes the
//! status change, every inventory decrement, and every ledger append in a
//! single unit of work. The order row is locked before any status check, and
//! inventory rows are locked in ascending menu_item_id order, so concurrent
//! completions against the same item serialize instead of overselling.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::{
    validate_quantity, Order, OrderItemWithDetails, OrderStatus, OrderWithItems, PaymentMethod,
    StockTransactionType,
};

use crate::cache::{Cache, DAILY_SALES_REPORT_PATTERN, TOP_SELLING_ITEMS_PATTERN};
use crate::error::{AppError, AppResult};
use crate::services::inventory::{InventoryService, LedgerEntry};

/// Order service orchestrating creation, item addition, completion and
/// cancellation
#[derive(Clone)]
pub struct OrderService {
    db: PgPool,
    inventory: InventoryService,
    cache: Arc<dyn Cache>,
}

/// One requested order line
#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Input for creating a draft order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub items: Vec<OrderItemInput>,
}

/// Input for completing an order
#[derive(Debug, Deserialize)]
pub struct CompleteOrderInput {
    pub payment_method: PaymentMethod,
}

/// Input for cancelling an order
#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderInput {
    pub reason: Option<String>,
}

/// Filter options for listing orders
#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub user_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Menu item fields the order core needs (name, price snapshot source,
/// availability)
#[derive(Debug, sqlx::FromRow)]
struct MenuItemRef {
    id: Uuid,
    name: String,
    price: Decimal,
    is_available: bool,
}

/// A priced line ready to be persisted
struct PricedLine {
    menu_item_id: Uuid,
    quantity: i32,
    unit_price: Decimal,
    total_price: Decimal,
}

impl OrderService {
    /// Create a new OrderService instance
    pub fn new(db: PgPool, cache: Arc<dyn Cache>) -> Self {
        let inventory = InventoryService::new(db.clone());
        Self {
            db,
            inventory,
            cache,
        }
    }

    /// Create a draft order from a set of requested lines.
    ///
    /// Availability and stock are checked here but no stock is held: the
    /// check is advisory and the authoritative check happens at completion.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        input: CreateOrderInput,
    ) -> AppResult<OrderWithItems> {
        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Order must contain at least one item".to_string(),
            });
        }

        // Validate every line and snapshot prices before writing anything
        let mut lines: Vec<PricedLine> = Vec::with_capacity(input.items.len());
        let mut total_amount = Decimal::ZERO;

        for item in &input.items {
            validate_quantity(item.quantity).map_err(|msg| AppError::Validation {
                field: "quantity".to_string(),
                message: msg.to_string(),
            })?;

            let menu_item = self.menu_item_ref(item.menu_item_id).await?;
            if !menu_item.is_available {
                return Err(AppError::ValidationError(format!(
                    "Menu item is not available: {}",
                    menu_item.name
                )));
            }

            let available = self.inventory.current_stock(menu_item.id).await?;
            if available < item.quantity {
                return Err(AppError::InsufficientStock {
                    item_name: menu_item.name,
                    available,
                    requested: i64::from(item.quantity),
                });
            }

            let total_price = menu_item.price * Decimal::from(item.quantity);
            total_amount += total_price;
            lines.push(PricedLine {
                menu_item_id: menu_item.id,
                quantity: item.quantity,
                unit_price: menu_item.price,
                total_price,
            });
        }

        let order_number = generate_order_number(Utc::now());

        // Header and all lines are one unit of work
        let mut tx = self.db.begin().await?;

        let order_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO orders (order_number, user_id, status, total_amount, discount_amount, tax_amount, payment_status)
            VALUES ($1, $2, 'draft', $3, 0, 0, 'pending')
            RETURNING id
            "#,
        )
        .bind(&order_number)
        .bind(user_id)
        .bind(total_amount)
        .fetch_one(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, total_price)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_id)
            .bind(line.menu_item_id)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.total_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Get an order with its lines
    pub async fn get_order(&self, order_id: Uuid) -> AppResult<OrderWithItems> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id, status, total_amount, discount_amount,
                   tax_amount, payment_method, payment_status, completed_at,
                   created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Order".to_string()))?;

        let items = sqlx::query_as::<_, OrderItemWithDetails>(
            r#"
            SELECT oi.id, oi.order_id, oi.menu_item_id, m.name as menu_item_name,
                   oi.quantity, oi.unit_price, oi.total_price
            FROM order_items oi
            JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE oi.order_id = $1
            ORDER BY oi.created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.db)
        .await?;

        Ok(OrderWithItems { order, items })
    }

    /// List order headers matching a filter, newest first
    pub async fn list_orders(&self, filter: OrderFilter) -> AppResult<Vec<Order>> {
        let pagination = shared::Pagination::clamped(filter.limit, filter.offset);

        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, order_number, user_id, status, total_amount, discount_amount,
                   tax_amount, payment_method, payment_status, completed_at,
                   created_at, updated_at
            FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::timestamptz IS NULL OR created_at >= $3)
              AND ($4::timestamptz IS NULL OR created_at <= $4)
            ORDER BY created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.status)
        .bind(filter.user_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(orders)
    }

    /// Add a line to a draft order.
    ///
    /// Availability is revalidated and the line is priced at the current
    /// menu price; cumulative stock across the whole order is not checked
    /// here, only at completion.
    pub async fn add_item_to_order(
        &self,
        order_id: Uuid,
        _user_id: Uuid,
        item: OrderItemInput,
    ) -> AppResult<OrderWithItems> {
        validate_quantity(item.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;

        let menu_item = self.menu_item_ref(item.menu_item_id).await?;
        if !menu_item.is_available {
            return Err(AppError::ValidationError(format!(
                "Menu item is not available: {}",
                menu_item.name
            )));
        }

        let total_price = menu_item.price * Decimal::from(item.quantity);

        let mut tx = self.db.begin().await?;

        let status = Self::lock_order_row(&mut *tx, order_id).await?;
        if !status.accepts_items() {
            return Err(AppError::InvalidState(
                "Items can only be added to draft orders".to_string(),
            ));
        }

        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, menu_item_id, quantity, unit_price, total_price)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(item.menu_item_id)
        .bind(item.quantity)
        .bind(menu_item.price)
        .bind(total_price)
        .execute(&mut *tx)
        .await?;

        // New total is the old total plus the new line; discount and tax
        // carry over unchanged
        sqlx::query(
            r#"
            UPDATE orders
            SET total_amount = total_amount + $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(total_price)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_order(order_id).await
    }

    /// Complete an order: authoritative stock check, inventory decrement,
    /// ledger append, payment fields and status flip, all in one
    /// transaction.
    pub async fn complete_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        input: CompleteOrderInput,
    ) -> AppResult<OrderWithItems> {
        let mut tx = self.db.begin().await?;

        let status = Self::lock_order_row(&mut *tx, order_id).await?;
        if !status.can_complete() {
            return Err(AppError::InvalidState(
                "Order is not in a valid state for completion".to_string(),
            ));
        }

        // Requested quantities aggregated per menu item, in ascending id
        // order so inventory row locks are always taken in the same order
        let demands = sqlx::query_as::<_, (Uuid, String, i64)>(
            r#"
            SELECT oi.menu_item_id, m.name, SUM(oi.quantity) as quantity
            FROM order_items oi
            JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE oi.order_id = $1
            GROUP BY oi.menu_item_id, m.name
            ORDER BY oi.menu_item_id
            "#,
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        if demands.is_empty() {
            return Err(AppError::InvalidState(
                "Order has no items to complete".to_string(),
            ));
        }

        // Lock every inventory row and check the full set of items together.
        // This is the only authoritative stock check in the order lifecycle.
        let mut locked: Vec<(Uuid, i32, i32)> = Vec::with_capacity(demands.len());
        for (menu_item_id, name, quantity) in &demands {
            let available =
                InventoryService::lock_inventory_row(&mut *tx, *menu_item_id).await?;
            // The summed demand is i64; comparing in i64 keeps demands past
            // i32::MAX from wrapping into a passing check
            if i64::from(available) < *quantity {
                return Err(AppError::InsufficientStock {
                    item_name: name.clone(),
                    available,
                    requested: *quantity,
                });
            }
            // Bounded by an i32 stock level once the check passes
            let requested = i32::try_from(*quantity).map_err(|_| {
                AppError::ValidationError("Requested quantity out of range".to_string())
            })?;
            locked.push((*menu_item_id, available, requested));
        }

        // All checks passed; apply the decrements and ledger appends
        for (menu_item_id, previous_stock, requested) in &locked {
            let new_stock = previous_stock - requested;
            InventoryService::write_stock(&mut *tx, *menu_item_id, new_stock, user_id).await?;
            InventoryService::append_ledger_entry(
                &mut *tx,
                LedgerEntry {
                    menu_item_id: *menu_item_id,
                    transaction_type: StockTransactionType::Out,
                    quantity: -requested,
                    previous_stock: *previous_stock,
                    current_stock: new_stock,
                    reason: format!("Order {} completion", order_id),
                    reference_type: Some("order".to_string()),
                    reference_id: Some(order_id),
                    user_id: Some(user_id),
                },
            )
            .await?;
        }

        sqlx::query(
            r#"
            UPDATE orders
            SET status = 'completed', payment_method = $1, payment_status = 'paid',
                completed_at = NOW(), updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(input.payment_method)
        .bind(order_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        // Completed orders feed the sales aggregates; drop the report
        // caches best-effort
        self.invalidate_report_caches().await;

        self.get_order(order_id).await
    }

    /// Cancel an order.
    ///
    /// Cancelling a completed order flips the status only: inventory
    /// decrements and ledger entries from completion are left untouched
    /// (refunds are a manual process outside this system). That path is
    /// restricted to managers, checked under the row lock so a cancel
    /// racing a concurrent completion cannot slip past the check.
    pub async fn cancel_order(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        is_manager: bool,
        input: CancelOrderInput,
    ) -> AppResult<OrderWithItems> {
        let mut tx = self.db.begin().await?;

        let status = Self::lock_order_row(&mut *tx, order_id).await?;
        if !status.can_cancel() {
            return Err(AppError::InvalidState(
                "Order is already cancelled".to_string(),
            ));
        }

        let was_completed = status == OrderStatus::Completed;
        if was_completed && !is_manager {
            return Err(AppError::InsufficientPermissions);
        }

        sqlx::query("UPDATE orders SET status = 'cancelled', updated_at = NOW() WHERE id = $1")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order_id,
            user_id = %user_id,
            reason = input.reason.as_deref().unwrap_or("none given"),
            "Order cancelled"
        );

        // Cancelling a previously completed order changes the sales data
        // behind the report caches
        if was_completed {
            self.invalidate_report_caches().await;
        }

        self.get_order(order_id).await
    }

    /// Lock an order row and return its status; NotFound if absent.
    ///
    /// Holding the row lock makes read-validate-write one atomic unit per
    /// order id, so completion and cancellation cannot race each other.
    async fn lock_order_row(conn: &mut PgConnection, order_id: Uuid) -> AppResult<OrderStatus> {
        sqlx::query_scalar::<_, OrderStatus>("SELECT status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(order_id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound("Order".to_string()))
    }

    /// Resolve a menu item for the order core
    async fn menu_item_ref(&self, menu_item_id: Uuid) -> AppResult<MenuItemRef> {
        sqlx::query_as::<_, MenuItemRef>(
            "SELECT id, name, price, is_available FROM menu_items WHERE id = $1",
        )
        .bind(menu_item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Menu item".to_string()))
    }

    /// Drop the report caches affected by completed-order sales data
    async fn invalidate_report_caches(&self) {
        self.cache.delete_pattern(DAILY_SALES_REPORT_PATTERN).await;
        self.cache.delete_pattern(TOP_SELLING_ITEMS_PATTERN).await;
    }
}

/// Generate a display-only order number: `ORD-<yyyymmdd>-<4 digits>`.
///
/// The suffix is derived from the sub-second clock and is not unique; the
/// order id is the only identity.
pub fn generate_order_number(now: DateTime<Utc>) -> String {
    format!(
        "ORD-{}-{:04}",
        now.format("%Y%m%d"),
        now.timestamp_subsec_nanos() % 10_000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_order_number_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 30, 0).unwrap();
        let number = generate_order_number(now);
        assert!(number.starts_with("ORD-20240307-"));
        assert_eq!(number.len(), "ORD-20240307-0000".len());
        assert!(number[13..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_order_number_suffix_is_bounded() {
        let now = Utc
            .with_ymd_and_hms(2024, 12, 31, 23, 59, 59)
            .unwrap()
            .with_nanosecond(987_654_321)
            .unwrap();
        let number = generate_order_number(now);
        let suffix: u32 = number[13..].parse().unwrap();
        assert!(suffix < 10_000);
    }
}
