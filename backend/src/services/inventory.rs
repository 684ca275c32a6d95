//! Inventory service: current-stock state and the append-only stock ledger
//!
//! Every stock mutation in the system flows through this module. A mutation
//! is one atomic unit: the inventory row is locked (`SELECT ... FOR UPDATE`),
//! the new stock value is written, and the ledger entry is appended, all
//! inside a single transaction. Concurrent mutations against the same menu
//! item therefore serialize on the row lock and compose correctly.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use shared::{
    validate_reason, validate_stock_delta, Inventory, InventoryWithItem, StockTransaction,
    StockTransactionType,
};

use crate::error::{AppError, AppResult};

/// Inventory service owning current-stock state and ledger appends
#[derive(Clone)]
pub struct InventoryService {
    db: PgPool,
}

/// Input for a manual stock adjustment
#[derive(Debug, Deserialize)]
pub struct UpdateStockInput {
    pub menu_item_id: Uuid,
    /// Signed delta; positive restocks, negative removes. Zero is rejected.
    pub quantity: i32,
    pub reason: String,
}

/// Filter options for listing inventory
#[derive(Debug, Default, Deserialize)]
pub struct InventoryFilter {
    #[serde(default)]
    pub low_stock_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Filter options for listing stock transactions
#[derive(Debug, Default, Deserialize)]
pub struct StockTransactionFilter {
    pub menu_item_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Inventory row joined with its menu item name
#[derive(Debug, sqlx::FromRow)]
struct InventoryRow {
    id: Uuid,
    menu_item_id: Uuid,
    current_stock: i32,
    minimum_stock: i32,
    last_updated_at: DateTime<Utc>,
    last_updated_by: Option<Uuid>,
    menu_item_name: String,
}

impl InventoryRow {
    fn into_view(self) -> InventoryWithItem {
        let inventory = Inventory {
            id: self.id,
            menu_item_id: self.menu_item_id,
            current_stock: self.current_stock,
            minimum_stock: self.minimum_stock,
            last_updated_at: self.last_updated_at,
            last_updated_by: self.last_updated_by,
        };
        let is_low_stock = inventory.is_low_stock();
        InventoryWithItem {
            inventory,
            menu_item_name: self.menu_item_name,
            is_low_stock,
        }
    }
}

impl InventoryService {
    /// Create a new InventoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Manually adjust stock for a menu item.
    ///
    /// The manual path deliberately allows the resulting stock to go
    /// negative (pending future authorization rules); only the order
    /// completion path refuses to cross zero.
    pub async fn update_stock(
        &self,
        user_id: Uuid,
        input: UpdateStockInput,
    ) -> AppResult<InventoryWithItem> {
        validate_stock_delta(input.quantity).map_err(|msg| AppError::Validation {
            field: "quantity".to_string(),
            message: msg.to_string(),
        })?;
        validate_reason(&input.reason).map_err(|msg| AppError::Validation {
            field: "reason".to_string(),
            message: msg.to_string(),
        })?;

        // Verify the menu item exists before touching inventory
        let item_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM menu_items WHERE id = $1)",
        )
        .bind(input.menu_item_id)
        .fetch_one(&self.db)
        .await?;

        if !item_exists {
            return Err(AppError::NotFound("Menu item".to_string()));
        }

        let mut tx = self.db.begin().await?;

        let previous_stock =
            Self::lock_inventory_row(&mut *tx, input.menu_item_id).await?;
        let new_stock = previous_stock + input.quantity;

        Self::write_stock(&mut *tx, input.menu_item_id, new_stock, user_id).await?;
        Self::append_ledger_entry(
            &mut *tx,
            LedgerEntry {
                menu_item_id: input.menu_item_id,
                transaction_type: StockTransactionType::from_delta(input.quantity),
                quantity: input.quantity,
                previous_stock,
                current_stock: new_stock,
                reason: input.reason.trim().to_string(),
                reference_type: None,
                reference_id: None,
                user_id: Some(user_id),
            },
        )
        .await?;

        tx.commit().await?;

        self.get_inventory_by_menu_item(input.menu_item_id).await
    }

    /// Get inventory for a menu item
    pub async fn get_inventory_by_menu_item(
        &self,
        menu_item_id: Uuid,
    ) -> AppResult<InventoryWithItem> {
        let row = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT i.id, i.menu_item_id, i.current_stock, i.minimum_stock,
                   i.last_updated_at, i.last_updated_by, m.name as menu_item_name
            FROM inventory i
            JOIN menu_items m ON m.id = i.menu_item_id
            WHERE i.menu_item_id = $1
            "#,
        )
        .bind(menu_item_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Inventory".to_string()))?;

        Ok(row.into_view())
    }

    /// List inventory, optionally only low-stock rows
    pub async fn list_inventory(
        &self,
        filter: InventoryFilter,
    ) -> AppResult<Vec<InventoryWithItem>> {
        let pagination = shared::Pagination::clamped(filter.limit, filter.offset);

        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT i.id, i.menu_item_id, i.current_stock, i.minimum_stock,
                   i.last_updated_at, i.last_updated_by, m.name as menu_item_name
            FROM inventory i
            JOIN menu_items m ON m.id = i.menu_item_id
            WHERE ($1 = false OR i.current_stock <= i.minimum_stock)
            ORDER BY m.name
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(filter.low_stock_only)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventoryRow::into_view).collect())
    }

    /// List stock ledger entries, newest first
    pub async fn list_stock_transactions(
        &self,
        filter: StockTransactionFilter,
    ) -> AppResult<Vec<StockTransaction>> {
        let pagination = shared::Pagination::clamped(filter.limit, filter.offset);

        let transactions = sqlx::query_as::<_, StockTransaction>(
            r#"
            SELECT id, menu_item_id, transaction_type, quantity, previous_stock,
                   current_stock, reason, reference_type, reference_id, user_id, created_at
            FROM stock_transactions
            WHERE ($1::uuid IS NULL OR menu_item_id = $1)
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.menu_item_id)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(pagination.limit)
        .bind(pagination.offset)
        .fetch_all(&self.db)
        .await?;

        Ok(transactions)
    }

    /// Create an inventory row for a menu item if one does not exist yet.
    ///
    /// Idempotent: calling this twice for the same item leaves exactly one
    /// row with unchanged fields.
    pub async fn create_inventory_record(&self, menu_item_id: Uuid) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO inventory (menu_item_id, current_stock, minimum_stock)
            VALUES ($1, 0, 5)
            ON CONFLICT (menu_item_id) DO NOTHING
            "#,
        )
        .bind(menu_item_id)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Read current stock without locking; used for the advisory
    /// availability check at order creation time (no reservation is held).
    pub(crate) async fn current_stock(&self, menu_item_id: Uuid) -> AppResult<i32> {
        self.create_inventory_record(menu_item_id).await?;

        let stock = sqlx::query_scalar::<_, i32>(
            "SELECT current_stock FROM inventory WHERE menu_item_id = $1",
        )
        .bind(menu_item_id)
        .fetch_one(&self.db)
        .await?;

        Ok(stock)
    }

    /// Lock the inventory row for a menu item inside the caller's
    /// transaction, lazily creating it, and return the current stock.
    ///
    /// Callers deducting for several items must lock rows in ascending
    /// menu_item_id order to avoid lock-order deadlocks.
    pub(crate) async fn lock_inventory_row(
        conn: &mut PgConnection,
        menu_item_id: Uuid,
    ) -> AppResult<i32> {
        sqlx::query(
            r#"
            INSERT INTO inventory (menu_item_id, current_stock, minimum_stock)
            VALUES ($1, 0, 5)
            ON CONFLICT (menu_item_id) DO NOTHING
            "#,
        )
        .bind(menu_item_id)
        .execute(&mut *conn)
        .await?;

        let stock = sqlx::query_scalar::<_, i32>(
            "SELECT current_stock FROM inventory WHERE menu_item_id = $1 FOR UPDATE",
        )
        .bind(menu_item_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(stock)
    }

    /// Write the new stock value for a locked inventory row
    pub(crate) async fn write_stock(
        conn: &mut PgConnection,
        menu_item_id: Uuid,
        new_stock: i32,
        user_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE inventory
            SET current_stock = $1, last_updated_at = NOW(), last_updated_by = $2
            WHERE menu_item_id = $3
            "#,
        )
        .bind(new_stock)
        .bind(user_id)
        .bind(menu_item_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Append an entry to the stock ledger inside the caller's transaction
    pub(crate) async fn append_ledger_entry(
        conn: &mut PgConnection,
        entry: LedgerEntry,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO stock_transactions (
                menu_item_id, transaction_type, quantity, previous_stock,
                current_stock, reason, reference_type, reference_id, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.menu_item_id)
        .bind(entry.transaction_type)
        .bind(entry.quantity)
        .bind(entry.previous_stock)
        .bind(entry.current_stock)
        .bind(&entry.reason)
        .bind(&entry.reference_type)
        .bind(entry.reference_id)
        .bind(entry.user_id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}

/// Fields for one ledger append
pub(crate) struct LedgerEntry {
    pub menu_item_id: Uuid,
    pub transaction_type: StockTransactionType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub current_stock: i32,
    pub reason: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}
