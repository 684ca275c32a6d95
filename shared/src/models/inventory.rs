//! Inventory and stock ledger models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::types::StockTransactionType;

/// Current stock for a menu item
///
/// Exactly one row per menu item, created lazily the first time an order or
/// manual adjustment references the item. Mutated only by the inventory
/// service; never deleted while the menu item exists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Inventory {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub current_stock: i32,
    pub minimum_stock: i32,
    pub last_updated_at: DateTime<Utc>,
    pub last_updated_by: Option<Uuid>,
}

impl Inventory {
    /// Low-stock is derived at read time, never stored.
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.minimum_stock
    }
}

/// Inventory row joined with its menu item name and the derived low-stock flag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryWithItem {
    #[serde(flatten)]
    pub inventory: Inventory,
    pub menu_item_name: String,
    pub is_low_stock: bool,
}

/// An immutable stock ledger entry
///
/// Append-only: entries are never updated or deleted. For every entry
/// `current_stock = previous_stock + quantity`, and replaying all entries
/// for a menu item from zero reconstructs the inventory row's stock.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StockTransaction {
    pub id: Uuid,
    pub menu_item_id: Uuid,
    pub transaction_type: StockTransactionType,
    pub quantity: i32,
    pub previous_stock: i32,
    pub current_stock: i32,
    pub reason: String,
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn inventory(current: i32, minimum: i32) -> Inventory {
        Inventory {
            id: Uuid::new_v4(),
            menu_item_id: Uuid::new_v4(),
            current_stock: current,
            minimum_stock: minimum,
            last_updated_at: Utc::now(),
            last_updated_by: None,
        }
    }

    #[test]
    fn test_low_stock_at_or_below_minimum() {
        assert!(inventory(5, 5).is_low_stock());
        assert!(inventory(2, 5).is_low_stock());
        assert!(!inventory(6, 5).is_low_stock());
    }

    #[test]
    fn test_low_stock_negative_balance() {
        assert!(inventory(-3, 0).is_low_stock());
    }
}
