//! Inventory and stock ledger tests
//!
//! Unit and property-based tests for:
//! - The ledger delta invariant (current = previous + quantity)
//! - Ledger replay reconstructing current stock
//! - Transaction type derivation from delta sign
//! - Low stock detection

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use shared::{
    validate_reason, validate_stock_delta, Inventory, StockTransactionType,
};

/// One ledger entry as the invariants see it
#[derive(Debug, Clone)]
struct Entry {
    transaction_type: StockTransactionType,
    quantity: i32,
    previous_stock: i32,
    current_stock: i32,
}

/// Apply a sequence of signed deltas to an initial stock, producing the
/// ledger entries a correct implementation would append
fn replay(initial: i32, deltas: &[i32]) -> Vec<Entry> {
    let mut stock = initial;
    deltas
        .iter()
        .map(|&delta| {
            let entry = Entry {
                transaction_type: StockTransactionType::from_delta(delta),
                quantity: delta,
                previous_stock: stock,
                current_stock: stock + delta,
            };
            stock += delta;
            entry
        })
        .collect()
}

fn delta_strategy() -> impl Strategy<Value = i32> {
    // Nonzero deltas only; zero is rejected by validation
    prop_oneof![1i32..=50, -50i32..=-1]
}

mod ledger_invariants {
    use super::*;

    #[test]
    fn test_delta_invariant_holds_per_entry() {
        let entries = replay(10, &[5, -3, -7, 20]);
        for entry in &entries {
            assert_eq!(
                entry.current_stock,
                entry.previous_stock + entry.quantity
            );
        }
    }

    #[test]
    fn test_entries_chain() {
        let entries = replay(10, &[5, -3, -7, 20]);
        for pair in entries.windows(2) {
            assert_eq!(pair[1].previous_stock, pair[0].current_stock);
        }
    }

    #[test]
    fn test_final_stock_matches_sum_of_deltas() {
        let deltas = [5, -3, -7, 20];
        let entries = replay(10, &deltas);
        let final_stock = entries.last().unwrap().current_stock;
        assert_eq!(final_stock, 10 + deltas.iter().sum::<i32>());
    }

    #[test]
    fn test_manual_adjustment_may_go_negative() {
        // The manual path does not refuse to cross zero
        let entries = replay(3, &[-10]);
        assert_eq!(entries[0].current_stock, -7);
    }

    proptest! {
        /// Every entry satisfies current = previous + quantity
        #[test]
        fn prop_delta_invariant(
            initial in 0i32..1000,
            deltas in prop::collection::vec(delta_strategy(), 1..30),
        ) {
            for entry in replay(initial, &deltas) {
                prop_assert_eq!(entry.current_stock, entry.previous_stock + entry.quantity);
            }
        }

        /// Replaying the ledger from the initial stock reconstructs the
        /// final stock exactly
        #[test]
        fn prop_replay_reconstructs_stock(
            initial in 0i32..1000,
            deltas in prop::collection::vec(delta_strategy(), 1..30),
        ) {
            let entries = replay(initial, &deltas);
            let mut stock = initial;
            for entry in &entries {
                prop_assert_eq!(entry.previous_stock, stock);
                stock += entry.quantity;
            }
            prop_assert_eq!(stock, entries.last().unwrap().current_stock);
        }

        /// The entry type always matches the delta sign
        #[test]
        fn prop_type_matches_delta_sign(
            initial in 0i32..1000,
            deltas in prop::collection::vec(delta_strategy(), 1..30),
        ) {
            for entry in replay(initial, &deltas) {
                let expected = if entry.quantity > 0 {
                    StockTransactionType::In
                } else {
                    StockTransactionType::Out
                };
                prop_assert_eq!(entry.transaction_type, expected);
            }
        }
    }
}

mod adjustment_validation {
    use super::*;

    #[test]
    fn test_zero_delta_rejected() {
        assert!(validate_stock_delta(0).is_err());
    }

    #[test]
    fn test_nonzero_deltas_accepted() {
        assert!(validate_stock_delta(1).is_ok());
        assert!(validate_stock_delta(-1).is_ok());
    }

    #[test]
    fn test_reason_required() {
        assert!(validate_reason("restock delivery").is_ok());
        assert!(validate_reason("").is_err());
        assert!(validate_reason("   ").is_err());
    }

    #[test]
    fn test_reason_length_limit() {
        assert!(validate_reason(&"a".repeat(255)).is_ok());
        assert!(validate_reason(&"a".repeat(256)).is_err());
    }
}

mod low_stock {
    use super::*;

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
    fn test_low_stock_at_boundary() {
        // Low stock is inclusive: current == minimum counts as low
        assert!(inventory(5, 5).is_low_stock());
        assert!(inventory(4, 5).is_low_stock());
        assert!(!inventory(6, 5).is_low_stock());
    }

    #[test]
    fn test_negative_stock_is_low() {
        assert!(inventory(-2, 5).is_low_stock());
    }

    proptest! {
        /// Low stock is exactly current <= minimum, derived on the fly
        #[test]
        fn prop_low_stock_derivation(current in -100i32..200, minimum in 0i32..100) {
            prop_assert_eq!(
                inventory(current, minimum).is_low_stock(),
                current <= minimum
            );
        }
    }
}

mod bootstrap {
    use super::*;
    use std::collections::BTreeMap;

    const DEFAULT_STOCK: i32 = 0;
    const DEFAULT_MINIMUM: i32 = 5;

    /// Insert-if-absent, the way an inventory row is created for a new
    /// menu item; returns whether a row was inserted
    fn bootstrap(rows: &mut BTreeMap<Uuid, (i32, i32)>, menu_item_id: Uuid) -> bool {
        if rows.contains_key(&menu_item_id) {
            return false;
        }
        rows.insert(menu_item_id, (DEFAULT_STOCK, DEFAULT_MINIMUM));
        true
    }

    #[test]
    fn test_bootstrap_creates_zero_stock_row() {
        let item = Uuid::new_v4();
        let mut rows = BTreeMap::new();

        assert!(bootstrap(&mut rows, item));
        assert_eq!(rows[&item], (0, 5));
    }

    #[test]
    fn test_bootstrap_is_idempotent() {
        // A second call for the same item is a no-op, even after the
        // stock has moved since the first
        let item = Uuid::new_v4();
        let mut rows = BTreeMap::new();

        assert!(bootstrap(&mut rows, item));
        rows.insert(item, (42, 5));

        assert!(!bootstrap(&mut rows, item));
        assert_eq!(rows[&item], (42, 5));
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_bootstrap_does_not_touch_other_items() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut rows = BTreeMap::from([(a, (7, 3))]);

        assert!(bootstrap(&mut rows, b));
        assert_eq!(rows[&a], (7, 3));
        assert_eq!(rows[&b], (0, 5));
    }
}
