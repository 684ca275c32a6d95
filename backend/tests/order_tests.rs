//! Order lifecycle tests
//!
//! Unit and property-based tests for:
//! - Order total arithmetic (total = sum of line totals)
//! - Lifecycle state machine closure
//! - Completion-time stock checks over aggregated line quantities

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{validate_quantity, OrderStatus, PaymentStatus};

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Price and quantity of one order line
#[derive(Debug, Clone)]
struct Line {
    unit_price: Decimal,
    quantity: i32,
}

impl Line {
    fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

fn line_strategy() -> impl Strategy<Value = Line> {
    // Prices in cents between 0.50 and 500.00, quantities 1..=20
    (50i64..50_000, 1i32..=20).prop_map(|(cents, quantity)| Line {
        unit_price: Decimal::new(cents, 2),
        quantity,
    })
}

mod order_totals {
    use super::*;

    #[test]
    fn test_single_line_total() {
        let line = Line {
            unit_price: dec("4.50"),
            quantity: 3,
        };
        assert_eq!(line.total(), dec("13.50"));
    }

    #[test]
    fn test_order_total_is_sum_of_lines() {
        let lines = vec![
            Line {
                unit_price: dec("4.50"),
                quantity: 2,
            },
            Line {
                unit_price: dec("3.25"),
                quantity: 1,
            },
            Line {
                unit_price: dec("2.00"),
                quantity: 4,
            },
        ];

        let total: Decimal = lines.iter().map(Line::total).sum();
        assert_eq!(total, dec("20.25"));
    }

    #[test]
    fn test_unit_price_snapshot_is_independent_of_later_changes() {
        // The line keeps the price it was created with
        let line = Line {
            unit_price: dec("4.50"),
            quantity: 2,
        };
        let snapshot_total = line.total();

        let new_menu_price = dec("5.00");
        assert_ne!(line.unit_price, new_menu_price);
        assert_eq!(line.total(), snapshot_total);
    }

    proptest! {
        /// Total equals the sum of line totals for any set of lines
        #[test]
        fn prop_total_is_sum_of_line_totals(lines in prop::collection::vec(line_strategy(), 1..10)) {
            let total: Decimal = lines.iter().map(Line::total).sum();
            let recomputed: Decimal = lines
                .iter()
                .map(|l| l.unit_price * Decimal::from(l.quantity))
                .sum();
            prop_assert_eq!(total, recomputed);
        }

        /// Adding a line increases the total by exactly that line's total
        #[test]
        fn prop_adding_line_adds_line_total(
            lines in prop::collection::vec(line_strategy(), 1..8),
            extra in line_strategy(),
        ) {
            let before: Decimal = lines.iter().map(Line::total).sum();
            let mut with_extra = lines.clone();
            with_extra.push(extra.clone());
            let after: Decimal = with_extra.iter().map(Line::total).sum();
            prop_assert_eq!(after, before + extra.total());
        }

        /// Every accepted line quantity is strictly positive
        #[test]
        fn prop_valid_quantities_accepted(quantity in 1i32..10_000) {
            prop_assert!(validate_quantity(quantity).is_ok());
        }

        #[test]
        fn prop_non_positive_quantities_rejected(quantity in -10_000i32..=0) {
            prop_assert!(validate_quantity(quantity).is_err());
        }
    }
}

mod state_machine {
    use super::*;

    const ALL_STATES: [OrderStatus; 4] = [
        OrderStatus::Draft,
        OrderStatus::Pending,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    #[test]
    fn test_only_draft_accepts_items() {
        for status in ALL_STATES {
            assert_eq!(status.accepts_items(), status == OrderStatus::Draft);
        }
    }

    #[test]
    fn test_terminal_states_cannot_complete() {
        assert!(!OrderStatus::Completed.can_complete());
        assert!(!OrderStatus::Cancelled.can_complete());
    }

    #[test]
    fn test_cancelled_is_fully_terminal() {
        // No operation is legal on a cancelled order
        let status = OrderStatus::Cancelled;
        assert!(!status.accepts_items());
        assert!(!status.can_complete());
        assert!(!status.can_cancel());
    }

    #[test]
    fn test_completed_order_can_still_be_cancelled() {
        // Status-only flip; the completion's inventory decrement stays
        assert!(OrderStatus::Completed.can_cancel());
    }

    /// The cancel decision as made against the locked status: cancelling
    /// a completed order is reserved for managers
    fn cancel_permitted(status: OrderStatus, is_manager: bool) -> bool {
        status.can_cancel() && (status != OrderStatus::Completed || is_manager)
    }

    #[test]
    fn test_cancelling_completed_requires_manager() {
        assert!(!cancel_permitted(OrderStatus::Completed, false));
        assert!(cancel_permitted(OrderStatus::Completed, true));
    }

    #[test]
    fn test_cancelling_open_orders_needs_no_manager() {
        assert!(cancel_permitted(OrderStatus::Draft, false));
        assert!(cancel_permitted(OrderStatus::Pending, false));
        assert!(!cancel_permitted(OrderStatus::Cancelled, true));
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Draft).unwrap(),
            "\"draft\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
    }

    proptest! {
        /// Completing is legal exactly from draft and pending
        #[test]
        fn prop_completion_domain(idx in 0usize..4) {
            let status = ALL_STATES[idx];
            let expected = matches!(status, OrderStatus::Draft | OrderStatus::Pending);
            prop_assert_eq!(status.can_complete(), expected);
        }
    }
}

mod completion_stock_checks {
    use super::*;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    /// Aggregate line quantities per menu item, the way completion checks
    /// stock against the full set of lines together
    fn aggregate_demands(lines: &[(Uuid, i32)]) -> BTreeMap<Uuid, i64> {
        let mut demands = BTreeMap::new();
        for (menu_item_id, quantity) in lines {
            *demands.entry(*menu_item_id).or_insert(0i64) += i64::from(*quantity);
        }
        demands
    }

    /// Check-then-deduct over aggregated demands; returns the new stocks
    /// or the first shortfall
    fn try_complete(
        stocks: &BTreeMap<Uuid, i32>,
        demands: &BTreeMap<Uuid, i64>,
    ) -> Result<BTreeMap<Uuid, i32>, (Uuid, i32, i64)> {
        let mut result = stocks.clone();
        for (item, requested) in demands {
            let available = *stocks.get(item).unwrap_or(&0);
            if i64::from(available) < *requested {
                return Err((*item, available, *requested));
            }
            result.insert(*item, available - *requested as i32);
        }
        Ok(result)
    }

    #[test]
    fn test_duplicate_lines_are_checked_together() {
        // Stock 10, two lines of 2 and 9 for the same item: the aggregate
        // of 11 must be rejected even though each line fits alone
        let item = Uuid::new_v4();
        let stocks = BTreeMap::from([(item, 10)]);
        let demands = aggregate_demands(&[(item, 2), (item, 9)]);

        let result = try_complete(&stocks, &demands);
        assert_eq!(result, Err((item, 10, 11)));
    }

    #[test]
    fn test_aggregate_demand_beyond_i32_is_rejected() {
        // Summed demands are i64 and can exceed i32::MAX; the comparison
        // must stay in i64 or the shortfall is masked by wraparound
        let item = Uuid::new_v4();
        let stocks = BTreeMap::from([(item, 10)]);

        let demands = BTreeMap::from([(item, (1i64 << 32) + 5)]);
        assert_eq!(
            try_complete(&stocks, &demands),
            Err((item, 10, (1i64 << 32) + 5))
        );

        let demands = BTreeMap::from([(item, 1i64 << 31)]);
        assert_eq!(try_complete(&stocks, &demands), Err((item, 10, 1i64 << 31)));
    }

    #[test]
    fn test_exact_stock_is_sufficient() {
        let item = Uuid::new_v4();
        let stocks = BTreeMap::from([(item, 5)]);
        let demands = aggregate_demands(&[(item, 5)]);

        let after = try_complete(&stocks, &demands).unwrap();
        assert_eq!(after[&item], 0);
    }

    #[test]
    fn test_shortfall_leaves_no_partial_deduction() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let stocks = BTreeMap::from([(a, 10), (b, 1)]);
        let demands = aggregate_demands(&[(a, 3), (b, 2)]);

        // The whole completion fails; stocks are untouched
        assert!(try_complete(&stocks, &demands).is_err());
    }

    proptest! {
        /// A successful completion never drives any stock below zero
        #[test]
        fn prop_completion_never_oversells(
            stock_a in 0i32..50,
            stock_b in 0i32..50,
            qty_a in 1i32..30,
            qty_b in 1i32..30,
        ) {
            let a = Uuid::from_u128(1);
            let b = Uuid::from_u128(2);
            let stocks = BTreeMap::from([(a, stock_a), (b, stock_b)]);
            let demands = aggregate_demands(&[(a, qty_a), (b, qty_b)]);

            match try_complete(&stocks, &demands) {
                Ok(after) => {
                    prop_assert!(after.values().all(|&s| s >= 0));
                    prop_assert_eq!(after[&a], stock_a - qty_a);
                    prop_assert_eq!(after[&b], stock_b - qty_b);
                }
                Err((_, available, requested)) => {
                    prop_assert!(i64::from(available) < requested);
                }
            }
        }

        /// Two sequential completions against the same item compose: the
        /// second sees the first's deduction, so their sum never exceeds
        /// the initial stock
        #[test]
        fn prop_sequential_completions_compose(
            stock in 0i32..40,
            qty_1 in 1i32..25,
            qty_2 in 1i32..25,
        ) {
            let item = Uuid::from_u128(7);
            let stocks = BTreeMap::from([(item, stock)]);

            let first = try_complete(&stocks, &aggregate_demands(&[(item, qty_1)]));
            let after_first = match first {
                Ok(after) => after,
                Err(_) => stocks.clone(),
            };
            let second = try_complete(&after_first, &aggregate_demands(&[(item, qty_2)]));
            let after_second = match second {
                Ok(after) => after,
                Err(_) => after_first.clone(),
            };

            let sold = stock - after_second[&item];
            prop_assert!(sold <= stock);
            prop_assert!(after_second[&item] >= 0);
        }
    }
}
