//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Order lifecycle states.
///
/// `draft` is the only state that accepts item additions. `completed` and
/// `cancelled` are terminal; no transition is defined out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Draft,
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Items may only be added while the order is a draft.
    pub fn accepts_items(&self) -> bool {
        matches!(self, OrderStatus::Draft)
    }

    /// Completion is legal from draft or pending only.
    pub fn can_complete(&self) -> bool {
        matches!(self, OrderStatus::Draft | OrderStatus::Pending)
    }

    /// Cancellation is rejected only when the order is already cancelled.
    /// Cancelling a completed order flips the status without reversing
    /// inventory; the cancel path restricts that to managers.
    pub fn can_cancel(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

/// Payment methods accepted at the register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    Qris,
    Transfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
        }
    }
}

/// Ledger entry types, derived from the sign of the applied delta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "stock_transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StockTransactionType {
    In,
    Out,
    Adjustment,
}

impl StockTransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockTransactionType::In => "in",
            StockTransactionType::Out => "out",
            StockTransactionType::Adjustment => "adjustment",
        }
    }

    /// Classify a signed stock delta. Zero deltas are rejected upstream by
    /// validation, so `Adjustment` is only reachable for explicit
    /// corrections recorded with no quantity change.
    pub fn from_delta(delta: i32) -> Self {
        if delta > 0 {
            StockTransactionType::In
        } else if delta < 0 {
            StockTransactionType::Out
        } else {
            StockTransactionType::Adjustment
        }
    }
}

/// User roles for role-based access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Manager,
    Cashier,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Manager => "manager",
            UserRole::Cashier => "cashier",
        }
    }
}

/// Limit/offset pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
        }
    }
}

impl Pagination {
    /// Clamp caller-supplied values into a sane range.
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = limit.unwrap_or(20).clamp(1, 100);
        let offset = offset.unwrap_or(0).max(0);
        Self { limit, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_accepts_items() {
        assert!(OrderStatus::Draft.accepts_items());
        assert!(!OrderStatus::Pending.accepts_items());
        assert!(!OrderStatus::Completed.accepts_items());
        assert!(!OrderStatus::Cancelled.accepts_items());
    }

    #[test]
    fn test_completion_legal_states() {
        assert!(OrderStatus::Draft.can_complete());
        assert!(OrderStatus::Pending.can_complete());
        assert!(!OrderStatus::Completed.can_complete());
        assert!(!OrderStatus::Cancelled.can_complete());
    }

    #[test]
    fn test_cancel_rejected_only_when_cancelled() {
        assert!(OrderStatus::Draft.can_cancel());
        assert!(OrderStatus::Pending.can_cancel());
        assert!(OrderStatus::Completed.can_cancel());
        assert!(!OrderStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_transaction_type_from_delta() {
        assert_eq!(StockTransactionType::from_delta(5), StockTransactionType::In);
        assert_eq!(StockTransactionType::from_delta(-5), StockTransactionType::Out);
        assert_eq!(
            StockTransactionType::from_delta(0),
            StockTransactionType::Adjustment
        );
    }

    #[test]
    fn test_pagination_clamping() {
        let p = Pagination::clamped(Some(500), Some(-3));
        assert_eq!(p.limit, 100);
        assert_eq!(p.offset, 0);

        let p = Pagination::clamped(None, None);
        assert_eq!(p.limit, 20);
        assert_eq!(p.offset, 0);
    }
}
