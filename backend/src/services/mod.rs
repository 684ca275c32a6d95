//! Business logic services

pub mod auth;
pub mod expense;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod report;

pub use auth::AuthService;
pub use expense::ExpenseService;
pub use inventory::InventoryService;
pub use menu::MenuService;
pub use order::OrderService;
pub use report::ReportService;
