//! HTTP handlers

mod auth;
mod expense;
mod health;
mod inventory;
mod menu;
mod order;
mod report;

pub use auth::*;
pub use expense::*;
pub use health::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use report::*;
