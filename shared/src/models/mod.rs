//! Domain models for the cafe point-of-sale backend

mod expense;
mod inventory;
mod menu;
mod order;
mod user;

pub use expense::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use user::*;
