//! Per-user inventory endpoints and the service behind them.

mod service;
pub mod handlers;

pub use service::InventoryService;
