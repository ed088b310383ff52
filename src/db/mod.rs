//! Database module for the inventory server
//!
//! One supervised PostgreSQL connection and the stores that run their
//! statements over it.

pub mod credentials;
pub mod inventory;
pub mod models;
pub mod operations;
pub mod schema;
pub mod supervisor;

pub use credentials::CredentialStore;
pub use inventory::{InventoryStore, UPDATE_BATCH_SIZE};
pub use models::{InventoryItem, ItemUpdate, User};
pub use operations::DbOperations;
pub use supervisor::ConnectionSupervisor;
