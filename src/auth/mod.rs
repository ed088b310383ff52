//! Authentication module for the inventory server
//!
//! Registration, login, and the token check that guards every inventory
//! mutation.

mod gate;
mod service;
pub mod handlers;

pub use gate::{AuthGate, CredentialLookup};
pub use service::{AuthService, Session};
