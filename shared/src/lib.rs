//! Shared types and models for the Invoice Management System
//!
//! Pure domain logic used by the backend server and its maintenance tools:
//! roles and permissions, invoice numbering, cart totals and input validation.

pub mod error;
pub mod models;
pub mod validation;

pub use error::*;
pub use models::*;
pub use validation::*;
