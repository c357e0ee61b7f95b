//! Domain models for the Invoice Management System

mod cart;
mod invoice;
mod role;

pub use cart::*;
pub use invoice::*;
pub use role::*;
