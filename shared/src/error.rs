//! Errors raised by the pure domain logic

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown invoice status: {0}")]
    UnknownInvoiceStatus(String),

    #[error("Unknown cart status: {0}")]
    UnknownCartStatus(String),

    #[error("Malformed invoice number: {0}")]
    MalformedInvoiceNumber(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}
