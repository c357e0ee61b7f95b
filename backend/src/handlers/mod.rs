//! HTTP request handlers

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod health;
pub mod invoices;
pub mod items;
pub mod navigation;
pub mod profile;
pub mod users;

pub use auth::{login, logout, refresh, register};
pub use cart::{add_to_cart, checkout, clear_cart, get_cart, remove_from_cart, set_quantity};
pub use dashboard::get_dashboard;
pub use health::health_check;
pub use invoices::{download_invoice_pdf, get_invoice, list_invoices, pay_invoice};
pub use items::{browse_catalog, create_item, get_item, list_items, update_stock};
pub use navigation::get_navigation;
pub use profile::{get_profile, update_profile};
pub use users::{create_user, deactivate_user, get_user, list_users, list_vendors, update_user};
