//! Business logic services for the Invoice Management System

pub mod auth;
pub mod cart;
pub mod dashboard;
pub mod invoice;
pub mod item;
pub mod pdf;
pub mod profile;
pub mod user;

pub use auth::AuthService;
pub use cart::CartService;
pub use dashboard::DashboardService;
pub use invoice::InvoiceService;
pub use item::ItemService;
pub use profile::ProfileService;
pub use user::UserService;
