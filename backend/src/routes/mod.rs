//! Route definitions for the Invoice Management System

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (public)
        .nest("/auth", auth_routes())
        // Everything below requires a valid access token
        .merge(protected_routes(state))
}

/// Authentication routes (public)
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/refresh", post(handlers::refresh))
        .route("/logout", post(handlers::logout))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/me/navigation", get(handlers::get_navigation))
        .route("/dashboard", get(handlers::get_dashboard))
        .nest("/users", user_routes())
        .nest("/items", item_routes())
        .nest("/cart", cart_routes())
        .nest("/invoices", invoice_routes())
        .route(
            "/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// User management routes (protected)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_users).post(handlers::create_user))
        .route("/vendors", get(handlers::list_vendors))
        .route(
            "/:user_id",
            get(handlers::get_user).put(handlers::update_user),
        )
        .route("/:user_id/deactivate", post(handlers::deactivate_user))
}

/// Inventory item routes (protected)
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items).post(handlers::create_item))
        .route("/catalog", get(handlers::browse_catalog))
        .route("/:item_id", get(handlers::get_item))
        .route("/:item_id/stock", put(handlers::update_stock))
}

/// Cart routes (protected)
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/items", post(handlers::add_to_cart))
        .route(
            "/items/:item_id",
            put(handlers::set_quantity).delete(handlers::remove_from_cart),
        )
        .route("/checkout", post(handlers::checkout))
}

/// Invoice routes (protected)
fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_invoices))
        .route("/:invoice_number", get(handlers::get_invoice))
        .route("/:invoice_number/pay", post(handlers::pay_invoice))
        .route("/:invoice_number/pdf", get(handlers::download_invoice_pdf))
}
