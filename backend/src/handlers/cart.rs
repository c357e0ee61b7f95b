//! HTTP handlers for the customer cart

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Action, Cart, Resource};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::cart::AddToCartInput;
use crate::services::invoice::Invoice;
use crate::services::{CartService, InvoiceService};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub item_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SetQuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Get the active cart
pub async fn get_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Cart>> {
    current_user.0.require(Resource::Cart, Action::View)?;

    let service = CartService::new(state.db);
    let cart = service.get_cart(current_user.0.user_id).await?;
    Ok(Json(cart))
}

/// Add an item to the cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<AddToCartRequest>,
) -> AppResult<Json<Cart>> {
    current_user.0.require(Resource::Cart, Action::Edit)?;
    body.validate()?;

    let service = CartService::new(state.db);
    let cart = service
        .add_to_cart(
            current_user.0.user_id,
            AddToCartInput {
                item_id: body.item_id,
                quantity: body.quantity,
            },
        )
        .await?;
    Ok(Json(cart))
}

/// Change the quantity of a cart line
pub async fn set_quantity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
    Json(body): Json<SetQuantityRequest>,
) -> AppResult<Json<Cart>> {
    current_user.0.require(Resource::Cart, Action::Edit)?;
    body.validate()?;

    let service = CartService::new(state.db);
    let cart = service
        .set_quantity(current_user.0.user_id, item_id, body.quantity)
        .await?;
    Ok(Json(cart))
}

/// Remove an item from the cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<Cart>> {
    current_user.0.require(Resource::Cart, Action::Edit)?;

    let service = CartService::new(state.db);
    let cart = service
        .remove_from_cart(current_user.0.user_id, item_id)
        .await?;
    Ok(Json(cart))
}

/// Empty the cart
pub async fn clear_cart(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<StatusCode> {
    current_user.0.require(Resource::Cart, Action::Edit)?;

    let service = CartService::new(state.db);
    service.clear_cart(current_user.0.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Convert the cart into an invoice
pub async fn checkout(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    current_user.0.require(Resource::Cart, Action::Edit)?;

    let service = InvoiceService::new(state.db.clone(), &state.config);
    let invoice = service
        .generate_invoice_from_cart(current_user.0.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}
