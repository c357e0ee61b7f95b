//! HTTP handlers for inventory item endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{Action, Resource};
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::item::{CatalogEntry, CreateItemInput, Item};
use crate::services::ItemService;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateItemRequest {
    #[validate(length(min = 1, max = 255, message = "Description is required"))]
    pub description: String,
    pub price: Decimal,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
    pub vendor_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStockRequest {
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,
}

/// List items visible to the caller
pub async fn list_items(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<Item>>> {
    current_user.0.require(Resource::Item, Action::View)?;

    let service = ItemService::new(state.db);
    let items = service.list_items(current_user.0.item_scope()).await?;
    Ok(Json(items))
}

/// Get an item by ID
pub async fn get_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
) -> AppResult<Json<Item>> {
    current_user.0.require(Resource::Item, Action::View)?;

    let service = ItemService::new(state.db);
    let item = service
        .get_item(current_user.0.item_scope(), item_id)
        .await?;
    Ok(Json(item))
}

/// Create an item
pub async fn create_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(body): Json<CreateItemRequest>,
) -> AppResult<(StatusCode, Json<Item>)> {
    current_user.0.require(Resource::Item, Action::Create)?;
    body.validate()?;

    let service = ItemService::new(state.db);
    let item = service
        .create_item(
            &current_user.0,
            CreateItemInput {
                description: body.description,
                price: body.price,
                stock: body.stock,
                vendor_id: body.vendor_id,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set the stock level of an item
pub async fn update_stock(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(item_id): Path<i64>,
    Json(body): Json<UpdateStockRequest>,
) -> AppResult<Json<Item>> {
    current_user.0.require(Resource::Item, Action::Edit)?;
    body.validate()?;

    let service = ItemService::new(state.db);
    let item = service
        .update_stock(&current_user.0, item_id, body.stock)
        .await?;
    Ok(Json(item))
}

/// Catalog of items customers can add to their cart
pub async fn browse_catalog(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<Json<Vec<CatalogEntry>>> {
    current_user.0.require(Resource::Cart, Action::View)?;

    let service = ItemService::new(state.db);
    let entries = service.browse_catalog().await?;
    Ok(Json(entries))
}
