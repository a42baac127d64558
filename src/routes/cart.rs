use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::{
    auth::Identity,
    cache::{cart_key, LIST_TTL_SECS},
    error::AppError,
    extract::{object_id, parse_object_id, ValidatedJson},
    models::{CartItem, CartRecordView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartRequest {
    #[validate(custom(function = object_id))]
    pub product_id: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i64,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CartUpdate {
    #[validate(custom(function = object_id))]
    pub product_id: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i64>,
}

pub async fn list(
    identity: Identity,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let cache_key = cart_key(&identity.user_id.to_hex());

    if let Some(cached) = state.cache.get(&cache_key).await? {
        let carts: Value = serde_json::from_str(&cached)?;
        let length = carts.as_array().map(Vec::len).unwrap_or_default();
        return Ok(ok(
            StatusCode::OK,
            "Cart fetched successfully",
            json!({ "length": length, "carts": carts }),
        ));
    }

    let carts = store::populated_cart(&state.db, identity.user_id).await?;

    if carts.is_empty() {
        return Err(AppError::NotFound(
            "No cart found for this user".to_string(),
        ));
    }

    let serialized = serde_json::to_string(&carts)?;
    state
        .cache
        .put(&cache_key, &serialized, LIST_TTL_SECS)
        .await?;

    info!("Cart fetched successfully");
    Ok(ok(
        StatusCode::OK,
        "Cart fetched successfully",
        json!({ "length": carts.len(), "carts": carts }),
    ))
}

pub async fn add(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<CartRequest>,
) -> Result<Response, AppError> {
    info!("add to cart endpoint hit....");

    let mut item = CartItem::new(
        identity.user_id,
        parse_object_id(&payload.product_id)?,
        payload.quantity,
    );

    let inserted = store::carts(&state.db).insert_one(&item).await?;
    item.id = inserted.inserted_id.as_object_id();

    state
        .cache
        .invalidate(&cart_key(&identity.user_id.to_hex()))
        .await?;

    info!("cart created successfully");
    Ok(ok(
        StatusCode::CREATED,
        "Product added to cart successfully",
        json!({ "cart": CartRecordView::from(item) }),
    ))
}

pub async fn update(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<CartUpdate>,
) -> Result<Response, AppError> {
    let item_id = parse_object_id(&id)?;
    let collection = store::carts(&state.db);

    let item = collection
        .find_one(doc! { "_id": item_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    if item.user_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to update this cart".to_string(),
        ));
    }

    let mut changes = doc! { "updated_at": mongodb::bson::DateTime::now() };
    if let Some(product_id) = &payload.product_id {
        changes.insert("product_id", parse_object_id(product_id)?);
    }
    if let Some(quantity) = payload.quantity {
        changes.insert("quantity", quantity);
    }

    collection
        .update_one(doc! { "_id": item_id }, doc! { "$set": changes })
        .await?;

    let updated = collection
        .find_one(doc! { "_id": item_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    state
        .cache
        .invalidate(&cart_key(&identity.user_id.to_hex()))
        .await?;

    info!("Cart item updated successfully");
    Ok(ok(
        StatusCode::OK,
        "Cart item updated successfully",
        json!({ "updatedCart": CartRecordView::from(updated) }),
    ))
}

pub async fn remove(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let item_id = parse_object_id(&id)?;
    let collection = store::carts(&state.db);

    let item = collection
        .find_one(doc! { "_id": item_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Cart item not found".to_string()))?;

    if item.user_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this cart".to_string(),
        ));
    }

    collection.delete_one(doc! { "_id": item_id }).await?;

    state
        .cache
        .invalidate(&cart_key(&identity.user_id.to_hex()))
        .await?;

    info!("Cart deleted successfully");
    Ok(ok(
        StatusCode::OK,
        "Cart deleted successfully",
        json!({}),
    ))
}
