use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use validator::Validate;

use crate::{
    auth::AdminIdentity,
    cache::{self, product_key, product_list_key, DETAIL_TTL_SECS, LIST_TTL_SECS},
    error::AppError,
    extract::{object_id, parse_object_id, ValidatedJson},
    models::{Product, ProductView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize)]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// The cached list payload: totals plus the page itself.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProductPage {
    total_products: u64,
    total_pages: u64,
    current_page: u64,
    limit: u64,
    all_products: Vec<ProductView>,
}

#[derive(Deserialize, Validate)]
pub struct ProductRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: String,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: f64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i64,
    #[validate(custom(function = object_id))]
    pub category: String,
    #[validate(custom(function = object_id))]
    pub brand: String,
    #[validate(custom(function = object_id))]
    pub gender: String,
}

#[derive(Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: Option<String>,
    #[validate(length(min = 10, message = "Description must be at least 10 characters"))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Price must be positive"))]
    pub price: Option<f64>,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: Option<i64>,
    #[validate(custom(function = object_id))]
    pub category: Option<String>,
    #[validate(custom(function = object_id))]
    pub brand: Option<String>,
    #[validate(custom(function = object_id))]
    pub gender: Option<String>,
}

/// Every product write also touches what cached search results embed, so
/// both namespaces go.
async fn invalidate_product_caches(state: &AppState) -> Result<(), AppError> {
    state
        .cache
        .invalidate_namespace(cache::PRODUCTS_NS)
        .await?;
    state.cache.invalidate_namespace(cache::SEARCH_NS).await
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<Pagination>,
) -> Result<Response, AppError> {
    let page = pagination.page.unwrap_or(1).max(1);
    let limit = pagination.limit.unwrap_or(10).clamp(1, 100);
    let skip = (page - 1) * limit;

    let cache_key = product_list_key(page, limit);

    if let Some(cached) = state.cache.get(&cache_key).await? {
        let products: Value = serde_json::from_str(&cached)?;
        return Ok(ok(
            StatusCode::OK,
            "Products fetched successfully",
            json!({ "products": products }),
        ));
    }

    let collection = store::products(&state.db);
    let total_products = collection.count_documents(doc! {}).await?;

    let products: Vec<Product> = collection
        .find(doc! {})
        .sort(doc! { "created_at": -1 })
        .skip(skip)
        .limit(limit as i64)
        .await?
        .try_collect()
        .await?;

    let page_payload = ProductPage {
        total_products,
        total_pages: total_products.div_ceil(limit),
        current_page: page,
        limit,
        all_products: products.into_iter().map(ProductView::from).collect(),
    };

    if page_payload.all_products.is_empty() {
        return Ok(ok(
            StatusCode::OK,
            "No products available at this moment",
            json!({ "products": page_payload }),
        ));
    }

    // Cache the serialized payload and respond from the same bytes, so a
    // later cache hit is byte-identical to this response.
    let serialized = serde_json::to_string(&page_payload)?;
    state
        .cache
        .put(&cache_key, &serialized, LIST_TTL_SECS)
        .await?;

    let products: Value = serde_json::from_str(&serialized)?;

    info!("All products fetched successfully");
    Ok(ok(
        StatusCode::OK,
        "Products fetched successfully",
        json!({ "products": products }),
    ))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product_id = parse_object_id(&id)?;
    let cache_key = product_key(&id);

    if let Some(cached) = state.cache.get(&cache_key).await? {
        let product: Value = serde_json::from_str(&cached)?;
        return Ok(ok(
            StatusCode::OK,
            "Product fetched successfully",
            json!({ "product": product }),
        ));
    }

    let product = store::products(&state.db)
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let serialized = serde_json::to_string(&ProductView::from(product))?;
    state
        .cache
        .put(&cache_key, &serialized, DETAIL_TTL_SECS)
        .await?;

    let product: Value = serde_json::from_str(&serialized)?;

    info!("Product fetched successfully");
    Ok(ok(
        StatusCode::OK,
        "Product fetched successfully",
        json!({ "product": product }),
    ))
}

pub async fn create(
    AdminIdentity(identity): AdminIdentity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> Result<Response, AppError> {
    info!("Create product endpoint hit....");

    let now = mongodb::bson::DateTime::now();
    let mut product = Product {
        id: None,
        user_id: identity.user_id,
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        category: parse_object_id(&payload.category)?,
        brand: parse_object_id(&payload.brand)?,
        gender: parse_object_id(&payload.gender)?,
        images: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let inserted = store::products(&state.db).insert_one(&product).await?;
    product.id = inserted.inserted_id.as_object_id();

    invalidate_product_caches(&state).await?;

    info!("Product created successfully");
    Ok(ok(
        StatusCode::CREATED,
        "Product created successfully",
        json!({ "product": ProductView::from(product) }),
    ))
}

pub async fn update(
    AdminIdentity(identity): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProductUpdate>,
) -> Result<Response, AppError> {
    let product_id = parse_object_id(&id)?;
    let collection = store::products(&state.db);

    let product = collection
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.user_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to update this product".to_string(),
        ));
    }

    let changes = update_document(&payload)?;
    collection
        .update_one(doc! { "_id": product_id }, doc! { "$set": changes })
        .await?;

    let updated = collection
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    invalidate_product_caches(&state).await?;

    info!("Product updated successfully");
    Ok(ok(
        StatusCode::OK,
        "Product updated successfully",
        json!({ "updatedProduct": ProductView::from(updated) }),
    ))
}

fn update_document(payload: &ProductUpdate) -> Result<Document, AppError> {
    let mut changes = doc! { "updated_at": mongodb::bson::DateTime::now() };

    if let Some(name) = &payload.name {
        changes.insert("name", name);
    }
    if let Some(description) = &payload.description {
        changes.insert("description", description);
    }
    if let Some(price) = payload.price {
        changes.insert("price", price);
    }
    if let Some(stock) = payload.stock {
        changes.insert("stock", stock);
    }
    if let Some(category) = &payload.category {
        changes.insert("category", parse_object_id(category)?);
    }
    if let Some(brand) = &payload.brand {
        changes.insert("brand", parse_object_id(brand)?);
    }
    if let Some(gender) = &payload.gender {
        changes.insert("gender", parse_object_id(gender)?);
    }

    Ok(changes)
}

/// Cascade: reviews, then media (provider object before record), then
/// the product itself. Not atomic — a failure partway through stops the
/// cascade and surfaces, leaving whatever was already removed gone.
pub async fn remove(
    AdminIdentity(identity): AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product_id = parse_object_id(&id)?;
    let collection = store::products(&state.db);

    let product = collection
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    if product.user_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this product".to_string(),
        ));
    }

    store::reviews(&state.db)
        .delete_many(doc! { "product_id": product_id })
        .await?;

    let media_records: Vec<crate::models::Media> = store::media(&state.db)
        .find(doc! { "product_id": product_id })
        .await?
        .try_collect()
        .await?;
    for record in media_records {
        state.media.delete(&record.asset_id).await?;
        if let Some(media_id) = record.id {
            store::media(&state.db)
                .delete_one(doc! { "_id": media_id })
                .await?;
        }
    }

    collection.delete_one(doc! { "_id": product_id }).await?;

    invalidate_product_caches(&state).await?;

    info!("Product deleted successfully");
    Ok(ok(
        StatusCode::OK,
        "Product deleted successfully",
        json!({}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn full_request() -> ProductRequest {
        ProductRequest {
            name: "Trail runner".to_string(),
            description: "Lightweight trail running shoe".to_string(),
            price: 129.99,
            stock: 5,
            category: ObjectId::new().to_hex(),
            brand: ObjectId::new().to_hex(),
            gender: ObjectId::new().to_hex(),
        }
    }

    #[test]
    fn valid_product_passes_validation() {
        assert!(full_request().validate().is_ok());
    }

    #[test]
    fn zero_price_and_short_name_fail_validation() {
        let mut request = full_request();
        request.price = 0.0;
        request.name = "ab".to_string();

        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("price"));
        assert!(errors.errors().contains_key("name"));
    }

    #[test]
    fn bad_reference_ids_fail_validation() {
        let mut request = full_request();
        request.category = "not-an-id".to_string();
        assert!(request.validate().is_err());
    }

    #[test]
    fn partial_update_only_sets_provided_fields() {
        let payload = ProductUpdate {
            name: None,
            description: None,
            price: Some(79.5),
            stock: None,
            category: None,
            brand: None,
            gender: None,
        };

        let changes = update_document(&payload).unwrap();
        assert!(changes.contains_key("price"));
        assert!(changes.contains_key("updated_at"));
        assert!(!changes.contains_key("name"));
        assert!(!changes.contains_key("stock"));
    }

    #[test]
    fn empty_update_still_bumps_updated_at() {
        let payload = ProductUpdate {
            name: None,
            description: None,
            price: None,
            stock: None,
            category: None,
            brand: None,
            gender: None,
        };

        let changes = update_document(&payload).unwrap();
        assert_eq!(changes.len(), 1);
        assert!(changes.contains_key("updated_at"));
    }
}
