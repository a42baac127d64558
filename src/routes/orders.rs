use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::Identity,
    cache::cart_key,
    error::AppError,
    extract::ValidatedJson,
    models::{CartItem, Order, OrderStatus, OrderView, Product, ShippingAddress},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddressRequest {
    #[validate(length(min = 3, message = "Street must be at least 3 characters"))]
    pub street: String,
    #[validate(length(min = 2, message = "City must be at least 2 characters"))]
    pub city: String,
    #[validate(length(min = 4, message = "Postal code must be at least 4 characters"))]
    pub postal_code: String,
    #[validate(length(min = 2, message = "Country must be at least 2 characters"))]
    pub country: String,
}

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[validate(nested)]
    pub shipping_address: AddressRequest,
}

/// Non-atomic by design of the source system: read cart, compute totals,
/// insert the order, clear the cart. A failure after the insert leaves
/// the cart populated alongside the recorded order.
pub async fn create(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<OrderRequest>,
) -> Result<Response, AppError> {
    info!("create order endpoint hit...");

    let cart_items = store::cart_with_products(&state.db, identity.user_id).await?;
    if cart_items.is_empty() {
        return Err(AppError::BadRequest(
            "No items in cart to create an order".to_string(),
        ));
    }

    let (total_price, product_ids, total_quantity) = order_totals(&cart_items);

    let now = mongodb::bson::DateTime::now();
    let mut order = Order {
        id: None,
        user_id: identity.user_id,
        product_ids,
        total_price,
        shipping_address: ShippingAddress {
            street: payload.shipping_address.street,
            city: payload.shipping_address.city,
            postal_code: payload.shipping_address.postal_code,
            country: payload.shipping_address.country,
        },
        status: OrderStatus::Pending,
        quantity: total_quantity,
        created_at: now,
        updated_at: now,
    };

    let inserted = store::orders(&state.db).insert_one(&order).await?;
    order.id = inserted.inserted_id.as_object_id();

    store::carts(&state.db)
        .delete_many(doc! { "user_id": identity.user_id })
        .await?;

    state
        .cache
        .invalidate(&cart_key(&identity.user_id.to_hex()))
        .await?;

    info!("Order created successfully");
    Ok(ok(
        StatusCode::CREATED,
        "Order created successfully",
        json!({ "order": OrderView::from(order) }),
    ))
}

fn order_totals(items: &[(CartItem, Product)]) -> (f64, Vec<ObjectId>, i64) {
    let mut total_price = 0.0;
    let mut product_ids = Vec::with_capacity(items.len());
    let mut total_quantity = 0;

    for (item, product) in items {
        total_price += product.price * item.quantity as f64;
        if let Some(id) = product.id {
            product_ids.push(id);
        }
        total_quantity += item.quantity;
    }

    (total_price, product_ids, total_quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(price: f64) -> Product {
        let now = mongodb::bson::DateTime::now();
        Product {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            name: "Product".to_string(),
            description: "A product description".to_string(),
            price,
            stock: 10,
            category: ObjectId::new(),
            brand: ObjectId::new(),
            gender: ObjectId::new(),
            images: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn item(quantity: i64, product: &Product) -> CartItem {
        CartItem::new(ObjectId::new(), product.id.unwrap(), quantity)
    }

    #[test]
    fn totals_sum_price_times_quantity() {
        let a = product(10.0);
        let b = product(2.5);
        let items = vec![(item(2, &a), a.clone()), (item(4, &b), b.clone())];

        let (total_price, product_ids, quantity) = order_totals(&items);
        assert_eq!(total_price, 30.0);
        assert_eq!(quantity, 6);
        assert_eq!(product_ids, vec![a.id.unwrap(), b.id.unwrap()]);
    }

    #[test]
    fn empty_cart_totals_are_zero() {
        let (total_price, product_ids, quantity) = order_totals(&[]);
        assert_eq!(total_price, 0.0);
        assert!(product_ids.is_empty());
        assert_eq!(quantity, 0);
    }

    #[test]
    fn short_postal_code_fails_validation() {
        let request = OrderRequest {
            shipping_address: AddressRequest {
                street: "Main Street 1".to_string(),
                city: "Berlin".to_string(),
                postal_code: "101".to_string(),
                country: "DE".to_string(),
            },
        };
        assert!(request.validate().is_err());
    }
}
