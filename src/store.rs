//! Entity store access: typed collection handles and the explicit
//! join/fetch steps that replace document-database population, returning
//! denormalized view objects so the wire model stays decoupled from the
//! storage representation.

use std::collections::HashMap;

use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    Collection, Database,
};

use super::{
    error::AppError,
    models::{
        product::{GenderRef, NamedRef},
        Brand, CartItem, CartItemView, Category, GenderRecord, Media, PopulatedProductView,
        Product, Review, User,
    },
};

pub const USERS: &str = "users";
pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const BRANDS: &str = "brands";
pub const GENDERS: &str = "genders";
pub const CARTS: &str = "carts";
pub const ORDERS: &str = "orders";
pub const REVIEWS: &str = "reviews";
pub const MEDIA: &str = "media";

pub fn users(db: &Database) -> Collection<User> {
    db.collection(USERS)
}

pub fn products(db: &Database) -> Collection<Product> {
    db.collection(PRODUCTS)
}

pub fn categories(db: &Database) -> Collection<Category> {
    db.collection(CATEGORIES)
}

pub fn brands(db: &Database) -> Collection<Brand> {
    db.collection(BRANDS)
}

pub fn genders(db: &Database) -> Collection<GenderRecord> {
    db.collection(GENDERS)
}

pub fn carts(db: &Database) -> Collection<CartItem> {
    db.collection(CARTS)
}

pub fn orders(db: &Database) -> Collection<super::models::Order> {
    db.collection(ORDERS)
}

pub fn reviews(db: &Database) -> Collection<Review> {
    db.collection(REVIEWS)
}

pub fn media(db: &Database) -> Collection<Media> {
    db.collection(MEDIA)
}

/// Cart items paired with their product documents. Items whose product
/// has since been deleted are dropped, matching how a null population is
/// skipped downstream.
pub async fn cart_with_products(
    db: &Database,
    user_id: ObjectId,
) -> Result<Vec<(CartItem, Product)>, AppError> {
    let items: Vec<CartItem> = carts(db)
        .find(doc! { "user_id": user_id })
        .await?
        .try_collect()
        .await?;

    if items.is_empty() {
        return Ok(Vec::new());
    }

    let product_ids: Vec<ObjectId> = items.iter().map(|item| item.product_id).collect();
    let product_map = products_by_id(db, &product_ids).await?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let product = product_map.get(&item.product_id)?.clone();
            Some((item, product))
        })
        .collect())
}

pub async fn populated_cart(
    db: &Database,
    user_id: ObjectId,
) -> Result<Vec<CartItemView>, AppError> {
    Ok(cart_with_products(db, user_id)
        .await?
        .into_iter()
        .map(|(item, product)| CartItemView {
            id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
            quantity: item.quantity,
            product: product.into(),
            created_at: item.created_at.to_chrono(),
        })
        .collect())
}

async fn products_by_id(
    db: &Database,
    ids: &[ObjectId],
) -> Result<HashMap<ObjectId, Product>, AppError> {
    let found: Vec<Product> = products(db)
        .find(doc! { "_id": { "$in": ids } })
        .await?
        .try_collect()
        .await?;

    Ok(found
        .into_iter()
        .filter_map(|product| Some((product.id?, product)))
        .collect())
}

/// Ids of catalog records whose `name` matches a case-insensitive
/// substring. Used to turn search terms into reference-id filters.
pub async fn ids_matching_name(
    db: &Database,
    collection: &str,
    pattern: &str,
) -> Result<Vec<ObjectId>, AppError> {
    let docs: Vec<Document> = db
        .collection::<Document>(collection)
        .find(doc! { "name": { "$regex": pattern, "$options": "i" } })
        .projection(doc! { "_id": 1 })
        .await?
        .try_collect()
        .await?;

    Ok(docs
        .into_iter()
        .filter_map(|d| d.get_object_id("_id").ok())
        .collect())
}

/// Products matching `filter` with category, brand and gender records
/// joined in.
pub async fn populated_products(
    db: &Database,
    filter: Document,
) -> Result<Vec<PopulatedProductView>, AppError> {
    let found: Vec<Product> = products(db).find(filter).await?.try_collect().await?;

    if found.is_empty() {
        return Ok(Vec::new());
    }

    let category_ids: Vec<ObjectId> = found.iter().map(|p| p.category).collect();
    let brand_ids: Vec<ObjectId> = found.iter().map(|p| p.brand).collect();
    let gender_ids: Vec<ObjectId> = found.iter().map(|p| p.gender).collect();

    let category_names = names_by_id(db, CATEGORIES, &category_ids).await?;
    let brand_names = names_by_id(db, BRANDS, &brand_ids).await?;

    let gender_records: Vec<GenderRecord> = genders(db)
        .find(doc! { "_id": { "$in": gender_ids } })
        .await?
        .try_collect()
        .await?;
    let gender_map: HashMap<ObjectId, GenderRecord> = gender_records
        .into_iter()
        .filter_map(|g| Some((g.id?, g)))
        .collect();

    Ok(found
        .into_iter()
        .filter_map(|product| {
            let gender = gender_map.get(&product.gender)?;
            Some(PopulatedProductView {
                id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
                user_id: product.user_id.to_hex(),
                name: product.name,
                description: product.description,
                price: product.price,
                stock: product.stock,
                category: NamedRef {
                    id: product.category.to_hex(),
                    name: category_names
                        .get(&product.category)
                        .cloned()
                        .unwrap_or_default(),
                },
                brand: NamedRef {
                    id: product.brand.to_hex(),
                    name: brand_names.get(&product.brand).cloned().unwrap_or_default(),
                },
                gender: GenderRef {
                    id: product.gender.to_hex(),
                    gender: gender.gender,
                },
                images: product.images.iter().map(|id| id.to_hex()).collect(),
                created_at: product.created_at.to_chrono(),
            })
        })
        .collect())
}

async fn names_by_id(
    db: &Database,
    collection: &str,
    ids: &[ObjectId],
) -> Result<HashMap<ObjectId, String>, AppError> {
    let docs: Vec<Document> = db
        .collection::<Document>(collection)
        .find(doc! { "_id": { "$in": ids } })
        .await?
        .try_collect()
        .await?;

    Ok(docs
        .into_iter()
        .filter_map(|d| {
            let id = d.get_object_id("_id").ok()?;
            let name = d.get_str("name").ok()?.to_string();
            Some((id, name))
        })
        .collect())
}
