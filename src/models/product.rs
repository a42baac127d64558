use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::catalog::Gender;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// Owner; recorded at creation from the authenticated identity,
    /// never from the request body.
    pub user_id: ObjectId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: ObjectId,
    pub brand: ObjectId,
    pub gender: ObjectId,
    pub images: Vec<ObjectId>,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub brand: String,
    pub gender: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: product.user_id.to_hex(),
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            category: product.category.to_hex(),
            brand: product.brand.to_hex(),
            gender: product.gender.to_hex(),
            images: product.images.iter().map(|id| id.to_hex()).collect(),
            created_at: product.created_at.to_chrono(),
            updated_at: product.updated_at.to_chrono(),
        }
    }
}

/// Search results carry the referenced category/brand/gender records
/// inline instead of bare ids.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedProductView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub category: NamedRef,
    pub brand: NamedRef,
    pub gender: GenderRef,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct GenderRef {
    pub id: String,
    pub gender: Gender,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_renders_ids_as_hex_strings() {
        let now = mongodb::bson::DateTime::now();
        let category = ObjectId::new();
        let product = Product {
            id: Some(ObjectId::new()),
            user_id: ObjectId::new(),
            name: "Trail runner".to_string(),
            description: "Lightweight trail running shoe".to_string(),
            price: 129.99,
            stock: 12,
            category,
            brand: ObjectId::new(),
            gender: ObjectId::new(),
            images: vec![ObjectId::new()],
            created_at: now,
            updated_at: now,
        };

        let view = ProductView::from(product.clone());
        assert_eq!(view.category, category.to_hex());
        assert_eq!(view.images.len(), 1);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["userId"], product.user_id.to_hex());
        assert_eq!(json["price"], 129.99);
    }
}
