use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::product::ProductView;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub product_id: ObjectId,
    pub quantity: i64,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl CartItem {
    pub fn new(user_id: ObjectId, product_id: ObjectId, quantity: i64) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            user_id,
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Cart listing populates the referenced product.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemView {
    pub id: String,
    pub quantity: i64,
    pub product: ProductView,
    pub created_at: DateTime<Utc>,
}

/// Shape returned by cart writes, where no population happens.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecordView {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl From<CartItem> for CartRecordView {
    fn from(item: CartItem) -> Self {
        Self {
            id: item.id.map(|id| id.to_hex()).unwrap_or_default(),
            product_id: item.product_id.to_hex(),
            quantity: item.quantity,
            created_at: item.created_at.to_chrono(),
        }
    }
}
