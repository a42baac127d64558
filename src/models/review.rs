use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub product_id: ObjectId,
    /// 1 through 5, validated at the edge.
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl Review {
    pub fn new(user_id: ObjectId, product_id: ObjectId, rating: i32, comment: Option<String>) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            user_id,
            product_id,
            rating,
            comment,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: String,
    pub user_id: String,
    pub product_id: String,
    pub rating: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewView {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: review.user_id.to_hex(),
            product_id: review.product_id.to_hex(),
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at.to_chrono(),
        }
    }
}
