use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub url: String,
    /// Identifier at the storage provider; needed to delete the object.
    pub asset_id: String,
    pub product_id: ObjectId,
    pub user_id: ObjectId,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl Media {
    pub fn new(url: String, asset_id: String, product_id: ObjectId, user_id: ObjectId) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            url,
            asset_id,
            product_id,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaView {
    pub id: String,
    pub url: String,
    pub asset_id: String,
    pub product_id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl From<Media> for MediaView {
    fn from(media: Media) -> Self {
        Self {
            id: media.id.map(|id| id.to_hex()).unwrap_or_default(),
            url: media.url,
            asset_id: media.asset_id,
            product_id: media.product_id.to_hex(),
            user_id: media.user_id.to_hex(),
            created_at: media.created_at.to_chrono(),
        }
    }
}
