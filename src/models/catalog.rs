//! Categories, brands and genders: the flat lookup records products
//! reference by id.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl Category {
    pub fn new(name: String) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl Brand {
    pub fn new(name: String) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            name,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
    Unisex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenderRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub gender: Gender,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl GenderRecord {
    pub fn new(gender: Gender) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            gender,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryView {
    fn from(category: Category) -> Self {
        Self {
            id: category.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: category.name,
            created_at: category.created_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandView {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Brand> for BrandView {
    fn from(brand: Brand) -> Self {
        Self {
            id: brand.id.map(|id| id.to_hex()).unwrap_or_default(),
            name: brand.name,
            created_at: brand.created_at.to_chrono(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenderView {
    pub id: String,
    pub gender: Gender,
    pub created_at: DateTime<Utc>,
}

impl From<GenderRecord> for GenderView {
    fn from(record: GenderRecord) -> Self {
        Self {
            id: record.id.map(|id| id.to_hex()).unwrap_or_default(),
            gender: record.gender,
            created_at: record.created_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_serializes_to_the_three_known_values() {
        assert_eq!(serde_json::to_string(&Gender::Men).unwrap(), "\"men\"");
        assert_eq!(serde_json::to_string(&Gender::Women).unwrap(), "\"women\"");
        assert_eq!(
            serde_json::to_string(&Gender::Unisex).unwrap(),
            "\"unisex\""
        );
    }

    #[test]
    fn unknown_gender_values_are_rejected() {
        assert!(serde_json::from_str::<Gender>("\"kids\"").is_err());
    }
}
