use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::AdminIdentity,
    error::AppError,
    extract::ValidatedJson,
    models::{Category, CategoryView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Serialize, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 2, message = "Category must be at least 2 characters"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct BulkCategoryRequest {
    #[validate(length(min = 1, message = "At least one category is required"), nested)]
    pub categories: Vec<CategoryRequest>,
}

pub async fn add(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<BulkCategoryRequest>,
) -> Result<Response, AppError> {
    info!("Add category endpoint hit....");

    let mut records: Vec<Category> = payload
        .categories
        .into_iter()
        .map(|c| Category::new(c.name.trim().to_string()))
        .collect();

    // A duplicate name trips the unique index and surfaces as a 409.
    let inserted = store::categories(&state.db).insert_many(&records).await?;
    for (index, id) in inserted.inserted_ids {
        records[index].id = id.as_object_id();
    }

    let views: Vec<CategoryView> = records.into_iter().map(CategoryView::from).collect();

    Ok(ok(
        StatusCode::CREATED,
        "Categories created successfully",
        json!({ "length": views.len(), "categories": views }),
    ))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    info!("fetch all category endpoint hit....");

    let categories: Vec<Category> = store::categories(&state.db)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    if categories.is_empty() {
        return Err(AppError::NotFound("No category available yet".to_string()));
    }

    let views: Vec<CategoryView> = categories.into_iter().map(CategoryView::from).collect();

    Ok(ok(
        StatusCode::OK,
        "Categories fetched successfully",
        json!({ "length": views.len(), "categories": views }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bulk_payload_is_rejected() {
        let payload = BulkCategoryRequest { categories: vec![] };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn nested_names_are_validated() {
        let payload = BulkCategoryRequest {
            categories: vec![
                CategoryRequest {
                    name: "Shoes".to_string(),
                },
                CategoryRequest {
                    name: "x".to_string(),
                },
            ],
        };
        assert!(payload.validate().is_err());

        let payload = BulkCategoryRequest {
            categories: vec![CategoryRequest {
                name: "Shoes".to_string(),
            }],
        };
        assert!(payload.validate().is_ok());
    }
}
