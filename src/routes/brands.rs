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
    models::{Brand, BrandView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Serialize, Deserialize, Validate)]
pub struct BrandRequest {
    #[validate(length(min = 2, message = "Brand must be at least 2 characters"))]
    pub name: String,
}

#[derive(Deserialize, Validate)]
pub struct BulkBrandRequest {
    #[validate(length(min = 1, message = "At least one brand is required"), nested)]
    pub brands: Vec<BrandRequest>,
}

pub async fn add(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<BulkBrandRequest>,
) -> Result<Response, AppError> {
    info!("Add brand endpoint hit....");

    let mut records: Vec<Brand> = payload
        .brands
        .into_iter()
        .map(|b| Brand::new(b.name.trim().to_string()))
        .collect();

    let inserted = store::brands(&state.db).insert_many(&records).await?;
    for (index, id) in inserted.inserted_ids {
        records[index].id = id.as_object_id();
    }

    let views: Vec<BrandView> = records.into_iter().map(BrandView::from).collect();

    Ok(ok(
        StatusCode::CREATED,
        "Brands created successfully",
        json!({ "length": views.len(), "brands": views }),
    ))
}

pub async fn list(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    info!("fetch all brand endpoint hit....");

    let brands: Vec<Brand> = store::brands(&state.db)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    if brands.is_empty() {
        return Err(AppError::NotFound("No brand available yet".to_string()));
    }

    let views: Vec<BrandView> = brands.into_iter().map(BrandView::from).collect();

    Ok(ok(
        StatusCode::OK,
        "Brands fetched successfully",
        json!({ "length": views.len(), "brands": views }),
    ))
}
