use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::Identity,
    error::AppError,
    extract::{object_id, parse_object_id, ValidatedJson},
    models::{Review, ReviewView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    pub comment: Option<String>,
    #[validate(custom(function = object_id))]
    pub product_id: String,
}

pub async fn create(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ReviewRequest>,
) -> Result<Response, AppError> {
    info!("Create review endpoint hit....");

    let mut review = Review::new(
        identity.user_id,
        parse_object_id(&payload.product_id)?,
        payload.rating,
        payload.comment,
    );

    let inserted = store::reviews(&state.db).insert_one(&review).await?;
    review.id = inserted.inserted_id.as_object_id();

    info!("Review created successfully");
    Ok(ok(
        StatusCode::CREATED,
        "Review created successfully",
        json!({ "review": ReviewView::from(review) }),
    ))
}

pub async fn by_product(
    _identity: Identity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let product_id = parse_object_id(&id)?;

    store::products(&state.db)
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let reviews: Vec<Review> = store::reviews(&state.db)
        .find(doc! { "product_id": product_id })
        .await?
        .try_collect()
        .await?;

    if reviews.is_empty() {
        return Err(AppError::NotFound(
            "No reviews found for this product".to_string(),
        ));
    }

    let views: Vec<ReviewView> = reviews.into_iter().map(ReviewView::from).collect();

    Ok(ok(
        StatusCode::OK,
        "Reviews fetched successfully",
        json!({ "length": views.len(), "reviews": views }),
    ))
}

pub async fn remove(
    identity: Identity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let review_id = parse_object_id(&id)?;
    let collection = store::reviews(&state.db);

    let review = collection
        .find_one(doc! { "_id": review_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Review not found".to_string()))?;

    if review.user_id != identity.user_id {
        return Err(AppError::Forbidden(
            "You are not authorized to delete this review".to_string(),
        ));
    }

    collection.delete_one(doc! { "_id": review_id }).await?;

    info!("Review deleted successfully");
    Ok(ok(
        StatusCode::OK,
        "Review deleted successfully",
        json!({}),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    #[test]
    fn rating_bounds_are_enforced() {
        for rating in [0, 6, -1] {
            let payload = ReviewRequest {
                rating,
                comment: None,
                product_id: ObjectId::new().to_hex(),
            };
            assert!(payload.validate().is_err(), "rating {rating} should fail");
        }

        for rating in 1..=5 {
            let payload = ReviewRequest {
                rating,
                comment: Some("Solid product".to_string()),
                product_id: ObjectId::new().to_hex(),
            };
            assert!(payload.validate().is_ok(), "rating {rating} should pass");
        }
    }
}
