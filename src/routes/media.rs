use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Response,
};
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;
use tracing::info;

use crate::{
    auth::AdminIdentity,
    cache,
    error::AppError,
    extract::parse_object_id,
    models::{Media, MediaView},
    state::AppState,
    store,
};

use super::response::ok;

/// Multer-equivalent cap: one image, 5 MiB.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

struct UploadedFile {
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_upload(
    mut multipart: Multipart,
) -> Result<(Option<UploadedFile>, Option<String>), AppError> {
    let mut file = None;
    let mut product_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("image") => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("image") {
                    return Err(AppError::BadRequest(
                        "Not an image! Please upload an image".to_string(),
                    ));
                }

                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                file = Some(UploadedFile {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("productId") => {
                product_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            _ => {}
        }
    }

    Ok((file, product_id))
}

pub async fn upload(
    AdminIdentity(identity): AdminIdentity,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    info!("Starting media upload..");

    let (file, product_id) = read_upload(multipart).await?;

    let file = file.ok_or_else(|| {
        AppError::BadRequest("No file uploaded. Please upload an image.".to_string())
    })?;
    if file.bytes.is_empty() {
        return Err(AppError::BadRequest("File is empty.".to_string()));
    }

    let product_id = product_id
        .ok_or_else(|| AppError::BadRequest("productId is required".to_string()))
        .and_then(|id| parse_object_id(&id))?;

    store::products(&state.db)
        .find_one(doc! { "_id": product_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    info!("uploading file to media storage...");
    let stored = state.media.upload(&file.file_name, &file.bytes).await?;

    let mut record = Media::new(stored.url, stored.asset_id, product_id, identity.user_id);
    let inserted = store::media(&state.db).insert_one(&record).await?;
    record.id = inserted.inserted_id.as_object_id();

    if let Some(media_id) = record.id {
        store::products(&state.db)
            .update_one(
                doc! { "_id": product_id },
                doc! { "$push": { "images": media_id } },
            )
            .await?;
    }

    // Cached product views embed image ids.
    state.cache.invalidate_namespace(cache::PRODUCTS_NS).await?;
    state.cache.invalidate_namespace(cache::SEARCH_NS).await?;

    info!("Media uploaded successfully");
    Ok(ok(
        StatusCode::CREATED,
        "Media uploaded successfully",
        json!({ "data": MediaView::from(record) }),
    ))
}

pub async fn list(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    let records: Vec<Media> = store::media(&state.db)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    let views: Vec<MediaView> = records.into_iter().map(MediaView::from).collect();

    info!("Media fetched successfully");
    Ok(ok(
        StatusCode::OK,
        "Media fetched successfully",
        json!({ "length": views.len(), "data": views }),
    ))
}

/// Provider object first, record second; the product's image list is
/// kept consistent.
pub async fn remove(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let media_id = parse_object_id(&id)?;
    let collection = store::media(&state.db);

    let record = collection
        .find_one(doc! { "_id": media_id })
        .await?
        .ok_or_else(|| AppError::NotFound("Media not found".to_string()))?;

    state.media.delete(&record.asset_id).await?;

    collection.delete_one(doc! { "_id": media_id }).await?;

    store::products(&state.db)
        .update_one(
            doc! { "_id": record.product_id },
            doc! { "$pull": { "images": media_id } },
        )
        .await?;

    state.cache.invalidate_namespace(cache::PRODUCTS_NS).await?;
    state.cache.invalidate_namespace(cache::SEARCH_NS).await?;

    info!("Media deleted successfully");
    Ok(ok(
        StatusCode::OK,
        "Media deleted successfully",
        json!({}),
    ))
}
