use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use validator::Validate;

use crate::{
    auth::AdminIdentity,
    error::AppError,
    extract::ValidatedJson,
    models::{Gender, GenderRecord, GenderView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize, Validate)]
pub struct GenderRequest {
    /// Deserialization enforces the men/women/unisex enum.
    pub gender: Gender,
}

pub async fn add(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<GenderRequest>,
) -> Result<Response, AppError> {
    info!("Gender endpoint hit....");

    let mut record = GenderRecord::new(payload.gender);
    let inserted = store::genders(&state.db).insert_one(&record).await?;
    record.id = inserted.inserted_id.as_object_id();

    Ok(ok(
        StatusCode::CREATED,
        "Gender created successfully",
        json!({ "gender": GenderView::from(record) }),
    ))
}
