use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use futures::TryStreamExt;
use mongodb::bson::doc;
use serde_json::json;
use tracing::info;

use crate::{
    auth::AdminIdentity,
    error::AppError,
    models::{User, UserView},
    state::AppState,
    store,
};

use super::response::ok;

pub async fn list(
    _admin: AdminIdentity,
    State(state): State<Arc<AppState>>,
) -> Result<Response, AppError> {
    info!("fetch all user endpoint hit....");

    let users: Vec<User> = store::users(&state.db)
        .find(doc! {})
        .await?
        .try_collect()
        .await?;

    if users.is_empty() {
        return Err(AppError::NotFound("No user available".to_string()));
    }

    let views: Vec<UserView> = users.into_iter().map(UserView::from).collect();

    Ok(ok(
        StatusCode::OK,
        "Users fetched successfully",
        json!({ "length": views.len(), "users": views }),
    ))
}
