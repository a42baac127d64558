use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use mongodb::bson::doc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

use crate::{
    auth::generate_token,
    error::AppError,
    extract::ValidatedJson,
    models::{Role, User, UserView},
    state::AppState,
    store,
};

use super::response::ok;

#[derive(Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(length(min = 2, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Accepted for wire compatibility, never persisted. Accounts always
    /// start as `user`; promotion is an operator action.
    pub role: Option<Role>,
}

#[derive(Deserialize, Validate)]
pub struct SigninRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> Result<Response, AppError> {
    info!("Sign up endpoint hit....");

    let users = store::users(&state.db);

    let existing = users.find_one(doc! { "email": &payload.email }).await?;
    if existing.is_some() {
        warn!("Email already in use");
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let mut user = User::new(
        payload.first_name,
        payload.last_name,
        payload.email,
        User::hash_password(&payload.password)?,
        Role::User,
    );

    // The unique email index still backs this up under a racing signup.
    let inserted = users.insert_one(&user).await?;
    user.id = inserted.inserted_id.as_object_id();

    info!("User registered successfully");
    Ok(ok(
        StatusCode::CREATED,
        "User registered successfully",
        json!({ "user": UserView::from(user) }),
    ))
}

pub async fn signin(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<SigninRequest>,
) -> Result<Response, AppError> {
    info!("Sign in endpoint hit....");

    let user = store::users(&state.db)
        .find_one(doc! { "email": &payload.email })
        .await?
        .ok_or_else(|| AppError::Unauthenticated("Invalid email or password".to_string()))?;

    if !user.verify_password(&payload.password) {
        warn!("Invalid password for {}", payload.email);
        return Err(AppError::Unauthenticated(
            "Invalid email or password".to_string(),
        ));
    }

    let access_token = generate_token(&user, &state.config.jwt_secret)?;

    info!("User logged in successfully");
    Ok(ok(
        StatusCode::CREATED,
        "User logged in successfully",
        json!({
            "accessToken": access_token,
            "userId": user.id.map(|id| id.to_hex()),
            "role": user.role,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use mongodb::bson::oid::ObjectId;

    use crate::auth::verify_token;

    use super::*;

    #[test]
    fn signup_cannot_claim_admin() {
        let payload: SignupRequest = serde_json::from_str(
            r#"{
                "firstName": "Eve",
                "lastName": "Mallory",
                "email": "eve@example.com",
                "password": "secret1",
                "role": "admin"
            }"#,
        )
        .unwrap();
        assert_eq!(payload.role, Some(Role::Admin));

        let mut user = User::new(
            payload.first_name,
            payload.last_name,
            payload.email,
            User::hash_password(&payload.password).unwrap(),
            Role::User,
        );
        user.id = Some(ObjectId::new());

        let token = generate_token(&user, "test-secret").unwrap();
        let claims = verify_token(&token, "test-secret").unwrap();
        assert!(!claims.role.is_admin());
    }
}
