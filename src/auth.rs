//! Bearer-token gate.
//!
//! `Identity` verifies the `Authorization` header before any handler
//! logic runs; `AdminIdentity` adds the role check for admin-only
//! routes. Ownership checks stay in the handlers, comparing the
//! authenticated user id against the stored owner field.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use super::{
    error::AppError,
    models::{Role, User},
    state::AppState,
};

const TOKEN_LIFETIME_DAYS: i64 = 7;

const MISSING_TOKEN: &str = "Access denied. No token provided. Please login to continue";
const NOT_ADMIN: &str = "Access denied. You are not an admin";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id, hex.
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub fn generate_token(user: &User, secret: &str) -> Result<String, AppError> {
    let user_id = user
        .id
        .ok_or_else(|| AppError::internal("user has no id"))?;

    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_hex(),
        email: user.email.clone(),
        role: user.role,
        iat: now.timestamp(),
        exp: (now + Duration::days(TOKEN_LIFETIME_DAYS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::internal)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthenticated(MISSING_TOKEN.to_string()))
}

/// The decoded caller, attached by the gate.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: ObjectId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    fn from_parts(parts: &Parts, secret: &str) -> Result<Self, AppError> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| AppError::Unauthenticated(MISSING_TOKEN.to_string()))?;

        let claims = verify_token(token, secret)?;

        let user_id = ObjectId::parse_str(&claims.sub)
            .map_err(|_| AppError::Unauthenticated(MISSING_TOKEN.to_string()))?;

        Ok(Self {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    header.split_once(' ').map(|(_, token)| token)
}

impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Identity::from_parts(parts, &state.config.jwt_secret)
    }
}

/// Admin-only gate: a valid identity whose role is `admin`.
#[derive(Debug, Clone)]
pub struct AdminIdentity(pub Identity);

impl FromRequestParts<Arc<AppState>> for AdminIdentity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let identity = Identity::from_parts(parts, &state.config.jwt_secret)?;

        if !identity.role.is_admin() {
            return Err(AppError::Forbidden(NOT_ADMIN.to_string()));
        }

        Ok(AdminIdentity(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(role: Role) -> User {
        let mut user = User::new(
            "Grace".to_string(),
            "Hopper".to_string(),
            "grace@example.com".to_string(),
            "$argon2id$stub".to_string(),
            role,
        );
        user.id = Some(ObjectId::new());
        user
    }

    #[test]
    fn token_round_trips_identity_and_role() {
        let user = test_user(Role::Admin);
        let token = generate_token(&user, "secret").unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user.id.unwrap().to_hex());
        assert_eq!(claims.email, "grace@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let user = test_user(Role::User);
        let token = generate_token(&user, "secret").unwrap();

        assert!(matches!(
            verify_token(&token, "other"),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let user = test_user(Role::User);
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.unwrap().to_hex(),
            email: user.email.clone(),
            role: user.role,
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(
            verify_token(&token, "secret"),
            Err(AppError::Unauthenticated(_))
        ));
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(verify_token("not-a-jwt", "secret").is_err());
        assert!(verify_token("", "secret").is_err());
    }

    #[test]
    fn bearer_prefix_is_split_off() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("token-without-scheme"), None);
    }
}
