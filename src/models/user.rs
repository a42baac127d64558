use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, SaltString},
    Argon2, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(self) -> bool {
        self == Role::Admin
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 hash, never the plaintext.
    pub password: String,
    pub role: Role,
    pub created_at: mongodb::bson::DateTime,
    pub updated_at: mongodb::bson::DateTime,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        role: Role,
    ) -> Self {
        let now = mongodb::bson::DateTime::now();
        Self {
            id: None,
            first_name,
            last_name,
            email,
            password: password_hash,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn hash_password(plain: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::internal(e.to_string()))
    }

    pub fn verify_password(&self, plain: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password) else {
            return false;
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }
}

/// Wire shape; the password hash never leaves the process.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at.to_chrono(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_password(plain: &str) -> User {
        User::new(
            "Ada".to_string(),
            "Lovelace".to_string(),
            "ada@example.com".to_string(),
            User::hash_password(plain).unwrap(),
            Role::User,
        )
    }

    #[test]
    fn stored_password_is_never_the_plaintext() {
        let user = user_with_password("hunter42");
        assert_ne!(user.password, "hunter42");
        assert!(user.password.starts_with("$argon2"));
    }

    #[test]
    fn password_verification_round_trips() {
        let user = user_with_password("hunter42");
        assert!(user.verify_password("hunter42"));
        assert!(!user.verify_password("hunter43"));
    }

    #[test]
    fn view_strips_the_password() {
        let mut user = user_with_password("hunter42");
        user.id = Some(ObjectId::new());

        let view = UserView::from(user.clone());
        let json = serde_json::to_value(&view).unwrap();

        assert!(json.get("password").is_none());
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["role"], "user");
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }
}
