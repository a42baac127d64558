//! Typed request DTOs: a body either deserializes and validates into a
//! fully-populated value or the request ends with a 400 carrying the
//! field issues. Nothing partially validated flows downstream.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use mongodb::bson::oid::ObjectId;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::error::{AppError, FieldIssue};

pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            AppError::Validation(vec![FieldIssue {
                field: "body".to_string(),
                message: e.body_text(),
            }])
        })?;

        value
            .validate()
            .map_err(|errors| AppError::Validation(field_issues(&errors, "")))?;

        Ok(ValidatedJson(value))
    }
}

/// Flattens nested validation errors into `parent.child` field paths.
pub fn field_issues(errors: &ValidationErrors, prefix: &str) -> Vec<FieldIssue> {
    let mut issues = Vec::new();

    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for error in field_errors {
                    issues.push(FieldIssue {
                        field: path.clone(),
                        message: error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| error.code.to_string()),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                issues.extend(field_issues(nested, &path));
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    issues.extend(field_issues(nested, &format!("{path}[{index}]")));
                }
            }
        }
    }

    issues.sort_by(|a, b| a.field.cmp(&b.field));
    issues
}

/// `validator` custom check for ObjectId-typed string fields.
pub fn object_id(value: &str) -> Result<(), ValidationError> {
    if ObjectId::parse_str(value).is_ok() {
        return Ok(());
    }

    let mut error = ValidationError::new("object_id");
    error.message = Some("Invalid object id".into());
    Err(error)
}

/// Path-segment ids get the same treatment as body fields: a malformed
/// id is a caller error, not a 500.
pub fn parse_object_id(value: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(value).map_err(|_| {
        AppError::Validation(vec![FieldIssue {
            field: "id".to_string(),
            message: "Invalid object id".to_string(),
        }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Validate)]
    struct Inner {
        #[validate(length(min = 2, message = "City must be at least 2 characters"))]
        city: String,
    }

    #[derive(Deserialize, Validate)]
    struct Outer {
        #[validate(email(message = "Invalid email address"))]
        email: String,
        #[validate(nested)]
        address: Inner,
    }

    #[test]
    fn object_id_accepts_valid_hex() {
        assert!(object_id("64f000000000000000000001").is_ok());
    }

    #[test]
    fn object_id_rejects_malformed_input() {
        assert!(object_id("not-an-id").is_err());
        assert!(object_id("").is_err());
        assert!(object_id("64f0000000000000000000").is_err());
    }

    #[test]
    fn parse_object_id_maps_to_validation_error() {
        assert!(parse_object_id("64f000000000000000000001").is_ok());
        assert!(matches!(
            parse_object_id("nope"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn nested_errors_flatten_with_dotted_paths() {
        let value = Outer {
            email: "not-an-email".to_string(),
            address: Inner {
                city: "x".to_string(),
            },
        };

        let errors = value.validate().unwrap_err();
        let issues = field_issues(&errors, "");

        let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
        assert_eq!(fields, vec!["address.city", "email"]);
        assert_eq!(issues[0].message, "City must be at least 2 characters");
        assert_eq!(issues[1].message, "Invalid email address");
    }

    #[test]
    fn valid_values_produce_no_issues() {
        let value = Outer {
            email: "ada@example.com".to_string(),
            address: Inner {
                city: "London".to_string(),
            },
        };

        assert!(value.validate().is_ok());
    }
}
