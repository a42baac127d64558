use axum::{http::StatusCode, response::Response, Json};
use serde::Serialize;

/// Uniform success envelope: `{ success: true, message, ...payload }`.
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub data: T,
}

pub fn ok<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    use axum::response::IntoResponse;

    (
        status,
        Json(Envelope {
            success: true,
            message: message.into(),
            data,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_flattens_into_the_envelope() {
        let envelope = Envelope {
            success: true,
            message: "Products fetched successfully".to_string(),
            data: json!({ "length": 2 }),
        };

        let body = serde_json::to_value(&envelope).unwrap();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["length"], json!(2));
        assert!(body.get("data").is_none());
    }
}
