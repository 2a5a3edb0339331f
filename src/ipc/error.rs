use serde_json::json;

use crate::auth::AuthError;
use crate::error::StoreError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub struct HandlerErr {
    pub code: &'static str,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl HandlerErr {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_params(message: impl Into<String>) -> Self {
        Self::new("bad_params", message)
    }

    pub fn response(self, id: &str) -> serde_json::Value {
        err(id, self.code, self.message, self.details)
    }
}

impl From<StoreError> for HandlerErr {
    fn from(e: StoreError) -> Self {
        tracing::warn!(error = %e, "store operation failed");
        Self::new(e.code(), e.to_string())
    }
}

impl From<AuthError> for HandlerErr {
    fn from(e: AuthError) -> Self {
        let message = e.to_string();
        match e {
            AuthError::Form(fields) => {
                let mut by_field = serde_json::Map::new();
                for f in &fields {
                    by_field.insert(f.field.to_string(), json!(f.message));
                }
                Self {
                    code: "validation_failed",
                    message: fields
                        .first()
                        .map(|f| f.message.to_string())
                        .unwrap_or_else(|| "invalid form".to_string()),
                    details: Some(json!({ "fields": by_field })),
                }
            }
            AuthError::InvalidCredentials => Self::new("invalid_credentials", message),
            AuthError::UsernameTaken => Self {
                code: "username_taken",
                details: Some(json!({ "fields": { "username": message.clone() } })),
                message,
            },
            AuthError::Store(inner) => inner.into(),
        }
    }
}
