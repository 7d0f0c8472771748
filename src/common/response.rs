// src/common/response.rs

use serde::Serialize;
use serde_json::Value;

/// Envelope padrão de sucesso: `{ success: true, message?, ...payload }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize = Value> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(message: String, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_is_flattened_next_to_success() {
        let body = serde_json::to_value(Envelope::ok(json!({ "shipments": [] }))).unwrap();
        assert_eq!(body, json!({ "success": true, "shipments": [] }));

        let body = serde_json::to_value(Envelope::with_message("ok".into(), json!({}))).unwrap();
        assert_eq!(body["message"], "ok");
    }
}
