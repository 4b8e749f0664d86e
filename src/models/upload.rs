use serde::{Deserialize, Serialize};

/// Response body of `POST /upload_selfie`: `{}` on success, `{"error": ...}` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UploadResponse {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_shapes() {
        let ok: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(ok.is_success());

        let failed: UploadResponse = serde_json::from_str(r#"{"error": "No file"}"#).unwrap();
        assert!(!failed.is_success());
        assert_eq!(failed.error.as_deref(), Some("No file"));
    }
}
