use serde::{Deserialize, Serialize};

/// Error body returned by the storefront API on non-success responses.
///
/// Handlers answer with `{"detail": ..}`, `{"error": ..}` or `{"message": ..}`
/// depending on the endpoint; field validation errors come back as a map of
/// field name to messages and land in `fields`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ApiErrorBody {
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<Self>(body).ok()
    }

    /// Best single-line summary of the body.
    pub fn summary(&self) -> Option<String> {
        if let Some(text) = self
            .detail
            .as_ref()
            .or(self.error.as_ref())
            .or(self.message.as_ref())
        {
            return Some(text.clone());
        }
        let (field, value) = self.fields.iter().next()?;
        let text = match value {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(serde_json::Value::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Some(format!("{field}: {text}"))
    }
}

/// Summarizes a raw error body, falling back to the trimmed text itself.
pub fn summarize_error_body(body: &str) -> String {
    ApiErrorBody::parse(body)
        .and_then(|parsed| parsed.summary())
        .unwrap_or_else(|| body.trim().to_string())
}
