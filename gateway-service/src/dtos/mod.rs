use serde::{Deserialize, Serialize};

/// Body of POST /generate-text. The prompt is optional; an absent prompt is
/// forwarded and rejected by the provider's own validation.
#[derive(Debug, Deserialize)]
pub struct GenerateTextRequest {
    pub prompt: Option<String>,
}

/// Success body shared by all generation routes.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub result: String,
}
