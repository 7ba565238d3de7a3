use serde::{ Deserialize, Serialize };

/// Body of `POST /generate`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptRequest {
    pub prompt: String,
}

/// Lenient view of the request body used on the server side so a missing or
/// non-string `prompt` can be reported as a validation failure instead of a
/// framework rejection.
#[derive(Debug, Deserialize)]
pub(crate) struct RawPromptRequest {
    #[serde(default)]
    pub prompt: Option<serde_json::Value>,
}
