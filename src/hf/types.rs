use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct InferenceRequest<'a, P: Serialize> {
    pub inputs: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<P>,
}

#[derive(Debug, Serialize)]
pub struct TranslationParameters<'a> {
    pub src_lang: &'a str,
    pub tgt_lang: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
}

/// Feature extraction returns a flat vector for a single input and a nested one
/// when the model reports per-input rows.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EmbeddingResponse {
    Flat(Vec<f32>),
    Nested(Vec<Vec<f32>>),
}

#[derive(Debug, Deserialize)]
pub struct TranslationOutput {
    pub translation_text: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerationOutput {
    pub generated_text: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub estimated_time: Option<f64>,
}
