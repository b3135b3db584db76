use std::env;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::extract::{extract_embedding, extract_generation, extract_translation};
use super::types::{
    ApiError, EmbeddingResponse, GenerationOutput, GenerationParameters, InferenceRequest,
    TranslationOutput, TranslationParameters,
};
use crate::lang::LocaleTag;

const API_BASE: &str = "https://router.huggingface.co/hf-inference/models";
const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_GENERATION_MODEL: &str = "MBZUAI/LaMini-Flan-T5-783M";
const DEFAULT_TRANSLATION_MODEL: &str = "facebook/nllb-200-distilled-600M";
/// Seq2seq generation on a cold model can take well over a minute.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const SNIPPET_LEN: usize = 200;

#[derive(Debug, thiserror::Error)]
pub enum HfError {
    #[error("HF_TOKEN not set. Create one at https://huggingface.co/settings/tokens")]
    ApiKeyNotSet,

    #[error("invalid inference URL '{0}': must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("Inference API rejected the token: {0}")]
    Unauthorized(String),

    #[error("Inference API rate limit exceeded. Please retry later.")]
    RateLimited,

    #[error("model is loading (estimated {estimated_secs:.0}s)")]
    ModelLoading { estimated_secs: f64 },

    #[error("Inference API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Inference API returned an empty result")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Text to fixed-size vector, using the same model the knowledge index was built with.
pub trait Embedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, HfError>;
}

pub trait Translator {
    async fn translate(
        &self,
        text: &str,
        src: LocaleTag,
        tgt: LocaleTag,
    ) -> Result<String, HfError>;
}

/// Instruction-following text generation. Output is always in the pivot language.
pub trait Generator {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, HfError>;
}

#[derive(Clone)]
struct ApiKey(String);

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[derive(Debug, Clone)]
pub struct ModelIds {
    pub embedding: String,
    pub generation: String,
    pub translation: String,
}

impl Default for ModelIds {
    fn default() -> Self {
        Self {
            embedding: DEFAULT_EMBEDDING_MODEL.to_string(),
            generation: DEFAULT_GENERATION_MODEL.to_string(),
            translation: DEFAULT_TRANSLATION_MODEL.to_string(),
        }
    }
}

/// Client for the Hugging Face Inference API, serving all three model roles.
///
/// Configuration via environment variables:
/// - `HF_TOKEN`: access token (required)
/// - `HF_INFERENCE_URL`: API base (default: the hf-inference router)
/// - `EMBEDDING_MODEL`, `GENERATION_MODEL`, `TRANSLATION_MODEL`: model ids
#[derive(Debug, Clone)]
pub struct HfClient {
    http: Client,
    api_key: ApiKey,
    base_url: String,
    models: ModelIds,
}

impl HfClient {
    pub fn from_env(http: Client) -> Result<Self, HfError> {
        let api_key = env::var("HF_TOKEN").map_err(|_| HfError::ApiKeyNotSet)?;
        if api_key.trim().is_empty() {
            return Err(HfError::ApiKeyNotSet);
        }
        let base_url = match env_nonempty("HF_INFERENCE_URL") {
            Some(raw) => resolve_base_url(&raw)?,
            None => API_BASE.to_string(),
        };
        let defaults = ModelIds::default();
        let models = ModelIds {
            embedding: env_nonempty("EMBEDDING_MODEL").unwrap_or(defaults.embedding),
            generation: env_nonempty("GENERATION_MODEL").unwrap_or(defaults.generation),
            translation: env_nonempty("TRANSLATION_MODEL").unwrap_or(defaults.translation),
        };
        debug!(base_url = %base_url, ?models, "inference client configured");
        Ok(Self {
            http,
            api_key: ApiKey(api_key.trim().to_string()),
            base_url,
            models,
        })
    }

    #[cfg(test)]
    pub(crate) fn with_base_url(http: Client, base_url: &str) -> Self {
        Self {
            http,
            api_key: ApiKey("test-key".to_string()),
            base_url: base_url.to_string(),
            models: ModelIds::default(),
        }
    }

    async fn infer<P, R>(
        &self,
        url: &str,
        inputs: &str,
        parameters: Option<P>,
    ) -> Result<R, HfError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key.0)
            .header("User-Agent", crate::USER_AGENT)
            .json(&InferenceRequest { inputs, parameters })
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Inference API rate limited");
            return Err(HfError::RateLimited);
        }

        let text = response.text().await?;

        if !status.is_success() {
            if let Some(err) = parse_api_error(&text) {
                let classified = classify_api_error(Some(status.as_u16()), &err);
                warn!(error = %classified, "Inference API error");
                return Err(classified);
            }
            let end = text.floor_char_boundary(SNIPPET_LEN);
            warn!(status = %status, "Inference API error (no structured body)");
            return Err(HfError::Api {
                code: status.as_u16(),
                message: format!("HTTP {status}: {}", &text[..end]),
            });
        }

        if let Some(err) = parse_api_error(&text) {
            let classified = classify_api_error(None, &err);
            warn!(error = %classified, "Inference API error in 200 response");
            return Err(classified);
        }

        Ok(serde_json::from_str(&text)?)
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), model)
    }
}

impl Embedder for HfClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, HfError> {
        let url = format!(
            "{}/pipeline/feature-extraction",
            self.model_url(&self.models.embedding)
        );
        let response: EmbeddingResponse = self.infer(&url, text, None::<()>).await?;
        let vector = extract_embedding(response)?;
        debug!(model = %self.models.embedding, dim = vector.len(), "embedding complete");
        Ok(vector)
    }
}

impl Translator for HfClient {
    async fn translate(
        &self,
        text: &str,
        src: LocaleTag,
        tgt: LocaleTag,
    ) -> Result<String, HfError> {
        let url = self.model_url(&self.models.translation);
        let parameters = TranslationParameters {
            src_lang: src.as_str(),
            tgt_lang: tgt.as_str(),
        };
        let outputs: Vec<TranslationOutput> = self.infer(&url, text, Some(parameters)).await?;
        debug!(%src, %tgt, "translation complete");
        extract_translation(outputs)
    }
}

impl Generator for HfClient {
    async fn generate(&self, prompt: &str, max_new_tokens: u32) -> Result<String, HfError> {
        let url = self.model_url(&self.models.generation);
        let parameters = GenerationParameters { max_new_tokens };
        let outputs: Vec<GenerationOutput> = self.infer(&url, prompt, Some(parameters)).await?;
        debug!(model = %self.models.generation, "generation complete");
        extract_generation(outputs)
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_base_url(raw: &str) -> Result<String, HfError> {
    let parsed = Url::parse(raw).map_err(|_| HfError::InvalidBaseUrl(raw.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
        return Err(HfError::InvalidBaseUrl(raw.to_string()));
    }
    if parsed.scheme() == "http" {
        warn!(url = %parsed, "inference URL is plain HTTP; the token is sent unencrypted");
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// Error bodies are JSON objects; successful results are arrays.
fn parse_api_error(text: &str) -> Option<ApiError> {
    if !text.trim_start().starts_with('{') {
        return None;
    }
    serde_json::from_str(text).ok()
}

fn classify_api_error(status: Option<u16>, err: &ApiError) -> HfError {
    let message = err.error.clone();

    if let Some(estimated_secs) = err.estimated_time
        && matches!(status, None | Some(503))
    {
        return HfError::ModelLoading { estimated_secs };
    }

    match status {
        Some(401 | 403) => HfError::Unauthorized(message),
        Some(429) => HfError::RateLimited,
        Some(code) => HfError::Api { code, message },
        None => HfError::Api {
            code: 0,
            message: format!("Unknown error (no status code): {message}"),
        },
    }
}
