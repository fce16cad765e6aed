//! OpenAI image-generation client and artifact persistence.

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::config::GenerationConfig;

/// Everything that can go wrong between "send the prompt" and "bytes are on
/// disk". None of these are retried here; a failure aborts the run and the
/// entry stays eligible next invocation.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("image API returned {status}: {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),
    #[error("request failed")]
    Transport(#[source] reqwest::Error),
    #[error("failed to parse image API response")]
    Parse(#[from] serde_json::Error),
    #[error("response contained no image payload")]
    EmptyResponse,
    #[error("image payload is not valid base64")]
    Decode(#[from] base64::DecodeError),
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Seam between the orchestrator and the generation API, so tests can stand
/// in for the network.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    /// Generate one image for `prompt` and return the raw (decoded) bytes.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerateError>;
}

pub struct OpenAiImages {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    size: String,
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    n: u32,
}

#[derive(Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    data: Vec<GeneratedImage>,
}

#[derive(Deserialize)]
struct GeneratedImage {
    b64_json: Option<String>,
}

impl OpenAiImages {
    pub fn new(api_key: String, config: &GenerationConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_s))
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            api_key,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            size: config.size.clone(),
        }
    }
}

#[async_trait]
impl ImageBackend for OpenAiImages {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, GenerateError> {
        let url = format!("{}/v1/images/generations", self.base_url);
        let request = GenerationRequest {
            model: &self.model,
            prompt,
            size: &self.size,
            n: 1,
        };

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(GenerateError::Upstream { status, body });
        }

        // Parse from text rather than resp.json() so malformed bodies map to
        // a typed Parse error instead of a transport error.
        let body = resp.text().await.map_err(classify_transport)?;
        let parsed: GenerationResponse = serde_json::from_str(&body)?;
        decode_payload(&parsed)
    }
}

fn classify_transport(e: reqwest::Error) -> GenerateError {
    if e.is_timeout() {
        GenerateError::Timeout(e)
    } else {
        GenerateError::Transport(e)
    }
}

/// Extract and decode `data[0].b64_json`.
fn decode_payload(resp: &GenerationResponse) -> Result<Vec<u8>, GenerateError> {
    let payload = resp
        .data
        .first()
        .and_then(|img| img.b64_json.as_deref())
        .ok_or(GenerateError::EmptyResponse)?;
    Ok(base64::engine::general_purpose::STANDARD.decode(payload)?)
}

/// Generate an image for `prompt` and persist it at `destination`.
///
/// The orchestrator only calls this for paths it has checked do not exist, so
/// nothing is ever overwritten in practice.
pub async fn fetch_and_save(
    backend: &dyn ImageBackend,
    prompt: &str,
    destination: &Path,
) -> Result<(), GenerateError> {
    let bytes = backend.generate(prompt).await?;
    std::fs::write(destination, &bytes).map_err(|source| GenerateError::Io {
        path: destination.to_path_buf(),
        source,
    })
}
