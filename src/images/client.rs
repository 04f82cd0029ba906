use async_trait::async_trait;
use bytes::Bytes;
use reqwest::StatusCode;
use tracing::{debug, error, warn};

use crate::{
    config::ClipDropConfig,
    error::{AppError, UpstreamError},
};

const SERVICE: &str = "image generation service";

/// Remote text-to-image model.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Returns the encoded image produced for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<Bytes, AppError>;
}

/// ClipDrop text-to-image API: multipart `prompt` in, PNG bytes out.
#[derive(Clone)]
pub struct ClipDropClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ClipDropClient {
    pub fn new(http: reqwest::Client, cfg: &ClipDropConfig) -> Self {
        Self {
            http,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for ClipDropClient {
    async fn generate(&self, prompt: &str) -> Result<Bytes, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            error!("clipdrop api key not configured");
            AppError::ServiceMisconfigured("Image generation service not configured")
        })?;

        let form = reqwest::multipart::Form::new().text("prompt", prompt.to_string());
        let resp = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "clipdrop request failed");
                if e.is_connect() {
                    UpstreamError::Unreachable(SERVICE)
                } else {
                    UpstreamError::Failed("Failed to generate image. Please try again.".into())
                }
            })?;

        let status = resp.status();
        match status {
            s if s.is_success() => {
                let body = resp.bytes().await.map_err(|e| {
                    warn!(error = %e, "clipdrop body read failed");
                    UpstreamError::Failed("Failed to generate image. Please try again.".into())
                })?;
                debug!(bytes = body.len(), "clipdrop image received");
                Ok(body)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(%status, "clipdrop rejected api key");
                Err(AppError::ServiceMisconfigured(
                    "Invalid API key for image generation service",
                ))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("clipdrop rate limited");
                Err(UpstreamError::RateLimited.into())
            }
            s => {
                warn!(status = %s, "clipdrop error status");
                Err(UpstreamError::Failed("Failed to generate image. Please try again.".into()).into())
            }
        }
    }
}
