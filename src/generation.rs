use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::GenerationConfig;
use crate::error::{AutosubError, Result};
use crate::launcher::{AsyncOperation, AsyncRequest, Outcome, RequestPayload, ResultValue};
use crate::selection::{GenerationRequest, MediaRef};
use crate::subtitle::write_srt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequestBody {
    pub title: String,
    pub language: String,
    /// SubRip content of the source subtitle file
    pub subtitle: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponseBody {
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client for the external subtitle generation service
pub struct HttpGenerator {
    client: Client,
    config: GenerationConfig,
}

impl HttpGenerator {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent("autosub/0.1.0");
        if let Some(limit) = config.timeout() {
            builder = builder.timeout(limit);
        }
        let client = builder.build().map_err(AutosubError::Http)?;

        Ok(Self { client, config })
    }

    /// Where the generated subtitles for `request` are written
    pub fn output_path(&self, request: &GenerationRequest) -> PathBuf {
        Path::new(&self.config.output_dir).join(format!(
            "{}_{}.srt",
            file_stem_for(&request.title),
            request.language
        ))
    }

    /// Send the subtitle to the service and store the generated result
    pub async fn generate(&self, request: &GenerationRequest) -> Result<MediaRef> {
        let source_path = request.subtitle.to_path();
        let subtitle = tokio::fs::read_to_string(&source_path)
            .await
            .map_err(|e| AutosubError::Generation(format!(
                "Cannot read subtitle {}: {}",
                source_path.display(),
                e
            )))?;

        let body = GenerateRequestBody {
            title: request.title.clone(),
            language: request.language.clone(),
            subtitle,
        };

        let url = format!("{}/api/translate", self.config.endpoint.trim_end_matches('/'));
        debug!("Sending generation request to: {}", url);

        let response = self.client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AutosubError::Generation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AutosubError::Generation(format!(
                "Generation service error {}: {}", status, error_text
            )));
        }

        let text = response.text().await?;
        let reply: GenerateResponseBody = serde_json::from_str(&text)?;

        if let Some(error) = reply.error {
            return Err(AutosubError::Generation(error));
        }

        let content = reply
            .subtitle
            .ok_or_else(|| AutosubError::Generation("Response carried no subtitle".to_string()))?;

        let output_path = self.output_path(request);
        write_srt(&content, &output_path).await?;

        info!("Generated subtitles stored at {}", output_path.display());
        Ok(MediaRef::from(output_path))
    }
}

#[async_trait]
impl AsyncOperation for HttpGenerator {
    async fn run(&self, request: AsyncRequest) -> Outcome {
        let RequestPayload::Generate(generation) = request.payload else {
            return Outcome::Failed(format!("{} cannot be served by the generator", request.kind));
        };

        match self.generate(&generation).await {
            Ok(output) => Outcome::Success(ResultValue::Generated(output)),
            Err(e) => {
                warn!("Generation request {} failed: {}", request.correlation_id, e);
                Outcome::Failed(e.to_string())
            }
        }
    }
}

/// Turn a free-form title into a safe file stem
fn file_stem_for(title: &str) -> String {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();

    if stem.is_empty() {
        "subtitle".to_string()
    } else {
        stem
    }
}
