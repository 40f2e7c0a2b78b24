use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::Story,
    error::ApiError,
    protocol::{
        DescriptionResponse, HearStoryRequest, HearStoryResponse, VisualStoryRequest,
        VisualStoryResponse, GENERATE_DESCRIPTION_PATH, GENERATE_VISUAL_STORY_PATH,
        HEAR_STORY_PATH, IMAGE_FIELD,
    },
};
use tracing::{debug, info};

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod selection;
pub mod state;

pub use config::ClientSettings;
pub use error::{StoryError, StoryErrorKind, StoryResult};
pub use orchestrator::StoryOrchestrator;
pub use selection::ImageSelection;
pub use state::{
    Completion, DescribeTicket, InFlight, NarrationTicket, Operation, OperationStatus, Preview,
    StoryState, StoryTicket,
};

pub const STORY_GENERATION_FAILED: &str = "story generation failed";
pub const NARRATION_FAILED: &str = "narration failed";

/// The remote service that captions images, writes stories and narrates them.
#[async_trait]
pub trait StoryBackend: Send + Sync {
    async fn describe_image(&self, image: &ImageSelection) -> StoryResult<String>;
    async fn generate_story(&self, prompt: &str) -> StoryResult<Story>;
    async fn narrate(&self, story_text: &str) -> StoryResult<()>;
}

pub struct HttpStoryBackend {
    http: Client,
    server_url: String,
}

impl HttpStoryBackend {
    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let url = settings.backend_url()?;
        let mut builder = Client::builder();
        if let Some(secs) = settings.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("failed to build http client")?;
        Ok(Self::with_client(http, url.as_str()))
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }
}

#[async_trait]
impl StoryBackend for HttpStoryBackend {
    async fn describe_image(&self, image: &ImageSelection) -> StoryResult<String> {
        let part = Part::bytes(image.bytes().to_vec())
            .file_name(image.file_name().to_string())
            .mime_str(image.mime_type())
            .map_err(|e| StoryError::validation(format!("invalid image mime type: {e}")))?;
        let form = Form::new().part(IMAGE_FIELD, part);
        debug!(
            operation = "describe",
            bytes = image.len(),
            file_name = image.file_name(),
            "posting image for description"
        );

        let response = self
            .http
            .post(self.endpoint(GENERATE_DESCRIPTION_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(StoryError::from_reqwest)?;
        let body: DescriptionResponse = read_json(response).await?;

        match body.description {
            Some(description) if !description.trim().is_empty() => {
                info!(
                    operation = "describe",
                    bytes = description.len(),
                    "description received"
                );
                Ok(description)
            }
            _ => Err(StoryError::remote(body.error.unwrap_or_else(|| {
                "backend response did not include a description".to_string()
            }))),
        }
    }

    async fn generate_story(&self, prompt: &str) -> StoryResult<Story> {
        debug!(operation = "story", prompt_bytes = prompt.len(), "requesting visual story");
        let response = self
            .http
            .post(self.endpoint(GENERATE_VISUAL_STORY_PATH))
            .json(&VisualStoryRequest {
                prompt: prompt.to_string(),
            })
            .send()
            .await
            .map_err(StoryError::from_reqwest)?;
        let body: VisualStoryResponse = read_json(response).await?;

        let story = match body.story_data {
            Some(segments) if body.success => Story::from_payloads(segments),
            _ => None,
        };
        let Some(story) = story else {
            return Err(StoryError::remote(
                body.error
                    .unwrap_or_else(|| STORY_GENERATION_FAILED.to_string()),
            ));
        };
        info!(operation = "story", segments = story.len(), "story received");
        Ok(story)
    }

    async fn narrate(&self, story_text: &str) -> StoryResult<()> {
        debug!(operation = "narrate", bytes = story_text.len(), "requesting narration");
        let response = self
            .http
            .post(self.endpoint(HEAR_STORY_PATH))
            .json(&HearStoryRequest {
                story_text: story_text.to_string(),
            })
            .send()
            .await
            .map_err(StoryError::from_reqwest)?;
        let body: HearStoryResponse = read_json(response).await?;

        if !body.success {
            return Err(StoryError::remote(
                body.error.unwrap_or_else(|| NARRATION_FAILED.to_string()),
            ));
        }
        info!(operation = "narrate", "narration finished");
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> StoryResult<T> {
    let status = response.status();
    let body = response.bytes().await.map_err(StoryError::from_reqwest)?;
    if !status.is_success() {
        return Err(match ApiError::from_body(&body) {
            Some(api_error) => StoryError::Remote(api_error.error),
            None => StoryError::Remote(format!("backend returned {status}")),
        });
    }
    serde_json::from_slice(&body)
        .map_err(|e| StoryError::Remote(format!("unexpected response from backend: {e}")))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
