//! HTTP processing service binding.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::{info, warn};

use crate::error::{ProcessorError, ProcessorResult};
use crate::traits::{ProcessRequest, ProcessedOutput, VideoProcessor};

/// Client for the processing service.
///
/// `POST {base}/process` with multipart `{file, broll?}` returns the processed
/// video as the response body. Processing can take minutes, so the client
/// has no request timeout.
#[derive(Clone)]
pub struct HttpProcessor {
    http: Client,
    process_url: String,
    health_url: String,
}

impl HttpProcessor {
    pub fn new(base_url: &str) -> ProcessorResult<Self> {
        let base_url = base_url.trim_end_matches('/');
        if base_url.is_empty() {
            return Err(ProcessorError::config_error("VIDEO_PROCESSOR_URL is empty"));
        }

        let http = Client::builder()
            .user_agent(concat!("vboost-processor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            process_url: format!("{}/process", base_url),
            health_url: format!("{}/health", base_url),
        })
    }
}

#[async_trait]
impl VideoProcessor for HttpProcessor {
    async fn process(&self, request: ProcessRequest) -> ProcessorResult<ProcessedOutput> {
        let input_bytes = request.bytes.len();
        let mut part = Part::bytes(request.bytes).file_name(request.file_name.clone());
        if let Some(content_type) = request.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part("file", part);
        if let Some(broll) = request.broll {
            form = form.text("broll", broll);
        }

        info!(
            url = %self.process_url,
            file_name = %request.file_name,
            bytes = input_bytes,
            "Dispatching video to processor"
        );

        let response = self
            .http
            .post(&self.process_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Processor rejected video");
            return Err(ProcessorError::rejected(status.as_u16(), body));
        }

        let bytes = response.bytes().await?.to_vec();
        info!(bytes = bytes.len(), "Processor returned video");

        Ok(ProcessedOutput::new(bytes))
    }

    async fn check_health(&self) -> ProcessorResult<()> {
        let response = self.http.get(&self.health_url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ProcessorError::rejected(status.as_u16(), body))
        }
    }

    fn backend_name(&self) -> &'static str {
        "http"
    }
}
