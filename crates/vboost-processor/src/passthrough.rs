//! Processor that returns the upload unchanged.

use async_trait::async_trait;
use tracing::debug;

use crate::error::ProcessorResult;
use crate::traits::{ProcessRequest, ProcessedOutput, VideoProcessor};

/// Development processor: echoes the uploaded bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughProcessor;

#[async_trait]
impl VideoProcessor for PassthroughProcessor {
    async fn process(&self, request: ProcessRequest) -> ProcessorResult<ProcessedOutput> {
        debug!(
            file_name = %request.file_name,
            bytes = request.bytes.len(),
            "Passing video through unprocessed"
        );
        Ok(ProcessedOutput::new(request.bytes))
    }

    async fn check_health(&self) -> ProcessorResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "passthrough"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_passthrough_echoes_bytes() {
        let output = PassthroughProcessor
            .process(ProcessRequest {
                file_name: "a.mp4".into(),
                content_type: None,
                bytes: vec![0, 1, 2],
                broll: Some("city".into()),
            })
            .await
            .unwrap();
        assert_eq!(output.bytes, vec![0, 1, 2]);
        assert!(output.captions.is_none());
    }
}
