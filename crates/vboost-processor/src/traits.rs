//! Processor abstraction.

use async_trait::async_trait;

use crate::error::ProcessorResult;

/// An uploaded video handed to a processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    /// Client-supplied file name
    pub file_name: String,
    /// Client-supplied content type, if any
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    /// B-roll style, forwarded uninterpreted. Blank values are already dropped.
    pub broll: Option<String>,
}

/// Result of a successful processing run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedOutput {
    /// Processed video bytes (MP4)
    pub bytes: Vec<u8>,
    /// Caption text, when the binding produces it
    pub captions: Option<String>,
}

impl ProcessedOutput {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            captions: None,
        }
    }
}

#[async_trait]
pub trait VideoProcessor: Send + Sync {
    /// Process one video. No retry is attempted.
    async fn process(&self, request: ProcessRequest) -> ProcessorResult<ProcessedOutput>;

    /// Check that the processor can accept work.
    async fn check_health(&self) -> ProcessorResult<()>;

    fn backend_name(&self) -> &'static str;
}
