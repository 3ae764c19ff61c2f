//! The `JudgeProvider` capability trait and provider error types.
//!
//! Both backends (OpenAI-compatible and Gemini) expose the same three
//! operations behind one trait, so the UI and pipeline depend only on the
//! capability and a backend swap never touches them.

use async_trait::async_trait;
use thiserror::Error;

use crate::case::{CaseData, Verdict, VerdictError};

// ---------------------------------------------------------------------------
// Payload types
// ---------------------------------------------------------------------------

/// One finished recording, encoded for transport.
#[derive(Debug, Clone)]
pub struct AudioClip {
    /// Complete WAV file bytes (16-bit PCM mono).
    pub wav: Vec<u8>,
    /// MIME type of `wav` — always `audio/wav` today.
    pub mime: &'static str,
}

impl AudioClip {
    pub fn new(wav: Vec<u8>) -> Self {
        Self {
            wav,
            mime: "audio/wav",
        }
    }
}

/// An inline judge illustration returned by an image-capable backend.
#[derive(Debug, Clone)]
pub struct JudgeImage {
    /// Raw encoded image bytes (typically PNG).
    pub bytes: Vec<u8>,
    /// Declared MIME type, e.g. `image/png`.
    pub mime: String,
}

// ---------------------------------------------------------------------------
// JudgeError
// ---------------------------------------------------------------------------

/// Errors that can occur during a judgment call.
///
/// All variants collapse to one user-facing "judge unavailable" message at
/// the pipeline boundary; the variant detail only ever reaches the log.
#[derive(Debug, Error)]
pub enum JudgeError {
    /// HTTP transport, connection, or non-success status error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("judgment request timed out")]
    Timeout,

    /// The response body could not be parsed as the expected JSON.
    #[error("failed to parse judgment response: {0}")]
    Parse(String),

    /// The endpoint answered but carried no usable text content.
    #[error("judgment response was empty")]
    EmptyResponse,

    /// The JSON parsed but failed verdict validation (blame range / sum).
    #[error("judgment failed validation: {0}")]
    InvalidVerdict(#[from] VerdictError),
}

impl From<reqwest::Error> for JudgeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            JudgeError::Timeout
        } else {
            JudgeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TranscribeError
// ---------------------------------------------------------------------------

/// Errors that can occur during a transcription call.
#[derive(Debug, Error)]
pub enum TranscribeError {
    /// HTTP transport, connection, or non-success status error.
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("transcription request timed out")]
    Timeout,

    /// The endpoint returned no transcript text.
    #[error("transcription returned an empty transcript")]
    EmptyTranscript,
}

impl From<reqwest::Error> for TranscribeError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranscribeError::Timeout
        } else {
            TranscribeError::Request(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// JudgeProvider trait
// ---------------------------------------------------------------------------

/// Async capability trait implemented by all provider backends.
///
/// Implementors must be `Send + Sync` so they can be shared as
/// `Arc<dyn JudgeProvider>` between the pipeline task and tests.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Judge a complete case: one request, one validated [`Verdict`] or one
    /// terminal error.  No retry, no streaming.
    async fn judge(&self, case: &CaseData) -> Result<Verdict, JudgeError>;

    /// Transcribe a recorded clip into plain text in the configured
    /// language.
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscribeError>;

    /// Request the judge illustration.
    ///
    /// Never fails: backends without image support, and any failure in
    /// image-capable backends, return `None` so the caller falls back to
    /// the placeholder icon.
    async fn generate_judge_image(&self) -> Option<JudgeImage>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_error_converts_to_invalid_verdict() {
        let err: JudgeError = VerdictError::BlameSumMismatch(50).into();
        assert!(matches!(err, JudgeError::InvalidVerdict(_)));
    }

    #[test]
    fn audio_clip_declares_wav_mime() {
        let clip = AudioClip::new(vec![0u8; 44]);
        assert_eq!(clip.mime, "audio/wav");
        assert_eq!(clip.wav.len(), 44);
    }

    /// The trait must be object-safe (usable as `Arc<dyn JudgeProvider>`).
    #[test]
    fn provider_is_object_safe() {
        fn assert_traitobj(_: Option<&dyn JudgeProvider>) {}
        assert_traitobj(None);
    }
}
