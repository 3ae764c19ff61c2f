//! Gemini provider backend.
//!
//! Speaks the `models/{model}:generateContent` API for all three
//! operations: judgments use a declared JSON response schema, transcription
//! sends the recorded clip as an inline base64 audio part, and the judge
//! illustration comes back as inline base64 image data.
//!
//! The API key travels as a query parameter, per the Gemini REST contract.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;

use crate::case::{CaseData, RawVerdict, Verdict};
use crate::config::AppConfig;
use crate::provider::api::{AudioClip, JudgeError, JudgeImage, JudgeProvider, TranscribeError};
use crate::provider::prompt::{PromptBuilder, JUDGE_IMAGE_PROMPT, TRANSCRIBE_INSTRUCTION};

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CandidatePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: Option<String>,
    data: String,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate's parts, if any.
    fn first_text(self) -> Option<String> {
        let parts = self.candidates?.into_iter().next()?.content?.parts?;
        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// First inline-data payload of the first candidate, if any.
    fn first_inline_data(self) -> Option<InlineData> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .find_map(|p| p.inline_data)
    }
}

// ---------------------------------------------------------------------------
// GeminiProvider
// ---------------------------------------------------------------------------

/// Calls the Gemini `generateContent` REST API.
pub struct GeminiProvider {
    client: reqwest::Client,
    config: AppConfig,
    prompt: PromptBuilder,
}

impl GeminiProvider {
    /// Build a provider from application config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            prompt: PromptBuilder::new(),
        }
    }

    /// `{base}/v1beta/models/{model}:generateContent?key={api_key}`
    fn endpoint(&self, model: &str) -> String {
        let key = self.config.judge.api_key.as_deref().unwrap_or("");
        format!(
            "{}/v1beta/models/{model}:generateContent?key={key}",
            self.config.judge.base_url
        )
    }

    /// POST `body` to `model`'s generateContent endpoint and deserialize the
    /// response envelope.
    async fn generate(
        &self,
        model: &str,
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<GenerateContentResponse, reqwest::Error> {
        let response = self
            .client
            .post(self.endpoint(model))
            .json(body)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        response.json::<GenerateContentResponse>().await
    }
}

#[async_trait]
impl JudgeProvider for GeminiProvider {
    async fn judge(&self, case: &CaseData) -> Result<Verdict, JudgeError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": self.prompt.build(case) }] }],
            "generationConfig": {
                "temperature": self.config.judge.temperature,
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "blameA":   { "type": "INTEGER" },
                        "blameB":   { "type": "INTEGER" },
                        "analysis": { "type": "STRING" },
                        "advice":   { "type": "STRING" }
                    },
                    "required": ["blameA", "blameB", "analysis", "advice"]
                }
            }
        });

        let timeout = Duration::from_secs(self.config.judge.timeout_secs);
        let response = self.generate(&self.config.judge.model, &body, timeout).await?;

        let content = response.first_text().ok_or(JudgeError::EmptyResponse)?;

        let raw: RawVerdict = serde_json::from_str(content.trim())
            .map_err(|e| JudgeError::Parse(e.to_string()))?;

        Ok(Verdict::from_raw(raw)?)
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscribeError> {
        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": clip.mime,
                            "data": BASE64.encode(&clip.wav)
                        }
                    },
                    { "text": TRANSCRIBE_INSTRUCTION }
                ]
            }]
        });

        let timeout = Duration::from_secs(self.config.transcription.timeout_secs);
        let response = self
            .generate(&self.config.transcription.model, &body, timeout)
            .await?;

        response
            .first_text()
            .map(|t| t.trim().to_string())
            .ok_or(TranscribeError::EmptyTranscript)
    }

    async fn generate_judge_image(&self) -> Option<JudgeImage> {
        if !self.config.image.enabled {
            return None;
        }

        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": JUDGE_IMAGE_PROMPT }] }]
        });

        let timeout = Duration::from_secs(self.config.judge.timeout_secs);
        let response = match self.generate(&self.config.image.model, &body, timeout).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("judge illustration request failed: {e}");
                return None;
            }
        };

        let inline = response.first_inline_data()?;
        match BASE64.decode(inline.data.as_bytes()) {
            Ok(bytes) => Some(JudgeImage {
                bytes,
                mime: inline.mime_type.unwrap_or_else(|| "image/png".into()),
            }),
            Err(e) => {
                log::warn!("judge illustration payload was not valid base64: {e}");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
