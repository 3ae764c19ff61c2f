//! OpenAI-compatible provider backend.
//!
//! `OpenAiProvider` speaks to any `/v1/chat/completions` endpoint — OpenAI,
//! Groq, LM Studio, vLLM, etc. — for judgments, and to the Whisper-style
//! `/v1/audio/transcriptions` endpoint for speech-to-text.  All connection
//! details come from [`AppConfig`]; nothing is hardcoded.
//!
//! This backend has no image-generation surface: `generate_judge_image`
//! always returns `None` and the UI shows the placeholder icon.

use std::time::Duration;

use async_trait::async_trait;

use crate::case::{CaseData, RawVerdict, Verdict};
use crate::config::AppConfig;
use crate::provider::api::{AudioClip, JudgeError, JudgeImage, JudgeProvider, TranscribeError};
use crate::provider::prompt::PromptBuilder;

/// Calls an OpenAI-compatible REST API.
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: AppConfig,
    prompt: PromptBuilder,
}

impl OpenAiProvider {
    /// Build a provider from application config.
    ///
    /// A single HTTP client is shared by both calls; per-request timeouts
    /// come from the judge / transcription sections of the config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
            prompt: PromptBuilder::new(),
        }
    }

    /// Attach `Authorization: Bearer …` only when an API key is configured —
    /// safe for local providers that require no authentication.
    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let key = self.config.judge.api_key.as_deref().unwrap_or("");
        if key.is_empty() {
            req
        } else {
            req.bearer_auth(key)
        }
    }
}

#[async_trait]
impl JudgeProvider for OpenAiProvider {
    async fn judge(&self, case: &CaseData) -> Result<Verdict, JudgeError> {
        let (system_msg, user_msg) = self.prompt.build_chat(case);

        let url = format!("{}/v1/chat/completions", self.config.judge.base_url);

        let body = serde_json::json!({
            "model":       self.config.judge.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.judge.temperature,
            "response_format": { "type": "json_object" }
        });

        let response = self
            .authorize(self.client.post(&url).json(&body))
            .timeout(Duration::from_secs(self.config.judge.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(JudgeError::Request(format!("{status}: {detail}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| JudgeError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(JudgeError::EmptyResponse)?
            .trim();

        if content.is_empty() {
            return Err(JudgeError::EmptyResponse);
        }

        let raw: RawVerdict =
            serde_json::from_str(content).map_err(|e| JudgeError::Parse(e.to_string()))?;

        Ok(Verdict::from_raw(raw)?)
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<String, TranscribeError> {
        let url = format!("{}/v1/audio/transcriptions", self.config.judge.base_url);

        let file_part = reqwest::multipart::Part::bytes(clip.wav.clone())
            .file_name("audio.wav")
            .mime_str(clip.mime)
            .map_err(|e| TranscribeError::Request(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.config.transcription.model.clone())
            .text("language", self.config.transcription.language.clone())
            .text("response_format", "text")
            .part("file", file_part);

        let response = self
            .authorize(self.client.post(&url).multipart(form))
            .timeout(Duration::from_secs(self.config.transcription.timeout_secs))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(TranscribeError::Request(format!("{status}: {detail}")));
        }

        let transcript = response.text().await?.trim().to_string();
        if transcript.is_empty() {
            return Err(TranscribeError::EmptyTranscript);
        }

        Ok(transcript)
    }

    async fn generate_judge_image(&self) -> Option<JudgeImage> {
        log::debug!("judge illustration not supported by the OpenAI-compatible backend");
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    fn make_config(api_key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::default();
        config.provider = ProviderKind::OpenAiCompatible;
        config.judge.base_url = "https://api.openai.com".into();
        config.judge.api_key = api_key.map(|s| s.to_string());
        config.judge.model = "gpt-4o".into();
        config.transcription.model = "whisper-1".into();
        config
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _provider = OpenAiProvider::from_config(&make_config(None));
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let _provider = OpenAiProvider::from_config(&make_config(Some("")));
    }

    #[test]
    fn from_config_accepts_real_api_key() {
        let _provider = OpenAiProvider::from_config(&make_config(Some("sk-test-1234")));
    }

    /// This backend never surfaces an image — the placeholder is always
    /// valid input for the verdict view.
    #[tokio::test]
    async fn image_generation_silently_degrades() {
        let provider = OpenAiProvider::from_config(&make_config(None));
        assert!(provider.generate_judge_image().await.is_none());
    }

    /// Verify the provider is usable as `dyn JudgeProvider`.
    #[test]
    fn provider_is_object_safe() {
        let provider: Box<dyn JudgeProvider> =
            Box::new(OpenAiProvider::from_config(&make_config(None)));
        drop(provider);
    }
}
