//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Endpoint credentials, base URLs and model names are opaque pass-through
//! values for the provider backends; nothing in the core reads them beyond
//! handing them to the HTTP client.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// Selects which backend implements the judgment provider capability.
///
/// | Variant          | Judge                     | Transcribe            | Image |
/// |------------------|---------------------------|-----------------------|-------|
/// | OpenAiCompatible | `/v1/chat/completions`    | multipart WAV upload  | no    |
/// | Gemini           | `:generateContent` schema | inline base64 audio   | yes   |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Any OpenAI-compatible REST API (OpenAI, Groq, LM Studio, vLLM …).
    OpenAiCompatible,
    /// Google Gemini (`generativelanguage.googleapis.com`).
    Gemini,
}

impl Default for ProviderKind {
    fn default() -> Self {
        Self::Gemini
    }
}

// ---------------------------------------------------------------------------
// JudgeConfig
// ---------------------------------------------------------------------------

/// Settings for the chat-completion judgment call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Base URL of the API endpoint.
    ///
    /// - OpenAI: `https://api.openai.com`
    /// - Gemini: `https://generativelanguage.googleapis.com`
    pub base_url: String,
    /// API key — `None` for endpoints that require no authentication.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o"`,
    /// `"gemini-2.5-pro"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a judgment response before timing out.
    pub timeout_secs: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            model: "gemini-2.5-pro".into(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TranscriptionConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-to-text call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    /// Model identifier (e.g. `"whisper-1"`, `"gemini-2.5-flash"`).
    pub model: String,
    /// Target transcript language as an ISO-639-1 code.  The judge persona
    /// answers in Chinese, so transcripts default to `"zh"`.
    pub language: String,
    /// Maximum seconds to wait for a transcription response.
    pub timeout_secs: u64,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            language: "zh".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// ImageConfig
// ---------------------------------------------------------------------------

/// Settings for the optional judge-illustration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Whether to request an illustration after each verdict at all.
    pub enabled: bool,
    /// Image-capable model identifier.
    pub model: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.5-flash-image".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Last saved window position `(x, y)` in screen pixels.  `None` means
    /// let the OS / window manager pick a position on first launch.
    pub window_position: Option<(f32, f32)>,
    /// Initial window size `(width, height)`.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_position: None,
            window_size: (860.0, 720.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use neko_judge::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
///
/// // Modify and save
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Which backend serves judge/transcribe/image requests.
    pub provider: ProviderKind,
    /// Judgment call settings.
    pub judge: JudgeConfig,
    /// Speech-to-text call settings.
    pub transcription: TranscriptionConfig,
    /// Judge-illustration settings.
    pub image: ImageConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// Verify that a default `AppConfig` can be serialised to TOML and
    /// deserialised back without any data loss.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.provider, loaded.provider);
        assert_eq!(original.judge.base_url, loaded.judge.base_url);
        assert_eq!(original.judge.api_key, loaded.judge.api_key);
        assert_eq!(original.judge.model, loaded.judge.model);
        assert_eq!(original.judge.timeout_secs, loaded.judge.timeout_secs);
        assert_eq!(original.transcription.model, loaded.transcription.model);
        assert_eq!(
            original.transcription.language,
            loaded.transcription.language
        );
        assert_eq!(original.image.enabled, loaded.image.enabled);
        assert_eq!(original.image.model, loaded.image.model);
        assert_eq!(original.ui.window_size, loaded.ui.window_size);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");

        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.judge.model, AppConfig::default().judge.model);
        assert_eq!(config.transcription.language, "zh");
    }

    /// Verify default values.
    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.provider, ProviderKind::Gemini);
        assert_eq!(cfg.judge.base_url, "https://generativelanguage.googleapis.com");
        assert!(cfg.judge.api_key.is_none());
        assert_eq!(cfg.judge.timeout_secs, 60);
        assert_eq!(cfg.transcription.language, "zh");
        assert!(cfg.image.enabled);
    }

    /// Verify that modified non-default values survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.provider = ProviderKind::OpenAiCompatible;
        cfg.judge.base_url = "https://api.openai.com".into();
        cfg.judge.api_key = Some("sk-test".into());
        cfg.judge.model = "gpt-4o".into();
        cfg.judge.timeout_secs = 90;
        cfg.transcription.model = "whisper-1".into();
        cfg.image.enabled = false;
        cfg.ui.window_position = Some((100.0, 200.0));

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.provider, ProviderKind::OpenAiCompatible);
        assert_eq!(loaded.judge.base_url, "https://api.openai.com");
        assert_eq!(loaded.judge.api_key, Some("sk-test".into()));
        assert_eq!(loaded.judge.model, "gpt-4o");
        assert_eq!(loaded.judge.timeout_secs, 90);
        assert_eq!(loaded.transcription.model, "whisper-1");
        assert!(!loaded.image.enabled);
        assert_eq!(loaded.ui.window_position, Some((100.0, 200.0)));
    }
}
