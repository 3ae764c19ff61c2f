//! Judgment provider module for Neko Judge.
//!
//! This module provides:
//! * [`JudgeProvider`] — async capability trait (judge, transcribe,
//!   generate-image) implemented by all backends.
//! * [`OpenAiProvider`] — OpenAI-compatible REST backend.
//! * [`GeminiProvider`] — Gemini `generateContent` backend.
//! * [`PromptBuilder`] — builds the deterministic cat-judge prompt.
//! * [`JudgeError`] / [`TranscribeError`] — typed provider errors.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use neko_judge::case::CaseData;
//! use neko_judge::config::{AppConfig, ProviderKind};
//! use neko_judge::provider::{build_provider, JudgeProvider};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let provider: Arc<dyn JudgeProvider> = build_provider(&config);
//!
//!     let case = CaseData {
//!         name_a: "木可".into(),
//!         name_b: "木尚".into(),
//!         context: "忘记纪念日".into(),
//!         story_a: "他忘了".into(),
//!         story_b: "我没忘只是晚说".into(),
//!     };
//!     let verdict = provider.judge(&case).await.unwrap();
//!     println!("blame split {}/{}", verdict.blame_a, verdict.blame_b);
//! }
//! ```

pub mod api;
pub mod gemini;
pub mod openai;
pub mod prompt;

use std::sync::Arc;

use crate::config::{AppConfig, ProviderKind};

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use api::{AudioClip, JudgeError, JudgeImage, JudgeProvider, TranscribeError};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use prompt::PromptBuilder;

/// Construct the configured backend as a shared trait object.
pub fn build_provider(config: &AppConfig) -> Arc<dyn JudgeProvider> {
    match config.provider {
        ProviderKind::OpenAiCompatible => Arc::new(OpenAiProvider::from_config(config)),
        ProviderKind::Gemini => Arc::new(GeminiProvider::from_config(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_provider_honours_provider_kind() {
        let mut config = AppConfig::default();

        config.provider = ProviderKind::Gemini;
        let _gemini = build_provider(&config);

        config.provider = ProviderKind::OpenAiCompatible;
        let _openai = build_provider(&config);
    }
}
