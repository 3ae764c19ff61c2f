//! Background pipeline runner.
//!
//! [`PipelineRunner::run`] lives on the tokio runtime, receives
//! [`PipelineCommand`]s from the UI, drives the provider, and emits
//! [`PipelineResult`]s.  Each command is served by its own spawned task so
//! a long judgment call never blocks an independent transcription.
//!
//! Error mapping happens here: full provider detail goes to the log, the
//! UI only ever receives the fixed Chinese user-facing strings.  One
//! request, one response, one terminal outcome per command — no retries.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::case::Party;
use crate::pipeline::message::{PipelineCommand, PipelineResult};
use crate::provider::{AudioClip, JudgeProvider};

/// Banner text when the judgment call fails for any reason.
const MSG_JUDGE_UNAVAILABLE: &str = "猫猫法官去抓老鼠了（API错误），请稍后再试。";

/// Inline text when a transcription call fails for any reason.
const MSG_TRANSCRIBE_FAILED: &str = "转录失败，请重试。";

/// Drives provider calls on behalf of the UI.
pub struct PipelineRunner {
    provider: Arc<dyn JudgeProvider>,
}

impl PipelineRunner {
    pub fn new(provider: Arc<dyn JudgeProvider>) -> Self {
        Self { provider }
    }

    /// Serve commands until the command channel closes.
    pub async fn run(
        self,
        mut command_rx: mpsc::Receiver<PipelineCommand>,
        result_tx: mpsc::Sender<PipelineResult>,
    ) {
        while let Some(cmd) = command_rx.recv().await {
            let provider = Arc::clone(&self.provider);
            let result_tx = result_tx.clone();

            match cmd {
                PipelineCommand::Judge { seq, case } => {
                    tokio::spawn(async move {
                        run_judgment(provider, seq, case, result_tx).await;
                    });
                }
                PipelineCommand::Transcribe { seq, slot, clip } => {
                    tokio::spawn(async move {
                        run_transcription(provider, seq, slot, clip, result_tx).await;
                    });
                }
            }
        }

        log::info!("pipeline runner shutting down");
    }
}

async fn run_judgment(
    provider: Arc<dyn JudgeProvider>,
    seq: u64,
    case: crate::case::CaseData,
    result_tx: mpsc::Sender<PipelineResult>,
) {
    match provider.judge(&case).await {
        Ok(verdict) => {
            log::info!(
                "verdict ready (seq {seq}): blame {}/{}",
                verdict.blame_a,
                verdict.blame_b
            );
            let _ = result_tx
                .send(PipelineResult::VerdictReady { seq, verdict })
                .await;

            // The illustration is best-effort and strictly after the
            // verdict; a miss leaves the placeholder in place.
            if let Some(image) = provider.generate_judge_image().await {
                let _ = result_tx
                    .send(PipelineResult::JudgeImageReady { seq, image })
                    .await;
            }
        }
        Err(e) => {
            log::warn!("judgment failed (seq {seq}): {e}");
            let _ = result_tx
                .send(PipelineResult::JudgmentFailed {
                    seq,
                    message: MSG_JUDGE_UNAVAILABLE.into(),
                })
                .await;
        }
    }
}

async fn run_transcription(
    provider: Arc<dyn JudgeProvider>,
    seq: u64,
    slot: Party,
    clip: AudioClip,
    result_tx: mpsc::Sender<PipelineResult>,
) {
    match provider.transcribe(&clip).await {
        Ok(text) => {
            log::info!(
                "transcript ready (seq {seq}, slot {}): {} chars",
                slot.label(),
                text.chars().count()
            );
            let _ = result_tx
                .send(PipelineResult::TranscriptReady { seq, slot, text })
                .await;
        }
        Err(e) => {
            log::warn!("transcription failed (seq {seq}, slot {}): {e}", slot.label());
            let _ = result_tx
                .send(PipelineResult::TranscriptionFailed {
                    seq,
                    slot,
                    message: MSG_TRANSCRIBE_FAILED.into(),
                })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
