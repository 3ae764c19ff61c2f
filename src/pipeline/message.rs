//! Command / result protocol between the UI and the pipeline runner.
//!
//! Every command carries the case sequence number; results echo it back so
//! the UI can discard responses that arrive after the user has reset the
//! form (no in-flight cancellation exists — stale results are dropped, not
//! applied).

use crate::case::{CaseData, Party, Verdict};
use crate::provider::{AudioClip, JudgeImage};

/// Commands sent from the UI thread to the pipeline runner.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// Judge a complete case.  The UI guarantees at most one of these is in
    /// flight at a time.
    Judge { seq: u64, case: CaseData },
    /// Transcribe a finished recording for one story slot.  The two slots
    /// are independent; both may be in flight at once.
    Transcribe {
        seq: u64,
        slot: Party,
        clip: AudioClip,
    },
}

/// Results delivered from the pipeline runner to the UI.
#[derive(Debug, Clone)]
pub enum PipelineResult {
    /// The judgment call succeeded with a validated verdict.
    VerdictReady { seq: u64, verdict: Verdict },
    /// The judgment call failed; `message` is the fixed user-facing banner
    /// text, never raw provider detail.
    JudgmentFailed { seq: u64, message: String },
    /// Transcription succeeded for `slot`.
    TranscriptReady {
        seq: u64,
        slot: Party,
        text: String,
    },
    /// Transcription failed for `slot`; the story field stays untouched.
    TranscriptionFailed {
        seq: u64,
        slot: Party,
        message: String,
    },
    /// The judge illustration arrived (only ever sent after a successful
    /// verdict; absent entirely when generation fails or is unsupported).
    JudgeImageReady { seq: u64, image: JudgeImage },
}
