//! Pipeline module — the background half of the application.
//!
//! The UI owns all state; this module owns all network activity.  Commands
//! flow UI → runner over one tokio mpsc channel, results flow back over
//! another, and the sequence number carried on every message lets the UI
//! drop results that belong to a case the user has already reset.
//!
//! ```text
//! JudgeApp (egui) ──PipelineCommand──▶ PipelineRunner::run()  ← tokio task
//!        ▲                                   │
//!        └──────────PipelineResult───────────┘
//! ```

pub mod message;
pub mod runner;

pub use message::{PipelineCommand, PipelineResult};
pub use runner::PipelineRunner;
