//! Audio front-end — microphone capture → session assembly → WAV transport.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → Recorder thread
//!           → downmix_to_mono → encode_wav → AudioClip → transcription
//! ```

pub mod capture;
pub mod recorder;
pub mod wav;

pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use recorder::{Recorder, RecorderEvent};
pub use wav::{downmix_to_mono, encode_wav};
