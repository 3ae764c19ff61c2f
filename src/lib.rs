//! Neko Judge — an LLM-arbitrated dispute court for couples.
//!
//! Two parties each tell their side of an argument (typed or dictated via
//! the microphone); a chat-completion model returns a structured verdict
//! with blame percentages, an analysis, and reconciliation advice.
//!
//! # Module map
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`case`] | Case form data and the validated [`case::Verdict`] |
//! | [`html`] | Sanitizing and block-parsing the verdict's HTML fragments |
//! | [`config`] | TOML configuration and on-disk paths |
//! | [`provider`] | [`provider::JudgeProvider`] trait and the API backends |
//! | [`audio`] | cpal capture, WAV encoding, per-party recorder threads |
//! | [`pipeline`] | Async runner bridging the UI to the provider |
//! | [`app`] | egui application — form and verdict views |

pub mod app;
pub mod audio;
pub mod case;
pub mod config;
pub mod html;
pub mod pipeline;
pub mod provider;
