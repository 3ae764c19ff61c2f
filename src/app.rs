//! Neko Judge window — egui/eframe application.
//!
//! # Architecture
//!
//! [`JudgeApp`] is the top-level [`eframe::App`].  It owns the case form,
//! the derived [`UiPhase`], the last verdict and error, two per-slot
//! recorder handles, and two channel endpoints:
//!
//! * `command_tx` — sends [`PipelineCommand`] to the pipeline runner.
//! * `result_rx`  — receives [`PipelineResult`] from the runner.
//!
//! # Views
//!
//! | State | Visual |
//! |-------|--------|
//! | no verdict, idle        | case form with per-story recording controls |
//! | no verdict, judging     | "法庭审理中..." waiting panel |
//! | verdict present         | judge portrait, blame pie chart, analysis, advice |
//!
//! The form stays interactive while a transcription is outstanding — only
//! the affected slot's recording control and the submit button are gated.

use std::time::Duration;

use eframe::egui;
use tokio::sync::mpsc;

use crate::audio::{Recorder, RecorderEvent};
use crate::case::{CaseData, Party, Verdict, Winner};
use crate::config::AppConfig;
use crate::html::{self, Block};
use crate::pipeline::{PipelineCommand, PipelineResult};
use crate::provider::JudgeImage;

/// Banner shown when submit is pressed with an incomplete form.
const MSG_VALIDATION: &str = "请在召唤法官之前诉说你们的委屈！";

/// Party accent colours, matching the pie chart (pink / blue).
const COLOR_A: egui::Color32 = egui::Color32::from_rgb(244, 114, 182);
const COLOR_B: egui::Color32 = egui::Color32::from_rgb(96, 165, 250);

// ---------------------------------------------------------------------------
// UiPhase
// ---------------------------------------------------------------------------

/// Primary phase of the UI, derived from the independent in-flight flags.
///
/// Exactly one phase is active at a time; the per-slot transcription flags
/// underneath stay independent so recording for one party never blocks the
/// other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiPhase {
    /// Nothing in flight; the form is fully interactive.
    Idle,
    /// Party A's recording is being transcribed.
    TranscribingA,
    /// Party B's recording is being transcribed.
    TranscribingB,
    /// The judgment call is outstanding.
    Judging,
}

// ---------------------------------------------------------------------------
// JudgeApp
// ---------------------------------------------------------------------------

/// eframe application — the Neko Judge window.
pub struct JudgeApp {
    // ── Case state ───────────────────────────────────────────────────────
    /// The mutable case form, owned here for the lifetime of one case.
    pub case: CaseData,
    /// Validated verdict; `Some` switches the window to the verdict view.
    pub verdict: Option<Verdict>,
    /// Top-level banner (validation or judgment failure).
    pub error: Option<String>,

    // ── In-flight flags ──────────────────────────────────────────────────
    judging: bool,
    transcribing: [bool; 2],
    recording: [bool; 2],
    /// Inline per-slot message (permission denied / transcription failed).
    slot_error: [Option<String>; 2],

    /// Case sequence number.  Bumped on reset; results carrying an older
    /// seq are discarded instead of being applied to a fresh case.
    seq: u64,

    // ── Judge portrait ───────────────────────────────────────────────────
    judge_image: Option<JudgeImage>,
    judge_texture: Option<egui::TextureHandle>,

    // ── Channels / recorders ─────────────────────────────────────────────
    command_tx: mpsc::Sender<PipelineCommand>,
    result_rx: mpsc::Receiver<PipelineResult>,
    recorders: [Recorder; 2],

    /// Application configuration (read-only after startup).
    pub config: AppConfig,
}

impl JudgeApp {
    pub fn new(
        command_tx: mpsc::Sender<PipelineCommand>,
        result_rx: mpsc::Receiver<PipelineResult>,
        recorders: [Recorder; 2],
        config: AppConfig,
    ) -> Self {
        Self {
            case: CaseData::default(),
            verdict: None,
            error: None,
            judging: false,
            transcribing: [false; 2],
            recording: [false; 2],
            slot_error: [None, None],
            seq: 0,
            judge_image: None,
            judge_texture: None,
            command_tx,
            result_rx,
            recorders,
            config,
        }
    }

    // ── State machine ────────────────────────────────────────────────────

    /// Derive the primary phase: judging wins, then slot A, then slot B.
    pub fn phase(&self) -> UiPhase {
        if self.judging {
            UiPhase::Judging
        } else if self.transcribing[slot_index(Party::A)] {
            UiPhase::TranscribingA
        } else if self.transcribing[slot_index(Party::B)] {
            UiPhase::TranscribingB
        } else {
            UiPhase::Idle
        }
    }

    /// Submit the case for judgment.
    ///
    /// Fails fast with the validation banner — and no network call — when
    /// any of the five fields is empty.  At most one judgment is in flight;
    /// a submit while anything is outstanding is ignored (the button is
    /// disabled in that state anyway).
    pub fn submit(&mut self) {
        if self.phase() != UiPhase::Idle {
            return;
        }

        if !self.case.is_complete() {
            self.error = Some(MSG_VALIDATION.into());
            return;
        }

        self.error = None;
        self.judging = true;
        let _ = self.command_tx.try_send(PipelineCommand::Judge {
            seq: self.seq,
            case: self.case.clone(),
        });
    }

    /// Start the next case: clear verdict, error, and every form field, and
    /// bump the sequence number so any still-outstanding response is
    /// discarded when it eventually arrives.
    pub fn reset(&mut self) {
        self.seq += 1;
        self.case.clear();
        self.verdict = None;
        self.error = None;
        self.judging = false;
        self.transcribing = [false; 2];
        self.slot_error = [None, None];
        self.judge_image = None;
        self.judge_texture = None;
    }

    /// Merge a finished transcript into its story field: append with a
    /// single space separator when the field already has content, else set
    /// it directly.
    fn apply_transcript(&mut self, slot: Party, text: &str) {
        let field = self.case.story_mut(slot);
        if field.is_empty() {
            field.push_str(text);
        } else {
            field.push(' ');
            field.push_str(text);
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending recorder events (non-blocking).
    fn poll_recorders(&mut self) {
        for slot in [Party::A, Party::B] {
            let idx = slot_index(slot);
            while let Some(event) = self.recorders[idx].try_event() {
                match event {
                    RecorderEvent::Started => {
                        self.recording[idx] = true;
                        self.slot_error[idx] = None;
                    }
                    RecorderEvent::Finished { clip } => {
                        self.recording[idx] = false;
                        self.transcribing[idx] = true;
                        let _ = self.command_tx.try_send(PipelineCommand::Transcribe {
                            seq: self.seq,
                            slot,
                            clip,
                        });
                    }
                    RecorderEvent::PermissionDenied { message }
                    | RecorderEvent::Failed { message } => {
                        self.recording[idx] = false;
                        self.slot_error[idx] = Some(message);
                    }
                }
            }
        }
    }

    /// Drain all pending pipeline results (non-blocking).  Results from a
    /// previous case (stale seq after a reset) are dropped.
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            let seq = match &result {
                PipelineResult::VerdictReady { seq, .. }
                | PipelineResult::JudgmentFailed { seq, .. }
                | PipelineResult::TranscriptReady { seq, .. }
                | PipelineResult::TranscriptionFailed { seq, .. }
                | PipelineResult::JudgeImageReady { seq, .. } => *seq,
            };
            if seq != self.seq {
                log::debug!("discarding stale pipeline result (seq {seq} != {})", self.seq);
                continue;
            }

            match result {
                PipelineResult::VerdictReady { verdict, .. } => {
                    self.judging = false;
                    self.verdict = Some(verdict);
                }
                PipelineResult::JudgmentFailed { message, .. } => {
                    // Case data is preserved so the user can resubmit.
                    self.judging = false;
                    self.error = Some(message);
                }
                PipelineResult::TranscriptReady { slot, text, .. } => {
                    self.transcribing[slot_index(slot)] = false;
                    self.apply_transcript(slot, &text);
                }
                PipelineResult::TranscriptionFailed { slot, message, .. } => {
                    // The story field is left exactly as it was.
                    self.transcribing[slot_index(slot)] = false;
                    self.slot_error[slot_index(slot)] = Some(message);
                }
                PipelineResult::JudgeImageReady { image, .. } => {
                    self.judge_image = Some(image);
                    self.judge_texture = None;
                }
            }
        }
    }

    // ── Form view ────────────────────────────────────────────────────────

    fn draw_header(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.heading(egui::RichText::new("🐱 猫猫法官").size(30.0));
            ui.label(egui::RichText::new("情感调解庭").size(15.0));
            ui.label(
                egui::RichText::new("告诉猫猫法官你们的委屈，让公正可爱的哈基米来断案。")
                    .size(12.0)
                    .weak(),
            );
            ui.add_space(8.0);
        });
    }

    /// Render the waiting panel shown while the judgment call is in flight.
    fn draw_judging(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.spinner();
            ui.add_space(12.0);
            ui.heading("法庭审理中...");
            ui.label(
                egui::RichText::new("猫猫法官正在查阅卷宗并生成判决书").weak(),
            );
        });
    }

    fn draw_form(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label(egui::RichText::new("✨ 基本情况").strong().size(16.0));
            ui.add_space(4.0);

            ui.columns(2, |cols| {
                cols[0].label("主角 A 名字");
                cols[0].add(
                    egui::TextEdit::singleline(&mut self.case.name_a)
                        .hint_text("例如：木可")
                        .desired_width(f32::INFINITY),
                );
                cols[1].label("主角 B 名字");
                cols[1].add(
                    egui::TextEdit::singleline(&mut self.case.name_b)
                        .hint_text("例如：木尚")
                        .desired_width(f32::INFINITY),
                );
            });

            ui.add_space(4.0);
            ui.label("为什么吵架？");
            ui.add(
                egui::TextEdit::multiline(&mut self.case.context)
                    .hint_text("简述争吵的起因...")
                    .desired_rows(3)
                    .desired_width(f32::INFINITY),
            );
        });

        ui.add_space(6.0);
        ui.columns(2, |cols| {
            self.draw_story_section(&mut cols[0], Party::A);
            self.draw_story_section(&mut cols[1], Party::B);
        });

        if let Some(err) = self.error.clone() {
            ui.add_space(6.0);
            ui.colored_label(egui::Color32::from_rgb(220, 60, 60), format!("⚠ {err}"));
        }

        ui.add_space(8.0);
        let submit_enabled = self.phase() == UiPhase::Idle;
        let submit = ui.add_enabled(
            submit_enabled,
            egui::Button::new(egui::RichText::new("🔨 召唤猫猫法官").size(18.0))
                .min_size(egui::vec2(ui.available_width(), 44.0)),
        );
        if submit.clicked() {
            self.submit();
        }
    }

    /// One party's story card: label, text area, recording control, inline
    /// slot message.
    fn draw_story_section(&mut self, ui: &mut egui::Ui, slot: Party) {
        let idx = slot_index(slot);
        let (name, role, accent) = match slot {
            Party::A => (self.case.name_a.clone(), "原告", COLOR_A),
            Party::B => (self.case.name_b.clone(), "被告", COLOR_B),
        };
        let display_name = if name.is_empty() {
            format!("主角 {}", slot.label())
        } else {
            name
        };

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(format!("{display_name} 的说法"))
                        .strong()
                        .color(accent),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(role).size(11.0).weak());
                });
            });

            ui.add(
                egui::TextEdit::multiline(self.case.story_mut(slot))
                    .hint_text(format!("{display_name} 觉得哪里受委屈了？"))
                    .desired_rows(6)
                    .desired_width(f32::INFINITY),
            );

            ui.horizontal(|ui| {
                if self.recording[idx] {
                    if ui
                        .button(egui::RichText::new("⏹ 停止录音").color(egui::Color32::RED))
                        .clicked()
                    {
                        // The finished clip arrives as a recorder event.
                        self.recorders[idx].stop();
                    }
                } else if self.transcribing[idx] {
                    ui.spinner();
                    ui.label(egui::RichText::new("正在转录...").weak());
                } else {
                    let enabled = !self.judging;
                    if ui
                        .add_enabled(enabled, egui::Button::new("🎤 语音输入"))
                        .clicked()
                    {
                        self.slot_error[idx] = None;
                        self.recorders[idx].start();
                    }
                }

                if let Some(msg) = &self.slot_error[idx] {
                    ui.label(
                        egui::RichText::new(msg)
                            .size(11.0)
                            .color(egui::Color32::from_rgb(220, 60, 60)),
                    );
                }
            });
        });
    }

    // ── Verdict view ─────────────────────────────────────────────────────

    fn draw_verdict(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(verdict) = self.verdict.clone() else {
            return;
        };

        self.ensure_judge_texture(ctx);

        ui.vertical_centered(|ui| {
            match &self.judge_texture {
                Some(texture) => {
                    ui.add(egui::Image::new(texture).fit_to_exact_size(egui::vec2(260.0, 180.0)));
                }
                None => {
                    ui.add_space(12.0);
                    ui.label(egui::RichText::new("🐱").size(56.0));
                    ui.label(egui::RichText::new("猫猫法官画像生成中...").weak());
                }
            }
            ui.add_space(6.0);
            ui.heading("🔨 判决已下达");
            ui.label(egui::RichText::new("猫猫法官已经做出了公正的裁决。").weak());
        });

        ui.add_space(10.0);
        ui.group(|ui| {
            ui.label(egui::RichText::new("📊 责任分布图").strong().size(16.0));
            self.draw_blame_chart(ui, &verdict);

            ui.columns(2, |cols| {
                cols[0].vertical_centered(|ui| {
                    ui.label(format!("{} 的责任", self.case.name_a));
                    ui.label(
                        egui::RichText::new(format!("{}%", verdict.blame_a))
                            .strong()
                            .size(22.0)
                            .color(COLOR_A),
                    );
                });
                cols[1].vertical_centered(|ui| {
                    ui.label(format!("{} 的责任", self.case.name_b));
                    ui.label(
                        egui::RichText::new(format!("{}%", verdict.blame_b))
                            .strong()
                            .size(22.0)
                            .color(COLOR_B),
                    );
                });
            });

            ui.vertical_centered(|ui| {
                let line = match verdict.winner {
                    Winner::A => format!("本案胜诉方：{}", self.case.name_a),
                    Winner::B => format!("本案胜诉方：{}", self.case.name_b),
                    Winner::Tie => "本案平局，各打五十大板。".to_string(),
                };
                ui.label(egui::RichText::new(line).strong());
            });
        });

        ui.add_space(10.0);
        ui.group(|ui| {
            ui.label(egui::RichText::new("🐱 法官分析").strong().size(16.0));
            ui.add_space(4.0);
            draw_html_blocks(ui, &verdict.analysis);
        });

        ui.add_space(10.0);
        ui.group(|ui| {
            ui.label(egui::RichText::new("💚 和解建议").strong().size(16.0));
            ui.add_space(4.0);
            draw_html_blocks(ui, &verdict.advice);
        });

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            if ui
                .add(egui::Button::new(
                    egui::RichText::new("🔄 审理下一个案件").size(15.0),
                ))
                .clicked()
            {
                self.reset();
            }
        });
    }

    /// Two-sector pie of the blame split, pink for A and blue for B.
    fn draw_blame_chart(&self, ui: &mut egui::Ui, verdict: &Verdict) {
        let (rect, _) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), 170.0), egui::Sense::hover());
        let painter = ui.painter();

        let center = rect.center();
        let radius = 70.0_f32;
        let total = (verdict.blame_a as f32 + verdict.blame_b as f32).max(1.0);
        let sweep_a = verdict.blame_a as f32 / total * std::f32::consts::TAU;

        let start = -std::f32::consts::FRAC_PI_2; // 12 o'clock
        painter.extend(pie_sector(center, radius, start, sweep_a, COLOR_A));
        painter.extend(pie_sector(
            center,
            radius,
            start + sweep_a,
            std::f32::consts::TAU - sweep_a,
            COLOR_B,
        ));

        // Donut hole, matching the window background.
        painter.circle_filled(center, radius * 0.55, ui.visuals().panel_fill);
    }

    /// Decode the inline judge image into a texture, once per image.
    fn ensure_judge_texture(&mut self, ctx: &egui::Context) {
        if self.judge_texture.is_some() {
            return;
        }
        let Some(judge_image) = &self.judge_image else {
            return;
        };

        match image::load_from_memory(&judge_image.bytes) {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
                self.judge_texture = Some(ctx.load_texture(
                    "judge-portrait",
                    color_image,
                    egui::TextureOptions::LINEAR,
                ));
            }
            Err(e) => {
                log::warn!(
                    "could not decode judge illustration ({}): {e}",
                    judge_image.mime
                );
                // Keep the placeholder; don't retry the same bytes.
                self.judge_image = None;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for JudgeApp {
    /// Called every frame by eframe.  Polls channels, then renders either
    /// the form or the verdict view.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_recorders();
        self.poll_results();

        // Keep polling while anything is outstanding.
        if self.phase() != UiPhase::Idle || self.recording.iter().any(|&r| r) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_header(ui);
                ui.separator();

                if self.verdict.is_some() {
                    self.draw_verdict(ui, ctx);
                } else if self.judging {
                    self.draw_judging(ui);
                } else {
                    self.draw_form(ui);
                }

                ui.add_space(16.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("猫猫法官 - 愿爱无争吵。").size(11.0).weak());
                });
            });
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Neko Judge window closing");
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn slot_index(slot: Party) -> usize {
    match slot {
        Party::A => 0,
        Party::B => 1,
    }
}

/// Build a filled pie sector as a fan of thin triangles.  Sweeps beyond
/// half a turn are not convex, so a single polygon would render wrong.
fn pie_sector(
    center: egui::Pos2,
    radius: f32,
    start_angle: f32,
    sweep: f32,
    color: egui::Color32,
) -> Vec<egui::Shape> {
    let steps = ((sweep.abs() / 0.05).ceil() as usize).max(2);
    let point = |i: usize| {
        let angle = start_angle + sweep * i as f32 / steps as f32;
        center + radius * egui::vec2(angle.cos(), angle.sin())
    };

    (0..steps)
        .map(|i| {
            egui::Shape::convex_polygon(
                vec![center, point(i), point(i + 1)],
                color,
                egui::Stroke::NONE,
            )
        })
        .collect()
}

/// Render sanitized verdict HTML as egui paragraphs and bullets.
fn draw_html_blocks(ui: &mut egui::Ui, html_text: &str) {
    for block in html::parse_blocks(html_text) {
        let (spans, indent) = match &block {
            Block::Paragraph(s) => (s, false),
            Block::Bullet(s) => (s, true),
        };

        ui.horizontal_wrapped(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            if indent {
                ui.label("  • ");
            }
            for span in spans {
                let text = egui::RichText::new(&span.text);
                ui.label(if span.strong { text.strong() } else { text });
            }
        });
        ui.add_space(4.0);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::RawVerdict;
    use crate::provider::AudioClip;

    fn make_app() -> (
        JudgeApp,
        mpsc::Receiver<PipelineCommand>,
        mpsc::Sender<PipelineResult>,
    ) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (result_tx, result_rx) = mpsc::channel(16);
        let recorders = [Recorder::new(Party::A), Recorder::new(Party::B)];
        let app = JudgeApp::new(command_tx, result_rx, recorders, AppConfig::default());
        (app, command_rx, result_tx)
    }

    fn fill_case(app: &mut JudgeApp) {
        app.case = CaseData {
            name_a: "木可".into(),
            name_b: "木尚".into(),
            context: "忘记纪念日".into(),
            story_a: "他忘了".into(),
            story_b: "我没忘只是晚说".into(),
        };
    }

    fn sample_verdict() -> Verdict {
        Verdict::from_raw(RawVerdict {
            blame_a: 30,
            blame_b: 70,
            analysis: "<p>分析</p>".into(),
            advice: "<p>建议</p>".into(),
        })
        .unwrap()
    }

    // ---- submit ----

    #[test]
    fn submit_with_empty_field_sets_banner_and_sends_nothing() {
        let (mut app, mut command_rx, _result_tx) = make_app();
        fill_case(&mut app);
        app.case.context.clear();

        app.submit();

        assert_eq!(app.error.as_deref(), Some(MSG_VALIDATION));
        assert_eq!(app.phase(), UiPhase::Idle);
        assert!(command_rx.try_recv().is_err(), "no network call on validation failure");
    }

    #[test]
    fn submit_with_complete_case_sends_exactly_one_judge_command() {
        let (mut app, mut command_rx, _result_tx) = make_app();
        fill_case(&mut app);

        app.submit();

        assert_eq!(app.phase(), UiPhase::Judging);
        assert!(app.error.is_none());
        match command_rx.try_recv() {
            Ok(PipelineCommand::Judge { seq, case }) => {
                assert_eq!(seq, 0);
                assert_eq!(case, app.case);
            }
            other => panic!("expected a Judge command, got {other:?}"),
        }
        assert!(command_rx.try_recv().is_err());
    }

    #[test]
    fn submit_while_judging_is_ignored() {
        let (mut app, mut command_rx, _result_tx) = make_app();
        fill_case(&mut app);

        app.submit();
        app.submit();

        assert!(command_rx.try_recv().is_ok());
        assert!(
            command_rx.try_recv().is_err(),
            "never more than one judgment in flight"
        );
    }

    #[test]
    fn submit_clears_a_previous_validation_error() {
        let (mut app, _command_rx, _result_tx) = make_app();
        app.submit();
        assert!(app.error.is_some());

        fill_case(&mut app);
        app.submit();
        assert!(app.error.is_none());
    }

    // ---- results ----

    #[test]
    fn verdict_result_switches_to_verdict_view() {
        let (mut app, _command_rx, result_tx) = make_app();
        fill_case(&mut app);
        app.submit();

        result_tx
            .try_send(PipelineResult::VerdictReady {
                seq: 0,
                verdict: sample_verdict(),
            })
            .unwrap();
        app.poll_results();

        assert_eq!(app.phase(), UiPhase::Idle);
        let verdict = app.verdict.expect("verdict stored");
        assert_eq!(verdict.winner, Winner::A);
    }

    #[test]
    fn judgment_failure_returns_to_idle_and_preserves_case() {
        let (mut app, _command_rx, result_tx) = make_app();
        fill_case(&mut app);
        let before = app.case.clone();
        app.submit();

        result_tx
            .try_send(PipelineResult::JudgmentFailed {
                seq: 0,
                message: "猫猫法官去抓老鼠了（API错误），请稍后再试。".into(),
            })
            .unwrap();
        app.poll_results();

        assert_eq!(app.phase(), UiPhase::Idle);
        assert!(app.verdict.is_none());
        assert!(app.error.is_some());
        assert_eq!(app.case, before, "case preserved for resubmission");
    }

    #[test]
    fn stale_verdict_after_reset_is_discarded() {
        let (mut app, _command_rx, result_tx) = make_app();
        fill_case(&mut app);
        app.submit();

        // User resets the form while the call is outstanding.
        app.reset();

        result_tx
            .try_send(PipelineResult::VerdictReady {
                seq: 0,
                verdict: sample_verdict(),
            })
            .unwrap();
        app.poll_results();

        assert!(app.verdict.is_none(), "stale result must not apply");
        assert_eq!(app.phase(), UiPhase::Idle);
    }

    #[test]
    fn stale_transcript_after_reset_is_discarded() {
        let (mut app, _command_rx, result_tx) = make_app();
        app.transcribing[0] = true;
        app.reset();

        result_tx
            .try_send(PipelineResult::TranscriptReady {
                seq: 0,
                slot: Party::A,
                text: "迟到的转录".into(),
            })
            .unwrap();
        app.poll_results();

        assert!(app.case.story_a.is_empty());
    }

    // ---- transcripts ----

    #[test]
    fn transcript_sets_empty_field_directly() {
        let (mut app, _command_rx, _result_tx) = make_app();
        app.apply_transcript(Party::A, "他忘了我们的纪念日");
        assert_eq!(app.case.story_a, "他忘了我们的纪念日");
    }

    #[test]
    fn transcript_appends_with_single_space() {
        let (mut app, _command_rx, _result_tx) = make_app();
        app.case.story_b = "我没忘".into();
        app.apply_transcript(Party::B, "只是晚说");
        assert_eq!(app.case.story_b, "我没忘 只是晚说");
    }

    #[test]
    fn transcription_failure_leaves_field_untouched() {
        let (mut app, _command_rx, result_tx) = make_app();
        app.case.story_a = "原有内容".into();
        app.transcribing[0] = true;

        result_tx
            .try_send(PipelineResult::TranscriptionFailed {
                seq: 0,
                slot: Party::A,
                message: "转录失败，请重试。".into(),
            })
            .unwrap();
        app.poll_results();

        assert_eq!(app.case.story_a, "原有内容");
        assert!(app.slot_error[0].is_some());
        assert!(!app.transcribing[0]);
    }

    #[test]
    fn transcript_result_clears_only_its_own_slot() {
        let (mut app, _command_rx, result_tx) = make_app();
        app.transcribing = [true, true];

        result_tx
            .try_send(PipelineResult::TranscriptReady {
                seq: 0,
                slot: Party::A,
                text: "转录A".into(),
            })
            .unwrap();
        app.poll_results();

        assert!(!app.transcribing[0]);
        assert!(app.transcribing[1], "slot B stays in flight");
        assert_eq!(app.phase(), UiPhase::TranscribingB);
    }

    // ---- phase derivation ----

    #[test]
    fn judging_takes_precedence_over_transcription() {
        let (mut app, _command_rx, _result_tx) = make_app();
        app.judging = true;
        app.transcribing = [true, true];
        assert_eq!(app.phase(), UiPhase::Judging);
    }

    #[test]
    fn slot_a_phase_before_slot_b() {
        let (mut app, _command_rx, _result_tx) = make_app();
        app.transcribing = [true, true];
        assert_eq!(app.phase(), UiPhase::TranscribingA);
        app.transcribing[0] = false;
        assert_eq!(app.phase(), UiPhase::TranscribingB);
    }

    // ---- reset ----

    #[test]
    fn reset_clears_everything_and_bumps_seq() {
        let (mut app, _command_rx, _result_tx) = make_app();
        fill_case(&mut app);
        app.verdict = Some(sample_verdict());
        app.error = Some("err".into());
        app.slot_error[1] = Some("err".into());
        let seq_before = app.seq;

        app.reset();

        assert_eq!(app.case, CaseData::default());
        assert!(app.verdict.is_none());
        assert!(app.error.is_none());
        assert!(app.slot_error.iter().all(|e| e.is_none()));
        assert_eq!(app.phase(), UiPhase::Idle);
        assert_eq!(app.seq, seq_before + 1);
    }

    // ---- recorder events ----

    /// App wired to detached recorders so tests can feed recorder events
    /// through the real polling path.
    fn make_app_with_events() -> (
        JudgeApp,
        mpsc::Receiver<PipelineCommand>,
        [std::sync::mpsc::Sender<RecorderEvent>; 2],
    ) {
        let (command_tx, command_rx) = mpsc::channel(16);
        let (_result_tx, result_rx) = mpsc::channel(16);
        let (recorder_a, events_a) = Recorder::detached();
        let (recorder_b, events_b) = Recorder::detached();
        let app = JudgeApp::new(
            command_tx,
            result_rx,
            [recorder_a, recorder_b],
            AppConfig::default(),
        );
        (app, command_rx, [events_a, events_b])
    }

    #[test]
    fn permission_denied_shows_inline_and_stays_not_recording() {
        let (mut app, mut command_rx, events) = make_app_with_events();

        events[0]
            .send(RecorderEvent::PermissionDenied {
                message: "无法访问麦克风".into(),
            })
            .unwrap();
        app.poll_recorders();

        assert!(!app.recording[0]);
        assert_eq!(app.slot_error[0].as_deref(), Some("无法访问麦克风"));
        assert!(command_rx.try_recv().is_err(), "no transcription call made");
    }

    #[test]
    fn started_event_marks_recording_and_clears_slot_error() {
        let (mut app, _command_rx, events) = make_app_with_events();
        app.slot_error[1] = Some("旧错误".into());

        events[1].send(RecorderEvent::Started).unwrap();
        app.poll_recorders();

        assert!(app.recording[1]);
        assert!(app.slot_error[1].is_none());
    }

    #[test]
    fn finished_event_sends_one_transcribe_command_for_its_slot() {
        let (mut app, mut command_rx, events) = make_app_with_events();
        app.recording[0] = true;

        events[0]
            .send(RecorderEvent::Finished {
                clip: AudioClip::new(vec![1, 2, 3]),
            })
            .unwrap();
        app.poll_recorders();

        assert!(!app.recording[0]);
        assert!(app.transcribing[0]);
        match command_rx.try_recv() {
            Ok(PipelineCommand::Transcribe { seq, slot, clip }) => {
                assert_eq!(seq, 0);
                assert_eq!(slot, Party::A);
                assert_eq!(clip.wav, vec![1, 2, 3]);
            }
            other => panic!("expected a Transcribe command, got {other:?}"),
        }
        assert!(command_rx.try_recv().is_err());
    }
}
