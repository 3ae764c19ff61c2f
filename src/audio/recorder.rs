//! Per-story-slot recorder running on its own control thread.
//!
//! cpal streams are not `Send`, so each [`Recorder`] owns a dedicated
//! thread that opens the capture device on `Start`, lets chunks queue on an
//! mpsc channel while recording, and on `Stop` drops the stream (releasing
//! the microphone), drains the queued chunks in arrival order, and emits a
//! single [`AudioClip`] — exactly one clip per session.
//!
//! Starting while a session is active is a no-op; a device error on start
//! emits [`RecorderEvent::PermissionDenied`] without entering the recording
//! state.  The UI polls events non-blocking each frame.

use std::sync::mpsc;

use crate::audio::capture::{AudioCapture, AudioChunk, StreamHandle};
use crate::audio::wav;
use crate::case::Party;
use crate::provider::AudioClip;

/// Inline message shown next to the recording control when the microphone
/// cannot be opened.
const MSG_MIC_DENIED: &str = "无法访问麦克风";

// ---------------------------------------------------------------------------
// Commands / events
// ---------------------------------------------------------------------------

enum RecorderCommand {
    Start,
    Stop,
}

/// Events emitted by the recorder thread, polled by the UI.
#[derive(Debug)]
pub enum RecorderEvent {
    /// The microphone opened and a session is recording.
    Started,
    /// The session was finalized into one transport-ready clip.
    Finished { clip: AudioClip },
    /// The device could not be opened; no session was started.
    PermissionDenied { message: String },
    /// The session could not be finalized (encoding failure).  The story
    /// field stays untouched, same as a transcription failure.
    Failed { message: String },
}

// ---------------------------------------------------------------------------
// Recorder
// ---------------------------------------------------------------------------

/// Handle to one slot's recorder thread.
///
/// Dropping the handle closes the command channel, which ends the thread
/// (and, with it, any in-progress stream).
pub struct Recorder {
    cmd_tx: mpsc::Sender<RecorderCommand>,
    event_rx: mpsc::Receiver<RecorderEvent>,
}

impl Recorder {
    /// Spawn the control thread for `slot`.  The capture device is only
    /// opened once `start()` is called.
    pub fn new(slot: Party) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        std::thread::Builder::new()
            .name(format!("recorder-{}", slot.label().to_lowercase()))
            .spawn(move || run(slot, cmd_rx, event_tx))
            .expect("failed to spawn recorder thread");

        Self { cmd_tx, event_rx }
    }

    /// Request the start of a recording session.
    pub fn start(&self) {
        let _ = self.cmd_tx.send(RecorderCommand::Start);
    }

    /// Request the end of the current session (no-op when idle).
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(RecorderCommand::Stop);
    }

    /// Non-blocking poll for the next recorder event.
    pub fn try_event(&self) -> Option<RecorderEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Build a recorder with no control thread behind it, plus a sender that
    /// feeds its event channel directly.  Commands go nowhere; this exists so
    /// event-handling paths can be driven without a capture device.
    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::Sender<RecorderEvent>) {
        let (cmd_tx, _cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        (Self { cmd_tx, event_rx }, event_tx)
    }
}

// ---------------------------------------------------------------------------
// Control thread
// ---------------------------------------------------------------------------

struct Session {
    handle: StreamHandle,
    chunk_rx: mpsc::Receiver<AudioChunk>,
    sample_rate: u32,
}

fn run(slot: Party, cmd_rx: mpsc::Receiver<RecorderCommand>, event_tx: mpsc::Sender<RecorderEvent>) {
    let mut session: Option<Session> = None;

    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            RecorderCommand::Start => {
                if session.is_some() {
                    // Already recording; must not corrupt the session.
                    log::debug!("recorder {}: start ignored, session active", slot.label());
                    continue;
                }

                match open_session() {
                    Ok(s) => {
                        session = Some(s);
                        let _ = event_tx.send(RecorderEvent::Started);
                    }
                    Err(e) => {
                        log::warn!("recorder {}: microphone unavailable: {e}", slot.label());
                        let _ = event_tx.send(RecorderEvent::PermissionDenied {
                            message: MSG_MIC_DENIED.into(),
                        });
                    }
                }
            }

            RecorderCommand::Stop => {
                let Some(s) = session.take() else { continue };

                // Dropping the handle stops the stream and releases the
                // device; the callback's sender goes with it, so the drain
                // below terminates once queued chunks are consumed.
                let Session {
                    handle,
                    chunk_rx,
                    sample_rate,
                } = s;
                drop(handle);

                let mut chunks = Vec::new();
                while let Ok(chunk) = chunk_rx.recv() {
                    chunks.push(chunk);
                }

                match assemble_clip(&chunks, sample_rate) {
                    Ok(clip) => {
                        log::info!(
                            "recorder {}: session finalized ({} bytes)",
                            slot.label(),
                            clip.wav.len()
                        );
                        let _ = event_tx.send(RecorderEvent::Finished { clip });
                    }
                    Err(e) => {
                        log::error!("recorder {}: WAV encoding failed: {e}", slot.label());
                        let _ = event_tx.send(RecorderEvent::Failed {
                            message: "转录失败，请重试。".into(),
                        });
                    }
                }
            }
        }
    }
}

fn open_session() -> Result<Session, crate::audio::capture::CaptureError> {
    let capture = AudioCapture::new()?;
    let sample_rate = capture.sample_rate();
    let (chunk_tx, chunk_rx) = mpsc::channel();
    let handle = capture.start(chunk_tx)?;
    log::info!(
        "audio capture started ({} Hz, {} ch)",
        sample_rate,
        capture.channels()
    );

    Ok(Session {
        handle,
        chunk_rx,
        sample_rate,
    })
}

/// Downmix and concatenate `chunks` in arrival order, then WAV-encode the
/// result.
fn assemble_clip(chunks: &[AudioChunk], sample_rate: u32) -> Result<AudioClip, hound::Error> {
    let mut samples = Vec::new();
    for chunk in chunks {
        samples.extend(wav::downmix_to_mono(&chunk.samples, chunk.channels));
    }

    Ok(AudioClip::new(wav::encode_wav(&samples, sample_rate)?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn chunk(samples: Vec<f32>, channels: u16) -> AudioChunk {
        AudioChunk {
            samples,
            sample_rate: 48_000,
            channels,
        }
    }

    /// Chunks are concatenated in arrival order, not interleaved or sorted.
    #[test]
    fn assemble_preserves_arrival_order() {
        let chunks = vec![
            chunk(vec![0.1, 0.2], 1),
            chunk(vec![0.3], 1),
            chunk(vec![0.4, 0.5], 1),
        ];
        let clip = assemble_clip(&chunks, 48_000).expect("assemble");

        let reader = hound::WavReader::new(Cursor::new(clip.wav)).expect("read back");
        let decoded: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();

        let expected: Vec<i16> = [0.1_f32, 0.2, 0.3, 0.4, 0.5]
            .iter()
            .map(|&s| (s * i16::MAX as f32) as i16)
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn assemble_downmixes_stereo_chunks() {
        let chunks = vec![chunk(vec![1.0, 0.0, 0.0, 1.0], 2)];
        let clip = assemble_clip(&chunks, 48_000).expect("assemble");

        let reader = hound::WavReader::new(Cursor::new(clip.wav)).expect("read back");
        let decoded: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        let half = (0.5_f32 * i16::MAX as f32) as i16;
        assert_eq!(decoded, vec![half, half]);
    }

    #[test]
    fn empty_session_yields_an_empty_clip() {
        let clip = assemble_clip(&[], 44_100).expect("assemble");
        let reader = hound::WavReader::new(Cursor::new(clip.wav)).expect("read back");
        assert_eq!(reader.len(), 0);
    }

    /// Commands against a recorder whose thread is alive must not panic,
    /// and dropping the handle must end the thread cleanly.
    #[test]
    fn recorder_handle_survives_commands_and_drop() {
        let recorder = Recorder::new(Party::A);
        recorder.stop(); // stop while idle is a no-op
        drop(recorder);
    }
}
