//! In-memory WAV encoding for transport to the transcription endpoints.
//!
//! Recorded clips are downmixed to mono and written as 16-bit PCM WAV at
//! the device's native sample rate — both transcription backends accept
//! arbitrary rates, so no resampling happens on this side.

use std::io::Cursor;

/// Downmix interleaved multi-channel samples to mono by averaging each
/// frame.  Mono input is returned unchanged.
pub fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    let channels = channels as usize;
    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Encode mono `f32` samples as a complete 16-bit PCM WAV file in memory.
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_passes_through_unchanged() {
        let samples = vec![0.1, -0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples);
    }

    #[test]
    fn stereo_frames_are_averaged() {
        let samples = vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        assert_eq!(downmix_to_mono(&samples, 2), vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn encoded_wav_reads_back_with_expected_spec() {
        let samples = vec![0.0_f32, 0.5, -0.5, 1.0];
        let bytes = encode_wav(&samples, 48_000).expect("encode");

        let reader = hound::WavReader::new(Cursor::new(bytes)).expect("read back");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 4);
    }

    #[test]
    fn out_of_range_samples_are_clamped() {
        let bytes = encode_wav(&[2.0, -2.0], 16_000).expect("encode");
        let reader = hound::WavReader::new(Cursor::new(bytes)).expect("read back");
        let decoded: Vec<i16> = reader.into_samples().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, vec![i16::MAX, -i16::MAX]);
    }

    #[test]
    fn empty_input_still_produces_a_valid_header() {
        let bytes = encode_wav(&[], 44_100).expect("encode");
        let reader = hound::WavReader::new(Cursor::new(bytes)).expect("read back");
        assert_eq!(reader.len(), 0);
    }
}
