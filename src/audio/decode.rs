//! Reading and decoding user-selected audio files.

use log::{error, info, warn};
use std::io::{Cursor, ErrorKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::DecodedAudio;
use crate::error::{Result, SceneError};

/// Decode a whole audio file held in memory (WAV, FLAC, MP3, OGG/Vorbis, AAC)
///
/// The container is detected from the content.
pub fn decode_audio(bytes: &[u8]) -> Result<DecodedAudio> {
    decode_with_hint(bytes.to_vec(), &Hint::new())
}

fn decode_with_hint(bytes: Vec<u8>, hint: &Hint) -> Result<DecodedAudio> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    let detected = symphonia::default::get_probe().format(
        hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = detected.format;

    let track = format
        .default_track()
        .ok_or_else(|| SceneError::Decode("no audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    // Interleaved f32 samples of the whole file
    let mut samples: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                warn!("Skipping undecodable packet: {}", e);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate = Some(spec.rate);
        channels = Some(spec.channels.count());

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buffer.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buffer.samples());
    }

    let sample_rate =
        sample_rate.ok_or_else(|| SceneError::Decode("unknown sample rate".to_string()))?;
    let channels = channels
        .and_then(|c| u16::try_from(c).ok())
        .ok_or_else(|| SceneError::Decode("unknown channel layout".to_string()))?;

    DecodedAudio::new(samples, channels, sample_rate)
}

/// Read the selected file into memory
pub fn read_file(path: &Path) -> Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

/// Read then decode, in that order
pub fn load_file(path: &Path) -> Result<DecodedAudio> {
    let bytes = read_file(path)?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension() {
        hint.with_extension(&ext.to_string_lossy());
    }
    let audio = decode_with_hint(bytes, &hint)?;
    info!(
        "Decoded {}: {} channel(s) @ {}Hz, {:.1}s",
        path.display(),
        audio.channels(),
        audio.sample_rate(),
        audio.duration_secs()
    );
    Ok(audio)
}

/// Load a file on a background thread; the result arrives on the returned channel
pub fn spawn_load(path: PathBuf) -> mpsc::Receiver<Result<DecodedAudio>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = load_file(&path);
        if let Err(ref e) = result {
            error!("Failed to load {}: {}", path.display(), e);
        }
        // Receiver gone means the app shut down meanwhile
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    type MemoryWriter<'a> = hound::WavWriter<Cursor<&'a mut Vec<u8>>>;

    fn wav_bytes(spec: hound::WavSpec, write: impl FnOnce(&mut MemoryWriter<'_>)) -> Vec<u8> {
        let mut bytes = Vec::new();
        let mut writer = hound::WavWriter::new(Cursor::new(&mut bytes), spec).unwrap();
        write(&mut writer);
        writer.finalize().unwrap();
        bytes
    }

    #[test]
    fn test_decode_int16_stereo() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let bytes = wav_bytes(spec, |w| {
            for v in [16384i16, -16384, 0, 32767] {
                w.write_sample(v).unwrap();
            }
        });

        let audio = decode_audio(&bytes).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.sample_rate(), 22050);
        assert_eq!(audio.frame_count(), 2);
        assert!((audio.sample(0, 0) - 0.5).abs() < 1e-6);
        assert!((audio.sample(0, 1) + 0.5).abs() < 1e-6);
        assert!(audio.sample(1, 1) > 0.999);
    }

    #[test]
    fn test_decode_float_mono() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let bytes = wav_bytes(spec, |w| {
            for v in [0.25f32, -0.75, 1.0] {
                w.write_sample(v).unwrap();
            }
        });

        let audio = decode_audio(&bytes).unwrap();
        assert_eq!(audio.frame_count(), 3);
        assert_eq!(audio.sample(1, 0), -0.75);
    }

    /// Silent MPEG-1 Layer III stream: 128 kbit/s, 44.1 kHz, stereo
    fn silent_mp3(frames: usize) -> Vec<u8> {
        // 144 * 128000 / 44100 bytes per unpadded frame
        const FRAME_LEN: usize = 417;
        let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
        for _ in 0..frames {
            let mut frame = vec![0u8; FRAME_LEN];
            frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
            // Zeroed side info and main data: no coded spectrum
            bytes.extend_from_slice(&frame);
        }
        bytes
    }

    #[test]
    fn test_decode_mp3() {
        let audio = decode_audio(&silent_mp3(16)).unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.sample_rate(), 44100);
        assert!(audio.frame_count() >= 1152);
        assert!((0..audio.frame_count()).all(|f| audio.mono(f).abs() < 1e-6));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_audio(b"definitely not a wave file"),
            Err(SceneError::Decode(_))
        ));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let result = load_file(Path::new("/nonexistent/magical-wave/input.wav"));
        assert!(matches!(result, Err(SceneError::Io(_))));
    }

    #[test]
    fn test_spawn_load_reports_failure() {
        let rx = spawn_load(PathBuf::from("/nonexistent/magical-wave/input.wav"));
        assert!(rx.recv().unwrap().is_err());
    }
}
