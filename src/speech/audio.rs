//! Recorded audio that stands in for a live microphone.

use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc::{Receiver, channel};

use crate::error::SpeechError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PcmFormat {
    S16LE,
}

impl Display for PcmFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fmt_str = match self {
            PcmFormat::S16LE => "s16le",
        };
        f.write_str(fmt_str)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoundSpec {
    pub format: PcmFormat,
    pub sample_rate_hz: u32,
    pub num_channels: u32,
}

impl SoundSpec {
    /// 16-bit PCM, 24 kHz, mono, little-endian
    pub const REALTIME: Self = Self {
        format: PcmFormat::S16LE,
        sample_rate_hz: 24000,
        num_channels: 1,
    };

    /// Number of bytes holding `millis` milliseconds of audio.
    #[must_use]
    pub fn bytes_per(&self, millis: u32) -> usize {
        let bytes_per_sample = match self.format {
            PcmFormat::S16LE => 2,
        };
        let samples = u64::from(self.sample_rate_hz) * u64::from(millis) / 1000;
        usize::try_from(samples * u64::from(self.num_channels) * bytes_per_sample)
            .unwrap_or(usize::MAX)
    }
}

impl Display for SoundSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Audio format [{}, {} Hz, {} channels]",
            self.format, self.sample_rate_hz, self.num_channels
        )
    }
}

/// A raw PCM recording on disk, played back in chunks as if it was being
/// recorded right now. The file must already be in the expected
/// [`SoundSpec`], there is no resampling. Record one with e.g.
/// `ffmpeg -i input.wav -f s16le -ar 24000 -ac 1 output.pcm`.
pub struct RecordingFile {
    path: PathBuf,
    spec: SoundSpec,
}

impl RecordingFile {
    pub fn open(path: &Path, spec: SoundSpec) -> Result<Self, SpeechError> {
        if !path.is_file() {
            return Err(SpeechError::CapabilityUnavailable(format!(
                "recording {} does not exist or is not a file",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            spec,
        })
    }

    #[must_use]
    pub fn spec(&self) -> SoundSpec {
        self.spec
    }

    /// Streams the recording in chunks of 100 ms. The receiver yields `None`
    /// once the whole file has been read.
    pub async fn stream(&self) -> anyhow::Result<Receiver<std::io::Result<Vec<u8>>>> {
        let mut file = File::open(&self.path)
            .await
            .context(format!("Could not open recording {}", self.path.display()))?;
        let chunk_size = self.spec.bytes_per(100);

        // a small buffer is enough, the websocket is the slower side
        let (sender, receiver) = channel(16);
        tokio::spawn(async move {
            let mut buf = vec![0; chunk_size];
            loop {
                let chunk = match file.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(c) => Ok(buf[..c].to_vec()),
                    Err(err) => Err(err),
                };
                let failed = chunk.is_err();
                if sender.send(chunk).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(receiver)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn realtime_spec_displays_its_parameters() {
        assert_eq!(
            SoundSpec::REALTIME.to_string(),
            "Audio format [s16le, 24000 Hz, 1 channels]"
        );
    }

    #[test]
    fn hundred_milliseconds_of_realtime_audio() {
        assert_eq!(SoundSpec::REALTIME.bytes_per(100), 4800);
    }

    #[test]
    fn missing_recording_is_unavailable() {
        let result = RecordingFile::open(Path::new("/does/not/exist.pcm"), SoundSpec::REALTIME);
        assert!(matches!(result, Err(SpeechError::CapabilityUnavailable(_))));
    }

    #[tokio::test]
    async fn streams_the_whole_file_in_chunks() {
        let path = std::env::temp_dir().join(format!("voice_assistant_{}.pcm", std::process::id()));
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::File::create(&path).unwrap().write_all(&data).unwrap();

        let recording = RecordingFile::open(&path, SoundSpec::REALTIME).unwrap();
        let mut chunks = recording.stream().await.unwrap();
        let mut received = Vec::new();
        while let Some(chunk) = chunks.recv().await {
            let chunk = chunk.unwrap();
            assert!(chunk.len() <= 4800);
            received.extend(chunk);
        }
        std::fs::remove_file(&path).unwrap();

        assert_eq!(received, data);
    }
}
