//! Saying things out loud.
//!
//! Speaking is fire-and-forget. Overlapping utterances are queued and spoken
//! in submission order, nothing is ever dropped or interrupted.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use colored::Colorize;
use tokio::process::Command;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use crate::config::Config;
use crate::error::SpeechError;
use crate::logger::Logger;

pub trait Speaker {
    fn speak(&self, text: &str);
}

pub struct SpeechSpeaker(SpeakerImpl);

impl SpeechSpeaker {
    /// Uses the configured text-to-speech command, or prints what would be
    /// said when there is none. Must be called within a Tokio runtime.
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> Result<Self, SpeechError> {
        match &config.tts_command {
            Some(command) => Ok(Self(SpeakerImpl::Command(CommandSpeaker::new(
                command, logger,
            )?))),
            None => Ok(Self(SpeakerImpl::Console)),
        }
    }

    /// Waits until everything queued so far has been said.
    pub async fn finish(self) {
        if let SpeakerImpl::Command(speaker) = self.0 {
            speaker.finish().await;
        }
    }
}

impl Speaker for SpeechSpeaker {
    fn speak(&self, text: &str) {
        match &self.0 {
            SpeakerImpl::Console => println!("{} {text}", "Assistant:".green().bold()),
            SpeakerImpl::Command(speaker) => speaker.speak(text),
        }
    }
}

enum SpeakerImpl {
    Console,
    Command(CommandSpeaker),
}

/// Runs an external TTS program such as `espeak` or `say` once per utterance,
/// with the text as its last argument. A single worker runs the program, so
/// utterances never overlap.
struct CommandSpeaker {
    queue: UnboundedSender<String>,
    worker: JoinHandle<()>,
}

impl CommandSpeaker {
    fn new(command: &str, logger: Arc<dyn Logger>) -> Result<Self, SpeechError> {
        let mut parts = command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            SpeechError::CapabilityUnavailable("the text-to-speech command is empty".to_owned())
        })?;
        let program = find_program(program).ok_or_else(|| {
            SpeechError::CapabilityUnavailable(format!(
                "text-to-speech program '{program}' was not found"
            ))
        })?;
        let args: Vec<String> = parts.map(ToOwned::to_owned).collect();

        let (queue, mut pending) = unbounded_channel::<String>();
        let worker = tokio::spawn(async move {
            while let Some(text) = pending.recv().await {
                match Command::new(&program).args(&args).arg(&text).status().await {
                    Ok(status) if status.success() => (),
                    Ok(status) => logger.warn(&format!(
                        "{} exited with {status} while speaking",
                        program.display()
                    )),
                    Err(err) => logger.error(&format!(
                        "Could not run {}: {err}",
                        program.display()
                    )),
                }
            }
        });

        Ok(Self { queue, worker })
    }

    fn speak(&self, text: &str) {
        // the receiver only goes away together with the worker
        let _ = self.queue.send(text.to_owned());
    }

    async fn finish(self) {
        drop(self.queue);
        let _ = self.worker.await;
    }
}

/// Resolves a program name the way a shell would: paths are taken as they
/// are, bare names are searched in `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|path| path.is_file())
    })
}

#[cfg(test)]
mod tests {
    use crate::logger::ConsoleLogger;

    use super::*;

    fn logger() -> Arc<dyn Logger> {
        Arc::new(ConsoleLogger::default())
    }

    #[test]
    fn missing_program_is_unavailable() {
        let result = CommandSpeaker::new("definitely-not-a-tts-program-4711", logger());
        assert!(matches!(result, Err(SpeechError::CapabilityUnavailable(_))));
    }

    #[test]
    fn empty_command_is_unavailable() {
        let result = CommandSpeaker::new("   ", logger());
        assert!(matches!(result, Err(SpeechError::CapabilityUnavailable(_))));
    }

    #[test]
    fn explicit_paths_are_checked_directly() {
        assert!(find_program("/does/not/exist/espeak").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn bare_names_are_searched_in_path() {
        assert!(find_program("sh").is_some());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn speaks_everything_in_order() {
        let out = env::temp_dir().join(format!("voice_assistant_tts_{}.txt", std::process::id()));
        let script = env::temp_dir().join(format!("voice_assistant_tts_{}.sh", std::process::id()));
        std::fs::write(&script, format!("#!/bin/sh\necho \"$1\" >> {}\n", out.display())).unwrap();

        let speaker = CommandSpeaker::new(&format!("/bin/sh {}", script.display()), logger()).unwrap();
        speaker.speak("one");
        speaker.speak("two");
        speaker.speak("three");
        speaker.finish().await;

        let spoken = std::fs::read_to_string(&out).unwrap();
        std::fs::remove_file(&out).unwrap();
        std::fs::remove_file(&script).unwrap();
        assert_eq!(spoken, "one\ntwo\nthree\n");
    }
}
