use std::io::BufReader;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::mpsc::Receiver;

use crate::{
    assistant::Assistant,
    config::Config,
    logger::{ConsoleLogger, Logger},
    responders::Responders,
    session::SessionState,
    speech::{
        input::{RecognizedSpeech, SpeechListener},
        output::{SpeechSpeaker, Speaker},
    },
    ui::{self, ConsoleLine, Control},
};

pub struct AppComposite<S: Speaker> {
    pub assistant: Assistant<S>,
    pub speech_listener: SpeechListener,
    pub console: Receiver<ConsoleLine>,
    pub logger: Arc<dyn Logger>,
}

enum Event {
    Console(Option<ConsoleLine>),
    Heard(anyhow::Result<Option<RecognizedSpeech>>),
}

impl AppComposite<SpeechSpeaker> {
    /// Wires everything up. Fails when a speech backend is unavailable, the
    /// assistant has no way of talking to the user then.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let logger: Arc<dyn Logger> = Arc::new(ConsoleLogger::new(config.verbosity));

        let console = ui::spawn_console_reader(BufReader::new(std::io::stdin()));
        let speech_listener =
            SpeechListener::new(config, logger.clone()).context("Cannot listen to the user")?;
        let speaker =
            SpeechSpeaker::new(config, logger.clone()).context("Cannot talk to the user")?;
        let responders = Responders::new(config, logger.clone())?;

        Ok(Self::from_parts(
            Assistant::new(responders, speaker, logger.clone()),
            speech_listener,
            console,
            logger,
        ))
    }
}

impl<S: Speaker> AppComposite<S> {
    #[must_use]
    pub fn from_parts(
        assistant: Assistant<S>,
        speech_listener: SpeechListener,
        console: Receiver<ConsoleLine>,
        logger: Arc<dyn Logger>,
    ) -> Self {
        Self {
            assistant,
            speech_listener,
            console,
            logger,
        }
    }

    /// Handles console lines and utterances one at a time until the user
    /// quits or the console is closed. Utterances arriving while another one
    /// is being answered wait their turn. Hands the assistant back so its
    /// speaker can be drained.
    pub async fn run(mut self) -> anyhow::Result<Assistant<S>> {
        self.logger.info(ui::HELP);
        self.show_status();

        loop {
            match self.next_event().await {
                Event::Console(None | Some(ConsoleLine::Control(Control::Quit))) => break,
                Event::Console(Some(line)) => self.apply_line(line).await,
                Event::Heard(heard) => self.apply_heard(heard).await,
            }
            self.show_status();
        }

        Ok(self.assistant)
    }

    /// Waits for the next console line or transcript. While listening, lines
    /// that leave the listening state alone are answered in place so a
    /// running transcription is not cut short.
    async fn next_event(&mut self) -> Event {
        if !self.assistant.session().listening {
            return Event::Console(self.console.recv().await);
        }

        let hears_typed = self.speech_listener.hears_typed();
        let Self {
            assistant,
            speech_listener,
            console,
            logger,
        } = self;
        let heard = speech_listener.listen_to_input();
        tokio::pin!(heard);

        loop {
            tokio::select! {
                result = &mut heard => return Event::Heard(result),
                line = console.recv() => {
                    let Some(line) = line else { return Event::Console(None) };
                    if let Some(line) =
                        answer_aside(line, hears_typed, assistant.session(), &**logger)
                    {
                        return Event::Console(Some(line));
                    }
                }
            }
        }
    }

    async fn apply_line(&mut self, line: ConsoleLine) {
        match line {
            ConsoleLine::Control(control) => self.apply_control(control),
            ConsoleLine::Speech(text) => match self.speech_listener.hear_typed(text) {
                Some(speech) => self.assistant.handle(speech).await,
                None => self.logger.debug("Typed input ignored, not listening"),
            },
            ConsoleLine::Unknown(text) => {
                self.logger
                    .warn(&format!("Unknown control {text}. {}", ui::HELP));
            }
        }
    }

    async fn apply_heard(&mut self, heard: anyhow::Result<Option<RecognizedSpeech>>) {
        match heard {
            Ok(Some(speech)) => self.assistant.handle(speech).await,
            Ok(None) => self.assistant.input_ended(),
            Err(err) => {
                self.logger
                    .error(&format!("Speech recognition failed: {err:#}"));
                self.assistant.input_ended();
            }
        }
    }

    fn apply_control(&mut self, control: Control) {
        match control {
            Control::Start => {
                if self.assistant.start_listening() {
                    self.speech_listener.start();
                } else {
                    self.logger.warn("Already listening");
                }
            }
            Control::Stop => {
                if self.assistant.stop_listening() {
                    self.speech_listener.stop();
                } else {
                    self.logger.warn("Not listening");
                }
            }
            Control::Help => self.logger.info(ui::HELP),
            Control::Status | Control::Quit => (),
        }
    }

    fn show_status(&self) {
        self.logger.info(&ui::render(self.assistant.session()));
    }
}

/// Answers a line typed while listening when it leaves the listening state
/// alone. Hands back the lines the event loop has to apply.
fn answer_aside(
    line: ConsoleLine,
    hears_typed: bool,
    session: &SessionState,
    logger: &dyn Logger,
) -> Option<ConsoleLine> {
    match line {
        ConsoleLine::Control(Control::Start) => logger.warn("Already listening"),
        ConsoleLine::Control(Control::Status) => logger.info(&ui::render(session)),
        ConsoleLine::Control(Control::Help) => logger.info(ui::HELP),
        ConsoleLine::Unknown(text) => logger.warn(&format!("Unknown control {text}. {}", ui::HELP)),
        ConsoleLine::Speech(_) if !hears_typed => {
            logger.debug("Typed input ignored, speech comes from the recording");
        }
        line => return Some(line),
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::logger::Level;

    use super::*;

    fn aside(line: ConsoleLine, hears_typed: bool) -> Option<ConsoleLine> {
        let session = SessionState {
            listening: true,
            ..SessionState::default()
        };
        answer_aside(line, hears_typed, &session, &ConsoleLogger::new(Level::Info))
    }

    #[test]
    fn informational_lines_leave_a_transcription_running() {
        assert_eq!(aside(ConsoleLine::Control(Control::Status), false), None);
        assert_eq!(aside(ConsoleLine::Control(Control::Help), false), None);
        assert_eq!(aside(ConsoleLine::Control(Control::Start), false), None);
        assert_eq!(aside(ConsoleLine::Unknown(":dance".to_owned()), false), None);
        assert_eq!(aside(ConsoleLine::Speech("hello".to_owned()), false), None);
    }

    #[test]
    fn stop_and_quit_end_a_transcription() {
        assert_eq!(
            aside(ConsoleLine::Control(Control::Stop), false),
            Some(ConsoleLine::Control(Control::Stop))
        );
        assert_eq!(
            aside(ConsoleLine::Control(Control::Quit), false),
            Some(ConsoleLine::Control(Control::Quit))
        );
    }

    #[test]
    fn typed_speech_is_applied_when_it_is_the_input() {
        assert_eq!(
            aside(ConsoleLine::Speech("hello".to_owned()), true),
            Some(ConsoleLine::Speech("hello".to_owned()))
        );
    }
}
