//! Terminal presentation: the start/stop controls and the status panel.
//!
//! Lines starting with `:` are controls, everything else is typed speech.

use std::io::BufRead;
use std::str::FromStr;
use std::thread;

use colored::Colorize;
use tokio::sync::mpsc::{Receiver, channel};

use crate::session::SessionState;

pub const HELP: &str = "Controls: :start  :stop  :status  :help  :quit";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
    Status,
    Help,
    Quit,
}

impl FromStr for Control {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            ":start" => Ok(Self::Start),
            ":stop" => Ok(Self::Stop),
            ":status" => Ok(Self::Status),
            ":help" => Ok(Self::Help),
            ":quit" | ":q" => Ok(Self::Quit),
            other => anyhow::bail!("unknown control '{other}'"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConsoleLine {
    Control(Control),
    Speech(String),
    Unknown(String),
}

#[must_use]
pub fn parse_line(line: &str) -> ConsoleLine {
    if line.trim_start().starts_with(':') {
        match line.parse() {
            Ok(control) => ConsoleLine::Control(control),
            Err(_) => ConsoleLine::Unknown(line.trim().to_owned()),
        }
    } else {
        ConsoleLine::Speech(line.to_owned())
    }
}

/// Renders the status panel. Of the two controls only the one that makes
/// sense in the current state is enabled.
#[must_use]
pub fn render(state: &SessionState) -> String {
    let status = if state.listening {
        "Listening...".green().to_string()
    } else {
        "Not Listening".to_string()
    };
    let command = if state.last_transcript.is_empty() {
        "No command yet."
    } else {
        state.last_transcript.as_str()
    };
    let response = if state.last_response.is_empty() {
        "No response yet."
    } else {
        state.last_response.as_str()
    };
    let control = |name: &str, enabled: bool| {
        if enabled {
            format!("[{name}]").bold().to_string()
        } else {
            format!("[{name}]").dimmed().to_string()
        }
    };

    format!(
        "{} {status}\n{} {command}\n{} {response}\n{} {}",
        "Status:".bold(),
        "Your Command:".bold(),
        "Response:".bold(),
        control(":start", !state.listening),
        control(":stop", state.listening),
    )
}

/// Reads `input` on a dedicated thread and forwards every line, in order, as
/// a [`ConsoleLine`]. The receiver closes when the input does.
///
/// The event loop reads this channel in every state, so a full channel only
/// ever holds the reader back while a single line is being answered.
pub fn spawn_console_reader<R>(input: R) -> Receiver<ConsoleLine>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = channel(64);

    // A plain thread: a blocking stdin read on the runtime would keep it
    // from shutting down until the next line arrives.
    thread::spawn(move || {
        for line in input.lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(parse_line(&line)).is_err() {
                break;
            }
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn controls_are_prefixed_with_a_colon() {
        assert_eq!(parse_line(":start"), ConsoleLine::Control(Control::Start));
        assert_eq!(parse_line("  :STOP "), ConsoleLine::Control(Control::Stop));
        assert_eq!(parse_line(":q"), ConsoleLine::Control(Control::Quit));
        assert_eq!(parse_line(":dance"), ConsoleLine::Unknown(":dance".to_owned()));
    }

    #[test]
    fn everything_else_is_speech() {
        assert_eq!(
            parse_line("start the news"),
            ConsoleLine::Speech("start the news".to_owned())
        );
        assert_eq!(parse_line(""), ConsoleLine::Speech(String::new()));
    }

    #[tokio::test]
    async fn reader_forwards_every_line_in_order() {
        let mut lines = spawn_console_reader(Cursor::new("hello\n:start\n:dance\n"));

        assert_eq!(lines.recv().await, Some(ConsoleLine::Speech("hello".to_owned())));
        assert_eq!(lines.recv().await, Some(ConsoleLine::Control(Control::Start)));
        assert_eq!(lines.recv().await, Some(ConsoleLine::Unknown(":dance".to_owned())));
        assert_eq!(lines.recv().await, None);
    }

    #[test]
    fn fresh_session_shows_placeholders() {
        colored::control::set_override(false);
        let panel = render(&SessionState::default());
        assert_eq!(
            panel,
            "Status: Not Listening\n\
             Your Command: No command yet.\n\
             Response: No response yet.\n\
             [:start] [:stop]"
        );
    }

    #[test]
    fn shows_last_exchange_while_listening() {
        colored::control::set_override(false);
        let state = SessionState {
            listening: true,
            last_transcript: "buy milk".to_owned(),
            last_response: "Reminder set: buy milk".to_owned(),
            ..SessionState::default()
        };
        let panel = render(&state);
        assert!(panel.starts_with("Status: Listening...\n"));
        assert!(panel.contains("Your Command: buy milk\n"));
        assert!(panel.contains("Response: Reminder set: buy milk\n"));
    }
}
