//! Using the [Open AI realtime transcription API](https://platform.openai.com/docs/guides/realtime?use-case=transcription)

use std::path::Path;
use std::pin::pin;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use base64::prelude::*;
use futures_util::{SinkExt, Stream, StreamExt, future};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{http, protocol::Message},
};

use crate::error::SpeechError;
use crate::logger::Logger;
use crate::speech::audio::{RecordingFile, SoundSpec};

use super::RecognizedSpeech;

const TRANSCRIPTION_MODEL: &str = "gpt-4o-transcribe";
const TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Single-shot listener: every `start` allows one transcription of the
/// recording, after which the input ends.
pub struct RealtimeListener {
    api_key: String,
    recording: RecordingFile,
    armed: bool,
    logger: Arc<dyn Logger>,
}

impl RealtimeListener {
    pub fn new(
        api_key: Option<&str>,
        recording: &Path,
        logger: Arc<dyn Logger>,
    ) -> Result<Self, SpeechError> {
        let api_key = api_key.ok_or_else(|| {
            SpeechError::CapabilityUnavailable(
                "transcribing a recording requires an OpenAI key".to_owned(),
            )
        })?;
        let recording = RecordingFile::open(recording, SoundSpec::REALTIME)?;

        Ok(Self {
            api_key: api_key.to_owned(),
            recording,
            armed: false,
            logger,
        })
    }

    pub fn start(&mut self) {
        self.armed = true;
    }

    pub fn stop(&mut self) {
        self.armed = false;
    }

    pub async fn listen_to_input(&mut self) -> anyhow::Result<Option<RecognizedSpeech>> {
        if !self.armed {
            return Ok(None);
        }

        let text = tokio::time::timeout(TRANSCRIPTION_TIMEOUT, self.transcribe())
            .await
            .context("Transcription timed out")??;
        // only disarm once the cycle completed, so an interrupted one is retried
        self.armed = false;
        Ok(Some(RecognizedSpeech { text }))
    }

    async fn transcribe(&self) -> anyhow::Result<String> {
        self.logger.debug(&format!(
            "Transcribing recording in {}",
            self.recording.spec()
        ));

        let ws_stream = create_ws(&self.api_key).await?;
        let (mut ws_write, ws_read) = ws_stream.split();

        ws_write
            .send(to_message(&ClientEvent::session_update())?)
            .await
            .context("Failed to configure the transcription session")?;

        let mut audio = self.recording.stream().await?;
        let feed_audio = async move {
            while let Some(chunk) = audio.recv().await {
                let chunk = chunk.context("Failed to read the recording")?;
                let event = ClientEvent::Append {
                    audio: BASE64_STANDARD.encode(chunk),
                };
                ws_write
                    .feed(to_message(&event)?)
                    .await
                    .context("Could not send audio data")?;
            }
            ws_write
                .send(to_message(&ClientEvent::Commit)?)
                .await
                .context("Could not commit the audio buffer")?;
            anyhow::Ok(())
        };

        let events = to_event_stream(ws_read, self.logger.clone());
        let ((), transcript) = future::try_join(feed_audio, first_transcript(events)).await?;
        Ok(transcript)
    }
}

fn to_message(event: &ClientEvent) -> anyhow::Result<Message> {
    let json = serde_json::to_string(event).context("Failed to serialize client event")?;
    Ok(Message::Text(json.into()))
}

fn to_event_stream<S>(
    ws_stream: S,
    logger: Arc<dyn Logger>,
) -> impl Stream<Item = anyhow::Result<TranscriptionMessage>> + Send
where
    S: Stream<Item = Result<tungstenite::Message, tungstenite::Error>> + Send,
{
    ws_stream.filter_map(move |try_msg| {
        let event = match try_msg {
            Err(err) => Some(Err(anyhow::Error::new(err).context(
                "Failed to consume websocket stream",
            ))),
            Ok(Message::Text(msg)) => {
                let msg = msg.as_str();
                logger.debug(&format!("Received message {msg}"));
                Some(
                    serde_json::from_str::<TranscriptionMessage>(msg)
                        .context(format!("Failed to parse message {msg}")),
                )
            }
            Ok(_) => None,
        };
        future::ready(event)
    })
}

/// Waits for the first completed transcription, failing on API errors or
/// when the stream closes without one.
async fn first_transcript<S>(events: S) -> anyhow::Result<String>
where
    S: Stream<Item = anyhow::Result<TranscriptionMessage>>,
{
    let mut events = pin!(events);
    while let Some(event) = events.next().await {
        match event? {
            TranscriptionMessage::Error(err) => bail!(
                "The OpenAI transcription API responded with an error: {}: {}",
                err.error.type_,
                err.error.message,
            ),
            TranscriptionMessage::TranscriptionCompleted(done) => return Ok(done.transcript),
            _ => (),
        }
    }
    bail!("The transcription stream closed before a transcript arrived")
}

async fn create_ws(api_key: &str) -> anyhow::Result<WebSocketStream<MaybeTlsStream<TcpStream>>> {
    let url = http::Uri::from_str("wss://api.openai.com/v1/realtime?intent=transcription")?;
    // into_client_request for Uri will set headers required for websockets
    let mut req = url.into_client_request()?;
    let headers = req.headers_mut();
    let header_val = HeaderValue::from_str(&format!("Bearer {api_key}"))
        .context("Could not create header from OpenAI API key")?;
    headers
        .try_insert("Authorization", header_val)
        .context("Failed to modify transcription websocket request headers")?;
    headers
        .try_insert("OpenAI-Beta", HeaderValue::from_static("realtime=v1"))
        .context("Failed to modify transcription websocket request headers")?;

    let (ws_stream, _res) = connect_async(req)
        .await
        .context("Could not connect to the OpenAI realtime API")?;
    Ok(ws_stream)
}

/* Client events */

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ClientEvent {
    #[serde(rename = "transcription_session.update")]
    SessionUpdate { session: TranscriptionSession },

    #[serde(rename = "input_audio_buffer.append")]
    Append { audio: String },

    #[serde(rename = "input_audio_buffer.commit")]
    Commit,
}

impl ClientEvent {
    fn session_update() -> Self {
        Self::SessionUpdate {
            session: TranscriptionSession {
                input_audio_format: AudioFormat::Pcm16,
                input_audio_noise_reduction: NoiseReduction {
                    type_: NoiseReductionType::NearField,
                },
                input_audio_transcription: InputAudioTranscription {
                    model: TRANSCRIPTION_MODEL.to_owned(),
                    language: "en".to_owned(),
                },
                // the whole recording is committed by hand as one utterance
                turn_detection: None,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct TranscriptionSession {
    // input audio must be 16-bit PCM at a 24kHz sample rate, single channel, little-endian
    input_audio_format: AudioFormat,
    input_audio_noise_reduction: NoiseReduction,
    input_audio_transcription: InputAudioTranscription,
    turn_detection: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum AudioFormat {
    Pcm16,
}

#[derive(Debug, Serialize)]
struct NoiseReduction {
    #[serde(rename = "type")]
    type_: NoiseReductionType,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
enum NoiseReductionType {
    NearField,
}

#[derive(Debug, Serialize)]
struct InputAudioTranscription {
    model: String,
    language: String,
}

/* Transcription messages */

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum TranscriptionMessage {
    #[serde(rename = "error")]
    Error(ErrorEvent),

    #[serde(rename = "transcription_session.created")]
    SessionCreated,

    #[serde(rename = "transcription_session.updated")]
    SessionUpdated,

    #[serde(rename = "input_audio_buffer.committed")]
    SpeechCommitted,

    #[serde(rename = "conversation.item.input_audio_transcription.delta")]
    TranscriptionDelta,

    #[serde(rename = "conversation.item.input_audio_transcription.completed")]
    TranscriptionCompleted(TranscriptionCompletedEvent),

    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEvent {
    error: ErrorEventDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorEventDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionCompletedEvent {
    transcript: String,
}

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use crate::logger::ConsoleLogger;

    use super::*;

    fn parse(json: &str) -> TranscriptionMessage {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_completed_transcription() {
        let msg = parse(
            r#"{"type": "conversation.item.input_audio_transcription.completed",
                "event_id": "e1", "item_id": "i1", "content_index": 0,
                "transcript": "what's the weather"}"#,
        );
        match msg {
            TranscriptionMessage::TranscriptionCompleted(done) => {
                assert_eq!(done.transcript, "what's the weather");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    fn logger() -> Arc<dyn Logger> {
        Arc::new(ConsoleLogger::default())
    }

    #[test]
    fn needs_an_api_key() {
        let result = RealtimeListener::new(None, Path::new("/does/not/exist.pcm"), logger());
        assert!(matches!(result, Err(SpeechError::CapabilityUnavailable(_))));
    }

    #[test]
    fn needs_an_existing_recording() {
        let result = RealtimeListener::new(Some("sk-test"), Path::new("/does/not/exist.pcm"), logger());
        assert!(matches!(result, Err(SpeechError::CapabilityUnavailable(_))));
    }

    #[test]
    fn parses_session_lifecycle_events() {
        let msg = parse(r#"{"type": "transcription_session.updated", "event_id": "e2", "session": {}}"#);
        assert!(matches!(msg, TranscriptionMessage::SessionUpdated));
    }

    #[test]
    fn unknown_events_are_tolerated() {
        let msg = parse(r#"{"type": "input_audio_buffer.speech_started", "audio_start_ms": 10}"#);
        assert!(matches!(msg, TranscriptionMessage::Other));
    }

    #[test]
    fn session_update_commits_manually() {
        let json = serde_json::to_value(ClientEvent::session_update()).unwrap();
        assert_eq!(json["type"], "transcription_session.update");
        assert_eq!(json["session"]["input_audio_format"], "pcm16");
        assert_eq!(json["session"]["input_audio_noise_reduction"]["type"], "near_field");
        assert_eq!(json["session"]["input_audio_transcription"]["language"], "en");
        assert!(json["session"]["turn_detection"].is_null());
    }

    #[test]
    fn commit_is_a_bare_event() {
        let json = serde_json::to_value(ClientEvent::Commit).unwrap();
        assert_eq!(json, serde_json::json!({"type": "input_audio_buffer.commit"}));
    }

    #[tokio::test]
    async fn first_completed_transcript_wins() {
        let events = stream::iter(vec![
            Ok(parse(r#"{"type": "transcription_session.created", "event_id": "e0"}"#)),
            Ok(parse(
                r#"{"type": "conversation.item.input_audio_transcription.delta", "delta": "tell"}"#,
            )),
            Ok(parse(
                r#"{"type": "conversation.item.input_audio_transcription.completed", "transcript": "tell me the news"}"#,
            )),
            Ok(parse(
                r#"{"type": "conversation.item.input_audio_transcription.completed", "transcript": "ignored"}"#,
            )),
        ]);
        assert_eq!(first_transcript(events).await.unwrap(), "tell me the news");
    }

    #[tokio::test]
    async fn api_errors_abort_the_transcription() {
        let events = stream::iter(vec![Ok(parse(
            r#"{"type": "error", "event_id": "e1",
                "error": {"type": "invalid_request_error", "message": "bad audio"}}"#,
        ))]);
        let err = first_transcript(events).await.unwrap_err();
        assert!(err.to_string().contains("bad audio"));
    }

    #[tokio::test]
    async fn closed_stream_without_transcript_is_an_error() {
        let events = stream::iter(Vec::<anyhow::Result<TranscriptionMessage>>::new());
        assert!(first_transcript(events).await.is_err());
    }
}
