use super::RecognizedSpeech;

/// Treats each typed line as a finalized transcript. Listens continuously
/// between `start` and `stop`; lines typed outside of that are not heard.
#[derive(Default)]
pub struct ConsoleListener {
    listening: bool,
}

impl ConsoleListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.listening = true;
    }

    pub fn stop(&mut self) {
        self.listening = false;
    }

    pub fn hear(&self, text: String) -> Option<RecognizedSpeech> {
        self.listening.then_some(RecognizedSpeech { text })
    }
}
