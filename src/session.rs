use crate::cancel::StopToken;
use crate::client::ApiClient;
use crate::protocol::{ChatMessage, StreamEvent};
use crate::transcript::Transcript;

/// One chat conversation with the compliance agent. Owns the history and
/// the stop token; each call to [`ChatSession::send`] drives a single turn.
pub struct ChatSession {
    client: ApiClient,
    history: Vec<ChatMessage>,
    stop: StopToken,
}

impl ChatSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            history: Vec::new(),
            stop: StopToken::new(),
        }
    }

    /// Handle for cancelling an in-flight turn from another task. Stays
    /// valid across turns; `send` re-arms it at the start of each request.
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// Run one user turn. `on_update` receives the rendered assistant
    /// message after every event so the caller can replace its in-progress
    /// view. Failures are folded into the transcript; the turn itself never
    /// errors out of the session.
    pub async fn send(&mut self, message: &str, mut on_update: impl FnMut(&str)) -> Transcript {
        let message = message.trim();
        if message.is_empty() {
            return Transcript::new();
        }
        self.stop.reset();

        let mut transcript = Transcript::new();
        let mut stream = match self
            .client
            .chat(message.to_string(), self.history.clone())
            .await
        {
            Ok(stream) => Some(stream),
            Err(err) => {
                transcript = transcript.apply(&StreamEvent::Error {
                    message: err.to_string(),
                });
                None
            }
        };

        if let Some(stream) = stream.as_mut() {
            loop {
                if self.stop.is_cancelled() {
                    transcript = transcript.stop();
                    break;
                }
                let next = tokio::select! {
                    biased;
                    _ = self.stop.cancelled() => {
                        transcript = transcript.stop();
                        break;
                    }
                    next = stream.next() => next,
                };
                match next {
                    Ok(Some(event)) => {
                        transcript = transcript.apply(&event);
                        on_update(&transcript.render());
                        if transcript.is_done() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    // A read error after a deliberate stop is the stop
                    // tearing down the connection, not a failure.
                    Err(_) if self.stop.is_cancelled() => {
                        transcript = transcript.stop();
                        break;
                    }
                    Err(err) => {
                        transcript = transcript.apply(&StreamEvent::Error {
                            message: err.to_string(),
                        });
                        break;
                    }
                }
            }
        }

        on_update(&transcript.render());
        self.history.push(ChatMessage::user(message));
        self.history.push(ChatMessage::assistant(transcript.render()));
        transcript
    }
}
