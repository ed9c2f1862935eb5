use std::sync::mpsc;
use std::sync::Arc;

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::chat::ChatCompletionApi;
use crate::error::IntegrationError;
use crate::types::*;

/// A non-blocking handle to an in-flight async request.
/// Call `try_recv()` each frame to check for results without blocking the game loop.
pub struct PendingRequest<T> {
    receiver: mpsc::Receiver<Result<T, IntegrationError>>,
}

impl<T> PendingRequest<T> {
    /// Non-blocking check for the result. Returns `None` if still pending.
    /// A worker that vanished without answering reports a network error.
    pub fn try_recv(&self) -> Option<Result<T, IntegrationError>> {
        match self.receiver.try_recv() {
            Ok(result) => Some(result),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                Some(Err(IntegrationError::Network("Channel closed".into())))
            }
        }
    }
}

/// Fire-and-poll chat access as seen by the game loop.
///
/// At most one call is outstanding at a time; results are delivered through
/// `poll_result` exactly once and never through a callback.
pub trait ChatService {
    /// Whether calls will reach the network
    fn is_available(&self) -> bool;

    /// Whether a call was made whose result has not been polled yet
    fn is_in_flight(&self) -> bool;

    /// Start a call. Fails with `Busy` while a previous result is unclaimed.
    fn chat_async(&mut self, messages: Vec<ChatMessage>) -> Result<(), IntegrationError>;

    /// Non-blocking. Returns the outcome once, then `None` until the next call.
    fn poll_result(&mut self) -> Option<ChatOutcome>;
}

/// Chat completion client that runs each request on a background runtime.
pub struct DialogueClient {
    runtime: tokio::runtime::Runtime,
    api: Arc<ChatCompletionApi>,
    credentials: Option<Arc<LlmCredentials>>,
    options: ChatOptions,
    pending: Option<PendingRequest<String>>,
    /// Outcome produced without a network round trip
    settled: Option<Result<String, IntegrationError>>,
}

impl DialogueClient {
    /// Create a disabled client with a background tokio runtime.
    pub fn new(options: ChatOptions) -> Result<Self, IntegrationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("dialogue-client")
            .enable_all()
            .build()
            .map_err(|e| IntegrationError::Runtime(e.to_string()))?;

        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| IntegrationError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            runtime,
            api: Arc::new(ChatCompletionApi::new(client)),
            credentials: None,
            options,
            pending: None,
            settled: None,
        })
    }

    /// Enable the client. Incomplete credentials leave it disabled.
    pub fn configure(&mut self, credentials: LlmCredentials) {
        if credentials.is_complete() {
            info!("AI chat enabled with model {}", credentials.model);
            self.credentials = Some(Arc::new(credentials));
        } else {
            warn!("AI chat credentials incomplete, staying disabled");
            self.credentials = None;
        }
    }

    /// Turn network calls off. A call already in flight still delivers its result.
    pub fn disable(&mut self) {
        if self.credentials.take().is_some() {
            info!("AI chat disabled");
        }
    }

    pub fn options(&self) -> ChatOptions {
        self.options
    }
}

impl ChatService for DialogueClient {
    fn is_available(&self) -> bool {
        self.credentials.is_some()
    }

    fn is_in_flight(&self) -> bool {
        self.pending.is_some() || self.settled.is_some()
    }

    fn chat_async(&mut self, messages: Vec<ChatMessage>) -> Result<(), IntegrationError> {
        if self.is_in_flight() {
            return Err(IntegrationError::Busy);
        }

        let Some(credentials) = self.credentials.clone() else {
            self.settled = Some(Err(IntegrationError::Unavailable));
            return Ok(());
        };

        let request = ChatCompletionRequest {
            model: credentials.model.clone(),
            messages,
            max_tokens: self.options.max_tokens,
            temperature: self.options.temperature,
        };
        info!("Sending chat request with {} messages", request.messages.len());

        let (tx, rx) = mpsc::sync_channel(1);
        let api = Arc::clone(&self.api);

        self.runtime.spawn(async move {
            let result = api.complete(&credentials, &request).await;
            let _ = tx.send(result);
        });

        self.pending = Some(PendingRequest { receiver: rx });
        Ok(())
    }

    fn poll_result(&mut self) -> Option<ChatOutcome> {
        let result = match self.settled.take() {
            Some(result) => result,
            None => {
                let result = self.pending.as_ref()?.try_recv()?;
                self.pending = None;
                result
            }
        };
        Some(result.map_err(|e| {
            match &e {
                IntegrationError::Unavailable => debug!("Chat skipped: {}", e),
                _ => warn!("Chat request failed: {}", e),
            }
            ChatFailure::from(e)
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;

    fn poll_until_done(client: &mut DialogueClient) -> ChatOutcome {
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            if let Some(outcome) = client.poll_result() {
                return outcome;
            }
            assert!(Instant::now() < deadline, "chat request never completed");
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    #[test]
    fn test_pending_request_try_recv_none_then_result() {
        let (tx, rx) = mpsc::sync_channel(1);
        let pending: PendingRequest<String> = PendingRequest { receiver: rx };

        // Before sending, should return None
        assert!(pending.try_recv().is_none());

        tx.send(Ok("hello".to_string())).unwrap();

        let result = pending.try_recv();
        assert_eq!(result.unwrap().unwrap(), "hello");
    }

    #[test]
    fn test_pending_request_disconnected_worker() {
        let (tx, rx) = mpsc::sync_channel::<Result<String, IntegrationError>>(1);
        let pending = PendingRequest { receiver: rx };
        drop(tx);
        assert!(matches!(pending.try_recv(), Some(Err(IntegrationError::Network(_)))));
    }

    #[test]
    fn test_disabled_client_answers_synchronously_once() {
        let mut client = DialogueClient::new(ChatOptions::default()).unwrap();
        assert!(!client.is_available());

        client.chat_async(vec![ChatMessage::user("hi")]).unwrap();
        assert!(client.is_in_flight());

        let outcome = client.poll_result().expect("sentinel should be ready immediately");
        assert_eq!(outcome, Err(ChatFailure::Unavailable));
        assert_eq!(outcome.unwrap_err().to_string(), "(AI not enabled)");

        assert!(client.poll_result().is_none());
        assert!(!client.is_in_flight());
    }

    #[test]
    fn test_configure_and_disable() {
        let mut client = DialogueClient::new(ChatOptions::default()).unwrap();
        client.configure(LlmCredentials::new("key", "", "model"));
        assert!(!client.is_available());

        client.configure(LlmCredentials::new("key", "http://127.0.0.1:1", "model"));
        assert!(client.is_available());

        client.disable();
        assert!(!client.is_available());
    }

    #[test]
    fn test_single_flight_and_error_sentinel() {
        let options = ChatOptions {
            timeout: Duration::from_secs(5),
            ..ChatOptions::default()
        };
        let mut client = DialogueClient::new(options).unwrap();
        // Nothing listens on port 1, so the request fails fast.
        client.configure(LlmCredentials::new("key", "http://127.0.0.1:1", "model"));

        client.chat_async(vec![ChatMessage::user("hi")]).unwrap();
        assert!(matches!(
            client.chat_async(vec![ChatMessage::user("again")]),
            Err(IntegrationError::Busy)
        ));

        let outcome = poll_until_done(&mut client);
        let failure = outcome.unwrap_err();
        let ChatFailure::Error(msg) = &failure else {
            panic!("expected an error sentinel, got {:?}", failure);
        };
        assert!(msg.chars().count() <= ERROR_SENTINEL_CHARS);
        assert!(failure.to_string().starts_with("(Error: "));

        assert!(client.poll_result().is_none());
        assert!(client.chat_async(vec![ChatMessage::user("retry")]).is_ok());
    }
}
