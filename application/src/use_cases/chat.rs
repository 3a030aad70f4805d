//! Chat controller use case.
//!
//! Owns the transcript and the single model session, and serializes user
//! submissions so at most one streaming request is in flight at a time.
//!
//! The controller is deliberately fail-closed: initialization and streaming
//! failures never surface as raw errors to the rendering surface. Both are
//! converted into ordinary assistant turns, keeping a uniform user-visible
//! channel for all outcomes.

use crate::ports::chat_progress::ChatProgress;
use crate::ports::model_gateway::{GatewayError, ModelGateway, ModelSession};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use aura_domain::{Availability, SessionConfig, StreamEvent, Transcript, Turn};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Opening assistant turn shown before any interaction.
const GREETING: &str = "Hello! I'm Aura, your on-device AI. How can I help you today?";

/// Shown when the capability probe reports the model as not usable.
const UNAVAILABLE_NOTICE: &str =
    "Sorry, the on-device model is not available in this environment. \
     Please check your Aura host installation.";

/// Shown when the availability check or session creation fails.
const SETUP_ERROR_NOTICE: &str = "An error occurred while setting up the AI model.";

/// Shown when opening or consuming a streaming response fails.
const STREAM_ERROR_NOTICE: &str = "Sorry, I encountered an error.";

/// Outcome of the one-time connection attempt.
enum ConnectOutcome {
    Connected(Box<dyn ModelSession>),
    NotAvailable(Availability),
}

/// Use case driving the chat: session lifecycle plus streaming
/// reconciliation.
///
/// State machine per submission:
/// 1. **Idle** — submission allowed only with non-empty trimmed input, a
///    live session, and no request in flight.
/// 2. **Submitting** — user turn appended, input buffer cleared, loading
///    flag set, empty assistant placeholder appended.
/// 3. **Streaming** — each arriving chunk extends the placeholder, in
///    delivery order, one transcript mutation per chunk.
/// 4. **Terminal** — on success the placeholder holds the full response;
///    on failure a separate error turn is appended and the partial
///    placeholder is left as-is. Either way the loading flag is cleared.
pub struct ChatController {
    gateway: Arc<dyn ModelGateway>,
    config: SessionConfig,
    transcript: Transcript,
    /// The single session handle; absent until [`initialize`](Self::initialize)
    /// succeeds, and never recreated afterwards.
    session: Option<Box<dyn ModelSession>>,
    input: String,
    loading: bool,
    logger: Arc<dyn TranscriptLogger>,
}

impl ChatController {
    pub fn new(gateway: Arc<dyn ModelGateway>, config: SessionConfig) -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Turn::assistant(GREETING));

        Self {
            gateway,
            config,
            transcript,
            session: None,
            input: String::new(),
            loading: false,
            logger: Arc::new(NoTranscriptLogger),
        }
    }

    /// Attach a transcript logger.
    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Probe model availability and create the single session.
    ///
    /// Awaited once at startup, before any submission path is reachable.
    /// Failure is terminal for the process lifetime: the session is left
    /// absent, one explanatory assistant turn is appended, and every later
    /// submission is a no-op. Never retried.
    pub async fn initialize(&mut self) {
        match self.connect().await {
            Ok(ConnectOutcome::Connected(session)) => {
                info!("Model session created");
                self.session = Some(session);
            }
            Ok(ConnectOutcome::NotAvailable(availability)) => {
                info!("Model not available: {}", availability);
                self.logger.log(TranscriptEvent::new(
                    "model_unavailable",
                    serde_json::json!({ "availability": availability.as_str() }),
                ));
                self.transcript.push(Turn::assistant(UNAVAILABLE_NOTICE));
            }
            Err(e) => {
                warn!("Error initializing model: {}", e);
                self.logger.log(TranscriptEvent::new(
                    "init_error",
                    serde_json::json!({ "error": e.to_string() }),
                ));
                self.transcript.push(Turn::assistant(SETUP_ERROR_NOTICE));
            }
        }
    }

    async fn connect(&self) -> Result<ConnectOutcome, GatewayError> {
        let availability = self.gateway.availability().await?;
        debug!("Model availability: {}", availability);

        if !availability.is_available() {
            return Ok(ConnectOutcome::NotAvailable(availability));
        }

        let session = self.gateway.start_session(&self.config).await?;
        Ok(ConnectOutcome::Connected(session))
    }

    /// Replace the input buffer.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// True when a submission would be accepted right now.
    pub fn can_submit(&self) -> bool {
        !self.input.trim().is_empty() && self.session.is_some() && !self.loading
    }

    /// Submit the input buffer and stream the response into the transcript.
    ///
    /// Gated no-op when the trimmed input is empty, no session exists, or a
    /// request is already in flight. There is no cancellation: once
    /// streaming begins it runs to completion or failure.
    pub async fn submit(&mut self, progress: &dyn ChatProgress) {
        if !self.can_submit() {
            debug!("Submission rejected (idle gate)");
            return;
        }

        let text = self.input.trim().to_string();
        self.input.clear();

        self.transcript.push(Turn::user(text.clone()));
        self.logger.log(TranscriptEvent::new(
            "user_turn",
            serde_json::json!({ "text": text }),
        ));

        self.loading = true;
        // Empty placeholder for the streaming response
        self.transcript.push(Turn::assistant(""));

        match self.stream_response(&text, progress).await {
            Ok(()) => {
                let content = self
                    .transcript
                    .last()
                    .map(|turn| turn.content.clone())
                    .unwrap_or_default();
                debug!("Streaming complete ({} bytes)", content.len());
                self.logger.log(TranscriptEvent::new(
                    "assistant_turn",
                    serde_json::json!({ "bytes": content.len(), "text": content }),
                ));
            }
            Err(e) => {
                warn!("Error during model prompt: {}", e);
                self.logger.log(TranscriptEvent::new(
                    "stream_error",
                    serde_json::json!({ "error": e.to_string() }),
                ));
                // The partial placeholder is left as-is; the notice is a
                // separate turn.
                self.transcript.push(Turn::assistant(STREAM_ERROR_NOTICE));
            }
        }

        self.loading = false;
    }

    /// Open the stream and fold events into the trailing placeholder.
    async fn stream_response(
        &mut self,
        prompt: &str,
        progress: &dyn ChatProgress,
    ) -> Result<(), GatewayError> {
        let Some(session) = self.session.as_deref() else {
            return Ok(());
        };
        let mut handle = session.prompt_streaming(prompt).await?;

        progress.on_stream_start();
        let mut streamed_bytes = 0usize;

        let result = loop {
            match handle.receiver.recv().await {
                Some(StreamEvent::Delta(chunk)) => {
                    self.transcript.append_to_last(&chunk);
                    progress.on_chunk(&chunk);
                    streamed_bytes += chunk.len();
                }
                Some(StreamEvent::Completed(full)) => {
                    // Delta-less hosts deliver everything in the terminal
                    // event; fill the placeholder from it in that case.
                    if streamed_bytes == 0 && !full.is_empty() {
                        self.transcript.append_to_last(&full);
                        progress.on_chunk(&full);
                    }
                    break Ok(());
                }
                Some(StreamEvent::Error(message)) => {
                    break Err(GatewayError::RequestFailed(message));
                }
                // Channel closed without a terminal event: host died
                None => break Err(GatewayError::TransportClosed),
            }
        };

        progress.on_stream_end();
        result
    }

    /// The transcript, in display order.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// True when a session handle exists ("Online" status).
    pub fn is_online(&self) -> bool {
        self.session.is_some()
    }

    /// True while a streaming request is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    fn force_loading(&mut self, loading: bool) {
        self.loading = loading;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::chat_progress::NoChatProgress;
    use crate::ports::model_gateway::StreamHandle;
    use async_trait::async_trait;
    use aura_domain::Role;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    // ==================== Test Mocks ====================

    /// A scripted stream: either a list of events or an open failure.
    type StreamScript = Result<Vec<StreamEvent>, String>;

    struct MockSession {
        scripts: Mutex<VecDeque<StreamScript>>,
    }

    impl MockSession {
        fn new(scripts: Vec<StreamScript>) -> Self {
            Self {
                scripts: Mutex::new(VecDeque::from(scripts)),
            }
        }
    }

    #[async_trait]
    impl ModelSession for MockSession {
        async fn prompt_streaming(&self, _text: &str) -> Result<StreamHandle, GatewayError> {
            let script = self
                .scripts
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GatewayError::Other("No more scripts".to_string()))?;

            let events = script.map_err(GatewayError::RequestFailed)?;
            let (tx, rx) = mpsc::channel(events.len().max(1));
            for event in events {
                tx.try_send(event).unwrap();
            }
            // tx dropped here: a script without a terminal event closes the
            // channel early, simulating a dead host
            Ok(StreamHandle::new(rx))
        }
    }

    enum GatewayScript {
        Available(Vec<StreamScript>),
        NotAvailable(Availability),
        AvailabilityFails,
        SessionFails,
    }

    struct MockGateway {
        script: GatewayScript,
    }

    impl MockGateway {
        fn available(scripts: Vec<StreamScript>) -> Arc<Self> {
            Arc::new(Self {
                script: GatewayScript::Available(scripts),
            })
        }

        fn not_available(availability: Availability) -> Arc<Self> {
            Arc::new(Self {
                script: GatewayScript::NotAvailable(availability),
            })
        }
    }

    #[async_trait]
    impl ModelGateway for MockGateway {
        async fn availability(&self) -> Result<Availability, GatewayError> {
            match &self.script {
                GatewayScript::NotAvailable(availability) => Ok(*availability),
                GatewayScript::AvailabilityFails => {
                    Err(GatewayError::ConnectionError("probe failed".to_string()))
                }
                _ => Ok(Availability::Available),
            }
        }

        async fn start_session(
            &self,
            _config: &SessionConfig,
        ) -> Result<Box<dyn ModelSession>, GatewayError> {
            match &self.script {
                GatewayScript::Available(scripts) => {
                    Ok(Box::new(MockSession::new(scripts.clone())))
                }
                GatewayScript::SessionFails => {
                    Err(GatewayError::SessionError("spawn failed".to_string()))
                }
                _ => Err(GatewayError::Other("unexpected start_session".to_string())),
            }
        }
    }

    /// Records every chunk the controller reports.
    struct RecordingProgress {
        chunks: Mutex<Vec<String>>,
    }

    impl RecordingProgress {
        fn new() -> Self {
            Self {
                chunks: Mutex::new(Vec::new()),
            }
        }
    }

    impl ChatProgress for RecordingProgress {
        fn on_chunk(&self, chunk: &str) {
            self.chunks.lock().unwrap().push(chunk.to_string());
        }
    }

    fn delta(s: &str) -> StreamEvent {
        StreamEvent::Delta(s.to_string())
    }

    fn completed(s: &str) -> StreamEvent {
        StreamEvent::Completed(s.to_string())
    }

    async fn online_controller(scripts: Vec<StreamScript>) -> ChatController {
        let mut controller =
            ChatController::new(MockGateway::available(scripts), SessionConfig::default());
        controller.initialize().await;
        assert!(controller.is_online());
        controller
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn starts_with_greeting_turn() {
        let controller =
            ChatController::new(MockGateway::available(vec![]), SessionConfig::default());
        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::Assistant);
        assert_eq!(turns[0].content, GREETING);
        assert!(!controller.is_online());
    }

    #[tokio::test]
    async fn streams_chunks_into_trailing_turn() {
        let mut controller = online_controller(vec![Ok(vec![
            delta("Hel"),
            delta("lo"),
            delta("!"),
            completed("Hello!"),
        ])])
        .await;

        let progress = RecordingProgress::new();
        controller.set_input("Hi");
        controller.submit(&progress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].content, GREETING);
        assert_eq!(turns[1].role, Role::User);
        assert_eq!(turns[1].content, "Hi");
        assert_eq!(turns[2].role, Role::Assistant);
        assert_eq!(turns[2].content, "Hello!");

        // One progress callback per chunk, in delivery order
        assert_eq!(
            *progress.chunks.lock().unwrap(),
            vec!["Hel".to_string(), "lo".to_string(), "!".to_string()]
        );
        assert!(!controller.is_loading());
        assert!(controller.input().is_empty());
    }

    #[tokio::test]
    async fn degenerate_empty_stream_leaves_placeholder_empty() {
        let mut controller = online_controller(vec![Ok(vec![completed("")])]).await;

        controller.set_input("Hi");
        controller.submit(&NoChatProgress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[2].role, Role::Assistant);
        assert!(turns[2].content.is_empty());
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn delta_less_completion_fills_placeholder() {
        let mut controller = online_controller(vec![Ok(vec![completed("Hello!")])]).await;

        controller.set_input("Hi");
        controller.submit(&NoChatProgress).await;

        assert_eq!(controller.transcript().last().unwrap().content, "Hello!");
    }

    #[tokio::test]
    async fn whitespace_input_is_rejected_without_transcript_change() {
        let mut controller = online_controller(vec![Ok(vec![completed("unused")])]).await;

        controller.set_input("   \t ");
        controller.submit(&NoChatProgress).await;

        assert_eq!(controller.transcript().len(), 1);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn submission_while_loading_is_rejected() {
        let mut controller = online_controller(vec![Ok(vec![completed("unused")])]).await;

        controller.force_loading(true);
        controller.set_input("second");
        assert!(!controller.can_submit());
        controller.submit(&NoChatProgress).await;

        // No transcript change, input buffer untouched
        assert_eq!(controller.transcript().len(), 1);
        assert_eq!(controller.input(), "second");
    }

    #[tokio::test]
    async fn unavailable_model_appends_notice_and_disables_submit() {
        let mut controller = ChatController::new(
            MockGateway::not_available(Availability::Unavailable),
            SessionConfig::default(),
        );
        controller.initialize().await;

        assert!(!controller.is_online());
        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].content, UNAVAILABLE_NOTICE);

        // Submission is permanently a no-op
        controller.set_input("test");
        assert!(!controller.can_submit());
        controller.submit(&NoChatProgress).await;
        assert_eq!(controller.transcript().len(), 2);
    }

    #[tokio::test]
    async fn unsupported_capability_is_handled_like_unavailable() {
        let mut controller = ChatController::new(
            MockGateway::not_available(Availability::Unsupported),
            SessionConfig::default(),
        );
        controller.initialize().await;

        assert!(!controller.is_online());
        assert_eq!(
            controller.transcript().last().unwrap().content,
            UNAVAILABLE_NOTICE
        );
    }

    #[tokio::test]
    async fn availability_failure_appends_setup_notice() {
        let mut controller = ChatController::new(
            Arc::new(MockGateway {
                script: GatewayScript::AvailabilityFails,
            }),
            SessionConfig::default(),
        );
        controller.initialize().await;

        assert!(!controller.is_online());
        assert_eq!(
            controller.transcript().last().unwrap().content,
            SETUP_ERROR_NOTICE
        );
    }

    #[tokio::test]
    async fn session_creation_failure_appends_setup_notice() {
        let mut controller = ChatController::new(
            Arc::new(MockGateway {
                script: GatewayScript::SessionFails,
            }),
            SessionConfig::default(),
        );
        controller.initialize().await;

        assert!(!controller.is_online());
        assert_eq!(
            controller.transcript().last().unwrap().content,
            SETUP_ERROR_NOTICE
        );
    }

    #[tokio::test]
    async fn mid_stream_error_keeps_partial_and_appends_error_turn() {
        let mut controller = online_controller(vec![Ok(vec![
            delta("par"),
            delta("tial"),
            StreamEvent::Error("boom".to_string()),
        ])])
        .await;

        controller.set_input("test");
        controller.submit(&NoChatProgress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 4);
        // Placeholder left unmodified, not rolled back
        assert_eq!(turns[2].content, "partial");
        assert_eq!(turns[3].content, STREAM_ERROR_NOTICE);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn open_failure_appends_error_turn_after_empty_placeholder() {
        let mut controller = online_controller(vec![Err("refused".to_string())]).await;

        controller.set_input("test");
        controller.submit(&NoChatProgress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 4);
        assert!(turns[2].content.is_empty());
        assert_eq!(turns[3].content, STREAM_ERROR_NOTICE);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn channel_closing_without_terminal_event_is_a_failure() {
        // No Completed event in the script: the channel closes mid-stream
        let mut controller = online_controller(vec![Ok(vec![delta("par")])]).await;

        controller.set_input("test");
        controller.submit(&NoChatProgress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns[2].content, "par");
        assert_eq!(turns[3].content, STREAM_ERROR_NOTICE);
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_submission() {
        let mut controller = online_controller(vec![Ok(vec![completed("ok")])]).await;

        controller.set_input("  Hi  ");
        controller.submit(&NoChatProgress).await;

        assert_eq!(controller.transcript().turns()[1].content, "Hi");
    }

    #[tokio::test]
    async fn session_is_reused_across_submissions() {
        let mut controller = online_controller(vec![
            Ok(vec![delta("one"), completed("one")]),
            Ok(vec![delta("two"), completed("two")]),
        ])
        .await;

        controller.set_input("first");
        controller.submit(&NoChatProgress).await;
        controller.set_input("second");
        controller.submit(&NoChatProgress).await;

        let turns = controller.transcript().turns();
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[2].content, "one");
        assert_eq!(turns[4].content, "two");
    }

    #[tokio::test]
    async fn submission_is_possible_again_after_stream_error() {
        let mut controller = online_controller(vec![
            Ok(vec![StreamEvent::Error("boom".to_string())]),
            Ok(vec![delta("fine"), completed("fine")]),
        ])
        .await;

        controller.set_input("first");
        controller.submit(&NoChatProgress).await;
        assert!(!controller.is_loading());

        controller.set_input("second");
        assert!(controller.can_submit());
        controller.submit(&NoChatProgress).await;

        assert_eq!(controller.transcript().last().unwrap().content, "fine");
    }
}
