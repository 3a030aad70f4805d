//! Transport for the host model runtime process.
//!
//! Spawns the host executable and speaks line-delimited JSON-RPC 2.0 over
//! its stdin/stdout. A single background reader task owns the child's
//! stdout exclusively and dispatches every incoming frame (via
//! [`classify_message`]):
//!
//! - **Response** → oneshot correlation for pending requests
//! - **Notification `session.event`** → the registered session's channel
//! - **IncomingRequest** → offered to the [`BackgroundBridge`]
//!
//! At most one model session is alive at a time, so session routing is a
//! single slot rather than a table.

use crate::bridge::BackgroundBridge;
use crate::host::error::{HostError, Result};
use crate::host::protocol::{
    CreateSessionResult, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, JsonRpcResponseOut,
    MessageKind, SessionEventParams, classify_message,
};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// A session event routed from the reader task to the live session.
#[derive(Debug)]
pub struct SessionEventMessage {
    /// Event type (`assistant.message.delta`, `session.idle`, ...).
    pub event_type: String,
    /// The full event value, including its `data` payload.
    pub event: serde_json::Value,
}

/// Single-slot routing table: the live session's ID and sender.
type RouteSlot = Arc<std::sync::RwLock<Option<(String, mpsc::UnboundedSender<SessionEventMessage>)>>>;

/// The live session's receiving end for routed session events.
///
/// When dropped, the session is automatically deregistered from the
/// transport's routing slot.
pub struct SessionChannel {
    rx: mpsc::UnboundedReceiver<SessionEventMessage>,
    session_id: String,
    transport: Arc<StdioTransport>,
}

impl SessionChannel {
    /// Receive the next routed session event.
    ///
    /// Returns [`HostError::TransportClosed`] if the background reader task
    /// has ended (host process exited or stdout closed).
    pub async fn recv(&mut self) -> Result<SessionEventMessage> {
        self.rx.recv().await.ok_or(HostError::TransportClosed)
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionChannel {
    fn drop(&mut self) {
        self.transport.deregister_session(&self.session_id);
    }
}

/// Line-delimited JSON-RPC transport to the spawned host runtime.
pub struct StdioTransport {
    /// Background reader task handle.
    _reader_handle: JoinHandle<()>,

    /// The live session's event route.
    ///
    /// Uses `std::sync::RwLock` (not `tokio::sync::RwLock`) so that
    /// [`deregister_session`](Self::deregister_session) can be called
    /// synchronously from [`SessionChannel::drop`]. The lock is only held
    /// briefly for slot reads and swaps.
    route: RouteSlot,

    /// Request-response correlation (request_id -> oneshot sender).
    pending_responses: Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>,

    /// Writer (serialized writes, independent of the reader).
    ///
    /// Wrapped in `Arc` so the background reader loop can also write
    /// bridge acknowledgments for host-initiated requests.
    writer: Arc<Mutex<BufWriter<ChildStdin>>>,

    /// Host runtime child process (killed on Drop to prevent orphans).
    child: Child,
}

impl StdioTransport {
    /// Spawn the host runtime (`<command> --serve`) and build the transport.
    pub fn spawn(command: &str, bridge: Arc<BackgroundBridge>) -> Result<Arc<Self>> {
        debug!("Spawning host runtime: {} --serve", command);

        let mut cmd = Command::new(command);
        cmd.arg("--serve")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        // Linux: request kernel to send SIGTERM to child when parent dies.
        // This catches cases where Drop doesn't run (SIGKILL, OOM kill).
        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
                Ok(())
            });
        }

        let mut child = cmd.spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| HostError::SpawnError(std::io::Error::other("Failed to capture stdout")))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| HostError::SpawnError(std::io::Error::other("Failed to capture stdin")))?;

        let route: RouteSlot = Arc::new(std::sync::RwLock::new(None));
        let pending_responses: Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>> =
            Arc::new(RwLock::new(HashMap::new()));
        let writer = Arc::new(Mutex::new(BufWriter::new(stdin)));

        // Clone refs for the background reader task
        let route_bg = Arc::clone(&route);
        let pending_bg = Arc::clone(&pending_responses);
        let writer_bg = Arc::clone(&writer);

        let reader_handle = tokio::spawn(async move {
            Self::reader_loop(stdout, route_bg, pending_bg, bridge, writer_bg).await;
        });

        info!("Host runtime spawned");

        Ok(Arc::new(Self {
            _reader_handle: reader_handle,
            route,
            pending_responses,
            writer,
            child,
        }))
    }

    /// Background reader loop — single owner of the child's stdout.
    ///
    /// Runs until the pipe closes or an I/O error occurs. When the loop
    /// exits, all senders are dropped so that receivers observe closure,
    /// which propagates as [`HostError::TransportClosed`].
    async fn reader_loop(
        stdout: ChildStdout,
        route: RouteSlot,
        pending_responses: Arc<RwLock<HashMap<u64, oneshot::Sender<JsonRpcResponse>>>>,
        bridge: Arc<BackgroundBridge>,
        writer: Arc<Mutex<BufWriter<ChildStdin>>>,
    ) {
        let mut lines = BufReader::new(stdout).lines();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => {
                    info!("Transport: host runtime closed its stdout");
                    break;
                }
                Err(e) => {
                    warn!("Transport: read error: {}", e);
                    break;
                }
            };

            let frame = line.trim();
            if frame.is_empty() {
                continue;
            }
            trace!("Transport received: {}", frame);

            let json_value: serde_json::Value = match serde_json::from_str(frame) {
                Ok(v) => v,
                Err(e) => {
                    warn!("Transport: failed to parse JSON: {} — {}", e, frame);
                    continue;
                }
            };

            match classify_message(&json_value) {
                // Response to a request we sent
                MessageKind::Response => {
                    if let Some(id) = json_value.get("id").and_then(|v| v.as_u64()) {
                        let response: JsonRpcResponse = match serde_json::from_value(json_value) {
                            Ok(r) => r,
                            Err(e) => {
                                warn!("Transport: failed to parse response: {}", e);
                                continue;
                            }
                        };
                        let sender = {
                            let mut pending = pending_responses.write().await;
                            pending.remove(&id)
                        };
                        if let Some(tx) = sender {
                            let _ = tx.send(response);
                        } else {
                            debug!("Transport: no pending receiver for response id={}", id);
                        }
                    }
                }

                // Host-initiated request — offer it to the background bridge
                MessageKind::IncomingRequest { id } => {
                    let params = json_value
                        .get("params")
                        .cloned()
                        .unwrap_or(serde_json::Value::Null);

                    match bridge.respond(&params) {
                        Some(result) => {
                            let response = JsonRpcResponseOut::new(id, result);
                            if let Ok(json) = serde_json::to_string(&response) {
                                let mut w = writer.lock().await;
                                let _ = w.write_all(json.as_bytes()).await;
                                let _ = w.write_all(b"\n").await;
                                let _ = w.flush().await;
                            }
                        }
                        None => {
                            debug!("Transport: ignoring incoming request (id={})", id);
                        }
                    }
                }

                // Notification (session.event, etc.)
                MessageKind::Notification => {
                    let notification: JsonRpcNotification = match serde_json::from_value(json_value)
                    {
                        Ok(n) => n,
                        Err(e) => {
                            warn!("Transport: failed to parse notification: {}", e);
                            continue;
                        }
                    };

                    if notification.method != "session.event" {
                        trace!(
                            "Transport: ignoring notification method={}",
                            notification.method
                        );
                        continue;
                    }

                    let Some(params) = notification.params else {
                        debug!("Transport: session.event without params");
                        continue;
                    };
                    let params: SessionEventParams = match serde_json::from_value(params) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!("Transport: failed to parse session.event params: {}", e);
                            continue;
                        }
                    };

                    let event_type = params
                        .event
                        .get("type")
                        .and_then(|t| t.as_str())
                        .unwrap_or("")
                        .to_string();

                    let routed = {
                        let slot = route.read().unwrap_or_else(|e| e.into_inner());
                        match slot.as_ref() {
                            Some((session_id, tx)) if *session_id == params.session_id => {
                                let _ = tx.send(SessionEventMessage {
                                    event_type: event_type.clone(),
                                    event: params.event.clone(),
                                });
                                true
                            }
                            _ => false,
                        }
                    };
                    if !routed {
                        debug!(
                            "Transport: no route for session_id={}, dropping event type={}",
                            params.session_id, event_type
                        );
                    }
                }
            }
        }

        // Reader ended — drop all senders so receivers observe closure
        info!("Transport: reader loop ended, closing session channel");
        {
            let mut slot = route.write().unwrap_or_else(|e| e.into_inner());
            *slot = None;
        }
        {
            let mut pending = pending_responses.write().await;
            pending.clear();
        }
    }

    /// Create a model session and return its ID + event channel.
    ///
    /// The single routing slot is (re)registered for the new session. At
    /// most one session exists per process lifetime, so an existing
    /// registration being replaced indicates a caller bug and is logged.
    pub async fn create_session(
        self: &Arc<Self>,
        params: serde_json::Value,
    ) -> Result<(String, SessionChannel)> {
        let request = JsonRpcRequest::new("session.create", Some(params));
        let response = self.request(&request).await?;

        if let Some(error) = response.error {
            return Err(HostError::RpcError {
                code: error.code,
                message: error.message,
            });
        }

        let result: CreateSessionResult = serde_json::from_value(
            response
                .result
                .ok_or_else(|| HostError::UnexpectedResponse("session.create without result".into()))?,
        )?;
        let session_id = result.session_id;
        debug!("Transport: session created: {}", session_id);

        let (tx, rx) = mpsc::unbounded_channel();
        {
            let mut slot = self.route.write().unwrap_or_else(|e| e.into_inner());
            if slot.is_some() {
                warn!("Transport: replacing an existing session route");
            }
            *slot = Some((session_id.clone(), tx));
        }

        let channel = SessionChannel {
            rx,
            session_id: session_id.clone(),
            transport: Arc::clone(self),
        };

        Ok((session_id, channel))
    }

    /// Send a JSON-RPC request and wait for the correlated response.
    ///
    /// Uses a `oneshot` channel: the request ID is registered in
    /// `pending_responses`, and the background reader task fulfils it when
    /// the matching response arrives. There is no timeout; a hung host
    /// hangs the caller, which the UI surfaces as a permanently pending
    /// request.
    pub async fn request(&self, request: &JsonRpcRequest) -> Result<JsonRpcResponse> {
        let (tx, rx) = oneshot::channel();
        let request_id = request.id;

        {
            let mut pending = self.pending_responses.write().await;
            pending.insert(request_id, tx);
        }

        if let Err(e) = self.send_request(request).await {
            // Clean up the pending entry to prevent leaks
            let mut pending = self.pending_responses.write().await;
            pending.remove(&request_id);
            return Err(e);
        }

        rx.await.map_err(|_| HostError::TransportClosed)
    }

    /// Send a JSON-RPC request without waiting for a response.
    pub async fn send_request(&self, request: &JsonRpcRequest) -> Result<()> {
        let request_json = serde_json::to_string(request)?;
        trace!("Transport sending: {}", request_json);

        let mut writer = self.writer.lock().await;
        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        Ok(())
    }

    /// Deregister a session from the routing slot.
    ///
    /// Automatically called by [`SessionChannel::drop`] — callers do not
    /// normally need to invoke this directly.
    pub fn deregister_session(&self, session_id: &str) {
        let mut slot = self.route.write().unwrap_or_else(|e| e.into_inner());
        if matches!(slot.as_ref(), Some((id, _)) if id == session_id) {
            *slot = None;
            debug!("Transport: deregistered session {}", session_id);
        }
    }
}

impl Drop for StdioTransport {
    fn drop(&mut self) {
        debug!("StdioTransport dropping, killing host runtime child process");
        let _ = self.child.start_kill();
    }
}
