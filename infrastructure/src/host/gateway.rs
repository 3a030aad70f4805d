//! Model gateway implementation for the host runtime.

use crate::bridge::BackgroundBridge;
use crate::host::protocol::{AvailabilityResult, JsonRpcRequest};
use crate::host::session::HostSession;
use crate::host::transport::StdioTransport;
use async_trait::async_trait;
use aura_application::ports::model_gateway::{GatewayError, ModelGateway, ModelSession};
use aura_domain::{Availability, SessionConfig};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default host runtime executable.
const DEFAULT_COMMAND: &str = "aura-host";

/// [`ModelGateway`] implementation backed by a local model runtime process.
///
/// The availability probe fails closed: if the host executable is absent
/// from `PATH`, nothing is spawned and the capability is reported as
/// `Unsupported`. The runtime is spawned lazily on first use and reused
/// for the session's lifetime.
pub struct HostModelGateway {
    command: String,
    bridge: Arc<BackgroundBridge>,
    transport: Mutex<Option<Arc<StdioTransport>>>,
}

impl HostModelGateway {
    pub fn new() -> Self {
        Self::with_command(DEFAULT_COMMAND)
    }

    /// Create a gateway with a custom host command.
    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            bridge: Arc::new(BackgroundBridge::new()),
            transport: Mutex::new(None),
        }
    }

    /// Replace the background bridge consulted for host-initiated requests.
    pub fn with_bridge(mut self, bridge: Arc<BackgroundBridge>) -> Self {
        self.bridge = bridge;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Spawn the host runtime on first use, reusing it afterwards.
    async fn ensure_transport(&self) -> Result<Arc<StdioTransport>, GatewayError> {
        let mut guard = self.transport.lock().await;
        if let Some(transport) = guard.as_ref() {
            return Ok(Arc::clone(transport));
        }

        let transport = StdioTransport::spawn(&self.command, Arc::clone(&self.bridge))
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;
        *guard = Some(Arc::clone(&transport));
        info!("HostModelGateway connected to '{}'", self.command);
        Ok(transport)
    }
}

impl Default for HostModelGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelGateway for HostModelGateway {
    async fn availability(&self) -> Result<Availability, GatewayError> {
        // Capability absent entirely: report unsupported without spawning
        if which::which(&self.command).is_err() {
            info!("Host runtime '{}' not found on PATH", self.command);
            return Ok(Availability::Unsupported);
        }

        let transport = self.ensure_transport().await?;
        let request = JsonRpcRequest::new("model.availability", None);
        let response = transport
            .request(&request)
            .await
            .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(GatewayError::RequestFailed(error.message));
        }

        let result: AvailabilityResult = serde_json::from_value(
            response
                .result
                .ok_or_else(|| GatewayError::RequestFailed("model.availability without result".into()))?,
        )
        .map_err(|e| GatewayError::RequestFailed(e.to_string()))?;

        debug!("Host reported availability: {}", result.availability);
        // Unknown states fail closed to Unavailable
        Ok(result
            .availability
            .parse()
            .unwrap_or(Availability::Unavailable))
    }

    async fn start_session(
        &self,
        config: &SessionConfig,
    ) -> Result<Box<dyn ModelSession>, GatewayError> {
        let transport = self.ensure_transport().await?;

        let params =
            serde_json::to_value(config).map_err(|e| GatewayError::SessionError(e.to_string()))?;
        let (session_id, channel) = transport
            .create_session(params)
            .await
            .map_err(|e| GatewayError::SessionError(e.to_string()))?;

        info!("Session created: {}", session_id);
        Ok(Box::new(HostSession::new(transport, session_id, channel)))
    }
}
