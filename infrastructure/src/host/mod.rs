//! Adapter for the host-provided on-device model runtime.
//!
//! The runtime is a local executable spoken to over line-delimited
//! JSON-RPC 2.0 on its stdin/stdout:
//!
//! - [`protocol`] — message structures and frame classification
//! - [`transport`] — process spawning and message routing
//! - [`gateway`] — [`ModelGateway`](aura_application::ModelGateway) implementation
//! - [`session`] — [`ModelSession`](aura_application::ModelSession) implementation

pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;
pub mod transport;
