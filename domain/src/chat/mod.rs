//! Chat transcript domain.
//!
//! - [`entities::Turn`] — a single message in the transcript
//! - [`entities::Transcript`] — the ordered sequence of turns
//! - [`stream::StreamEvent`] — events in a streaming model response
//! - [`availability::Availability`] — model capability probe result
//! - [`session_config::SessionConfig`] — options for creating a model session

pub mod availability;
pub mod entities;
pub mod session_config;
pub mod stream;
