//! SSE transport for NewsInsight job event streams.
//!
//! Provides the event-stream adapter used by the job monitor: an
//! incremental `text/event-stream` parser, connection management over a
//! long-lived HTTP GET, typed decoding of named job events, and a
//! bounded reconnection loop.

pub mod client;
pub mod events;
pub mod reconnect;
pub mod sse;

pub use client::{EventStreamClient, EventStreamConnection, StreamError};
pub use events::{decode_frame, DecodeError, StreamEvent};
pub use reconnect::{reconnect_loop, ReconnectConfig};
pub use sse::{SseFrame, SseParser};
