//! HTTP/1.1 wire protocol implementation.
//!
//! Requests are parsed incrementally from raw stream bytes and responses
//! are serialized through a state-gated writer; no pre-built HTTP stack is
//! involved at any layer.
//!
//! # Architecture
//!
//! - **`headers`**: header field collection with an incremental line parser
//! - **`request`**: request parser state machine and its stream-driving loop
//! - **`response`**: status codes and default response headers
//! - **`writer`**: ordered emission of status line, headers, body, trailers
//! - **`connection`**: per-connection glue from parsed request to flushed response
//!
//! # Parser State Machine
//!
//! Each request advances through four states, never backwards:
//!
//! ```text
//!        ┌──────────────┐
//!        │ Initialized  │ ← Wait for the full request line
//!        └──────┬───────┘
//!               │ Request line parsed
//!               ▼
//!        ┌──────────────────┐
//!        │ ParsingHeaders   │ ← One field line per step
//!        └──────┬───────────┘
//!               │ Empty line seen
//!               ▼
//!        ┌──────────────────┐
//!        │ ParsingBody      │ ← Accumulate content-length bytes
//!        └──────┬───────────┘
//!               │ Declared length reached
//!               ▼
//!        ┌──────────────────┐
//!        │ Done             │ ← Request handed to the handler
//!        └──────────────────┘
//! ```
//!
//! The response writer mirrors this with its own ordering gate: status
//! line, then headers, then exactly one of a whole body or a chunked body,
//! then (after a chunked body only) trailers.

pub mod connection;
pub mod headers;
pub mod request;
pub mod response;
pub mod writer;
