//! HTTP transport for the discovery and invocation calls.

mod http;

pub use http::{HttpReply, HttpTransport, TransportError};
