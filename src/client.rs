//! Pipeline client: the two-phase "resolve service → invoke service" protocol.
//!
//! Keep the public surface small and predictable. Payload construction and
//! response decoding for each phase live in `discovery` and `invocation`.

pub mod builder;
pub mod core;
mod discovery;
mod invocation;
pub mod policy;

pub use builder::PipelineClientBuilder;
pub use self::core::{CallStats, PipelineClient, RequestPhase};
pub use policy::{Decision, RetryPolicy};
