//! Integration tests with mock HTTP server

pub mod mock_server;
pub mod discovery;
pub mod invocation;
pub mod chained;
pub mod service;
