//! Marketplace admin client library
//!
//! Exposes the request gateway, the typed resource clients and the CLI
//! definitions used by the `salonadm` binary and its integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod gateway;
pub mod session;
