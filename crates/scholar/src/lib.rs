//! `scholar` crate (library surface).
//!
//! The primary entrypoint is the `scholar` binary (HTTP server + CLI). This library exposes
//! the pieces the binary wires together so tests and embedders can assemble them directly.

pub mod api;
pub mod catalog;
pub mod config;
pub mod orchestrator;
pub mod pipeline;

pub use scholar_core as core;
pub use scholar_local as local;
