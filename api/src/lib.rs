//! HTTP surface of the authsvc token engine
//!
//! Routes, request and response DTOs, and the mapping from domain errors to
//! HTTP responses. The binary in `main.rs` wires the concrete backends.

pub mod app;
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
