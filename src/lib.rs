//! # Drawing Archive Backend Library
//!
//! Persistence and retrieval for engineering drawings and their metadata:
//! extracted search features, machine runtimes, query history and the
//! feedback users give on search results. Everything is exposed through a
//! CRUD-style REST API.
//!
//! ## Architecture
//!
//! - **Axum**: HTTP server and routing
//! - **SQLx**: async SQLite access; cascades are enforced by foreign keys
//! - **Tokio**: async runtime
//! - **Serde**: JSON wire format
//!
//! ## Core Components
//!
//! - [`config`]: layered configuration (defaults, files, environment)
//! - [`db`]: schema creation
//! - [`model`]: stored entities and their relationships
//! - [`repository`]: per-entity SQL over a borrowed connection
//! - [`service`]: transactions, existence checks, error classification
//! - [`mapping`]: entity <-> DTO conversion
//! - [`types`]: wire DTOs
//! - [`routes`]: HTTP handlers and the router
//! - [`error`]: service errors and HTTP error responses
//! - [`state`]: shared application state

pub mod config;
pub mod db;
pub mod error;
pub mod mapping;
pub mod model;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;
pub mod types;

#[cfg(test)]
mod tests;
