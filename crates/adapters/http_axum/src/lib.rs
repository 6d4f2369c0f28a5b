//! # comforthub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a JSON API over the entity and device registries
//!   (`/api/entities`, `/api/devices`)
//! - Stream bus events to clients as Server-Sent Events
//!   (`/api/events/stream`)
//! - Accept bridge messages pushed by an external transport
//!   (`POST /api/bridge/messages`) and hand them to the bridge feed
//!
//! ## Dependency rule
//! Depends on `comforthub-app` (for port traits and services) and
//! `comforthub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
