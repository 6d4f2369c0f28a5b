//! # comforthub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `EntityRepository`: persistence for entities (also the restore store)
//!   - `DeviceRepository`: persistence for devices
//!   - `EventPublisher`: fan-out of domain events
//!   - `BridgeFeed`: ingress of raw bridge messages
//! - Define the **integration contract** (`Integration`, `IntegrationContext`)
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//! - Provide the `EntityService` / `DeviceService` use-cases
//!
//! ## Dependency rule
//! Depends on `comforthub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod services;

#[cfg(test)]
mod testing;
