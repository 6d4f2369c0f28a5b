//! # comforthub-domain
//!
//! Pure domain model for the comforthub home automation bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Devices** (physical things behind the bridge, rooms, the bridge itself)
//! - Define **Entities** (state holders with identity: binary sensors, sensors)
//! - Define **Events** (state-change and button-press records)
//! - Energy metering ([`energy::EnergyMeter`]) and momentary button state
//!   ([`momentary::MomentaryState`])
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod energy;
pub mod entity;
pub mod event;
pub mod momentary;
