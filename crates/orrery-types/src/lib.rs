//! Shared type definitions for the Orrery observatory simulator.
//!
//! This crate is the single source of truth for the value types that flow
//! between the motion engines, the dispatch envelope, and the Alpaca
//! routing layer.
//!
//! # Modules
//!
//! - [`vector`] -- The paired-angle [`Vector`] value type
//! - [`enums`] -- Alpaca enumerations (alignment, pier side, drive rates, shutter)
//! - [`ids`] -- Client and device identifiers
//! - [`error`] -- The Alpaca error taxonomy ([`AlpacaError`])

pub mod enums;
pub mod error;
pub mod ids;
pub mod vector;

// Re-export all public types at crate root for convenience.
pub use enums::{
    AlignmentMode, AlpacaEnum, DeviceType, DriveRate, EquatorialSystem, GuideDirection,
    PierSide, ShutterState, TelescopeAxis,
};
pub use error::{AlpacaError, AlpacaResult, ErrorKind, InvalidConfig};
pub use ids::{ClientId, DeviceKey};
pub use vector::Vector;
