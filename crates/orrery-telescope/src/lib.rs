//! Simulated telescope mount.
//!
//! The mount is modelled on its two mechanical axes. Each tick combines
//! sidereal tracking, rate offsets, `MoveAxis` rates, slew steps, hand
//! control and pulse guiding into a single displacement, then applies the
//! axis limits of the configured alignment.
//!
//! # Modules
//!
//! - [`config`] -- [`TelescopeConfig`] and its capability block
//! - [`motion`] -- Slew profile, pulse-guide countdown, and state enums
//! - [`engine`] -- The [`Telescope`] state machine

pub mod config;
pub mod engine;
pub mod motion;

pub use config::{SlewRates, TelescopeCapabilities, TelescopeConfig};
pub use engine::{AxisRate, INTERFACE_VERSION, SlewMode, Telescope};
pub use motion::{HandSpeed, SlewState, TrackingMode};
