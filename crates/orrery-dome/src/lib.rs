//! Simulated observatory dome.
//!
//! # Modules
//!
//! - [`config`] -- [`DomeConfig`], capabilities, and the park/home latch mode
//! - [`engine`] -- The [`Dome`] state machine

pub mod config;
pub mod engine;

pub use config::{DomeCapabilities, DomeConfig, LatchMode};
pub use engine::{Dome, INTERFACE_VERSION, SlewDirection};
