//! Angle arithmetic, sidereal time, and mount frame conversions.
//!
//! Everything in this crate is a pure function of its inputs: no clocks are
//! read and no state is kept. The motion engines own time and pass the
//! current sidereal time in explicitly.
//!
//! # Modules
//!
//! - [`angle`] -- Range reduction and angular distance helpers
//! - [`sidereal`] -- Julian date and local sidereal time
//! - [`frames`] -- Conversions between mount axes, Alt/Az, and RA/Dec

pub mod angle;
pub mod frames;
pub mod sidereal;

pub use frames::{FrameContext, altaz_to_hadec, hadec_to_altaz};
pub use sidereal::{julian_date, local_sidereal_time};
