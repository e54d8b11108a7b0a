//! Client and device identifiers.
//!
//! Alpaca clients identify themselves with an unsigned 32-bit `ClientID`
//! that they choose themselves. The simulator treats it as an opaque
//! connection token: one physical simulated device may be shared by many
//! client ids at once.

use serde::{Deserialize, Serialize};

use crate::enums::DeviceType;

/// Opaque identifier of a client session, as supplied in `ClientID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ClientId(pub u32);

impl ClientId {
    /// Return the inner value.
    pub const fn into_inner(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ClientId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Addresses one configured device: its class and its device number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DeviceKey {
    /// The device class.
    pub device_type: DeviceType,
    /// Zero-based device number within the class.
    pub number: u32,
}

impl DeviceKey {
    /// Create a key for the given class and number.
    pub const fn new(device_type: DeviceType, number: u32) -> Self {
        Self {
            device_type,
            number,
        }
    }
}

impl core::fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.device_type, self.number)
    }
}
