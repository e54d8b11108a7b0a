//! The Alpaca error taxonomy.
//!
//! Motion engines return [`AlpacaError`] from their command entry points.
//! The error carries a classification ([`ErrorKind`]) and a human-readable
//! message; the dispatch envelope is the only place that turns it into the
//! wire-level `ErrorNumber` / `ErrorMessage` pair.

/// Convenience alias for results of device operations.
pub type AlpacaResult<T> = Result<T, AlpacaError>;

/// Classification of a failed device operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The operation is unsupported by the current capability configuration.
    NotImplemented,
    /// An argument is outside the accepted domain.
    InvalidValue,
    /// A value was read before it was ever set.
    ValueNotSet,
    /// The operation requires an active connection and none exists.
    NotConnected,
    /// The operation is forbidden while the device is parked.
    Parked,
    /// The request is well-formed but unreachable or contradictory given
    /// the current state.
    InvalidOperation,
    /// The named action is not supported by the device.
    ActionNotImplemented,
    /// Any other internal fault.
    DriverError,
}

impl ErrorKind {
    /// The Alpaca `ErrorNumber` for this classification.
    pub const fn number(self) -> i32 {
        match self {
            Self::NotImplemented => 0x400,
            Self::InvalidValue => 0x401,
            Self::ValueNotSet => 0x402,
            Self::NotConnected => 0x407,
            Self::Parked => 0x408,
            Self::InvalidOperation => 0x40B,
            Self::ActionNotImplemented => 0x40C,
            Self::DriverError => 0x500,
        }
    }
}

/// A classified failure of a device operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AlpacaError {
    /// The member is not implemented by this device configuration.
    #[error("{0} is not implemented")]
    NotImplemented(String),

    /// An argument is outside the accepted domain.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A value was read before being set.
    #[error("{0} has not been set")]
    ValueNotSet(String),

    /// No client is connected to the device.
    #[error("device is not connected")]
    NotConnected,

    /// The operation is not allowed while parked.
    #[error("{0} is not allowed while the device is parked")]
    Parked(String),

    /// The request is contradictory or mechanically unreachable.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// The named action is not supported.
    #[error("action {0} is not implemented")]
    ActionNotImplemented(String),

    /// Unexpected internal fault.
    #[error("driver error: {0}")]
    Driver(String),
}

impl AlpacaError {
    /// The classification of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::InvalidValue(_) => ErrorKind::InvalidValue,
            Self::ValueNotSet(_) => ErrorKind::ValueNotSet,
            Self::NotConnected => ErrorKind::NotConnected,
            Self::Parked(_) => ErrorKind::Parked,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::ActionNotImplemented(_) => ErrorKind::ActionNotImplemented,
            Self::Driver(_) => ErrorKind::DriverError,
        }
    }

    /// The Alpaca `ErrorNumber` for this error.
    pub const fn number(&self) -> i32 {
        self.kind().number()
    }

    /// Shorthand for [`AlpacaError::NotImplemented`].
    pub fn not_implemented(member: impl Into<String>) -> Self {
        Self::NotImplemented(member.into())
    }

    /// Shorthand for [`AlpacaError::InvalidValue`].
    pub fn invalid_value(reason: impl Into<String>) -> Self {
        Self::InvalidValue(reason.into())
    }

    /// Shorthand for [`AlpacaError::InvalidOperation`].
    pub fn invalid_operation(reason: impl Into<String>) -> Self {
        Self::InvalidOperation(reason.into())
    }

    /// Shorthand for [`AlpacaError::Parked`].
    pub fn parked(operation: impl Into<String>) -> Self {
        Self::Parked(operation.into())
    }
}

/// A device configuration failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration: {reason}")]
pub struct InvalidConfig {
    /// Explanation of what is wrong with the configuration.
    pub reason: String,
}

impl InvalidConfig {
    /// Create a validation failure with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_numbers_match_alpaca() {
        assert_eq!(AlpacaError::not_implemented("CanPark").number(), 1024);
        assert_eq!(AlpacaError::invalid_value("x").number(), 1025);
        assert_eq!(AlpacaError::ValueNotSet("TargetRightAscension".into()).number(), 1026);
        assert_eq!(AlpacaError::NotConnected.number(), 1031);
        assert_eq!(AlpacaError::parked("SlewToAltAz").number(), 1032);
        assert_eq!(AlpacaError::invalid_operation("x").number(), 1035);
        assert_eq!(AlpacaError::ActionNotImplemented("x".into()).number(), 1036);
        assert_eq!(AlpacaError::Driver("boom".into()).number(), 1280);
    }

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            AlpacaError::parked("FindHome").to_string(),
            "FindHome is not allowed while the device is parked"
        );
        assert_eq!(AlpacaError::NotConnected.to_string(), "device is not connected");
    }
}
