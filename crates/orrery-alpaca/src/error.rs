//! HTTP-level request failures.
//!
//! Alpaca distinguishes two kinds of failure. A device that rejects an
//! operation answers HTTP 200 with a nonzero `ErrorNumber` in the envelope;
//! that path never touches this module. A request the server cannot even
//! route or parse (unknown device, unknown member, missing or malformed
//! parameter) answers HTTP 400 with a plain-text body, which is what
//! [`RequestError`] produces.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// A request rejected before it reached a device.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// No device is configured at this type and number.
    #[error("no {device_type} device with number {number}")]
    UnknownDevice {
        /// The device type path segment as requested.
        device_type: String,
        /// The requested device number.
        number: String,
    },

    /// The device type has no such member for this HTTP verb.
    #[error("{device_type} has no {verb} member named {method}")]
    UnknownMethod {
        /// The device type path segment.
        device_type: String,
        /// `GET` or `PUT`.
        verb: &'static str,
        /// The requested member.
        method: String,
    },

    /// A required parameter was not supplied.
    #[error("missing parameter {0}")]
    MissingParameter(&'static str),

    /// A parameter could not be parsed.
    #[error("parameter {name} has invalid value {value:?}")]
    InvalidParameter {
        /// The parameter name.
        name: &'static str,
        /// The raw value.
        value: String,
    },
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "rejected alpaca request");
        (StatusCode::BAD_REQUEST, self.to_string()).into_response()
    }
}
