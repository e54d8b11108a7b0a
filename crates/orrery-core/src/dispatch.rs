//! The command dispatch envelope.
//!
//! Every device operation, successful or not, goes through [`dispatch`]:
//!
//! 1. allocate a server transaction number,
//! 2. log the call,
//! 3. refuse with `NotConnected` if the operation needs a connection and
//!    the device has none,
//! 4. run the operation, catching panics,
//! 5. wrap the outcome in an [`AlpacaResponse`].
//!
//! This is the only place an [`AlpacaError`] becomes a wire error number.

use std::net::SocketAddr;
use std::panic::{AssertUnwindSafe, catch_unwind};

use serde::Serialize;
use tracing::{info, warn};

use orrery_types::{AlpacaError, AlpacaResult, ClientId, DeviceKey};

use crate::registry::Registry;

/// Who is calling, as supplied by the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestContext {
    /// The caller's `ClientID` (0 when absent).
    pub client_id: ClientId,
    /// The caller's `ClientTransactionID` (0 when absent).
    pub client_transaction_id: u32,
    /// The caller's socket address, when known.
    pub remote: Option<SocketAddr>,
}

/// What is being invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command<'a> {
    /// The addressed device, or `None` for management requests.
    pub device: Option<DeviceKey>,
    /// Alpaca member name, e.g. `slewtocoordinatesasync`.
    pub operation: &'a str,
    /// Whether the device must have at least one connected client.
    pub requires_connection: bool,
    /// Request parameters worth logging.
    pub payload: Option<String>,
}

impl<'a> Command<'a> {
    /// A device member that requires a connection.
    pub const fn device(device: DeviceKey, operation: &'a str) -> Self {
        Self {
            device: Some(device),
            operation,
            requires_connection: true,
            payload: None,
        }
    }

    /// A device member that works without a connection.
    pub const fn unconnected(device: DeviceKey, operation: &'a str) -> Self {
        Self {
            device: Some(device),
            operation,
            requires_connection: false,
            payload: None,
        }
    }

    /// A management API request.
    pub const fn management(operation: &'a str) -> Self {
        Self {
            device: None,
            operation,
            requires_connection: false,
            payload: None,
        }
    }

    /// Attach a payload for the call log.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }
}

/// The Alpaca JSON response envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlpacaResponse<T> {
    /// Echo of the caller's transaction id.
    #[serde(rename = "ClientTransactionID")]
    pub client_transaction_id: u32,
    /// Number allocated by this server.
    #[serde(rename = "ServerTransactionID")]
    pub server_transaction_id: u32,
    /// Zero on success, otherwise an Alpaca error number.
    #[serde(rename = "ErrorNumber")]
    pub error_number: i32,
    /// Empty on success.
    #[serde(rename = "ErrorMessage")]
    pub error_message: String,
    /// Returned value; omitted for methods and property writes.
    #[serde(rename = "Value", skip_serializing_if = "Option::is_none")]
    pub value: Option<T>,
}

impl<T> AlpacaResponse<T> {
    /// Whether the envelope carries an error.
    pub const fn is_error(&self) -> bool {
        self.error_number != 0
    }

    /// Replace the value, keeping the transaction ids and error fields.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AlpacaResponse<U> {
        AlpacaResponse {
            client_transaction_id: self.client_transaction_id,
            server_transaction_id: self.server_transaction_id,
            error_number: self.error_number,
            error_message: self.error_message,
            value: self.value.map(f),
        }
    }

    /// Drop the value so that `Value` is omitted from the JSON.
    pub fn discard_value(self) -> AlpacaResponse<()> {
        AlpacaResponse {
            client_transaction_id: self.client_transaction_id,
            server_transaction_id: self.server_transaction_id,
            error_number: self.error_number,
            error_message: self.error_message,
            value: None,
        }
    }
}

/// Run one operation inside the envelope.
///
/// Never fails: every outcome, including a panic inside `operation`, is
/// returned as a well-formed response.
pub fn dispatch<T>(
    registry: &Registry,
    ctx: &RequestContext,
    command: &Command<'_>,
    operation: impl FnOnce() -> AlpacaResult<T>,
) -> AlpacaResponse<T> {
    let server_transaction_id = registry.next_transaction();
    let device = command
        .device
        .map_or_else(|| "management".to_owned(), |key| key.to_string());
    let remote = ctx
        .remote
        .map_or_else(|| "-".to_owned(), |addr| addr.to_string());

    info!(
        device = %device,
        operation = command.operation,
        remote = %remote,
        client_id = ctx.client_id.into_inner(),
        client_transaction_id = ctx.client_transaction_id,
        server_transaction_id,
        payload = command.payload.as_deref().unwrap_or(""),
        "alpaca request"
    );

    let connected = match command.device {
        Some(key) if command.requires_connection => registry.is_connected(key),
        _ => true,
    };

    let outcome = if connected {
        catch_unwind(AssertUnwindSafe(operation)).unwrap_or_else(|panic| {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "operation panicked".to_owned());
            Err(AlpacaError::Driver(reason))
        })
    } else {
        Err(AlpacaError::NotConnected)
    };

    match outcome {
        Ok(value) => AlpacaResponse {
            client_transaction_id: ctx.client_transaction_id,
            server_transaction_id,
            error_number: 0,
            error_message: String::new(),
            value: Some(value),
        },
        Err(error) => {
            warn!(
                device = %device,
                operation = command.operation,
                server_transaction_id,
                error_number = error.number(),
                error = %error,
                "alpaca request failed"
            );
            AlpacaResponse {
                client_transaction_id: ctx.client_transaction_id,
                server_transaction_id,
                error_number: error.number(),
                error_message: error.to_string(),
                value: None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use orrery_types::DeviceType;

    use super::*;

    const TELESCOPE: DeviceKey = DeviceKey::new(DeviceType::Telescope, 0);

    fn ctx() -> RequestContext {
        RequestContext {
            client_id: ClientId(42),
            client_transaction_id: 7,
            remote: None,
        }
    }

    #[test]
    fn success_echoes_ids() {
        let registry = Registry::new();
        registry.connections(TELESCOPE).add(ClientId(42));
        let response = dispatch(&registry, &ctx(), &Command::device(TELESCOPE, "altitude"), || Ok(45.0));
        assert_eq!(response.client_transaction_id, 7);
        assert_eq!(response.server_transaction_id, 1);
        assert_eq!(response.error_number, 0);
        assert!(response.error_message.is_empty());
        assert_eq!(response.value, Some(45.0));
    }

    #[test]
    fn not_connected_short_circuits() {
        let registry = Registry::new();
        let mut invoked = false;
        let response: AlpacaResponse<()> =
            dispatch(&registry, &ctx(), &Command::device(TELESCOPE, "park"), || {
                invoked = true;
                Ok(())
            });
        assert!(!invoked);
        assert_eq!(response.error_number, 0x407);
        assert!(response.value.is_none());
    }

    #[test]
    fn unconnected_members_skip_the_check() {
        let registry = Registry::new();
        let response = dispatch(&registry, &ctx(), &Command::unconnected(TELESCOPE, "name"), || {
            Ok("scope".to_owned())
        });
        assert!(!response.is_error());
    }

    #[test]
    fn classified_errors_map_to_numbers() {
        let registry = Registry::new();
        registry.connections(TELESCOPE).add(ClientId(1));
        let response: AlpacaResponse<()> =
            dispatch(&registry, &ctx(), &Command::device(TELESCOPE, "findhome"), || {
                Err(AlpacaError::parked("FindHome"))
            });
        assert_eq!(response.error_number, 0x408);
        assert!(response.error_message.contains("FindHome"));
    }

    #[test]
    fn panics_become_driver_errors() {
        let registry = Registry::new();
        let response: AlpacaResponse<()> =
            dispatch(&registry, &ctx(), &Command::management("description"), || {
                panic!("gearbox exploded")
            });
        assert_eq!(response.error_number, 0x500);
        assert!(response.error_message.contains("gearbox exploded"));
    }

    #[test]
    fn every_call_consumes_a_transaction() {
        let registry = Registry::new();
        let first: AlpacaResponse<()> =
            dispatch(&registry, &ctx(), &Command::device(TELESCOPE, "park"), || Ok(()));
        let second = dispatch(&registry, &ctx(), &Command::management("apiversions"), || Ok(vec![1]));
        assert_eq!(first.server_transaction_id, 1);
        assert_eq!(second.server_transaction_id, 2);
    }

    #[test]
    fn envelope_serializes_with_alpaca_names() {
        let response = AlpacaResponse {
            client_transaction_id: 3,
            server_transaction_id: 9,
            error_number: 0,
            error_message: String::new(),
            value: Some(true),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ClientTransactionID"], 3);
        assert_eq!(json["ServerTransactionID"], 9);
        assert_eq!(json["Value"], true);

        let json = serde_json::to_value(response.discard_value()).unwrap();
        assert!(json.get("Value").is_none());
        assert_eq!(json["ErrorMessage"], "");
    }
}
