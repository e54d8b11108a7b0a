//! Alpaca endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/v1/{type}/{number}/{member}` | Read a property |
//! | `PUT` | `/api/v1/{type}/{number}/{member}` | Write a property or call a method |
//! | `GET` | `/management/apiversions` | Supported API versions |
//! | `GET` | `/management/v1/description` | Server description |
//! | `GET` | `/management/v1/configureddevices` | Hosted devices |
//!
//! Device handlers resolve the device, parse the member's parameters, and
//! run the member through [`orrery_core::dispatch`]. Parameter problems are
//! HTTP 400; everything the device itself rejects is an envelope error.

pub mod common;
pub mod dome;
pub mod management;
pub mod telescope;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Form, Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::Serialize;

use orrery_core::{AlpacaResponse, Command, Device, RequestContext, Simulated, dispatch};
use orrery_types::{AlpacaEnum, AlpacaError, AlpacaResult, DeviceKey, DeviceType};

use crate::error::RequestError;
use crate::params::Params;
use crate::state::AppState;

/// Path segments of a device request: type, number, member.
type DevicePath = Path<(String, String, String)>;

/// The caller's address, present when served with connect info.
type Remote = Option<Extension<ConnectInfo<SocketAddr>>>;

/// HTTP verb of a device request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Property read.
    Get,
    /// Property write or method call.
    Put,
}

impl Verb {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
        }
    }
}

/// One parsed device request.
#[derive(Debug)]
pub struct Invocation<'a> {
    /// Shared server state.
    pub state: &'a AppState,
    /// Caller identity.
    pub ctx: RequestContext,
    /// Addressed device.
    pub key: DeviceKey,
    /// Lowercase member name.
    pub method: &'a str,
    /// Request parameters.
    pub params: &'a Params,
    /// GET or PUT.
    pub verb: Verb,
}

impl Invocation<'_> {
    fn command(&self, requires_connection: bool) -> Command<'_> {
        let command = if requires_connection {
            Command::device(self.key, self.method)
        } else {
            Command::unconnected(self.key, self.method)
        };
        match self.params.summary() {
            Some(payload) => command.with_payload(payload),
            None => command,
        }
    }

    /// Dispatch a member that returns a value and requires a connection.
    pub fn value<T: Serialize>(&self, operation: impl FnOnce() -> AlpacaResult<T>) -> Response {
        self.respond(true, operation)
    }

    /// Dispatch a member that returns a value and works unconnected.
    pub fn unconnected<T: Serialize>(&self, operation: impl FnOnce() -> AlpacaResult<T>) -> Response {
        self.respond(false, operation)
    }

    /// Dispatch a member whose envelope carries no `Value`.
    pub fn method(&self, operation: impl FnOnce() -> AlpacaResult<()>) -> Response {
        reply(&self.run(true, operation).discard_value())
    }

    /// Dispatch a value-less member that works unconnected.
    pub fn unconnected_method(&self, operation: impl FnOnce() -> AlpacaResult<()>) -> Response {
        reply(&self.run(false, operation).discard_value())
    }

    /// Read an infallible property from the engine.
    pub fn read<E: Simulated, T: Serialize>(&self, device: &Device<E>, f: impl FnOnce(&E) -> T) -> Response {
        self.value(|| Ok(device.with(|engine| f(engine))))
    }

    /// Read a property that can fail, such as an unset target.
    pub fn try_read<E: Simulated, T: Serialize>(
        &self,
        device: &Device<E>,
        f: impl FnOnce(&E) -> AlpacaResult<T>,
    ) -> Response {
        self.value(|| device.with(|engine| f(engine)))
    }

    /// Write a property or run a method against the engine.
    pub fn write<E: Simulated>(&self, device: &Device<E>, f: impl FnOnce(&mut E) -> AlpacaResult<()>) -> Response {
        self.method(|| device.with(f))
    }

    /// Run the envelope and hand back the response for further work.
    pub fn run<T>(&self, requires_connection: bool, operation: impl FnOnce() -> AlpacaResult<T>) -> AlpacaResponse<T> {
        dispatch(&self.state.registry, &self.ctx, &self.command(requires_connection), operation)
    }

    fn respond<T: Serialize>(&self, requires_connection: bool, operation: impl FnOnce() -> AlpacaResult<T>) -> Response {
        reply(&self.run(requires_connection, operation))
    }

    /// The rejection for a member this device type does not have.
    pub fn unknown(&self) -> RequestError {
        RequestError::UnknownMethod {
            device_type: self.key.device_type.path_segment().to_owned(),
            verb: self.verb.as_str(),
            method: self.method.to_owned(),
        }
    }
}

/// Serialize an envelope as the HTTP 200 body.
pub fn reply<T: Serialize>(response: &AlpacaResponse<T>) -> Response {
    Json(response).into_response()
}

/// Decode an Alpaca enum value received as a parameter.
pub fn decode<E: AlpacaEnum>(value: i32, what: &str) -> AlpacaResult<E> {
    E::from_alpaca(value).ok_or_else(|| AlpacaError::invalid_value(format!("{value} is not a valid {what}")))
}

// ---------------------------------------------------------------------------
// Device routes
// ---------------------------------------------------------------------------

/// `GET /api/v1/{type}/{number}/{member}`.
pub async fn device_get(
    State(state): State<Arc<AppState>>,
    Path((device_type, number, method)): DevicePath,
    remote: Remote,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, RequestError> {
    let params = Params::new(pairs);
    route(&state, Verb::Get, &device_type, &number, &method, &params, remote).await
}

/// `PUT /api/v1/{type}/{number}/{member}`.
pub async fn device_put(
    State(state): State<Arc<AppState>>,
    Path((device_type, number, method)): DevicePath,
    remote: Remote,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Response, RequestError> {
    let params = Params::new(pairs);
    route(&state, Verb::Put, &device_type, &number, &method, &params, remote).await
}

async fn route(
    state: &AppState,
    verb: Verb,
    device_type: &str,
    number: &str,
    method: &str,
    params: &Params,
    remote: Remote,
) -> Result<Response, RequestError> {
    let ctx = params.context(remote.map(|Extension(ConnectInfo(addr))| addr))?;
    let method = method.to_ascii_lowercase();
    let method = method.as_str();
    let unknown_device = || RequestError::UnknownDevice {
        device_type: device_type.to_owned(),
        number: number.to_owned(),
    };

    match DeviceType::from_path_segment(device_type).ok_or_else(unknown_device)? {
        DeviceType::Telescope => {
            let device = state.telescope(number)?;
            let call = Invocation {
                state,
                ctx,
                key: device.key(),
                method,
                params,
                verb,
            };
            match verb {
                Verb::Get => telescope::get(&call, device),
                Verb::Put => telescope::put(&call, device).await,
            }
        }
        DeviceType::Dome => {
            let device = state.dome(number)?;
            let call = Invocation {
                state,
                ctx,
                key: device.key(),
                method,
                params,
                verb,
            };
            match verb {
                Verb::Get => dome::get(&call, device),
                Verb::Put => dome::put(&call, device),
            }
        }
    }
}
