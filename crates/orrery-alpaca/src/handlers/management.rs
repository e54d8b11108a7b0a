//! The Alpaca management API.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Serialize;

use orrery_core::{Command, DeviceInfo, dispatch};

use super::{Remote, reply};
use crate::error::RequestError;
use crate::params::Params;
use crate::state::AppState;

/// Alpaca API versions served.
const API_VERSIONS: &[u32] = &[1];

/// `GET /management/v1/description` value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServerDescription {
    /// Display name of the server.
    pub server_name: String,
    /// Who made it.
    pub manufacturer: String,
    /// Server version.
    pub manufacturer_version: String,
    /// Where it runs.
    pub location: String,
}

/// One entry of `GET /management/v1/configureddevices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfiguredDevice {
    /// Device display name.
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// Device class, e.g. `Telescope`.
    #[serde(rename = "DeviceType")]
    pub device_type: &'static str,
    /// Device number within its class.
    #[serde(rename = "DeviceNumber")]
    pub device_number: u32,
    /// Stable identifier for this process.
    #[serde(rename = "UniqueID")]
    pub unique_id: String,
}

impl From<DeviceInfo> for ConfiguredDevice {
    fn from(info: DeviceInfo) -> Self {
        Self {
            device_name: info.name,
            device_type: info.key.device_type.display_name(),
            device_number: info.key.number,
            unique_id: info.unique_id.to_string(),
        }
    }
}

/// `GET /management/apiversions`.
pub async fn api_versions(
    State(state): State<Arc<AppState>>,
    remote: Remote,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, RequestError> {
    let ctx = Params::new(pairs).context(remote.map(|r| r.0.0))?;
    let response = dispatch(&state.registry, &ctx, &Command::management("apiversions"), || {
        Ok(API_VERSIONS.to_vec())
    });
    Ok(reply(&response))
}

/// `GET /management/v1/description`.
pub async fn description(
    State(state): State<Arc<AppState>>,
    remote: Remote,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, RequestError> {
    let ctx = Params::new(pairs).context(remote.map(|r| r.0.0))?;
    let response = dispatch(&state.registry, &ctx, &Command::management("description"), || {
        Ok(ServerDescription {
            server_name: state.server.server_name.clone(),
            manufacturer: state.server.manufacturer.clone(),
            manufacturer_version: env!("CARGO_PKG_VERSION").to_owned(),
            location: state.server.location.clone(),
        })
    });
    Ok(reply(&response))
}

/// `GET /management/v1/configureddevices`.
pub async fn configured_devices(
    State(state): State<Arc<AppState>>,
    remote: Remote,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Response, RequestError> {
    let ctx = Params::new(pairs).context(remote.map(|r| r.0.0))?;
    let response = dispatch(
        &state.registry,
        &ctx,
        &Command::management("configureddevices"),
        || {
            let telescopes = state.telescopes().map(|device| device.info());
            let domes = state.domes().map(|device| device.info());
            Ok(telescopes
                .chain(domes)
                .map(ConfiguredDevice::from)
                .collect::<Vec<_>>())
        },
    );
    Ok(reply(&response))
}
