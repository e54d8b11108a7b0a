//! Members shared by every device type.
//!
//! Common members answer without a connection, so a client can inspect
//! a device before connecting to it. `Action` is the exception: actions
//! drive the device and need a connected client.

use axum::response::Response;

use orrery_core::{Device, Simulated, to_settings};
use orrery_types::{AlpacaError, AlpacaResult};

use super::Invocation;
use crate::error::RequestError;

/// Persist the device's current configuration.
pub const SAVE_CONFIG: &str = "SaveConfig";

/// Remove the device's persisted configuration.
pub const RESET_SETTINGS: &str = "ResetSettings";

/// Handle a common GET member, or `None` if `call.method` is not one.
pub fn get<E: Simulated>(call: &Invocation<'_>, device: &Device<E>, actions: &[&str]) -> Option<Response> {
    let response = match call.method {
        "connected" => call.unconnected(|| Ok(device.connected())),
        "connecting" => call.unconnected(|| Ok(false)),
        "description" => call.unconnected(|| Ok(device.info().description)),
        "driverinfo" => call.unconnected(|| Ok(device.info().driver_info)),
        "driverversion" => call.unconnected(|| Ok(device.info().driver_version)),
        "interfaceversion" => call.unconnected(|| Ok(E::INTERFACE_VERSION)),
        "name" => call.unconnected(|| Ok(device.info().name)),
        "supportedactions" => call.unconnected(|| Ok(supported_actions(actions))),
        _ => return None,
    };
    Some(response)
}

/// Handle a common PUT member other than `Action`, or `None` if
/// `call.method` is not one.
pub fn put<E: Simulated>(call: &Invocation<'_>, device: &Device<E>) -> Result<Option<Response>, RequestError> {
    let client = call.ctx.client_id;
    let response = match call.method {
        "connected" => {
            let connected = call.params.bool("Connected")?;
            call.unconnected_method(|| {
                if connected {
                    device.connect(client);
                } else {
                    device.disconnect(client);
                }
                Ok(())
            })
        }
        "connect" => call.unconnected_method(|| {
            device.connect(client);
            Ok(())
        }),
        "disconnect" => call.unconnected_method(|| {
            device.disconnect(client);
            Ok(())
        }),
        "commandblind" | "commandbool" | "commandstring" => {
            let member = call.method;
            call.unconnected_method(|| Err(AlpacaError::not_implemented(member)))
        }
        _ => return Ok(None),
    };
    Ok(Some(response))
}

/// Every action name a device answers, common ones first.
pub fn supported_actions(device_actions: &[&str]) -> Vec<String> {
    [SAVE_CONFIG, RESET_SETTINGS]
        .iter()
        .chain(device_actions)
        .map(|name| (*name).to_owned())
        .collect()
}

/// Run `SaveConfig` or `ResetSettings`, or `None` for any other action.
pub fn settings_action<E: Simulated>(
    call: &Invocation<'_>,
    device: &Device<E>,
    action: &str,
) -> Option<AlpacaResult<String>> {
    let key = device.key();
    if action.eq_ignore_ascii_case(SAVE_CONFIG) {
        let saved = to_settings(key, &device.current_config())
            .and_then(|settings| call.state.settings.save(key, &settings));
        return Some(saved.map(|()| String::new()).map_err(driver_error));
    }
    if action.eq_ignore_ascii_case(RESET_SETTINGS) {
        let reset = call.state.settings.reset(key);
        return Some(reset.map(|()| String::new()).map_err(driver_error));
    }
    None
}

fn driver_error(error: orrery_core::SettingsError) -> AlpacaError {
    AlpacaError::Driver(error.to_string())
}

/// Match `action` against a device's action list, ignoring case.
pub fn is_action(action: &str, name: &str) -> bool {
    action.eq_ignore_ascii_case(name)
}

/// The rejection for an unrecognized action name.
pub fn unknown_action(action: &str) -> AlpacaError {
    AlpacaError::ActionNotImplemented(action.to_owned())
}
