//! IDome members.

use axum::response::Response;

use orrery_core::Device;
use orrery_dome::Dome;
use orrery_types::{AlpacaEnum, AlpacaResult};

use super::Invocation;
use super::common::{self, is_action, unknown_action};
use crate::error::RequestError;

/// Clear a jammed shutter back to closed.
pub const RESET_SHUTTER: &str = "Dome:ResetShutter";

/// Rotate clockwise until halted.
pub const ROTATE_CLOCKWISE: &str = "Dome:RotateClockwise";

/// Rotate counter-clockwise until halted.
pub const ROTATE_COUNTER_CLOCKWISE: &str = "Dome:RotateCounterClockwise";

const ACTIONS: &[&str] = &[RESET_SHUTTER, ROTATE_CLOCKWISE, ROTATE_COUNTER_CLOCKWISE];

/// Handle a dome GET member.
pub fn get(call: &Invocation<'_>, device: &Device<Dome>) -> Result<Response, RequestError> {
    if let Some(response) = common::get(call, device, ACTIONS) {
        return Ok(response);
    }

    let response = match call.method {
        "altitude" => call.read(device, Dome::altitude),
        "athome" => call.read(device, Dome::at_home),
        "atpark" => call.read(device, Dome::at_park),
        "azimuth" => call.read(device, Dome::azimuth),
        "canfindhome" => call.read(device, |d| d.capabilities().can_find_home),
        "canpark" => call.read(device, |d| d.capabilities().can_park),
        "cansetaltitude" => call.read(device, |d| d.capabilities().can_set_altitude),
        "cansetazimuth" => call.read(device, |d| d.capabilities().can_set_azimuth),
        "cansetpark" => call.read(device, |d| d.capabilities().can_set_park),
        "cansetshutter" => call.read(device, |d| d.capabilities().can_set_shutter),
        "canslave" => call.read(device, |d| d.capabilities().can_slave),
        "cansyncazimuth" => call.read(device, |d| d.capabilities().can_sync_azimuth),
        "shutterstatus" => call.read(device, |d| d.shutter_status().to_alpaca()),
        "slaved" => call.read(device, Dome::slaved),
        "slewing" => call.read(device, Dome::slewing),
        _ => return Err(call.unknown()),
    };
    Ok(response)
}

/// Handle a dome PUT member.
pub fn put(call: &Invocation<'_>, device: &Device<Dome>) -> Result<Response, RequestError> {
    if let Some(response) = common::put(call, device)? {
        return Ok(response);
    }

    let params = call.params;
    let response = match call.method {
        "action" => {
            let action = params.require("Action")?;
            call.value(|| run_action(call, device, action))
        }
        "abortslew" => call.write(device, |d| {
            d.halt();
            Ok(())
        }),
        "closeshutter" => call.write(device, Dome::close_shutter),
        "findhome" => call.write(device, Dome::find_home),
        "openshutter" => call.write(device, Dome::open_shutter),
        "park" => call.write(device, Dome::park),
        "setpark" => call.write(device, Dome::set_park),
        "slaved" => {
            let slaved = params.bool("Slaved")?;
            call.write(device, |d| d.set_slaved(slaved))
        }
        "slewtoaltitude" => {
            let altitude = params.f64("Altitude")?;
            call.write(device, |d| d.move_shutter(altitude))
        }
        "slewtoazimuth" => {
            let azimuth = params.f64("Azimuth")?;
            call.write(device, |d| d.slew_to_azimuth(azimuth))
        }
        "synctoazimuth" => {
            let azimuth = params.f64("Azimuth")?;
            call.write(device, |d| d.sync_to_azimuth(azimuth))
        }
        _ => return Err(call.unknown()),
    };
    Ok(response)
}

fn run_action(call: &Invocation<'_>, device: &Device<Dome>, action: &str) -> AlpacaResult<String> {
    if let Some(result) = common::settings_action(call, device, action) {
        return result;
    }
    if is_action(action, RESET_SHUTTER) {
        device.with(Dome::reset_shutter);
    } else if is_action(action, ROTATE_CLOCKWISE) {
        device.with(|d| d.rotate(true))?;
    } else if is_action(action, ROTATE_COUNTER_CLOCKWISE) {
        device.with(|d| d.rotate(false))?;
    } else {
        return Err(unknown_action(action));
    }
    Ok(String::new())
}
