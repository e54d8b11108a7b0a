//! ITelescope members.

use axum::response::Response;
use chrono::{DateTime, SecondsFormat, Utc};

use orrery_core::Device;
use orrery_telescope::{HandSpeed, SlewMode, Telescope};
use orrery_types::{AlpacaEnum, AlpacaError, AlpacaResult, DriveRate, GuideDirection, PierSide, TelescopeAxis};

use super::common::{self, is_action, unknown_action};
use super::{Invocation, decode, reply};
use crate::error::RequestError;

/// Start hand control. Parameters: `primary,secondary,speed`.
pub const HAND_CONTROL: &str = "Telescope:HandControl";

/// Stop hand control.
pub const STOP_HAND_CONTROL: &str = "Telescope:StopHandControl";

const ACTIONS: &[&str] = &[HAND_CONTROL, STOP_HAND_CONTROL];

/// Handle a telescope GET member.
pub fn get(call: &Invocation<'_>, device: &Device<Telescope>) -> Result<Response, RequestError> {
    if let Some(response) = common::get(call, device, ACTIONS) {
        return Ok(response);
    }

    let response = match call.method {
        "alignmentmode" => call.read(device, |t| t.alignment_mode().to_alpaca()),
        "altitude" => call.read(device, Telescope::altitude),
        "aperturearea" => call.read(device, Telescope::aperture_area),
        "aperturediameter" => call.read(device, Telescope::aperture_diameter),
        "athome" => call.read(device, Telescope::at_home),
        "atpark" => call.read(device, Telescope::at_park),
        "azimuth" => call.read(device, Telescope::azimuth),
        "canfindhome" => call.read(device, |t| t.capabilities().can_find_home),
        "canpark" => call.read(device, |t| t.capabilities().can_park),
        "canpulseguide" => call.read(device, |t| t.capabilities().can_pulse_guide),
        "cansetdeclinationrate" => call.read(device, |t| t.capabilities().can_set_declination_rate),
        "cansetguiderates" => call.read(device, |t| t.capabilities().can_set_guide_rates),
        "cansetpark" => call.read(device, |t| t.capabilities().can_set_park),
        "cansetpierside" => call.read(device, |t| t.capabilities().can_set_pier_side),
        "cansetrightascensionrate" => call.read(device, |t| t.capabilities().can_set_right_ascension_rate),
        "cansettracking" => call.read(device, |t| t.capabilities().can_set_tracking),
        "canslew" => call.read(device, |t| t.capabilities().can_slew),
        "canslewaltaz" => call.read(device, |t| t.capabilities().can_slew_alt_az),
        "canslewaltazasync" => call.read(device, |t| t.capabilities().can_slew_alt_az_async),
        "canslewasync" => call.read(device, |t| t.capabilities().can_slew_async),
        "cansync" => call.read(device, |t| t.capabilities().can_sync),
        "cansyncaltaz" => call.read(device, |t| t.capabilities().can_sync_alt_az),
        "canunpark" => call.read(device, |t| t.capabilities().can_unpark),
        "canmoveaxis" => {
            let axis = call.params.i32("Axis")?;
            call.try_read(device, |t| Ok(t.can_move_axis(decode(axis, "axis")?)))
        }
        "axisrates" => {
            let axis = call.params.i32("Axis")?;
            call.try_read(device, |t| Ok(t.axis_rates(decode(axis, "axis")?)))
        }
        "declination" => call.read(device, Telescope::declination),
        "declinationrate" => call.read(device, Telescope::declination_rate),
        "destinationsideofpier" => {
            let ra = call.params.f64("RightAscension")?;
            let dec = call.params.f64("Declination")?;
            call.try_read(device, |t| Ok(t.destination_side_of_pier(ra, dec)?.to_alpaca()))
        }
        "doesrefraction" => call.read(device, Telescope::does_refraction),
        "equatorialsystem" => call.read(device, |t| t.equatorial_system().to_alpaca()),
        "focallength" => call.read(device, Telescope::focal_length),
        "guideratedeclination" => call.read(device, Telescope::guide_rate_declination),
        "guideraterightascension" => call.read(device, Telescope::guide_rate_right_ascension),
        "ispulseguiding" => call.read(device, Telescope::is_pulse_guiding),
        "rightascension" => call.read(device, Telescope::right_ascension),
        "rightascensionrate" => call.read(device, Telescope::right_ascension_rate),
        "sideofpier" => call.read(device, |t| t.side_of_pier().to_alpaca()),
        "siderealtime" => call.read(device, Telescope::sidereal_time),
        "siteelevation" => call.read(device, Telescope::site_elevation),
        "sitelatitude" => call.read(device, Telescope::site_latitude),
        "sitelongitude" => call.read(device, Telescope::site_longitude),
        "slewing" => call.read(device, Telescope::slewing),
        "slewsettletime" => call.read(device, Telescope::slew_settle_time),
        "targetdeclination" => call.try_read(device, Telescope::target_declination),
        "targetrightascension" => call.try_read(device, Telescope::target_right_ascension),
        "tracking" => call.read(device, Telescope::tracking),
        "trackingrate" => call.read(device, |t| t.tracking_rate().to_alpaca()),
        "trackingrates" => call.read(device, |t| {
            t.tracking_rates()
                .iter()
                .map(|rate| rate.to_alpaca())
                .collect::<Vec<_>>()
        }),
        "utcdate" => call.read(device, |t| format_utc(t.utc_date())),
        _ => return Err(call.unknown()),
    };
    Ok(response)
}

/// Handle a telescope PUT member.
///
/// Synchronous slews return only once the mount has stopped moving.
pub async fn put(call: &Invocation<'_>, device: &Device<Telescope>) -> Result<Response, RequestError> {
    if let Some(response) = common::put(call, device)? {
        return Ok(response);
    }

    let params = call.params;
    let response = match call.method {
        "action" => {
            let action = params.require("Action")?;
            let parameters = params.get("Parameters").unwrap_or_default();
            call.value(|| run_action(call, device, action, parameters))
        }
        "abortslew" => call.write(device, Telescope::abort_slew),
        "declinationrate" => {
            let rate = params.f64("DeclinationRate")?;
            call.write(device, |t| t.set_declination_rate(rate))
        }
        "doesrefraction" => {
            let on = params.bool("DoesRefraction")?;
            call.write(device, |t| {
                t.set_does_refraction(on);
                Ok(())
            })
        }
        "findhome" => call.write(device, Telescope::find_home),
        "guideratedeclination" => {
            let rate = params.f64("GuideRateDeclination")?;
            call.write(device, |t| t.set_guide_rate_declination(rate))
        }
        "guideraterightascension" => {
            let rate = params.f64("GuideRateRightAscension")?;
            call.write(device, |t| t.set_guide_rate_right_ascension(rate))
        }
        "moveaxis" => {
            let axis = params.i32("Axis")?;
            let rate = params.f64("Rate")?;
            call.write(device, |t| t.move_axis(decode::<TelescopeAxis>(axis, "axis")?, rate))
        }
        "park" => call.write(device, Telescope::park),
        "pulseguide" => {
            let direction = params.i32("Direction")?;
            let duration = params.i32("Duration")?;
            call.write(device, |t| {
                t.pulse_guide(decode::<GuideDirection>(direction, "guide direction")?, duration)
            })
        }
        "rightascensionrate" => {
            let rate = params.f64("RightAscensionRate")?;
            call.write(device, |t| t.set_right_ascension_rate(rate))
        }
        "setpark" => call.write(device, Telescope::set_park),
        "sideofpier" => {
            let side = params.i32("SideOfPier")?;
            call.write(device, |t| t.set_side_of_pier(decode::<PierSide>(side, "pier side")?))
        }
        "siteelevation" => {
            let metres = params.f64("SiteElevation")?;
            call.write(device, |t| t.set_site_elevation(metres))
        }
        "sitelatitude" => {
            let degrees = params.f64("SiteLatitude")?;
            call.write(device, |t| t.set_site_latitude(degrees))
        }
        "sitelongitude" => {
            let degrees = params.f64("SiteLongitude")?;
            call.write(device, |t| t.set_site_longitude(degrees))
        }
        "slewsettletime" => {
            let seconds = params.i32("SlewSettleTime")?;
            call.write(device, |t| t.set_slew_settle_time(seconds))
        }
        "slewtoaltaz" | "slewtoaltazasync" => {
            let azimuth = params.f64("Azimuth")?;
            let altitude = params.f64("Altitude")?;
            let mode = slew_mode(call.method);
            return Ok(slew(call, device, mode, |t| t.start_slew_altaz(azimuth, altitude, mode)).await);
        }
        "slewtocoordinates" | "slewtocoordinatesasync" => {
            let ra = params.f64("RightAscension")?;
            let dec = params.f64("Declination")?;
            let mode = slew_mode(call.method);
            return Ok(slew(call, device, mode, |t| t.start_slew_radec(ra, dec, mode)).await);
        }
        "slewtotarget" | "slewtotargetasync" => {
            let mode = slew_mode(call.method);
            return Ok(slew(call, device, mode, |t| t.slew_to_target(mode)).await);
        }
        "synctoaltaz" => {
            let azimuth = params.f64("Azimuth")?;
            let altitude = params.f64("Altitude")?;
            call.write(device, |t| t.sync_to_altaz(azimuth, altitude))
        }
        "synctocoordinates" => {
            let ra = params.f64("RightAscension")?;
            let dec = params.f64("Declination")?;
            call.write(device, |t| t.sync_to_coordinates(ra, dec))
        }
        "synctotarget" => call.write(device, Telescope::sync_to_target),
        "targetdeclination" => {
            let degrees = params.f64("TargetDeclination")?;
            call.write(device, |t| t.set_target_declination(degrees))
        }
        "targetrightascension" => {
            let hours = params.f64("TargetRightAscension")?;
            call.write(device, |t| t.set_target_right_ascension(hours))
        }
        "tracking" => {
            let on = params.bool("Tracking")?;
            call.write(device, |t| t.set_tracking(on))
        }
        "trackingrate" => {
            let rate = params.i32("TrackingRate")?;
            call.write(device, |t| {
                t.set_tracking_rate(decode::<DriveRate>(rate, "tracking rate")?);
                Ok(())
            })
        }
        "unpark" => call.write(device, Telescope::unpark),
        "utcdate" => {
            let utc: DateTime<Utc> = params.parse("UTCDate")?;
            call.write(device, |t| {
                t.set_utc_date(utc);
                Ok(())
            })
        }
        _ => return Err(call.unknown()),
    };
    Ok(response)
}

fn slew_mode(method: &str) -> SlewMode {
    if method.ends_with("async") {
        SlewMode::Asynchronous
    } else {
        SlewMode::Synchronous
    }
}

/// Start a slew and, for the synchronous members, wait for it to finish.
///
/// The engine lock is released between polls so the tick task can run.
async fn slew(
    call: &Invocation<'_>,
    device: &Device<Telescope>,
    mode: SlewMode,
    start: impl FnOnce(&mut Telescope) -> AlpacaResult<()>,
) -> Response {
    let response = call.run(true, || device.with(start)).discard_value();
    if mode == SlewMode::Synchronous && !response.is_error() {
        let poll = device.with(|t| t.tick_interval());
        while device.with(|t| t.slewing()) {
            tokio::time::sleep(poll).await;
        }
    }
    reply(&response)
}

fn run_action(
    call: &Invocation<'_>,
    device: &Device<Telescope>,
    action: &str,
    parameters: &str,
) -> AlpacaResult<String> {
    if let Some(result) = common::settings_action(call, device, action) {
        return result;
    }
    if is_action(action, HAND_CONTROL) {
        let (primary, secondary, speed) = parse_hand_control(parameters)?;
        device.with(|t| t.set_hand_control(primary, secondary, speed))?;
        return Ok(String::new());
    }
    if is_action(action, STOP_HAND_CONTROL) {
        device.with(Telescope::stop_hand_control);
        return Ok(String::new());
    }
    Err(unknown_action(action))
}

/// Parse `primary,secondary,speed`, e.g. `1,0,fast`.
fn parse_hand_control(parameters: &str) -> AlpacaResult<(f64, f64, HandSpeed)> {
    let parts: Vec<&str> = parameters.split(',').map(str::trim).collect();
    let [primary, secondary, speed] = parts.as_slice() else {
        return Err(AlpacaError::invalid_value(format!(
            "hand control expects primary,secondary,speed, got {parameters:?}"
        )));
    };
    let axis = |raw: &str| {
        raw.parse::<f64>()
            .map_err(|_parse_error| AlpacaError::invalid_value(format!("{raw:?} is not a number")))
    };
    Ok((axis(*primary)?, axis(*secondary)?, speed.parse()?))
}

fn format_utc(utc: DateTime<Utc>) -> String {
    utc.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn hand_control_parameters() {
        let (primary, secondary, speed) = parse_hand_control("1, -1, Medium").unwrap();
        assert!((primary - 1.0).abs() < f64::EPSILON);
        assert!((secondary + 1.0).abs() < f64::EPSILON);
        assert_eq!(speed, HandSpeed::Medium);

        assert!(parse_hand_control("1,0").is_err());
        assert!(parse_hand_control("left,0,fast").is_err());
        assert!(parse_hand_control("1,0,warp").is_err());
    }

    #[test]
    fn async_suffix_selects_the_mode() {
        assert_eq!(slew_mode("slewtocoordinatesasync"), SlewMode::Asynchronous);
        assert_eq!(slew_mode("slewtoaltaz"), SlewMode::Synchronous);
    }

    #[test]
    fn utc_dates_use_a_z_suffix() {
        let utc = DateTime::parse_from_rfc3339("2024-03-20T03:06:00.5+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_utc(utc), "2024-03-20T03:06:00.500Z");
    }
}
