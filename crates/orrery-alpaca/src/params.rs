//! Request parameter access.
//!
//! Alpaca parameter names are case-insensitive (`ClientID`, `clientid` and
//! `CLIENTID` are the same parameter) while values keep their case. GET
//! members carry their parameters in the query string and PUT members in
//! an `application/x-www-form-urlencoded` body; both arrive here as a list
//! of pairs.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::str::FromStr;

use orrery_core::RequestContext;
use orrery_types::ClientId;

use crate::error::RequestError;

/// Case-insensitive view of a request's parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    values: BTreeMap<String, (String, String)>,
}

impl Params {
    /// Collect `pairs`. A repeated name keeps its last value.
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), (name, value)))
            .collect();
        Self { values }
    }

    /// The raw value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    /// The raw value of a required parameter.
    pub fn require(&self, name: &'static str) -> Result<&str, RequestError> {
        self.get(name).ok_or(RequestError::MissingParameter(name))
    }

    /// Parse a required parameter.
    pub fn parse<T: FromStr>(&self, name: &'static str) -> Result<T, RequestError> {
        let raw = self.require(name)?;
        raw.trim()
            .parse()
            .map_err(|_parse_error| RequestError::InvalidParameter {
                name,
                value: raw.to_owned(),
            })
    }

    /// A required floating-point parameter.
    pub fn f64(&self, name: &'static str) -> Result<f64, RequestError> {
        self.parse(name)
    }

    /// A required integer parameter.
    pub fn i32(&self, name: &'static str) -> Result<i32, RequestError> {
        self.parse(name)
    }

    /// A required boolean, spelled `true` or `false` in any case.
    pub fn bool(&self, name: &'static str) -> Result<bool, RequestError> {
        let raw = self.require(name)?;
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(RequestError::InvalidParameter {
                name,
                value: raw.to_owned(),
            })
        }
    }

    /// The caller identity fields.
    ///
    /// Absent ids default to 0. Present but malformed ids reject the request.
    pub fn context(&self, remote: Option<SocketAddr>) -> Result<RequestContext, RequestError> {
        Ok(RequestContext {
            client_id: ClientId(self.optional_u32("ClientID")?),
            client_transaction_id: self.optional_u32("ClientTransactionID")?,
            remote,
        })
    }

    fn optional_u32(&self, name: &'static str) -> Result<u32, RequestError> {
        if self.get(name).is_some() { self.parse(name) } else { Ok(0) }
    }

    /// `Name=Value` pairs for the call log, without the caller ids.
    pub fn summary(&self) -> Option<String> {
        let parts: Vec<String> = self
            .values
            .iter()
            .filter(|(key, _)| key.as_str() != "clientid" && key.as_str() != "clienttransactionid")
            .map(|(_, (name, value))| format!("{name}={value}"))
            .collect();
        (!parts.is_empty()).then(|| parts.join("&"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params::new(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        )
    }

    #[test]
    fn names_are_case_insensitive() {
        let p = params(&[("RightAscension", "5.5"), ("DECLINATION", "-20")]);
        assert!((p.f64("rightascension").unwrap() - 5.5).abs() < f64::EPSILON);
        assert!((p.f64("Declination").unwrap() + 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn booleans_accept_any_case() {
        let p = params(&[("Connected", "True"), ("Tracking", "FALSE"), ("Slaved", "yes")]);
        assert!(p.bool("Connected").unwrap());
        assert!(!p.bool("Tracking").unwrap());
        assert_eq!(
            p.bool("Slaved").unwrap_err(),
            RequestError::InvalidParameter {
                name: "Slaved",
                value: "yes".to_owned()
            }
        );
    }

    #[test]
    fn missing_and_malformed_parameters() {
        let p = params(&[("Duration", "soon")]);
        assert_eq!(p.i32("Duration").unwrap_err().to_string(), "parameter Duration has invalid value \"soon\"");
        assert_eq!(p.f64("Rate").unwrap_err(), RequestError::MissingParameter("Rate"));
    }

    #[test]
    fn caller_ids_default_to_zero() {
        let ctx = params(&[]).context(None).unwrap();
        assert_eq!(ctx.client_id, ClientId(0));
        assert_eq!(ctx.client_transaction_id, 0);

        let ctx = params(&[("clientid", "12"), ("ClientTransactionId", "99")])
            .context(None)
            .unwrap();
        assert_eq!(ctx.client_id, ClientId(12));
        assert_eq!(ctx.client_transaction_id, 99);

        assert!(params(&[("ClientID", "-1")]).context(None).is_err());
    }

    #[test]
    fn summary_skips_caller_ids() {
        let p = params(&[("ClientID", "1"), ("Azimuth", "90"), ("ClientTransactionID", "2")]);
        assert_eq!(p.summary().as_deref(), Some("Azimuth=90"));
        assert!(params(&[("ClientID", "1")]).summary().is_none());
    }
}
