//! Request-side DTOs and client configuration.
//!
//! # Design
//! These types are the caller's vocabulary for building requests. They are
//! serialized into the flat parameter mapping an `RpcRequest` carries; absent
//! optional values are omitted rather than sent as nil. Presence and shape
//! checks are left to the caller.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::record::Mapping;

/// Client-wide settings, passed explicitly to `RentClient::new`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Account name sent as `client_name` with every call.
    pub client_name: String,
}

impl ClientConfig {
    pub fn new(client_name: impl Into<String>) -> Self {
        Self {
            client_name: client_name.into(),
        }
    }
}

/// Per-unit options for the lease-term-rent family of operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub building: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_lease_term: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_lease_term: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_move_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_move_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready_for_move_in_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_available_date: Option<NaiveDate>,
    /// Renewal start date; only meaningful for renewal requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl UnitRateRequest {
    pub fn for_unit(unit_number: impl Into<String>) -> Self {
        Self {
            unit_number: Some(unit_number.into()),
            ..Self::default()
        }
    }

    /// The option group as a parameter mapping.
    pub fn to_group(&self) -> Mapping {
        // Every field is a string, integer or date, so the value is always an object.
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Mapping::new(),
        }
    }
}

/// Operation-specific request options: flat values plus option groups that
/// the endpoint nests under its group key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub values: Mapping,
    pub groups: Vec<Mapping>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// Adds `value` under `key` only when it is present.
    pub fn optional(self, key: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.value(key, value),
            None => self,
        }
    }

    pub fn group(mut self, group: Mapping) -> Self {
        self.groups.push(group);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_rate_request_omits_absent_fields() {
        let request = UnitRateRequest {
            unit_number: Some("101".into()),
            min_lease_term: Some(6),
            first_move_in_date: NaiveDate::from_ymd_opt(2014, 1, 2),
            ..UnitRateRequest::default()
        };
        let group = request.to_group();
        assert_eq!(
            Value::Object(group),
            json!({"unit_number": "101", "min_lease_term": 6, "first_move_in_date": "2014-01-02"})
        );
    }

    #[test]
    fn empty_unit_rate_request_is_empty_group() {
        assert!(UnitRateRequest::default().to_group().is_empty());
    }

    #[test]
    fn request_options_skip_absent_optionals() {
        let options = RequestOptions::new()
            .value("unit_name", "101")
            .optional("floor_plan_name", None::<&str>)
            .optional("building", Some("A"));
        assert_eq!(Value::Object(options.values), json!({"unit_name": "101", "building": "A"}));
    }

    #[test]
    fn client_config_deserializes() {
        let config: ClientConfig = serde_json::from_str(r#"{"client_name":"acme"}"#).unwrap();
        assert_eq!(config, ClientConfig::new("acme"));
    }
}
