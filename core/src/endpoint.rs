//! Declarative per-operation bindings.
//!
//! # Design
//! An `EndpointConfig` holds everything that differs between operations:
//! the action name, which option keys the request forwards and where option
//! groups nest, where records live in the response, and which record type
//! to build. One binding path (`request_params` on the way out, `records` /
//! `parse_*` on the way back) serves every operation, so adding an endpoint
//! is a table entry rather than new glue.
//!
//! The lease-term-rent family shares one constructor, `lease_term_family`,
//! whose instances differ only in action, group key, response key and record
//! type.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ServerError;
use crate::extract::{context, extract, fold_pairs, ExtractionSpec};
use crate::fault::translate_fault;
use crate::record::{build_record, Mapping, Model, Record, RecordModel};
use crate::records::{
    AVAILABLE_UNIT_MODEL, FLOOR_PLAN_MODEL, LEASE_TERM_RENT_MODEL, LEASE_TERM_RENT_PLUS_MODEL,
    PROPERTY_MODEL, PROPERTY_PARAMETERS_MODEL, RENEWAL_LEASE_TERM_RENT_MODEL, RENT_SUMMARY_MODEL,
    UNIT_MODEL,
};
use crate::rpc::RpcResult;
use crate::types::RequestOptions;

/// Request side of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestShape {
    /// Flat option keys forwarded from `RequestOptions::values`.
    pub option_keys: &'static [&'static str],
    /// Key the option groups nest under, if the operation takes any.
    pub group_key: Option<&'static str>,
}

impl RequestShape {
    pub const NONE: RequestShape = RequestShape {
        option_keys: &[],
        group_key: None,
    };

    pub const fn options(option_keys: &'static [&'static str]) -> Self {
        Self {
            option_keys,
            group_key: None,
        }
    }

    pub const fn grouped(group_key: &'static str) -> Self {
        Self {
            option_keys: &[],
            group_key: Some(group_key),
        }
    }
}

/// How extracted mappings become results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// One record per extracted mapping.
    Collection,
    /// Exactly one record, from the first extracted mapping.
    Single,
    /// One record folded from name/value pair elements; the return node's
    /// context keys are kept alongside.
    Pairs {
        name_key: &'static str,
        value_key: &'static str,
    },
}

/// Everything one remote operation needs.
#[derive(Debug)]
pub struct EndpointConfig {
    /// Client-side operation name, e.g. `get_units`.
    pub operation: &'static str,
    /// Remote action name, e.g. `getUnits`.
    pub action: &'static str,
    pub request: RequestShape,
    pub extraction: ExtractionSpec,
    pub shape: ResultShape,
    pub record: &'static RecordModel,
}

impl EndpointConfig {
    /// Merge base parameters with this operation's options.
    pub fn request_params(&self, base: &Mapping, options: &RequestOptions) -> Mapping {
        let mut params = base.clone();
        for (key, value) in &options.values {
            if value.is_null() {
                continue;
            }
            if self.request.option_keys.iter().any(|k| k == key) {
                params.insert(key.clone(), value.clone());
            } else {
                debug!(operation = self.operation, key = %key, "ignoring undeclared option");
            }
        }
        match self.request.group_key {
            Some(group_key) => {
                let groups = options.groups.iter().cloned().map(Value::Object).collect();
                params.insert(group_key.to_string(), Value::Array(groups));
            }
            None if !options.groups.is_empty() => {
                warn!(operation = self.operation, "operation takes no option groups");
            }
            None => {}
        }
        params
    }

    /// Records of this endpoint's type, in response order.
    pub fn records(&self, response: &Value) -> Vec<Record> {
        let records: Vec<Record> = self
            .mappings(response)
            .iter()
            .map(|m| build_record(m, self.record))
            .collect();
        debug!(operation = self.operation, count = records.len(), "built records");
        records
    }

    /// Flat source mappings, one per result record.
    fn mappings(&self, response: &Value) -> Vec<Mapping> {
        match self.shape {
            ResultShape::Collection => extract(response, &self.extraction),
            ResultShape::Single => {
                let mut found = extract(response, &self.extraction);
                if found.len() > 1 {
                    warn!(operation = self.operation, count = found.len(), "expected one element");
                }
                found.truncate(1);
                if found.is_empty() {
                    debug!(operation = self.operation, "no element; building defaults");
                    found.push(context(response, &self.extraction));
                }
                found
            }
            ResultShape::Pairs {
                name_key,
                value_key,
            } => {
                let pairs = extract(response, &self.extraction);
                let mut folded = context(response, &self.extraction);
                folded.extend(fold_pairs(&pairs, name_key, value_key));
                vec![folded]
            }
        }
    }

    /// Translate a fault, or build one `T` per extracted element.
    ///
    /// Records are built with `T`'s own model, so the result is always a
    /// well-formed `T`. Pairing an endpoint with a `T` other than the one it
    /// declares in `record` extracts this endpoint's elements into that
    /// type's fields; `RentClient` always pairs them as declared.
    pub fn parse_many<T: Model>(&self, result: RpcResult) -> Result<Vec<T>, ServerError> {
        let response = result.map_err(|fault| translate_fault(&fault))?;
        Ok(self.mappings(&response).iter().map(T::build).collect())
    }

    /// Like `parse_many`, for single-resource operations. With no element,
    /// the record is built from the return node's context alone.
    pub fn parse_one<T: Model>(&self, result: RpcResult) -> Result<T, ServerError> {
        let response = result.map_err(|fault| translate_fault(&fault))?;
        let source = self
            .mappings(&response)
            .into_iter()
            .next()
            .unwrap_or_else(|| context(&response, &self.extraction));
        Ok(T::build(&source))
    }
}

/// Merge `base` with `options` as `config` declares.
pub fn request_params(base: &Mapping, options: &RequestOptions, config: &EndpointConfig) -> Mapping {
    config.request_params(base, options)
}

const PROPERTY_CONTEXT: &[&str] = &["external_property_id"];
const DATED_CONTEXT: &[&str] = &["external_property_id", "effective_date"];
const UNIT_RATE_LEVEL: &str = "unit_rate";

/// A member of the lease-term-rent family.
const fn lease_term_family(
    operation: &'static str,
    action: &'static str,
    wrapper: &'static [&'static str],
    collection: &'static [&'static str],
    group_key: &'static str,
    record: &'static RecordModel,
) -> EndpointConfig {
    EndpointConfig {
        operation,
        action,
        request: RequestShape::grouped(group_key),
        extraction: ExtractionSpec::new(wrapper, collection).with_context(PROPERTY_CONTEXT),
        shape: ResultShape::Collection,
        record,
    }
}

pub static GET_PROPERTIES: EndpointConfig = EndpointConfig {
    operation: "get_properties",
    action: "getProperties",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_properties_response", "return"], &["property"]),
    shape: ResultShape::Collection,
    record: &PROPERTY_MODEL,
};

pub static GET_PROPERTY: EndpointConfig = EndpointConfig {
    operation: "get_property",
    action: "getPropertyInfo",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_property_response", "return"], &["property"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Single,
    record: &PROPERTY_MODEL,
};

pub static GET_PROPERTY_PARAMETERS: EndpointConfig = EndpointConfig {
    operation: "get_property_parameters",
    action: "getPropertyParameters",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_property_parameters_response", "return"], &["parameter"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Pairs {
        name_key: "name",
        value_key: "value",
    },
    record: &PROPERTY_PARAMETERS_MODEL,
};

pub static GET_FLOOR_PLANS: EndpointConfig = EndpointConfig {
    operation: "get_floor_plans",
    action: "getFloorPlans",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_floor_plans_response", "return"], &["floor_plan"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Collection,
    record: &FLOOR_PLAN_MODEL,
};

pub static GET_FLOOR_PLAN: EndpointConfig = EndpointConfig {
    operation: "get_floor_plan",
    action: "getFloorPlan",
    request: RequestShape::options(&["floor_plan_name"]),
    extraction: ExtractionSpec::new(&["get_floor_plan_response", "return"], &["floor_plan"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Single,
    record: &FLOOR_PLAN_MODEL,
};

pub static GET_UNITS: EndpointConfig = EndpointConfig {
    operation: "get_units",
    action: "getUnits",
    request: RequestShape::options(&["floor_plan_name"]),
    extraction: ExtractionSpec::new(&["get_units_response", "return"], &["unit"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Collection,
    record: &UNIT_MODEL,
};

pub static GET_UNIT: EndpointConfig = EndpointConfig {
    operation: "get_unit",
    action: "getUnit",
    request: RequestShape::options(&["unit_name"]),
    extraction: ExtractionSpec::new(&["get_unit_response", "return"], &["unit"])
        .with_context(PROPERTY_CONTEXT),
    shape: ResultShape::Single,
    record: &UNIT_MODEL,
};

pub static GET_AVAILABLE_UNITS: EndpointConfig = EndpointConfig {
    operation: "get_available_units",
    action: "getAvailableUnits",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_available_units_response", "return"], &["floor_plan", "unit"])
        .with_context(DATED_CONTEXT)
        .with_renames(&[("name", "floor_plan_name")]),
    shape: ResultShape::Collection,
    record: &AVAILABLE_UNIT_MODEL,
};

pub static GET_RENT_SUMMARY: EndpointConfig = EndpointConfig {
    operation: "get_rent_summary",
    action: "getRentSummary",
    request: RequestShape::NONE,
    extraction: ExtractionSpec::new(&["get_rent_summary_response", "return"], &["floor_plan_unit_type"])
        .with_context(DATED_CONTEXT),
    shape: ResultShape::Collection,
    record: &RENT_SUMMARY_MODEL,
};

pub static GET_LEASE_TERM_RENT: EndpointConfig = lease_term_family(
    "get_lease_term_rent",
    "getLeaseTermRent",
    &["get_lease_term_rent_response", "return"],
    &["lease_term_rent_unit_response", UNIT_RATE_LEVEL],
    "lease_term_rent_unit_request",
    &LEASE_TERM_RENT_MODEL,
);

pub static GET_LEASE_TERM_RENT_PLUS: EndpointConfig = lease_term_family(
    "get_lease_term_rent_plus",
    "getLeaseTermRentPlus",
    &["get_lease_term_rent_plus_response", "return"],
    &["lease_term_rent_plus_unit_response", UNIT_RATE_LEVEL],
    "lease_term_rent_plus_unit_request",
    &LEASE_TERM_RENT_PLUS_MODEL,
);

pub static GET_RENEWAL_LEASE_TERM_RENT: EndpointConfig = lease_term_family(
    "get_renewal_lease_term_rent",
    "getRenewalLeaseTermRent",
    &["get_renewal_lease_term_rent_response", "return"],
    &["renewal_lease_term_rent_unit_response", UNIT_RATE_LEVEL],
    "renewal_lease_term_rent_unit_request",
    &RENEWAL_LEASE_TERM_RENT_MODEL,
);

/// Every binding, for lookup by operation name.
pub static ENDPOINTS: [&EndpointConfig; 12] = [
    &GET_PROPERTIES,
    &GET_PROPERTY,
    &GET_PROPERTY_PARAMETERS,
    &GET_FLOOR_PLANS,
    &GET_FLOOR_PLAN,
    &GET_UNITS,
    &GET_UNIT,
    &GET_AVAILABLE_UNITS,
    &GET_RENT_SUMMARY,
    &GET_LEASE_TERM_RENT,
    &GET_LEASE_TERM_RENT_PLUS,
    &GET_RENEWAL_LEASE_TERM_RENT,
];

pub fn lookup(operation: &str) -> Option<&'static EndpointConfig> {
    ENDPOINTS.iter().copied().find(|e| e.operation == operation)
}
