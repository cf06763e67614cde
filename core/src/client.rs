//! Stateless request builder and response parser for the rent-pricing service.
//!
//! # Design
//! `RentClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `RpcRequest` and a `parse_*` method that consumes the
//! `RpcResult`. Both halves go through the operation's `EndpointConfig`, so
//! the methods here only supply base parameters and option values. The
//! caller executes the call in between, keeping the core free of I/O.

use serde_json::Value;

use crate::endpoint::{
    EndpointConfig, GET_AVAILABLE_UNITS, GET_FLOOR_PLAN, GET_FLOOR_PLANS, GET_LEASE_TERM_RENT,
    GET_LEASE_TERM_RENT_PLUS, GET_PROPERTIES, GET_PROPERTY, GET_PROPERTY_PARAMETERS,
    GET_RENEWAL_LEASE_TERM_RENT, GET_RENT_SUMMARY, GET_UNIT, GET_UNITS,
};
use crate::error::ServerError;
use crate::record::Mapping;
use crate::records::{
    AvailableUnit, FloorPlan, LeaseTermRent, LeaseTermRentPlus, Property, PropertyParameters,
    RenewalLeaseTermRent, RentSummary, Unit,
};
use crate::rpc::{RpcRequest, RpcResult};
use crate::types::{ClientConfig, RequestOptions, UnitRateRequest};

/// Synchronous, stateless client for the rent-pricing service.
#[derive(Debug, Clone)]
pub struct RentClient {
    config: ClientConfig,
}

impl RentClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Identity plus, where the operation targets one property, its id.
    fn base_params(&self, external_property_id: Option<&str>) -> Mapping {
        let mut base = Mapping::new();
        base.insert("client_name".to_string(), Value::from(self.config.client_name.as_str()));
        if let Some(id) = external_property_id {
            base.insert("external_property_id".to_string(), Value::from(id));
        }
        base
    }

    fn build(
        &self,
        endpoint: &EndpointConfig,
        external_property_id: Option<&str>,
        options: RequestOptions,
    ) -> RpcRequest {
        RpcRequest {
            action: endpoint.action.to_string(),
            params: endpoint.request_params(&self.base_params(external_property_id), &options),
        }
    }

    fn unit_rates(units: &[UnitRateRequest]) -> RequestOptions {
        units
            .iter()
            .fold(RequestOptions::new(), |options, unit| options.group(unit.to_group()))
    }

    // -- properties ----------------------------------------------------------

    pub fn build_get_properties(&self) -> RpcRequest {
        self.build(&GET_PROPERTIES, None, RequestOptions::new())
    }

    pub fn parse_get_properties(&self, result: RpcResult) -> Result<Vec<Property>, ServerError> {
        GET_PROPERTIES.parse_many(result)
    }

    pub fn build_get_property(&self, external_property_id: &str) -> RpcRequest {
        self.build(&GET_PROPERTY, Some(external_property_id), RequestOptions::new())
    }

    pub fn parse_get_property(&self, result: RpcResult) -> Result<Property, ServerError> {
        GET_PROPERTY.parse_one(result)
    }

    pub fn build_get_property_parameters(&self, external_property_id: &str) -> RpcRequest {
        self.build(&GET_PROPERTY_PARAMETERS, Some(external_property_id), RequestOptions::new())
    }

    pub fn parse_get_property_parameters(
        &self,
        result: RpcResult,
    ) -> Result<PropertyParameters, ServerError> {
        GET_PROPERTY_PARAMETERS.parse_one(result)
    }

    // -- floor plans ---------------------------------------------------------

    pub fn build_get_floor_plans(&self, external_property_id: &str) -> RpcRequest {
        self.build(&GET_FLOOR_PLANS, Some(external_property_id), RequestOptions::new())
    }

    pub fn parse_get_floor_plans(&self, result: RpcResult) -> Result<Vec<FloorPlan>, ServerError> {
        GET_FLOOR_PLANS.parse_many(result)
    }

    pub fn build_get_floor_plan(&self, external_property_id: &str, floor_plan_name: &str) -> RpcRequest {
        let options = RequestOptions::new().value("floor_plan_name", floor_plan_name);
        self.build(&GET_FLOOR_PLAN, Some(external_property_id), options)
    }

    pub fn parse_get_floor_plan(&self, result: RpcResult) -> Result<FloorPlan, ServerError> {
        GET_FLOOR_PLAN.parse_one(result)
    }

    // -- units ---------------------------------------------------------------

    pub fn build_get_units(&self, external_property_id: &str, floor_plan_name: Option<&str>) -> RpcRequest {
        let options = RequestOptions::new().optional("floor_plan_name", floor_plan_name);
        self.build(&GET_UNITS, Some(external_property_id), options)
    }

    pub fn parse_get_units(&self, result: RpcResult) -> Result<Vec<Unit>, ServerError> {
        GET_UNITS.parse_many(result)
    }

    pub fn build_get_unit(&self, external_property_id: &str, unit_name: &str) -> RpcRequest {
        let options = RequestOptions::new().value("unit_name", unit_name);
        self.build(&GET_UNIT, Some(external_property_id), options)
    }

    pub fn parse_get_unit(&self, result: RpcResult) -> Result<Unit, ServerError> {
        GET_UNIT.parse_one(result)
    }

    pub fn build_get_available_units(&self, external_property_id: &str) -> RpcRequest {
        self.build(&GET_AVAILABLE_UNITS, Some(external_property_id), RequestOptions::new())
    }

    pub fn parse_get_available_units(&self, result: RpcResult) -> Result<Vec<AvailableUnit>, ServerError> {
        GET_AVAILABLE_UNITS.parse_many(result)
    }

    // -- rents ---------------------------------------------------------------

    pub fn build_get_rent_summary(&self, external_property_id: &str) -> RpcRequest {
        self.build(&GET_RENT_SUMMARY, Some(external_property_id), RequestOptions::new())
    }

    pub fn parse_get_rent_summary(&self, result: RpcResult) -> Result<Vec<RentSummary>, ServerError> {
        GET_RENT_SUMMARY.parse_many(result)
    }

    pub fn build_get_lease_term_rent(&self, external_property_id: &str, units: &[UnitRateRequest]) -> RpcRequest {
        self.build(&GET_LEASE_TERM_RENT, Some(external_property_id), Self::unit_rates(units))
    }

    pub fn parse_get_lease_term_rent(&self, result: RpcResult) -> Result<Vec<LeaseTermRent>, ServerError> {
        GET_LEASE_TERM_RENT.parse_many(result)
    }

    pub fn build_get_lease_term_rent_plus(
        &self,
        external_property_id: &str,
        units: &[UnitRateRequest],
    ) -> RpcRequest {
        self.build(&GET_LEASE_TERM_RENT_PLUS, Some(external_property_id), Self::unit_rates(units))
    }

    pub fn parse_get_lease_term_rent_plus(
        &self,
        result: RpcResult,
    ) -> Result<Vec<LeaseTermRentPlus>, ServerError> {
        GET_LEASE_TERM_RENT_PLUS.parse_many(result)
    }

    pub fn build_get_renewal_lease_term_rent(
        &self,
        external_property_id: &str,
        units: &[UnitRateRequest],
    ) -> RpcRequest {
        self.build(&GET_RENEWAL_LEASE_TERM_RENT, Some(external_property_id), Self::unit_rates(units))
    }

    pub fn parse_get_renewal_lease_term_rent(
        &self,
        result: RpcResult,
    ) -> Result<Vec<RenewalLeaseTermRent>, ServerError> {
        GET_RENEWAL_LEASE_TERM_RENT.parse_many(result)
    }
}
