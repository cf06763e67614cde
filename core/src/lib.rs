//! Synchronous client core for the rent-pricing service.
//!
//! # Overview
//! Builds `RpcRequest` values and parses `RpcResult` values without touching
//! the network (host-does-IO pattern). The service's responses are loosely
//! shaped: a repeated element may be absent, a bare mapping, or a sequence,
//! and the same concept appears under different keys per operation. This
//! crate normalizes those shapes into strongly typed records and turns
//! service faults into a typed error.
//!
//! # Design
//! - `coerce` converts raw values per field type, strictly or tolerantly.
//! - `record` turns a static field table into an immutable `Record`;
//!   `records` declares the concrete record types.
//! - `extract` flattens nested responses into ordered flat mappings.
//! - `endpoint` binds each operation declaratively: request shape,
//!   `ExtractionSpec`, result record type.
//! - `fault` maps service faults to `ServerError`.
//! - `RentClient` is stateless: it holds only its `ClientConfig`.

pub mod client;
pub mod coerce;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod fault;
pub mod record;
pub mod records;
pub mod rpc;
pub mod types;

pub use client::RentClient;
pub use coerce::{coerce, coerce_or_raw, FieldType, FieldValue, Symbol};
pub use endpoint::{lookup, request_params, EndpointConfig, RequestShape, ResultShape};
pub use error::{ServerError, TypeConversionError};
pub use extract::{extract, ExtractionSpec};
pub use fault::{translate_fault, ErrorKind, FaultMapping, ServiceFault};
pub use record::{build_record, FieldDefault, FieldSpec, Mapping, Model, Record, RecordModel};
pub use records::{
    AvailableUnit, FloorPlan, LeaseTermRent, LeaseTermRentPlus, Property, PropertyParameters,
    RenewalLeaseTermRent, RentSummary, Unit,
};
pub use rpc::{RpcChannel, RpcRequest, RpcResult};
pub use types::{ClientConfig, RequestOptions, UnitRateRequest};
