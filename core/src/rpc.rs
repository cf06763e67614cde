//! RPC transport types for the host-does-IO pattern.
//!
//! # Design
//! The core never touches the network. `RentClient::build_*` methods produce
//! an `RpcRequest` (an action name plus a flat parameter mapping) and
//! `RentClient::parse_*` methods consume an `RpcResult`: the nested response
//! mapping on success, or the `ServiceFault` the channel reported. How the
//! request travels is the host's business, either by hand or through an
//! `RpcChannel` implementation.

use serde_json::Value;

use crate::fault::ServiceFault;
use crate::record::Mapping;

/// What the channel hands back for one call.
pub type RpcResult = Result<Value, ServiceFault>;

/// A remote call described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub action: String,
    /// Flat scalars, plus at most one level of named nested groups.
    pub params: Mapping,
}

impl RpcRequest {
    /// Send this request over `channel`.
    pub fn invoke<C: RpcChannel + ?Sized>(&self, channel: &C) -> RpcResult {
        channel.invoke(&self.action, &self.params)
    }
}

/// The opaque transport collaborator.
pub trait RpcChannel {
    fn invoke(&self, action: &str, params: &Mapping) -> RpcResult;
}
