//! Accept or reject an Access-Request and assign its VLAN
//!
//! A response starts pending and is settled exactly once: rejected when no
//! MAC can be found or the MAC resolves to no VLAN, otherwise accepted with
//! the RFC 2868 tunnel triple (Tunnel-Private-Group-Id, Tunnel-Type,
//! Tunnel-Medium-Type), all untagged.

use crate::extract::{AttributeSource, extract};
use crate::mac::MacAddress;
use crate::mapping::{MacVlanMapping, VlanId};
use crate::resolver::resolve;
use crate::store::ConfigStore;
use radius_proto::{Code, TunnelAttribute};
use std::sync::Arc;

/// Tag used on every tunnel attribute (untagged)
pub const TUNNEL_TAG: u8 = 0;

/// Write access to the outbound response
pub trait AttributeSink {
    /// Settle the response as Access-Accept or Access-Reject
    fn set_outcome(&mut self, code: Code);

    /// Append an attribute to the response
    fn append(&mut self, attribute: TunnelAttribute);
}

/// Result of one authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Accept(VlanId),
    Reject,
}

impl AuthenticationOutcome {
    pub fn code(self) -> Code {
        match self {
            AuthenticationOutcome::Accept(_) => Code::AccessAccept,
            AuthenticationOutcome::Reject => Code::AccessReject,
        }
    }

    pub fn vlan(self) -> Option<VlanId> {
        match self {
            AuthenticationOutcome::Accept(vlan) => Some(vlan),
            AuthenticationOutcome::Reject => None,
        }
    }
}

/// Outcome plus the MAC it was decided for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub mac: Option<MacAddress>,
    pub outcome: AuthenticationOutcome,
}

/// Decide a request against one snapshot, without touching any response
pub fn decide(request: &impl AttributeSource, mapping: &MacVlanMapping) -> Decision {
    let Some(mac) = extract(request) else {
        return Decision {
            mac: None,
            outcome: AuthenticationOutcome::Reject,
        };
    };
    let outcome = match resolve(&mac, mapping) {
        Some(vlan) => AuthenticationOutcome::Accept(vlan),
        None => AuthenticationOutcome::Reject,
    };
    Decision {
        mac: Some(mac),
        outcome,
    }
}

/// Write a decided outcome into a response
pub fn apply(outcome: AuthenticationOutcome, response: &mut impl AttributeSink) {
    response.set_outcome(outcome.code());
    if let AuthenticationOutcome::Accept(vlan) = outcome {
        response.append(TunnelAttribute::private_group_id(TUNNEL_TAG, vlan.get()));
        response.append(TunnelAttribute::vlan_tunnel_type(TUNNEL_TAG));
        response.append(TunnelAttribute::ieee_802_medium(TUNNEL_TAG));
    }
}

/// Decision Handler bound to a [`ConfigStore`]
#[derive(Clone)]
pub struct MacVlanHandler {
    store: Arc<ConfigStore>,
}

impl MacVlanHandler {
    pub fn new(store: Arc<ConfigStore>) -> Self {
        MacVlanHandler { store }
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Decide `request` against the current snapshot and settle `response`
    ///
    /// The snapshot is captured once, so a concurrent reload cannot change
    /// the answer halfway through.
    pub fn handle(
        &self,
        request: &impl AttributeSource,
        response: &mut impl AttributeSink,
    ) -> Decision {
        let snapshot = self.store.snapshot();
        let decision = decide(request, &snapshot);
        apply(decision.outcome, response);
        decision
    }
}
