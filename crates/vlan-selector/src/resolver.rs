use crate::mac::MacAddress;
use crate::mapping::{MacVlanMapping, VlanId};

/// VLAN for a MAC: its own entry, else the default VLAN, else none
pub fn resolve(mac: &MacAddress, mapping: &MacVlanMapping) -> Option<VlanId> {
    mapping.lookup(mac).or(mapping.default_vlan())
}
