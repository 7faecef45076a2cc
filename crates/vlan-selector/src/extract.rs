//! MAC extraction from an Access-Request
//!
//! Calling-Station-Id is the conventional carrier of the device MAC and is
//! trusted as-is. Some access points send the MAC as User-Name instead, so
//! User-Name is used as a fallback when it looks like a MAC address.

use crate::mac::{MacAddress, is_mac_shaped, normalize};
use radius_proto::{Attribute, AttributeType, Packet};

/// Read access to request attributes by type
pub trait AttributeSource {
    /// All attributes of the given type, in request order
    fn get(&self, attr_type: AttributeType) -> Vec<&Attribute>;
}

impl AttributeSource for Packet {
    fn get(&self, attr_type: AttributeType) -> Vec<&Attribute> {
        self.attributes_of(attr_type)
    }
}

fn first_value(request: &impl AttributeSource, attr_type: AttributeType) -> Option<String> {
    request
        .get(attr_type)
        .first()
        .map(|attr| attr.as_string_lossy().into_owned())
}

/// Pull the device MAC out of a request, if it carries one
pub fn extract(request: &impl AttributeSource) -> Option<MacAddress> {
    if let Some(calling_station_id) = first_value(request, AttributeType::CallingStationId) {
        let mac = normalize(&calling_station_id);
        // An empty Calling-Station-Id carries no MAC
        return (!mac.is_empty()).then_some(mac);
    }

    let user_name = first_value(request, AttributeType::UserName)?;
    is_mac_shaped(&user_name).then(|| normalize(&user_name))
}
