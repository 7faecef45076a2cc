//! RFC 2868 tunnel attributes
//!
//! A NAS places a device into a VLAN when the Access-Accept carries the
//! triple Tunnel-Type = VLAN, Tunnel-Medium-Type = IEEE-802 and
//! Tunnel-Private-Group-Id = the VLAN id (RFC 3580 Section 3.31).

use super::{Attribute, AttributeType};
use crate::packet::PacketError;
use std::fmt;

/// Tunnel-Type value for VLAN (RFC 3580)
pub const TUNNEL_TYPE_VLAN: u32 = 13;

/// Tunnel-Medium-Type value for IEEE-802 (RFC 2868)
pub const TUNNEL_MEDIUM_IEEE_802: u32 = 6;

/// Value carried by a tunnel attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunnelValue {
    /// 24-bit integer (Tunnel-Type, Tunnel-Medium-Type)
    Integer(u32),
    /// Text (Tunnel-Private-Group-Id)
    Text(String),
}

impl fmt::Display for TunnelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelValue::Integer(v) => write!(f, "{}", v),
            TunnelValue::Text(s) => f.write_str(s),
        }
    }
}

/// A tagged tunnel attribute: code, tag, value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelAttribute {
    pub attr_type: AttributeType,
    pub tag: u8,
    pub value: TunnelValue,
}

impl TunnelAttribute {
    pub fn new(attr_type: AttributeType, tag: u8, value: TunnelValue) -> Self {
        TunnelAttribute {
            attr_type,
            tag,
            value,
        }
    }

    /// Tunnel-Private-Group-Id carrying a VLAN id as decimal text
    pub fn private_group_id(tag: u8, vlan: u32) -> Self {
        Self::new(
            AttributeType::TunnelPrivateGroupId,
            tag,
            TunnelValue::Text(vlan.to_string()),
        )
    }

    /// Tunnel-Type = VLAN
    pub fn vlan_tunnel_type(tag: u8) -> Self {
        Self::new(
            AttributeType::TunnelType,
            tag,
            TunnelValue::Integer(TUNNEL_TYPE_VLAN),
        )
    }

    /// Tunnel-Medium-Type = IEEE-802
    pub fn ieee_802_medium(tag: u8) -> Self {
        Self::new(
            AttributeType::TunnelMediumType,
            tag,
            TunnelValue::Integer(TUNNEL_MEDIUM_IEEE_802),
        )
    }

    /// Encode into a wire attribute
    ///
    /// Fails for attribute types that carry no RFC 2868 tag octet.
    pub fn to_attribute(&self) -> Result<Attribute, PacketError> {
        if !self.attr_type.is_tagged() {
            return Err(PacketError::AttributeError(format!(
                "{} is not a tagged tunnel attribute",
                self.attr_type
            )));
        }
        let code = self.attr_type.as_u8();
        match &self.value {
            TunnelValue::Integer(v) => Attribute::tagged_integer(code, self.tag, *v),
            TunnelValue::Text(s) => Attribute::tagged_string(code, self.tag, s),
        }
    }
}

impl TryFrom<&TunnelAttribute> for Attribute {
    type Error = PacketError;

    fn try_from(tunnel: &TunnelAttribute) -> Result<Self, Self::Error> {
        tunnel.to_attribute()
    }
}

impl fmt::Display for TunnelAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} = {}", self.attr_type.name(), self.tag, self.value)
    }
}
