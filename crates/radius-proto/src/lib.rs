//! RADIUS Protocol Implementation
//!
//! The subset of RFC 2865 and RFC 2868 needed to answer MAC authentication
//! requests with a VLAN assignment.
//!
//! # Features
//!
//! - Packet encoding and decoding
//! - Attribute type registry with dictionary names
//! - RFC 2868 tagged tunnel attributes
//! - Response Authenticator calculation
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Attribute, AttributeType, Code, Packet, TunnelAttribute};
//! use radius_proto::auth::{generate_request_authenticator, sign_response};
//!
//! let req_auth = generate_request_authenticator();
//! let mut request = Packet::new(Code::AccessRequest, 1, req_auth);
//! request.add_attribute(
//!     Attribute::string(AttributeType::CallingStationId as u8, "AA-BB-CC-DD-EE-FF").unwrap()
//! );
//!
//! let mut response = Packet::new(Code::AccessAccept, request.identifier, [0u8; 16]);
//! response.add_attribute(TunnelAttribute::private_group_id(0, 10).to_attribute().unwrap());
//! response.add_attribute(TunnelAttribute::vlan_tunnel_type(0).to_attribute().unwrap());
//! response.add_attribute(TunnelAttribute::ieee_802_medium(0).to_attribute().unwrap());
//! sign_response(&mut response, &request.authenticator, b"secret").unwrap();
//!
//! let bytes = response.encode().unwrap();
//! assert_eq!(Packet::decode(&bytes).unwrap().attributes.len(), 3);
//! ```

pub mod attributes;
pub mod auth;
pub mod packet;

pub use attributes::tunnel::{TUNNEL_MEDIUM_IEEE_802, TUNNEL_TYPE_VLAN};
pub use attributes::{Attribute, AttributeType, TunnelAttribute, TunnelValue};
pub use auth::{
    calculate_response_authenticator, generate_request_authenticator, sign_response,
    verify_response_authenticator,
};
pub use packet::{Code, Packet, PacketError};
