use crate::handler::AttributeSink;
use radius_proto::auth::sign_response;
use radius_proto::{Attribute, AttributeType, Code, Packet, PacketError, TunnelAttribute};
use tracing::warn;

/// Outbound response while the handler runs
///
/// Starts pending; the first `set_outcome` settles it and later calls are
/// ignored. A response that is never settled goes out as Access-Reject.
#[derive(Debug, Default)]
pub struct PendingResponse {
    outcome: Option<Code>,
    attributes: Vec<TunnelAttribute>,
}

impl PendingResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcome(&self) -> Option<Code> {
        self.outcome
    }

    pub fn attributes(&self) -> &[TunnelAttribute] {
        &self.attributes
    }

    /// Build the signed reply to `request`
    ///
    /// Proxy-State attributes are echoed back (RFC 2865 Section 5.33).
    pub fn into_packet(self, request: &Packet, secret: &[u8]) -> Result<Packet, PacketError> {
        let code = self.outcome.unwrap_or(Code::AccessReject);
        let mut response = Packet::new(code, request.identifier, [0u8; 16]);

        for tunnel in &self.attributes {
            response.add_attribute(Attribute::try_from(tunnel)?);
        }

        for attr in request.attributes_of(AttributeType::ProxyState) {
            response.add_attribute(attr.clone());
        }

        sign_response(&mut response, &request.authenticator, secret)?;
        Ok(response)
    }
}

impl AttributeSink for PendingResponse {
    fn set_outcome(&mut self, code: Code) {
        match self.outcome {
            None => self.outcome = Some(code),
            Some(settled) => warn!(
                settled = %settled,
                requested = %code,
                "Response outcome already set, ignoring"
            ),
        }
    }

    fn append(&mut self, attribute: TunnelAttribute) {
        self.attributes.push(attribute);
    }
}
