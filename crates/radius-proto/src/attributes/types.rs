/// RADIUS Attribute Types used by MAC authentication (RFC 2865, RFC 2868)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// NAS-IP-Address (4) - RFC 2865
    NasIpAddress = 4,
    /// NAS-Port (5) - RFC 2865
    NasPort = 5,
    /// Service-Type (6) - RFC 2865
    ServiceType = 6,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// State (24) - RFC 2865
    State = 24,
    /// Class (25) - RFC 2865
    Class = 25,
    /// Vendor-Specific (26) - RFC 2865
    VendorSpecific = 26,
    /// Session-Timeout (27) - RFC 2865
    SessionTimeout = 27,
    /// Called-Station-Id (30) - RFC 2865
    CalledStationId = 30,
    /// Calling-Station-Id (31) - RFC 2865
    /// Carries the MAC address of the device on 802.1X and MAB requests
    CallingStationId = 31,
    /// NAS-Identifier (32) - RFC 2865
    NasIdentifier = 32,
    /// Proxy-State (33) - RFC 2865
    ProxyState = 33,
    /// NAS-Port-Type (61) - RFC 2865
    NasPortType = 61,
    /// Tunnel-Type (64) - RFC 2868
    TunnelType = 64,
    /// Tunnel-Medium-Type (65) - RFC 2868
    TunnelMediumType = 65,
    /// Message-Authenticator (80) - RFC 2869
    MessageAuthenticator = 80,
    /// Tunnel-Private-Group-Id (81) - RFC 2868
    /// Holds the VLAN id when Tunnel-Type is VLAN
    TunnelPrivateGroupId = 81,
}

/// Every known attribute, in code order
const ALL: [AttributeType; 19] = [
    AttributeType::UserName,
    AttributeType::UserPassword,
    AttributeType::NasIpAddress,
    AttributeType::NasPort,
    AttributeType::ServiceType,
    AttributeType::ReplyMessage,
    AttributeType::State,
    AttributeType::Class,
    AttributeType::VendorSpecific,
    AttributeType::SessionTimeout,
    AttributeType::CalledStationId,
    AttributeType::CallingStationId,
    AttributeType::NasIdentifier,
    AttributeType::ProxyState,
    AttributeType::NasPortType,
    AttributeType::TunnelType,
    AttributeType::TunnelMediumType,
    AttributeType::MessageAuthenticator,
    AttributeType::TunnelPrivateGroupId,
];

impl AttributeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        ALL.iter().copied().find(|t| t.as_u8() == value)
    }

    /// Look up an attribute by its dictionary name, e.g. `"Calling-Station-Id"`.
    ///
    /// Matching ignores ASCII case, since dictionaries disagree on
    /// `Tunnel-Private-Group-Id` versus `Tunnel-Private-Group-ID`.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL.iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Dictionary name of the attribute
    pub fn name(self) -> &'static str {
        match self {
            AttributeType::UserName => "User-Name",
            AttributeType::UserPassword => "User-Password",
            AttributeType::NasIpAddress => "NAS-IP-Address",
            AttributeType::NasPort => "NAS-Port",
            AttributeType::ServiceType => "Service-Type",
            AttributeType::ReplyMessage => "Reply-Message",
            AttributeType::State => "State",
            AttributeType::Class => "Class",
            AttributeType::VendorSpecific => "Vendor-Specific",
            AttributeType::SessionTimeout => "Session-Timeout",
            AttributeType::CalledStationId => "Called-Station-Id",
            AttributeType::CallingStationId => "Calling-Station-Id",
            AttributeType::NasIdentifier => "NAS-Identifier",
            AttributeType::ProxyState => "Proxy-State",
            AttributeType::NasPortType => "NAS-Port-Type",
            AttributeType::TunnelType => "Tunnel-Type",
            AttributeType::TunnelMediumType => "Tunnel-Medium-Type",
            AttributeType::MessageAuthenticator => "Message-Authenticator",
            AttributeType::TunnelPrivateGroupId => "Tunnel-Private-Group-Id",
        }
    }

    /// Whether the attribute carries an RFC 2868 tag octet
    pub fn is_tagged(self) -> bool {
        matches!(
            self,
            AttributeType::TunnelType
                | AttributeType::TunnelMediumType
                | AttributeType::TunnelPrivateGroupId
        )
    }
}

impl std::fmt::Display for AttributeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.as_u8())
    }
}
