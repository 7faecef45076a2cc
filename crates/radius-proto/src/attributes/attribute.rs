use super::AttributeType;
use crate::packet::PacketError;
use std::borrow::Cow;
use std::io::{Cursor, Read, Write};

/// RADIUS Attribute structure as defined in RFC 2865 Section 5
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Type      |    Length     |  Value ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Attribute type (1 byte)
    pub attr_type: u8,
    /// Attribute value (0-253 bytes)
    pub value: Vec<u8>,
}

impl Attribute {
    /// Minimum attribute length (type + length fields = 2 bytes)
    pub const MIN_LENGTH: usize = 2;
    /// Maximum attribute length (255 bytes including type and length)
    pub const MAX_LENGTH: usize = 255;
    /// Maximum value length (253 bytes)
    pub const MAX_VALUE_LENGTH: usize = 253;
    /// Largest tag that identifies a tunnel (RFC 2868 Section 3.1)
    pub const MAX_TAG: u8 = 0x1F;

    pub fn new(attr_type: u8, value: Vec<u8>) -> Result<Self, PacketError> {
        if value.len() > Self::MAX_VALUE_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Attribute value too long: {} bytes (max {})",
                value.len(),
                Self::MAX_VALUE_LENGTH
            )));
        }
        Ok(Attribute { attr_type, value })
    }

    /// Create a string attribute
    pub fn string(attr_type: u8, value: impl Into<String>) -> Result<Self, PacketError> {
        Self::new(attr_type, value.into().into_bytes())
    }

    /// Create an integer attribute (32-bit big-endian)
    pub fn integer(attr_type: u8, value: u32) -> Result<Self, PacketError> {
        Self::new(attr_type, value.to_be_bytes().to_vec())
    }

    /// Create an IP address attribute
    pub fn ipv4(attr_type: u8, value: [u8; 4]) -> Result<Self, PacketError> {
        Self::new(attr_type, value.to_vec())
    }

    /// Create a tagged integer attribute (RFC 2868)
    ///
    /// The tag takes the high octet, leaving 24 bits for the value.
    pub fn tagged_integer(attr_type: u8, tag: u8, value: u32) -> Result<Self, PacketError> {
        if tag > Self::MAX_TAG {
            return Err(PacketError::AttributeError(format!("Invalid tag: {}", tag)));
        }
        if value > 0x00FF_FFFF {
            return Err(PacketError::AttributeError(format!(
                "Tagged integer out of range: {}",
                value
            )));
        }
        let mut bytes = value.to_be_bytes();
        bytes[0] = tag;
        Self::new(attr_type, bytes.to_vec())
    }

    /// Create a tagged string attribute (RFC 2868)
    ///
    /// The tag octet is always written, so an untagged value is sent
    /// with a leading `0x00`.
    pub fn tagged_string(attr_type: u8, tag: u8, value: &str) -> Result<Self, PacketError> {
        if tag > Self::MAX_TAG {
            return Err(PacketError::AttributeError(format!("Invalid tag: {}", tag)));
        }
        let mut bytes = Vec::with_capacity(value.len() + 1);
        bytes.push(tag);
        bytes.extend_from_slice(value.as_bytes());
        Self::new(attr_type, bytes)
    }

    /// Encode attribute to bytes
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let length = self.encoded_length();
        if length > Self::MAX_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Encoded attribute too long: {} bytes",
                length
            )));
        }

        let mut buffer = Vec::with_capacity(length);
        buffer.write_all(&[self.attr_type, length as u8])?;
        buffer.write_all(&self.value)?;

        Ok(buffer)
    }

    /// Decode attribute from bytes
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        if data.len() < Self::MIN_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Attribute data too short: {} bytes",
                data.len()
            )));
        }

        let mut cursor = Cursor::new(data);

        let mut header = [0u8; 2];
        cursor.read_exact(&mut header)?;
        let [attr_type, length] = header;
        let length = length as usize;

        if length < Self::MIN_LENGTH {
            return Err(PacketError::AttributeError(format!(
                "Invalid attribute length: {}",
                length
            )));
        }

        if data.len() < length {
            return Err(PacketError::AttributeError(format!(
                "Insufficient data for attribute: expected {}, got {}",
                length,
                data.len()
            )));
        }

        let mut value = vec![0u8; length - Self::MIN_LENGTH];
        cursor.read_exact(&mut value)?;

        Ok(Attribute { attr_type, value })
    }

    /// Get the encoded length of this attribute
    pub fn encoded_length(&self) -> usize {
        Self::MIN_LENGTH + self.value.len()
    }

    /// Known type of this attribute, if any
    pub fn known_type(&self) -> Option<AttributeType> {
        AttributeType::from_u8(self.attr_type)
    }

    /// Try to interpret value as a string
    pub fn as_string(&self) -> Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.value.clone())
    }

    /// Interpret value as text, replacing invalid UTF-8 sequences
    pub fn as_string_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Try to interpret value as an integer (32-bit big-endian)
    pub fn as_integer(&self) -> Result<u32, PacketError> {
        let bytes: [u8; 4] = self.value.as_slice().try_into().map_err(|_| {
            PacketError::AttributeError(format!(
                "Expected 4 bytes for integer, got {}",
                self.value.len()
            ))
        })?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Try to interpret value as a tagged integer, returning `(tag, value)`
    pub fn as_tagged_integer(&self) -> Result<(u8, u32), PacketError> {
        let raw = self.as_integer()?;
        Ok(((raw >> 24) as u8, raw & 0x00FF_FFFF))
    }

    /// Try to interpret value as a tagged string, returning `(tag, value)`
    ///
    /// A first octet above `0x1F` belongs to the string and the tag is 0.
    pub fn as_tagged_string(&self) -> Result<(u8, String), PacketError> {
        let (tag, rest) = match self.value.split_first() {
            Some((&tag, rest)) if tag <= Self::MAX_TAG => (tag, rest),
            _ => (0, self.value.as_slice()),
        };
        let text = String::from_utf8(rest.to_vec())
            .map_err(|e| PacketError::AttributeError(format!("Invalid UTF-8: {}", e)))?;
        Ok((tag, text))
    }
}
