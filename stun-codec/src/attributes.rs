//! STUN Attributes.
//!
//! Attribute payloads are decoded into a tagged [`AttributeValue`], picked
//! by the shape the [registry](crate::AttributeShape) declares for the
//! attribute type. Attribute types the registry does not know keep their
//! raw payload and are reported through the log facade instead of failing
//! the message.

use crate::common::{xor_decode, xor_encode};
use crate::error::{StunError, StunErrorType};
use crate::registry::{self, AttributeShape};
use crate::types::{ErrorCode, TransactionId};
use crate::{Decode, Encode};
use byteorder::{BigEndian, ByteOrder};
use enumflags2::{bitflags, BitFlags};
use std::net::SocketAddr;

// Change-request flag bits, RFC3489 11.2.4:
// 29 reserved bits, change-ip, change-port, 1 reserved bit.
const CHANGE_IP_BIT: u32 = 0x0000_0004;
const CHANGE_PORT_BIT: u32 = 0x0000_0002;

/// Flags carried by a change-request attribute.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Ask the server to answer from its alternate IP address
    Ip,
    /// Ask the server to answer from its alternate port
    Port,
}

/// A decoded attribute payload. The variant is the registry shape of the
/// attribute type; attribute types absent from the registry decode as
/// [`AttributeValue::Value`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Raw byte sequence, unmodified from the wire
    Value(Vec<u8>),
    /// An (IP, port) pair
    Address(SocketAddr),
    /// An (IP, port) pair that is XOR-masked on the wire with the magic
    /// cookie and, for IPv6, the transaction id
    XorAddress(SocketAddr),
    /// Numeric error code plus reason phrase
    Error(ErrorCode),
    /// Subset of the change-request flags
    ChangeRequest(BitFlags<Change>),
}

impl AttributeValue {
    /// Creates a raw value payload.
    pub fn value<T>(value: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        AttributeValue::Value(value.into())
    }

    /// Returns the raw bytes if this is a [`AttributeValue::Value`].
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttributeValue::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the socket address if this is an address or a XOR address.
    pub fn as_socket_address(&self) -> Option<&SocketAddr> {
        match self {
            AttributeValue::Address(addr) | AttributeValue::XorAddress(addr) => Some(addr),
            _ => None,
        }
    }

    /// Returns the error code if this is an error attribute.
    pub fn as_error_code(&self) -> Option<&ErrorCode> {
        match self {
            AttributeValue::Error(error_code) => Some(error_code),
            _ => None,
        }
    }

    /// Returns the flag set if this is a change-request attribute.
    pub fn as_change_request(&self) -> Option<BitFlags<Change>> {
        match self {
            AttributeValue::ChangeRequest(flags) => Some(*flags),
            _ => None,
        }
    }
}

/// One attribute of a [`StunMessage`](crate::StunMessage): the 16-bit
/// attribute type together with its decoded payload.
///
/// # Examples
///```rust
/// # use stun_codec::{Attribute, AttributeValue};
/// # use std::error::Error;
/// # use std::net::{IpAddr, Ipv4Addr, SocketAddr};
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let attr = Attribute::new("software", AttributeValue::value("STUN test client"))?;
/// assert_eq!(attr.code(), 0x8022);
/// assert_eq!(attr.name(), Some("software"));
///
/// let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)), 32853);
/// let attr = Attribute::new("xor_mapped_address", AttributeValue::XorAddress(addr))?;
/// assert_eq!(attr.code(), 0x0020);
/// #
/// #   Ok(())
/// # }
///```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    code: u16,
    value: AttributeValue,
}

impl Attribute {
    /// Creates an attribute from its registry name.
    /// # Returns:
    /// The attribute, or a [`StunError`] if the name is not registered.
    pub fn new(name: &str, value: AttributeValue) -> Result<Self, StunError> {
        let attr_row = registry::attribute_by_name(name).ok_or_else(|| {
            StunError::new(
                StunErrorType::InvalidParam,
                format!("Attribute name '{}' is not registered", name),
            )
        })?;
        Ok(Self {
            code: attr_row.code,
            value,
        })
    }

    /// Creates an attribute from a raw attribute type. This is the way to
    /// attach attribute types the registry does not know about.
    pub fn from_code(code: u16, value: AttributeValue) -> Self {
        Self { code, value }
    }

    /// Returns the 16-bit attribute type.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Returns the registry name of the attribute type, if it has one.
    pub fn name(&self) -> Option<&'static str> {
        registry::attribute_by_code(self.code).map(|attr_row| attr_row.name)
    }

    /// Returns the decoded payload.
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

/// Decodes one attribute payload, dispatching on the shape the registry
/// declares for `code`. Unknown attribute types are kept as raw values and
/// logged, never refused.
pub(crate) fn decode_value(
    code: u16,
    raw_value: &[u8],
    transaction_id: &TransactionId,
) -> Result<AttributeValue, StunError> {
    let attr_row = match registry::attribute_by_code(code) {
        Some(attr_row) => attr_row,
        None => {
            log::warn!(
                "unknown attribute type {:#06x} ({} bytes), kept as raw value",
                code,
                raw_value.len()
            );
            return Ok(AttributeValue::Value(raw_value.to_vec()));
        }
    };

    match attr_row.shape {
        AttributeShape::Value => Ok(AttributeValue::Value(raw_value.to_vec())),
        AttributeShape::Address => {
            let (addr, _) = SocketAddr::decode(raw_value)?;
            Ok(AttributeValue::Address(addr))
        }
        AttributeShape::XorAddress => {
            let (addr, _) = xor_decode(transaction_id.as_bytes(), raw_value)?;
            Ok(AttributeValue::XorAddress(addr))
        }
        AttributeShape::ErrorCode => {
            let (error_code, _) = ErrorCode::decode(raw_value)?;
            Ok(AttributeValue::Error(error_code))
        }
        AttributeShape::ChangeRequest => {
            let (bits, _) = u32::decode(raw_value)?;
            let mut flags = BitFlags::empty();
            if bits & CHANGE_IP_BIT != 0 {
                flags |= Change::Ip;
            }
            if bits & CHANGE_PORT_BIT != 0 {
                flags |= Change::Port;
            }
            Ok(AttributeValue::ChangeRequest(flags))
        }
    }
}

/// Encodes one attribute payload. The variant of the value, not the
/// registry, drives the wire form, so raw values round-trip even for
/// unregistered attribute types.
pub(crate) fn encode_value(
    value: &AttributeValue,
    transaction_id: &TransactionId,
) -> Result<Vec<u8>, StunError> {
    match value {
        AttributeValue::Value(bytes) => Ok(bytes.clone()),
        AttributeValue::Address(addr) => {
            let mut buffer = [0u8; 20];
            let size = addr.encode(&mut buffer)?;
            Ok(buffer[..size].to_vec())
        }
        AttributeValue::XorAddress(addr) => {
            let mut buffer = [0u8; 20];
            let size = xor_encode(transaction_id.as_bytes(), addr, &mut buffer)?;
            Ok(buffer[..size].to_vec())
        }
        AttributeValue::Error(error_code) => {
            let mut buffer = vec![0u8; 4 + error_code.reason().len()];
            error_code.encode(&mut buffer)?;
            Ok(buffer)
        }
        AttributeValue::ChangeRequest(flags) => {
            let mut bits = 0u32;
            if flags.contains(Change::Ip) {
                bits |= CHANGE_IP_BIT;
            }
            if flags.contains(Change::Port) {
                bits |= CHANGE_PORT_BIT;
            }
            let mut buffer = [0u8; 4];
            BigEndian::write_u32(&mut buffer, bits);
            Ok(buffer.to_vec())
        }
    }
}
