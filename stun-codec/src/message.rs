use crate::attributes::{Attribute, AttributeValue};
use crate::common::check_buffer_boundaries;
use crate::error::StunError;
use crate::{registry, Encode, IntegrityKey, TransactionId};
use byteorder::{BigEndian, ByteOrder};
use std::convert::{TryFrom, TryInto};
use std::fmt;

/// The message type defines the message class (request, success
/// response, error response, or indication) and the message method (the
/// primary function) of the STUN message. The 12-bit method and the
/// 2-bit class are interleaved across the 14 usable bits of the first
/// half-word:
///
/// ```text
/// bit:   0 1 | 2 3 4 5 6 7 | 8 | 9 10 11 | 12 | 13 14 15
/// field: 00  |   M0 (5)    |C0 |  M1 (3) | C1 |  M2 (4)
/// ```
///
/// # Examples
///```rust
/// # use stun_codec::{MessageClass, MessageMethod, MessageType};
/// # use stun_codec::methods::BINDING;
/// let msg_type = MessageType::new(BINDING, MessageClass::SuccessResponse);
/// assert_eq!(msg_type.as_u16(), 0x0101);
/// assert_eq!(msg_type.method(), BINDING);
/// assert_eq!(msg_type.class(), MessageClass::SuccessResponse);
///```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType {
    method: MessageMethod,
    class: MessageClass,
}

impl MessageType {
    /// Creates a new message type.
    /// # Arguments:
    /// - `method`- the message method.
    /// - `class` - The message class.
    pub fn new(method: MessageMethod, class: MessageClass) -> Self {
        Self { method, class }
    }

    /// Returns the message class.
    pub fn class(&self) -> MessageClass {
        self.class
    }

    /// Returns the message method
    pub fn method(&self) -> MessageMethod {
        self.method
    }

    /// Returns the [`u16`] representation of this [`MessageType`]
    pub fn as_u16(&self) -> u16 {
        ((self.method.0 & 0x1F80) << 2)
            | ((self.method.as_u16() & 0x0070) << 1)
            | (self.method.as_u16() & 0x000F)
            | ((self.class.as_u8() as u16 & 0x0002) << 7)
            | ((self.class.as_u8() as u16 & 0x0001) << 4)
    }
}

impl From<u16> for MessageType {
    fn from(value: u16) -> Self {
        // Discard two most significant bits
        let val = value & 0x3FFF;
        // There is no way this can fail. Value gotten will always fit into a u8
        // and it will be less or equal to 0x0003
        let class_u8: u8 = (((val & 0x0100) >> 7) | ((val & 0x0010) >> 4))
            .try_into()
            .unwrap();
        let class = MessageClass::try_from(class_u8).unwrap();
        // There is no way that method number falls out of the range 0x000-0xFFF
        let method_u16: u16 = ((val & 0x3E00) >> 2) | ((val & 0x00E0) >> 1) | (val & 0x000F);
        let method = MessageMethod::try_from(method_u16).unwrap();

        MessageType::new(method, class)
    }
}

impl From<&[u8; 2]> for MessageType {
    fn from(value: &[u8; 2]) -> Self {
        MessageType::from(BigEndian::read_u16(value))
    }
}

impl Encode for MessageType {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, StunError> {
        check_buffer_boundaries(buffer, 2)?;
        BigEndian::write_u16(buffer, self.as_u16());
        Ok(2)
    }
}

/// The STUN method is a 12 bits hex number in the range 0x000-0xFFF.
/// Named constants for the methods known to this library live in the
/// [`methods`](crate::methods) module; ids without a registered name pass
/// through the codec as raw integers.
///
/// # Examples
///```rust
/// # use stun_codec::{MessageMethod, StunErrorType};
/// # use std::convert::TryFrom;
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let binding = MessageMethod::try_from(0x001)?;
/// assert_eq!(binding.as_u16(), 0x001);
/// assert_eq!(binding.name(), Some("binding"));
///
/// // An unassigned method keeps its raw value and has no name
/// let method = MessageMethod::try_from(0x4f2)?;
/// assert_eq!(method.name(), None);
///
/// // Creating a message method out of 12 bits range 0x000-0xFFF
/// // will result in an error
/// assert_eq!(MessageMethod::try_from(0x1000).expect_err("Error expected"), StunErrorType::InvalidParam);
/// #
/// #   Ok(())
/// # }
///```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MessageMethod(pub(crate) u16);

impl MessageMethod {
    /// Returns the [`u16`] representation of this message method.
    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Returns the symbolic name of this method in the method registry, or
    /// `None` if the id is not registered.
    pub fn name(&self) -> Option<&'static str> {
        registry::method_name(self.0)
    }
}

impl TryFrom<u16> for MessageMethod {
    type Error = StunError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        (value & 0xF000 == 0)
            .then_some(MessageMethod(value))
            .ok_or_else(|| {
                StunError::new(
                    crate::StunErrorType::InvalidParam,
                    format!("Value '{:#02x}' is not a valid MessageMethod", value),
                )
            })
    }
}

impl fmt::Display for MessageMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{:#05x}", self.0),
        }
    }
}

/// The STUN message class. Although there are four
/// message classes, there are only two types of transactions in STUN:
/// request/response transactions (which consist of a request message and
/// a response message) and indication transactions (which consist of a
/// single indication message).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageClass {
    /// request
    Request,
    /// indication
    Indication,
    /// success response
    SuccessResponse,
    /// error response
    ErrorResponse,
}

impl MessageClass {
    pub(crate) fn as_u8(&self) -> u8 {
        match self {
            MessageClass::Request => 0b00,
            MessageClass::Indication => 0b01,
            MessageClass::SuccessResponse => 0b10,
            MessageClass::ErrorResponse => 0b11,
        }
    }

    /// Returns the symbolic name of this class in the class registry.
    pub fn name(&self) -> &'static str {
        // Every 2-bit value is registered
        registry::class_name(self.as_u8()).unwrap()
    }
}

impl TryFrom<u8> for MessageClass {
    type Error = StunError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0b00 => Ok(MessageClass::Request),
            0b01 => Ok(MessageClass::Indication),
            0b10 => Ok(MessageClass::SuccessResponse),
            0b11 => Ok(MessageClass::ErrorResponse),
            _ => Err(StunError::new(
                crate::StunErrorType::InvalidParam,
                format!("Value '{:#02x}' is not a valid MessageClass", value),
            )),
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug)]
struct StunMessageParameters {
    method: MessageMethod,
    class: MessageClass,
    transaction_id: Option<TransactionId>,
    integrity: bool,
    fingerprint: bool,
    key: Option<IntegrityKey>,
    attributes: Vec<Attribute>,
}

/// The [`StunMessageBuilder`] eases the creation of a [`StunMessage`]
///
/// # Examples
///```rust
/// # use stun_codec::{Attribute, AttributeValue, MessageClass, StunMessageBuilder};
/// # use stun_codec::methods::BINDING;
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// // Create a STUN request message with a random transaction ID.
/// let message = StunMessageBuilder::new(BINDING, MessageClass::Request)
///     .with_attribute(Attribute::new("username", AttributeValue::value("test-username"))?)
///     .with_attribute(Attribute::new("software", AttributeValue::value("test-software"))?)
///     .build();
///
/// let username = message.get("username").ok_or("UserName attribute not found")?;
/// assert_eq!(username.as_bytes(), Some(&b"test-username"[..]));
///
/// // Nonce attribute must return None
/// assert!(message.get("nonce").is_none());
/// #
/// #   Ok(())
/// # }
///```
#[derive(Debug)]
pub struct StunMessageBuilder(StunMessageParameters);

impl StunMessageBuilder {
    /// Creates a new builder.
    /// # Arguments:
    /// - `method` - Message method.
    /// - `class` - Message class.
    pub fn new(method: MessageMethod, class: MessageClass) -> StunMessageBuilder {
        Self(StunMessageParameters {
            method,
            class,
            transaction_id: None,
            integrity: false,
            fingerprint: false,
            key: None,
            attributes: Vec::new(),
        })
    }

    /// Creates a STUN message using an specific transaction ID. If no
    /// [`TransactionId`] is specified, a random one will be used
    pub fn with_transaction_id(mut self, transaction_id: TransactionId) -> Self {
        self.0.transaction_id = Some(transaction_id);
        self
    }

    /// Adds an attribute to the message. Attributes are encoded in the
    /// order they are added.
    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.0.attributes.push(attribute);
        self
    }

    /// Attaches a key to the message, so that the encoder appends a
    /// MESSAGE-INTEGRITY attribute computed with it.
    pub fn with_integrity(mut self, key: IntegrityKey) -> Self {
        self.0.integrity = true;
        self.0.key = Some(key);
        self
    }

    /// Asks the encoder to append a FINGERPRINT attribute.
    pub fn with_fingerprint(mut self) -> Self {
        self.0.fingerprint = true;
        self
    }

    /// Creates the STUN message.
    pub fn build(self) -> StunMessage {
        StunMessage {
            method: self.0.method,
            class: self.0.class,
            transaction_id: self.0.transaction_id.unwrap_or_default(),
            integrity: self.0.integrity,
            fingerprint: self.0.fingerprint,
            key: self.0.key,
            attributes: self.0.attributes,
        }
    }
}

/// The stun message is the basic unit of information interchanged between
/// two agents implementing the STUN protocol.
///
/// All STUN messages comprise a 20-byte header followed by zero or more
/// attributes, optionally terminated by the MESSAGE-INTEGRITY and
/// FINGERPRINT trailers. Messages are value objects: they are created by
/// the decoder or through the [`StunMessageBuilder`], and consumed by the
/// encoder.
///
/// Attributes are held as an ordered sequence, preserving wire order on
/// decode and insertion order on encode. [`StunMessage::get`] offers a
/// mapping view over that sequence keyed by attribute name.
#[derive(Debug)]
pub struct StunMessage {
    pub(crate) method: MessageMethod,
    pub(crate) class: MessageClass,
    pub(crate) transaction_id: TransactionId,
    pub(crate) integrity: bool,
    pub(crate) fingerprint: bool,
    pub(crate) key: Option<IntegrityKey>,
    pub(crate) attributes: Vec<Attribute>,
}

impl StunMessage {
    /// Returns the message method.
    pub fn method(&self) -> MessageMethod {
        self.method
    }

    /// Returns the message class
    pub fn class(&self) -> MessageClass {
        self.class
    }

    /// Returns the transaction-id
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// On a decoded message, whether a valid MESSAGE-INTEGRITY trailer was
    /// verified against the supplied key. On a message being built, whether
    /// the encoder will append one (it also requires a non-empty key).
    pub fn integrity(&self) -> bool {
        self.integrity
    }

    /// On a decoded message, whether a valid FINGERPRINT trailer was
    /// verified and stripped. On a message being built, whether the encoder
    /// will append one.
    pub fn fingerprint(&self) -> bool {
        self.fingerprint
    }

    /// The key used to verify or compute the MESSAGE-INTEGRITY trailer.
    pub fn key(&self) -> Option<&IntegrityKey> {
        self.key.as_ref()
    }

    /// Returns the attributes contained in this STUN message, in wire
    /// order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the value of the attribute with the given registry name, or
    /// `None` if there is no such attribute. If the same name appears more
    /// than once, the last value wins, matching mapping semantics where a
    /// later insert overwrites an earlier one.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        let attr_row = registry::attribute_by_name(name)?;
        self.get_code(attr_row.code)
    }

    /// Returns the value of the attribute with the given attribute type, or
    /// `None` if there is no such attribute. The last occurrence wins.
    pub fn get_code(&self, code: u16) -> Option<&AttributeValue> {
        self.attributes
            .iter()
            .rev()
            .find(|attr| attr.code() == code)
            .map(|attr| attr.value())
    }
}
