use crate::common::padding;
use crate::error::{StunError, StunErrorType};
use crate::types::{MAGIC_COOKIE, MAGIC_COOKIE_SIZE, TRANSACTION_ID_SIZE};
use crate::Decode;
use byteorder::{BigEndian, ByteOrder};
use fallible_iterator::{FallibleIterator, IntoFallibleIterator};
use std::convert::TryFrom;

// Stun message format
//       0                   1                   2                   3
//       0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//      |0 0|     STUN Message Type     |         Message Length        |
//      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//      |                         Magic Cookie                          |
//      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//      |                                                               |
//      |                     Transaction ID (96 bits)                  |
//      |                                                               |
//      +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

/// STUN message header size
pub const MESSAGE_HEADER_SIZE: usize = 20;
pub(crate) const ATTRIBUTE_HEADER_SIZE: usize = 4;

/// The STUN message header. Decoding enforces the two fixed invariants of
/// the header: the two most significant bits must be zero and the magic
/// cookie must be present; any violation is a
/// [`MalformedHeader`](crate::StunErrorType::MalformedHeader) error.
#[derive(Debug)]
pub struct MessageHeader<'a> {
    /// Message type, with the two most significant bits already discarded
    pub msg_type: u16,
    /// Message length
    pub msg_length: u16,
    /// Transaction Id
    pub transaction_id: &'a [u8; TRANSACTION_ID_SIZE],
}

impl<'a> TryFrom<&'a [u8; MESSAGE_HEADER_SIZE]> for MessageHeader<'a> {
    type Error = StunError;
    fn try_from(buff: &'a [u8; MESSAGE_HEADER_SIZE]) -> Result<Self, Self::Error> {
        let (attr, _) = MessageHeader::decode(buff)?;
        Ok(attr)
    }
}

impl<'a> PartialEq for MessageHeader<'a> {
    fn eq(&self, other: &Self) -> bool {
        self.msg_type == other.msg_type
            && self.msg_length == other.msg_length
            && self.transaction_id == other.transaction_id
    }
}

impl<'a> Eq for MessageHeader<'a> {}

impl<'a> Decode<'a> for MessageHeader<'a> {
    fn decode(buffer: &'a [u8]) -> Result<(Self, usize), StunError> {
        if buffer.len() < MESSAGE_HEADER_SIZE {
            return Err(StunError::new(
                StunErrorType::MalformedHeader,
                format!(
                    "Buffer size ({}) < header size ({})",
                    buffer.len(),
                    MESSAGE_HEADER_SIZE
                ),
            ));
        }

        let msg_type = BigEndian::read_u16(&buffer[..2]);
        if msg_type >> 14 != 0 {
            return Err(StunError::new(
                StunErrorType::MalformedHeader,
                "The two most significant bits are not zeroes",
            ));
        }
        let msg_length = BigEndian::read_u16(&buffer[2..4]);

        let cookie = <&[u8; MAGIC_COOKIE_SIZE]>::try_from(&buffer[4..8])?;
        if MAGIC_COOKIE.ne(cookie) {
            return Err(StunError::new(
                StunErrorType::MalformedHeader,
                format!(
                    "Magic cookie {:#010x} != {:#010x}",
                    BigEndian::read_u32(cookie),
                    MAGIC_COOKIE.as_u32()
                ),
            ));
        }
        let transaction_id = <&[u8; TRANSACTION_ID_SIZE]>::try_from(&buffer[8..20])?;

        Ok((
            Self {
                msg_type,
                msg_length,
                transaction_id,
            },
            MESSAGE_HEADER_SIZE,
        ))
    }
}

/// A STUN message split into its header and its raw attribute section,
/// with no attribute decoded yet.
#[derive(Debug)]
pub(crate) struct RawMessage<'a> {
    /// Message header
    pub header: MessageHeader<'a>,
    /// Attribute section, exactly as declared by the header length field
    pub attributes: &'a [u8],
}

impl<'a> Decode<'a> for RawMessage<'a> {
    fn decode(buffer: &'a [u8]) -> Result<(Self, usize), StunError> {
        let (header, _) = MessageHeader::decode(buffer)?;

        let value_size: usize = MESSAGE_HEADER_SIZE + header.msg_length as usize;
        if buffer.len() < value_size {
            return Err(StunError::new(
                StunErrorType::MalformedHeader,
                format!(
                    "Header declares {} bytes, buffer holds {}",
                    value_size,
                    buffer.len()
                ),
            ));
        }
        let attributes = &buffer[MESSAGE_HEADER_SIZE..value_size];

        Ok((Self { header, attributes }, value_size))
    }
}

// Format of STUN Attributes:
//      0                   1                   2                   3
//      0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//     |         Type                  |            Length             |
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//     |                         Value (variable)                ....
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawAttribute<'a> {
    /// Attribute type
    pub attr_type: u16,
    /// Attribute value of size equal to Length
    pub value: &'a [u8],
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawAttributes<'a>(&'a [u8]);

impl<'a> From<&'a [u8]> for RawAttributes<'a> {
    fn from(buff: &'a [u8]) -> Self {
        RawAttributes(buff)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RawAttributesIter<'a> {
    buffer: &'a [u8],
    pos: usize,
}

impl<'a> FallibleIterator for RawAttributesIter<'a> {
    type Item = RawAttribute<'a>;
    type Error = StunError;

    fn next(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        let remaining = &self.buffer[self.pos..];
        if remaining.is_empty() {
            return Ok(None);
        }
        if remaining.len() < ATTRIBUTE_HEADER_SIZE {
            // Some stacks emit stray bytes at the end of the attribute
            // section. Surface what was decoded instead of failing.
            log::warn!(
                "{} trailing bytes left in the attribute section, ignored",
                remaining.len()
            );
            self.pos = self.buffer.len();
            return Ok(None);
        }

        let attr_type = BigEndian::read_u16(&remaining[..2]);
        let attr_length = BigEndian::read_u16(&remaining[2..4]) as usize;
        let payload = &remaining[ATTRIBUTE_HEADER_SIZE..];
        if attr_length > payload.len() {
            return Err(StunError::new(
                StunErrorType::TruncatedAttribute,
                format!(
                    "Attribute {:#06x} claims {} bytes, {} remain",
                    attr_type,
                    attr_length,
                    payload.len()
                ),
            ));
        }

        // Peers are allowed to omit the padding of the last attribute when
        // it fills the buffer exactly.
        let pad = if attr_length == payload.len() {
            0
        } else {
            padding(attr_length)
        };
        self.pos += ATTRIBUTE_HEADER_SIZE + attr_length + pad;
        if self.pos > self.buffer.len() {
            log::warn!(
                "attribute {:#06x}: padding runs past the end of the attribute section",
                attr_type
            );
            self.pos = self.buffer.len();
        }

        Ok(Some(RawAttribute {
            attr_type,
            value: &payload[..attr_length],
        }))
    }
}

impl<'a> IntoFallibleIterator for RawAttributes<'a> {
    type Item = RawAttribute<'a>;
    type Error = StunError;
    type IntoFallibleIter = RawAttributesIter<'a>;

    fn into_fallible_iter(self) -> Self::IntoFallibleIter {
        RawAttributesIter {
            buffer: self.0,
            pos: 0,
        }
    }
}
