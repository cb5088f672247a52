use crate::attributes::{decode_value, encode_value, Attribute};
use crate::common::padding;
use crate::error::{
    StunAttributeError, StunDecodeError, StunEncodeError, StunError, StunErrorLevel, StunErrorType,
    StunMessageError,
};
use crate::integrity::{append_fingerprint, append_integrity, check_fingerprint, check_integrity};
use crate::message::{MessageType, StunMessage};
use crate::raw::{RawAttributes, RawMessage, ATTRIBUTE_HEADER_SIZE, MESSAGE_HEADER_SIZE};
use crate::types::{IntegrityKey, MAGIC_COOKIE};
use crate::Decode;
use byteorder::{BigEndian, ByteOrder};
use fallible_iterator::{FallibleIterator, IntoFallibleIterator};
use std::convert::TryFrom;

/// Builder class used to create a stun [`MessageDecoder`]
#[derive(Debug, Default)]
pub struct MessageDecoderBuilder(MessageDecoder);

impl MessageDecoderBuilder {
    /// Configure the decoder to verify MESSAGE-INTEGRITY trailers with a
    /// key. Without a key the trailer is never stripped and shows up as a
    /// raw attribute.
    pub fn with_key(mut self, key: IntegrityKey) -> Self {
        self.0.key = Some(key);
        self
    }

    /// Builds a [`MessageDecoder`]
    pub fn build(self) -> MessageDecoder {
        self.0
    }
}

/// Class used to decode STUN messages.
///
/// Decoding strips and verifies the FINGERPRINT trailer, then the
/// MESSAGE-INTEGRITY trailer (when a key is configured), and only then
/// walks the attribute stream. A trailer that fails verification is not an
/// error: the corresponding flag on the returned message stays `false` and
/// callers must refuse unauthenticated messages themselves.
#[derive(Debug, Default, Clone)]
pub struct MessageDecoder {
    key: Option<IntegrityKey>,
}

impl MessageDecoder {
    /// Decodes the STUN raw buffer
    /// # Arguments:
    /// - `buffer` - Raw buffer containing the STUN message
    /// # Returns:
    /// A tuple with the [`StunMessage`] itself and the size consumed from
    /// the buffer, or an error describing the problem if the message could
    /// not be decoded.
    pub fn decode(&self, buffer: &[u8]) -> Result<(StunMessage, usize), StunDecodeError> {
        let (raw_msg, size) = RawMessage::decode(buffer)
            .map_err(|error| StunDecodeError(StunErrorLevel::Message(StunMessageError(error))))?;

        let msg = &buffer[..size];
        let (fingerprint, end) = check_fingerprint(msg);
        let (integrity, end) = check_integrity(&msg[..end], self.key.as_ref());

        let msg_type = MessageType::from(raw_msg.header.msg_type);
        let transaction_id = crate::TransactionId::from(raw_msg.header.transaction_id);

        // Parse raw attributes, trailers excluded
        let attributes = RawAttributes::from(&msg[MESSAGE_HEADER_SIZE..end]);
        let mut iter = attributes.into_fallible_iter();
        let mut decoded = Vec::new();
        let mut position = 0;

        while let Some(raw_attr) = iter.next().map_err(|error| {
            StunDecodeError(StunErrorLevel::Attribute(StunAttributeError {
                attr_type: None,
                position,
                error,
            }))
        })? {
            let value =
                decode_value(raw_attr.attr_type, raw_attr.value, &transaction_id).map_err(
                    |error| {
                        StunDecodeError(StunErrorLevel::Attribute(StunAttributeError {
                            attr_type: Some(raw_attr.attr_type),
                            position,
                            error,
                        }))
                    },
                )?;
            decoded.push(Attribute::from_code(raw_attr.attr_type, value));
            position += 1;
        }

        Ok((
            StunMessage {
                method: msg_type.method(),
                class: msg_type.class(),
                transaction_id,
                integrity,
                fingerprint,
                key: self.key.clone(),
                attributes: decoded,
            },
            size,
        ))
    }

    /// Gets the key associated to this decoder
    pub fn key(&self) -> Option<&IntegrityKey> {
        self.key.as_ref()
    }
}

/// Builder class used to create a stun [`MessageEncoder`]
#[derive(Debug, Default)]
pub struct MessageEncoderBuilder(MessageEncoder);

impl MessageEncoderBuilder {
    /// Builds a [`MessageEncoder`]
    pub fn build(self) -> MessageEncoder {
        self.0
    }
}

/// Class used to encode STUN messages.
///
/// Attributes are encoded in the order the message holds them. When the
/// message asks for integrity and carries a non-empty key, a
/// MESSAGE-INTEGRITY trailer is appended; when it asks for a fingerprint,
/// a FINGERPRINT trailer goes last. Each trailer rewrites the header
/// length field before its MAC/CRC is computed.
#[derive(Debug, Default, Clone)]
pub struct MessageEncoder {}

impl MessageEncoder {
    /// Encodes a STUN message.
    /// # Arguments:
    /// - `msg` - The STUN message.
    /// # Returns:
    /// The encoded message as a freshly owned buffer, or a
    /// [`StunEncodeError`] describing the error if the message could not
    /// be encoded.
    pub fn encode(&self, msg: &StunMessage) -> Result<Vec<u8>, StunEncodeError> {
        let mut buffer = vec![0u8; MESSAGE_HEADER_SIZE];

        BigEndian::write_u16(
            &mut buffer[..2],
            MessageType::new(msg.method(), msg.class()).as_u16(),
        );
        BigEndian::write_u32(&mut buffer[4..8], MAGIC_COOKIE.as_u32());
        buffer[8..MESSAGE_HEADER_SIZE].copy_from_slice(msg.transaction_id().as_bytes());

        for (position, attr) in msg.attributes().iter().enumerate() {
            let raw_value = encode_value(attr.value(), msg.transaction_id()).map_err(|error| {
                StunEncodeError(StunErrorLevel::Attribute(StunAttributeError {
                    attr_type: Some(attr.code()),
                    position,
                    error,
                }))
            })?;
            let value_size = u16::try_from(raw_value.len()).map_err(|_| {
                StunEncodeError(StunErrorLevel::Attribute(StunAttributeError {
                    attr_type: Some(attr.code()),
                    position,
                    error: StunError::new(
                        StunErrorType::ValueTooLong,
                        format!(
                            "Value length ({}) does not fit in the attribute length field",
                            raw_value.len()
                        ),
                    ),
                }))
            })?;

            let mut tlv_header = [0u8; ATTRIBUTE_HEADER_SIZE];
            BigEndian::write_u16(&mut tlv_header[..2], attr.code());
            BigEndian::write_u16(&mut tlv_header[2..4], value_size);
            buffer.extend_from_slice(&tlv_header);
            buffer.extend_from_slice(&raw_value);
            // Padding bits MUST be set to zero on sending
            buffer.resize(buffer.len() + padding(raw_value.len()), 0x00);
        }

        let length = u16::try_from(buffer.len() - MESSAGE_HEADER_SIZE).map_err(|_| {
            StunEncodeError(StunErrorLevel::Message(StunMessageError(StunError::new(
                StunErrorType::ValueTooLong,
                "Attribute section does not fit in the header length field",
            ))))
        })?;
        BigEndian::write_u16(&mut buffer[2..4], length);

        if msg.integrity() {
            match msg.key() {
                Some(key) if !key.is_empty() => {
                    append_integrity(&mut buffer, key).map_err(|error| {
                        StunEncodeError(StunErrorLevel::Message(StunMessageError(error)))
                    })?;
                }
                _ => {}
            }
        }
        if msg.fingerprint() {
            append_fingerprint(&mut buffer).map_err(|error| {
                StunEncodeError(StunErrorLevel::Message(StunMessageError(error)))
            })?;
        }

        Ok(buffer)
    }
}
