//! STUN codec library.
//!
//! This crate provides a pure, stateless encoder/decoder for STUN messages.
//! The implementation is based on:
//! * [`RFC5389`](https://datatracker.ietf.org/doc/html/rfc5389). Session Traversal Utilities for NAT (STUN).
//! * [`RFC3489`](https://datatracker.ietf.org/doc/html/rfc3489). Legacy STUN attributes.
//! * [`RFC5766`](https://datatracker.ietf.org/doc/html/rfc5766). Traversal Using Relays around NAT (TURN) attributes.
//! * [`RFC5245`](https://datatracker.ietf.org/doc/html/rfc5245). Interactive Connectivity Establishment (ICE) attributes.
//! * [`RFC5769`](https://datatracker.ietf.org/doc/html/rfc5769). Test Vectors for Session Traversal Utilities for NAT (STUN).
//!
//! Attribute payloads are decoded by the shape a fixed registry declares
//! for each attribute type; types the registry does not know pass through
//! as raw values rather than failing the message. The MESSAGE-INTEGRITY
//! (HMAC-SHA1) and FINGERPRINT (CRC-32) trailers are verified and stripped
//! by the decoder and recomputed by the encoder; a trailer that fails
//! verification only clears the corresponding flag on the decoded message,
//! it never aborts the decode.
//!
//! # Usage
//! Example that creates and encodes a STUN Binding request
//!```rust
//! # use stun_codec::{Attribute, AttributeValue, IntegrityKey, MessageClass,
//! #   StunMessageBuilder};
//! # use stun_codec::methods::BINDING;
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let key = IntegrityKey::long_term(
//!     "\u{30DE}\u{30C8}\u{30EA}\u{30C3}\u{30AF}\u{30B9}",
//!     "example.org",
//!     "TheMatrIX",
//! );
//!
//! let msg = StunMessageBuilder::new(BINDING, MessageClass::Request)
//!     .with_attribute(Attribute::new(
//!         "username",
//!         AttributeValue::value("\u{30DE}\u{30C8}\u{30EA}\u{30C3}\u{30AF}\u{30B9}"),
//!     )?)
//!     .with_attribute(Attribute::new(
//!         "nonce",
//!         AttributeValue::value("f//499k954d6OL34oL9FSTvy64sA"),
//!     )?)
//!     .with_attribute(Attribute::new(
//!         "realm",
//!         AttributeValue::value("example.org"),
//!     )?)
//!     .with_integrity(key)
//!     .build();
//!
//! let buffer = stun_codec::encode(&msg)?;
//! assert_eq!(buffer.len(), 116);
//! #
//! #   Ok(())
//! # }
//!```
//!
//! Example that decodes a STUN Binding response and fetches some attributes.
//!```rust
//! # use stun_codec::{IntegrityKey, MessageClass};
//! # use stun_codec::methods::BINDING;
//! # use std::net::{IpAddr, Ipv4Addr};
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! // This response uses the following parameter:
//! // Password: `VOkJxbRl1RmTxUk/WvJxBt` (without quotes)
//! // Software name: "test vector" (without quotes)
//! // Mapped address: 192.0.2.1 port 32853
//! let sample_ipv4_response = [
//!     0x01, 0x01, 0x00, 0x3c, // Response type and message length
//!     0x21, 0x12, 0xa4, 0x42, // Magic cookie
//!     0xb7, 0xe7, 0xa7, 0x01, // }
//!     0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
//!     0xfa, 0x87, 0xdf, 0xae, // }
//!     0x80, 0x22, 0x00, 0x0b, // SOFTWARE attribute header
//!     0x74, 0x65, 0x73, 0x74, // }
//!     0x20, 0x76, 0x65, 0x63, // }  UTF-8 server name
//!     0x74, 0x6f, 0x72, 0x20, // }
//!     0x00, 0x20, 0x00, 0x08, // XOR-MAPPED-ADDRESS attribute header
//!     0x00, 0x01, 0xa1, 0x47, // Address family (IPv4) and xor'd mapped port number
//!     0xe1, 0x12, 0xa6, 0x43, // Xor'd mapped IPv4 address
//!     0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
//!     0x2b, 0x91, 0xf5, 0x99, // }
//!     0xfd, 0x9e, 0x90, 0xc3, // }
//!     0x8c, 0x74, 0x89, 0xf9, // } HMAC-SHA1 fingerprint
//!     0x2a, 0xf9, 0xba, 0x53, // }
//!     0xf0, 0x6b, 0xe7, 0xd7, // }
//!     0x80, 0x28, 0x00, 0x04, // FINGERPRINT attribute header
//!     0xc0, 0x7d, 0x4c, 0x96, // CRC32 fingerprint
//! ];
//!
//! let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");
//! let msg = stun_codec::decode(&sample_ipv4_response, Some(&key))?;
//!
//! // Check message method is a BINDING response
//! assert_eq!(msg.method(), BINDING);
//! assert_eq!(msg.class(), MessageClass::SuccessResponse);
//!
//! // Both trailers verified
//! assert!(msg.integrity());
//! assert!(msg.fingerprint());
//!
//! let software = msg.get("software").ok_or("Software attribute not found")?;
//! assert_eq!(software.as_bytes(), Some(&b"test vector"[..]));
//!
//! let socket = msg
//!     .get("xor_mapped_address")
//!     .ok_or("XorMappedAddress attribute not found")?
//!     .as_socket_address()
//!     .ok_or("Expected a socket address")?;
//! assert_eq!(socket.ip(), IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
//! assert_eq!(socket.port(), 32853);
//! #
//! #   Ok(())
//! # }
//!```

#![deny(missing_docs)]

mod attributes;
mod codec;
mod common;
mod integrity;
mod message;
mod raw;
mod registry;
mod types;

pub mod error;
pub mod methods;

pub use crate::attributes::{Attribute, AttributeValue, Change};
pub use crate::codec::{
    MessageDecoder, MessageDecoderBuilder, MessageEncoder, MessageEncoderBuilder,
};
pub use crate::error::{StunDecodeError, StunEncodeError, StunError, StunErrorType};
pub use crate::message::{
    MessageClass, MessageMethod, MessageType, StunMessage, StunMessageBuilder,
};
pub use crate::raw::{MessageHeader, MESSAGE_HEADER_SIZE};
pub use crate::registry::AttributeShape;
pub use crate::types::{Cookie, ErrorCode, IntegrityKey, TransactionId, MAGIC_COOKIE};

/// Provides a simple interface to encode elements into buffers.
pub(crate) trait Encode {
    /// Encodes an object in binary using network-oriented format.
    /// # Arguments:
    /// - `buffer`- output buffer where the data will be serialized.
    /// # Returns:
    /// The size in bytes taken by the serialized object or
    /// a [`StunError`] describing the error.
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, StunError>;
}

/// Provides a simple interface to decode elements from buffers.
pub(crate) trait Decode<'a> {
    /// Decodes an object serialized in binary from a buffer.
    /// # Arguments:
    /// - `buffer`: input buffer were the object is encoded.
    /// # Returns:
    /// The object or a [`StunError`] describing the error.
    fn decode(buffer: &'a [u8]) -> Result<(Self, usize), StunError>
    where
        Self: Sized;
}

/// Decodes a STUN message from a buffer.
/// # Arguments:
/// - `buffer` - Raw buffer containing the STUN message.
/// - `key` - Optional key used to verify the MESSAGE-INTEGRITY trailer.
/// # Returns:
/// The decoded [`StunMessage`], or a [`StunDecodeError`] when the header is
/// malformed or an attribute is truncated. Trailer verification failures
/// are reported through the `integrity` and `fingerprint` flags of the
/// message, never as errors.
pub fn decode(buffer: &[u8], key: Option<&IntegrityKey>) -> Result<StunMessage, StunDecodeError> {
    let mut builder = MessageDecoderBuilder::default();
    if let Some(key) = key {
        builder = builder.with_key(key.clone());
    }
    let (msg, _) = builder.build().decode(buffer)?;
    Ok(msg)
}

/// Encodes a STUN message into a freshly owned buffer.
/// # Arguments:
/// - `msg` - The STUN message.
/// # Returns:
/// The encoded bytes, with MESSAGE-INTEGRITY appended when the message
/// carries a non-empty key and FINGERPRINT appended when the message asks
/// for one.
pub fn encode(msg: &StunMessage) -> Result<Vec<u8>, StunEncodeError> {
    MessageEncoderBuilder::default().build().encode(msg)
}
