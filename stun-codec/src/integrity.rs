//! MESSAGE-INTEGRITY and FINGERPRINT trailers.
//!
//! Both trailers are regular TLV attributes on the wire, but their MAC/CRC
//! is computed over a message whose header length field already accounts
//! for the trailer being appended. The encoder therefore rewrites the
//! length field before digesting, and the decoder verifies against a copy
//! with the length field patched the same way.

use crate::error::{StunError, StunErrorType};
use crate::raw::{ATTRIBUTE_HEADER_SIZE, MESSAGE_HEADER_SIZE};
use crate::types::IntegrityKey;
use byteorder::{BigEndian, ByteOrder};
use hmacsha1::hmac_sha1;
use std::convert::TryFrom;

pub(crate) const MESSAGE_INTEGRITY: u16 = 0x0008;
pub(crate) const FINGERPRINT: u16 = 0x8028;

const MESSAGE_INTEGRITY_SIZE: usize = 20;
const FINGERPRINT_SIZE: usize = 4;

/// Full TLV sizes of the two trailers.
pub(crate) const MESSAGE_INTEGRITY_TLV_SIZE: usize =
    ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE;
pub(crate) const FINGERPRINT_TLV_SIZE: usize = ATTRIBUTE_HEADER_SIZE + FINGERPRINT_SIZE;

const FINGERPRINT_XOR_VALUE: u32 = 0x5354_554e;

fn crc32(input: &[u8]) -> u32 {
    crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC).checksum(input)
}

// The tail of `msg` is a trailer TLV iff its type and length fields match.
fn tail_is_tlv(msg: &[u8], attr_type: u16, value_size: usize) -> bool {
    let tlv_size = ATTRIBUTE_HEADER_SIZE + value_size;
    if msg.len() < MESSAGE_HEADER_SIZE + tlv_size {
        return false;
    }
    let tail = &msg[msg.len() - tlv_size..];
    BigEndian::read_u16(&tail[..2]) == attr_type
        && BigEndian::read_u16(&tail[2..4]) as usize == value_size
}

/// Checks whether `msg` ends in a valid FINGERPRINT trailer. The CRC
/// covers everything before the trailer, with the header length field as
/// found on the wire (it already includes the trailer).
///
/// Returns the verification result and the number of bytes the message
/// spans once a verified trailer is stripped. A missing or unverifiable
/// trailer leaves the message untouched.
pub(crate) fn check_fingerprint(msg: &[u8]) -> (bool, usize) {
    if !tail_is_tlv(msg, FINGERPRINT, FINGERPRINT_SIZE) {
        return (false, msg.len());
    }
    let end = msg.len() - FINGERPRINT_TLV_SIZE;
    let wire_value = BigEndian::read_u32(&msg[msg.len() - FINGERPRINT_SIZE..]);
    if crc32(&msg[..end]) ^ FINGERPRINT_XOR_VALUE == wire_value {
        (true, end)
    } else {
        log::debug!("FINGERPRINT CRC mismatch, trailer kept as a plain attribute");
        (false, msg.len())
    }
}

/// Checks whether `msg` (with any fingerprint already stripped) ends in a
/// MESSAGE-INTEGRITY trailer that verifies under `key`. The HMAC input is
/// the message up to the trailer with the header length field patched to
/// include the trailer itself.
///
/// Returns the verification result and the number of bytes the message
/// spans once a verified trailer is stripped. Without a usable key, or on
/// MAC mismatch, the trailer stays in place and later decodes as a raw
/// attribute.
pub(crate) fn check_integrity(msg: &[u8], key: Option<&IntegrityKey>) -> (bool, usize) {
    let key = match key {
        Some(key) if !key.is_empty() => key,
        _ => return (false, msg.len()),
    };
    if !tail_is_tlv(msg, MESSAGE_INTEGRITY, MESSAGE_INTEGRITY_SIZE) {
        return (false, msg.len());
    }

    let end = msg.len() - MESSAGE_INTEGRITY_TLV_SIZE;
    let mut input = msg[..end].to_vec();
    // The length field must point at the end of the MESSAGE-INTEGRITY
    // value, whatever followed it on the wire.
    BigEndian::write_u16(
        &mut input[2..4],
        (msg.len() - MESSAGE_HEADER_SIZE) as u16,
    );

    let expected = hmac_sha1(key.as_bytes(), &input);
    if expected[..] == msg[msg.len() - MESSAGE_INTEGRITY_SIZE..] {
        (true, end)
    } else {
        log::debug!("MESSAGE-INTEGRITY HMAC mismatch, trailer kept as a plain attribute");
        (false, msg.len())
    }
}

// Bumps the header length field by `tlv_size` so the digest covers the
// trailer about to be appended.
fn grow_length(msg: &mut [u8], tlv_size: usize) -> Result<(), StunError> {
    let new_length = u16::try_from(msg.len() - MESSAGE_HEADER_SIZE + tlv_size).map_err(|_| {
        StunError::new(
            StunErrorType::ValueTooLong,
            "Attribute section does not fit in the header length field",
        )
    })?;
    BigEndian::write_u16(&mut msg[2..4], new_length);
    Ok(())
}

/// Appends a MESSAGE-INTEGRITY trailer to an encoded message, rewriting
/// the header length field first so the HMAC covers it.
pub(crate) fn append_integrity(msg: &mut Vec<u8>, key: &IntegrityKey) -> Result<(), StunError> {
    grow_length(msg, MESSAGE_INTEGRITY_TLV_SIZE)?;
    let mac = hmac_sha1(key.as_bytes(), msg);

    let mut tlv = [0u8; ATTRIBUTE_HEADER_SIZE];
    BigEndian::write_u16(&mut tlv[..2], MESSAGE_INTEGRITY);
    BigEndian::write_u16(&mut tlv[2..4], MESSAGE_INTEGRITY_SIZE as u16);
    msg.extend_from_slice(&tlv);
    msg.extend_from_slice(&mac);
    Ok(())
}

/// Appends a FINGERPRINT trailer to an encoded message, rewriting the
/// header length field first so the CRC covers it.
pub(crate) fn append_fingerprint(msg: &mut Vec<u8>) -> Result<(), StunError> {
    grow_length(msg, FINGERPRINT_TLV_SIZE)?;
    let crc = crc32(msg) ^ FINGERPRINT_XOR_VALUE;

    let mut tlv = [0u8; FINGERPRINT_TLV_SIZE];
    BigEndian::write_u16(&mut tlv[..2], FINGERPRINT);
    BigEndian::write_u16(&mut tlv[2..4], FINGERPRINT_SIZE as u16);
    BigEndian::write_u32(&mut tlv[4..], crc);
    msg.extend_from_slice(&tlv);
    Ok(())
}
