use crate::common::check_buffer_boundaries;
use crate::error::{StunError, StunErrorType};
use crate::Encode;
use byteorder::{BigEndian, ByteOrder};
use rand::distributions::{Distribution, Standard};
use rand::Rng;
use std::convert::TryInto;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub(crate) const MAGIC_COOKIE_SIZE: usize = 4;
pub(crate) const TRANSACTION_ID_SIZE: usize = 12;

/// STUN message cookie
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cookie(u32);

impl Cookie {
    /// Returns the [`u32`] representation of the cookie
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl PartialEq<u32> for Cookie {
    fn eq(&self, other: &u32) -> bool {
        self.0 == *other
    }
}

impl PartialEq<Cookie> for u32 {
    fn eq(&self, other: &Cookie) -> bool {
        *self == other.0
    }
}

impl PartialEq<[u8; MAGIC_COOKIE_SIZE]> for Cookie {
    fn eq(&self, other: &[u8; MAGIC_COOKIE_SIZE]) -> bool {
        self.0 == BigEndian::read_u32(other)
    }
}

impl PartialEq<Cookie> for [u8; MAGIC_COOKIE_SIZE] {
    fn eq(&self, other: &Cookie) -> bool {
        other.0 == BigEndian::read_u32(self)
    }
}

/// STUN magic cookie. The decoder rejects any message that does not carry
/// this value in bytes 4..8 of the header.
pub const MAGIC_COOKIE: Cookie = Cookie(0x2112_A442);

/// The transaction ID is a 96-bit identifier, used to uniquely identify
/// STUN transactions. It primarily serves to correlate requests with
/// responses, though it also plays a small role in helping to prevent
/// certain types of attacks. It is carried in big-endian wire order and
/// passes through encode and decode unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId([u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    /// Returns a reference to the bytes that represents the identifier.
    pub fn as_bytes(&self) -> &[u8; TRANSACTION_ID_SIZE] {
        &self.0
    }

    /// Returns the identifier as an unsigned 96-bit value.
    pub fn as_u128(&self) -> u128 {
        let mut buffer = [0u8; 16];
        buffer[4..].copy_from_slice(&self.0);
        u128::from_be_bytes(buffer)
    }
}

fn fmt_transaction_id(bytes: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for byte in bytes {
        write!(f, "{:02X}", byte)?;
    }
    write!(f, ")")
}

impl fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "TransactionId(0x")?;
        fmt_transaction_id(self.as_ref(), f)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "transaction id (0x")?;
        fmt_transaction_id(self.as_ref(), f)
    }
}

impl Deref for TransactionId {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8]> for TransactionId {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<&[u8; TRANSACTION_ID_SIZE]> for TransactionId {
    fn from(buff: &[u8; TRANSACTION_ID_SIZE]) -> Self {
        Self(*buff)
    }
}

impl From<[u8; TRANSACTION_ID_SIZE]> for TransactionId {
    fn from(buff: [u8; TRANSACTION_ID_SIZE]) -> Self {
        Self(buff)
    }
}

impl From<u128> for TransactionId {
    /// Takes the low 96 bits of the value, in big-endian byte order.
    fn from(value: u128) -> Self {
        let bytes = value.to_be_bytes();
        let mut buffer = [0u8; TRANSACTION_ID_SIZE];
        buffer.copy_from_slice(&bytes[4..]);
        Self(buffer)
    }
}

impl Distribution<TransactionId> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TransactionId {
        let mut buffer = [0u8; TRANSACTION_ID_SIZE];
        rng.fill_bytes(&mut buffer);
        TransactionId::from(buffer)
    }
}

impl Default for TransactionId {
    /// Creates a cryptographically random transaction ID chosen from the
    /// interval 0 .. 2**96-1.
    fn default() -> Self {
        let mut rng = rand::thread_rng();
        rng.gen()
    }
}

/// Key used for the MESSAGE-INTEGRITY trailer. The codec treats the key as
/// opaque bytes; which bytes to use is the caller's credential policy.
///
/// # Examples:
///```rust
/// # use stun_codec::IntegrityKey;
/// // Short-term credentials use the password bytes verbatim
/// let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");
/// assert_eq!(key.as_bytes(), b"VOkJxbRl1RmTxUk/WvJxBt");
///
/// // Long-term credentials use MD5(username ":" realm ":" password).
/// // Note that no SASLprep processing is applied to the password.
/// let key = IntegrityKey::long_term("user", "realm", "pass");
/// let expected_hash = [
///     0x84, 0x93, 0xFB, 0xC5, 0x3B, 0xA5, 0x82, 0xFB,
///     0x4C, 0x04, 0x4C, 0x45, 0x6B, 0xDC, 0x40, 0xEB,
/// ];
/// assert_eq!(key.as_bytes(), expected_hash);
///```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IntegrityKey(Arc<Vec<u8>>);

impl IntegrityKey {
    /// Creates a key from raw bytes.
    pub fn new<T>(key: T) -> Self
    where
        T: Into<Vec<u8>>,
    {
        IntegrityKey(Arc::new(key.into()))
    }

    /// Creates a short-term credential key, which uses the password bytes
    /// as they are.
    pub fn short_term<S>(password: S) -> Self
    where
        S: AsRef<str>,
    {
        IntegrityKey::new(password.as_ref().as_bytes())
    }

    /// Creates a long-term credential key,
    /// `MD5(username ":" realm ":" password)`. The resulting key length is
    /// 16 bytes. SASLprep is not applied; callers that need it must prepare
    /// the password themselves.
    pub fn long_term<A, B, C>(username: A, realm: B, password: C) -> Self
    where
        A: AsRef<str>,
        B: AsRef<str>,
        C: AsRef<str>,
    {
        let key_str = format!(
            "{}:{}:{}",
            username.as_ref(),
            realm.as_ref(),
            password.as_ref()
        );
        let digest = md5::compute(key_str.as_bytes());
        IntegrityKey(Arc::new(digest.0.to_vec()))
    }

    /// Gets the bytes representation of the key
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Whether the key holds no bytes. Empty keys are treated as absent by
    /// both the encoder and the decoder.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

const MIN_ERROR_CODE: u16 = 300;
const MAX_ERROR_CODE: u16 = 700;

/// The `ErrorCode` contains a numeric error code value in the range of 300
/// to 699 plus a textual reason phrase encoded in UTF-8
/// [`RFC3629`](https://datatracker.ietf.org/doc/html/rfc3629). The reason
/// phrase is meant for diagnostic purposes and can be anything appropriate
/// for the error code.
/// # Examples
///```rust
/// # use stun_codec::ErrorCode;
/// # use std::error::Error;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let attr = ErrorCode::new(420, "Unknown Attribute")?;
/// assert_eq!(attr.class(), 4);
/// assert_eq!(attr.number(), 20);
/// assert_eq!(attr.error_code(), 420);
/// assert_eq!(attr.reason(), "Unknown Attribute");
/// #  Ok(())
/// # }
///```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCode {
    error_code: u16,
    reason: String,
}

impl ErrorCode {
    /// Creates a new `ErrorCode` type.
    /// # Arguments:
    /// * `error_code` - The numeric error code.
    /// * `reason` - The reason phrase.
    /// # Return:
    /// The `ErrorCode` type or a [`StunError`] if the numeric
    /// error value is not in the range of 300 to 699.
    pub fn new(error_code: u16, reason: &str) -> Result<Self, StunError> {
        (MIN_ERROR_CODE..MAX_ERROR_CODE)
            .contains(&error_code)
            .then(|| Self {
                error_code,
                reason: String::from(reason),
            })
            .ok_or_else(|| {
                StunError::new(
                    StunErrorType::InvalidParam,
                    format!("Error code is not ({}..{})", MIN_ERROR_CODE, MAX_ERROR_CODE),
                )
            })
    }

    /// Returns the numeric error code value.
    pub fn error_code(&self) -> u16 {
        self.error_code
    }

    /// Returns the class of the error code (the hundreds digit).
    pub fn class(&self) -> u8 {
        ((self.error_code - self.number() as u16) / 100)
            .try_into()
            .unwrap()
    }

    /// Returns the binary encoding of the error code modulo 100.
    pub fn number(&self) -> u8 {
        (self.error_code % 100).try_into().unwrap()
    }

    /// Returns the reason phrase associated to this error.
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }
}

// ErrorCode format
//  0                   1                   2                   3
//  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |           Reserved, should be 0         |Class|     Number    |
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
// |      Reason Phrase (variable)                                ..
// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

impl<'a> crate::Decode<'a> for ErrorCode {
    fn decode(raw_value: &[u8]) -> Result<(Self, usize), StunError> {
        check_buffer_boundaries(raw_value, 4)?;

        let class = raw_value[2] & 0x07;
        if !(3..=6).contains(&class) {
            return Err(StunError::new(
                StunErrorType::InvalidParam,
                format!("Error class {} is not in the range (3..=6)", class),
            ));
        }

        let number = raw_value[3];
        if !(0..=99).contains(&number) {
            return Err(StunError::new(
                StunErrorType::InvalidParam,
                format!("Error number {} is not in the range (0..=99)", number),
            ));
        }

        let reason = std::str::from_utf8(&raw_value[4..])?;

        let error_code = class as u16 * 100 + number as u16;
        Ok((ErrorCode::new(error_code, reason)?, raw_value.len()))
    }
}

impl Encode for ErrorCode {
    fn encode(&self, raw_value: &mut [u8]) -> Result<usize, StunError> {
        let len = 4 + self.reason.len(); // (Reserved + class + number)

        check_buffer_boundaries(raw_value, len)?;

        raw_value[0] = 0;
        raw_value[1] = 0;
        raw_value[2] = self.class();
        raw_value[3] = self.number();
        raw_value[4..len].clone_from_slice(self.reason.as_bytes());
        Ok(len)
    }
}
