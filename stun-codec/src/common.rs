use crate::error::{StunError, StunErrorType};
use crate::types::{MAGIC_COOKIE, TRANSACTION_ID_SIZE};
use crate::{Decode, Encode};
use byteorder::{BigEndian, ByteOrder};
use std::net::{IpAddr, SocketAddr};

pub fn check_buffer_boundaries(buffer: &[u8], limit: usize) -> Result<(), StunError> {
    (buffer.len() >= limit).then_some(()).ok_or_else(|| {
        StunError::new(
            StunErrorType::TruncatedAttribute,
            format!("Required size: {}, buffer size: {}", limit, buffer.len()),
        )
    })
}

/// Number of padding bytes that follow a value of `value_size` bytes so that
/// the next attribute starts on a 4-byte boundary.
pub fn padding(value_size: usize) -> usize {
    (4 - (value_size & 3)) & 3
}

const U64_SIZE: usize = 8;
const U32_SIZE: usize = 4;
const U16_SIZE: usize = 2;

impl<'a> crate::Decode<'a> for u64 {
    fn decode(raw_value: &[u8]) -> Result<(Self, usize), StunError> {
        check_buffer_boundaries(raw_value, U64_SIZE)?;
        let value = BigEndian::read_u64(&raw_value[..U64_SIZE]);
        Ok((value, U64_SIZE))
    }
}

impl Encode for u64 {
    fn encode(&self, raw_value: &mut [u8]) -> Result<usize, StunError> {
        check_buffer_boundaries(raw_value, U64_SIZE)?;
        BigEndian::write_u64(raw_value, *self);
        Ok(U64_SIZE)
    }
}

impl<'a> crate::Decode<'a> for u32 {
    fn decode(raw_value: &[u8]) -> Result<(Self, usize), StunError> {
        check_buffer_boundaries(raw_value, U32_SIZE)?;
        let value = BigEndian::read_u32(&raw_value[..U32_SIZE]);
        Ok((value, U32_SIZE))
    }
}

impl Encode for u32 {
    fn encode(&self, raw_value: &mut [u8]) -> Result<usize, StunError> {
        check_buffer_boundaries(raw_value, U32_SIZE)?;
        BigEndian::write_u32(raw_value, *self);
        Ok(U32_SIZE)
    }
}

impl<'a> crate::Decode<'a> for u16 {
    fn decode(raw_value: &[u8]) -> Result<(Self, usize), StunError> {
        check_buffer_boundaries(raw_value, U16_SIZE)?;
        let value = BigEndian::read_u16(&raw_value[..U16_SIZE]);
        Ok((value, U16_SIZE))
    }
}

impl Encode for u16 {
    fn encode(&self, raw_value: &mut [u8]) -> Result<usize, StunError> {
        check_buffer_boundaries(raw_value, U16_SIZE)?;
        BigEndian::write_u16(raw_value, *self);
        Ok(U16_SIZE)
    }
}

// Format of address attributes:
//      0                   1                   2                   3
//      0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//     |0 0 0 0 0 0 0 0|    Family     |           Port                |
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//     |                                                               |
//     |                 Address (32 bits or 128 bits)                 |
//     |                                                               |
//     +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+

fn encoded_size(addr: &SocketAddr) -> usize {
    let ip_size = match addr.ip() {
        IpAddr::V4(_) => 4,
        IpAddr::V6(_) => 16,
    };

    // 1 byte (zeros) + Family (1 byte) + 2 bytes (port)
    // + IP size (4 | 16)
    4 + ip_size
}

impl Decode<'_> for SocketAddr {
    fn decode(buffer: &[u8]) -> Result<(Self, usize), StunError> {
        let mut size = 4;
        check_buffer_boundaries(buffer, size)?;

        let family = buffer[1];
        let port = BigEndian::read_u16(&buffer[2..4]);

        let (address, len) = match family {
            1 => {
                check_buffer_boundaries(buffer, 8)?;
                let mut dst = [0u8; 4];
                dst.clone_from_slice(&buffer[4..8]);
                (IpAddr::from(dst), 4)
            }
            2 => {
                check_buffer_boundaries(buffer, 20)?;
                let mut dst = [0u8; 16];
                dst.clone_from_slice(&buffer[4..20]);
                (IpAddr::from(dst), 16)
            }
            _ => {
                return Err(StunError::new(
                    StunErrorType::InvalidParam,
                    format!("Invalid address family: {}", family),
                ))
            }
        };
        size += len;

        Ok((Self::new(address, port), size))
    }
}

impl Encode for SocketAddr {
    fn encode(&self, buffer: &mut [u8]) -> Result<usize, StunError> {
        let length = encoded_size(self);

        check_buffer_boundaries(buffer, length)?;

        // The first 8 bits MUST be set to 0 and MUST be ignored
        // by receivers.  These bits are present for aligning
        // parameters on natural 32-bit boundaries.
        buffer[0] = 0;

        BigEndian::write_u16(&mut buffer[2..4], self.port());

        match self.ip() {
            IpAddr::V4(ip) => {
                buffer[1] = 1;
                buffer[4..8].clone_from_slice(&ip.octets());
            }
            IpAddr::V6(ip) => {
                buffer[1] = 2;
                buffer[4..20].clone_from_slice(&ip.octets());
            }
        }

        Ok(length)
    }
}

fn socket_addr_xor(addr: &SocketAddr, transaction_id: &[u8; TRANSACTION_ID_SIZE]) -> SocketAddr {
    let xor_port = addr.port() ^ (MAGIC_COOKIE.as_u32() >> 16) as u16;
    match addr.ip() {
        IpAddr::V4(ip) => {
            let mut octets = ip.octets();
            for (i, b) in octets.iter_mut().enumerate() {
                *b ^= (MAGIC_COOKIE.as_u32() >> (24 - i * 8)) as u8;
            }
            let xor_ip = From::from(octets);
            SocketAddr::new(IpAddr::V4(xor_ip), xor_port)
        }
        IpAddr::V6(ip) => {
            let mut octets = ip.octets();
            for (i, b) in octets.iter_mut().enumerate().take(4) {
                *b ^= (MAGIC_COOKIE.as_u32() >> (24 - i * 8)) as u8;
            }
            for (i, b) in octets.iter_mut().enumerate().take(16).skip(4) {
                *b ^= transaction_id[i - 4];
            }
            let xor_ip = From::from(octets);
            SocketAddr::new(IpAddr::V6(xor_ip), xor_port)
        }
    }
}

pub(crate) fn xor_encode(
    transaction_id: &[u8; TRANSACTION_ID_SIZE],
    addr: &SocketAddr,
    buffer: &mut [u8],
) -> Result<usize, StunError> {
    let xor_addr = socket_addr_xor(addr, transaction_id);
    let size = xor_addr.encode(buffer)?;

    Ok(size)
}

pub(crate) fn xor_decode(
    transaction_id: &[u8; TRANSACTION_ID_SIZE],
    buffer: &[u8],
) -> Result<(SocketAddr, usize), StunError> {
    let (xor_addr, size) = SocketAddr::decode(buffer)?;
    let addr = socket_addr_xor(&xor_addr, transaction_id);

    Ok((addr, size))
}
