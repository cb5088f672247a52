//! The attribute, method and class registries.
//!
//! Three static tables fixed at build time and indexed once at library
//! initialization. The attribute table maps a 16-bit attribute type to its
//! name and to the shape that drives the attribute codec dispatch.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// The decode/encode dispatch tag attached to each attribute code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeShape {
    /// Raw byte sequence, carried unmodified from the wire
    Value,
    /// (IP, port) pair
    Address,
    /// (IP, port) pair, XOR-masked on the wire
    XorAddress,
    /// Numeric error code plus UTF-8 reason phrase
    ErrorCode,
    /// Change-request flag subset
    ChangeRequest,
}

#[derive(Debug)]
pub(crate) struct AttributeRow {
    pub code: u16,
    pub name: &'static str,
    pub shape: AttributeShape,
}

const fn row(code: u16, name: &'static str, shape: AttributeShape) -> AttributeRow {
    AttributeRow { code, name, shape }
}

// MESSAGE-INTEGRITY (0x0008) and FINGERPRINT (0x8028) are listed here so
// that they resolve by name and code, but the message codec strips them
// before the attribute codec ever sees them.
const ATTRIBUTES: &[AttributeRow] = &[
    row(0x0001, "mapped_address", AttributeShape::Address),
    row(0x0002, "response_address", AttributeShape::Address),
    row(0x0003, "change_request", AttributeShape::ChangeRequest),
    row(0x0004, "source_address", AttributeShape::Address),
    row(0x0005, "changed_address", AttributeShape::Address),
    row(0x0006, "username", AttributeShape::Value),
    row(0x0007, "password", AttributeShape::Value),
    row(0x0008, "message_integrity", AttributeShape::Value),
    row(0x0009, "error_code", AttributeShape::ErrorCode),
    row(0x000A, "unknown_attributes", AttributeShape::Value),
    row(0x000B, "reflected_from", AttributeShape::Address),
    row(0x000C, "channel_number", AttributeShape::Value),
    row(0x000D, "lifetime", AttributeShape::Value),
    row(0x0012, "xor_peer_address", AttributeShape::XorAddress),
    row(0x0013, "data", AttributeShape::Value),
    row(0x0014, "realm", AttributeShape::Value),
    row(0x0015, "nonce", AttributeShape::Value),
    row(0x0016, "xor_relayed_address", AttributeShape::XorAddress),
    row(0x0017, "requested_address_family", AttributeShape::Value),
    row(0x0018, "even_port", AttributeShape::Value),
    row(0x0019, "requested_transport", AttributeShape::Value),
    row(0x001A, "dont_fragment", AttributeShape::Value),
    row(0x0020, "xor_mapped_address", AttributeShape::XorAddress),
    row(0x0022, "reservation_token", AttributeShape::Value),
    row(0x0024, "priority", AttributeShape::Value),
    row(0x0025, "use_candidate", AttributeShape::Value),
    row(0x002A, "connection_id", AttributeShape::Value),
    row(0x8020, "x_vovida_xor_mapped_address", AttributeShape::XorAddress),
    row(0x8022, "software", AttributeShape::Value),
    row(0x8023, "alternate_server", AttributeShape::Address),
    row(0x8028, "fingerprint", AttributeShape::Value),
    row(0x8029, "ice_controlled", AttributeShape::Value),
    row(0x802A, "ice_controlling", AttributeShape::Value),
];

const METHODS: &[(u16, &str)] = &[
    (0x0000, "reserved"),
    (0x0001, "binding"),
    (0x0002, "shared_secret"),
    (0x0003, "allocate"),
    (0x0004, "refresh"),
    (0x0006, "send"),
    (0x0007, "data"),
    (0x0008, "create_permission"),
    (0x0009, "channel_bind"),
];

const CLASSES: &[(u8, &str)] = &[
    (0b00, "request"),
    (0b01, "indication"),
    (0b10, "success"),
    (0b11, "error"),
];

lazy_static! {
    static ref ATTRIBUTES_BY_CODE: HashMap<u16, &'static AttributeRow> = {
        let mut map = HashMap::new();
        for attr_row in ATTRIBUTES {
            assert!(
                map.insert(attr_row.code, attr_row).is_none(),
                "Attribute type 0x{:04X} is already registered",
                attr_row.code
            );
        }
        map
    };
    static ref ATTRIBUTES_BY_NAME: HashMap<&'static str, &'static AttributeRow> = {
        let mut map = HashMap::new();
        for attr_row in ATTRIBUTES {
            assert!(
                map.insert(attr_row.name, attr_row).is_none(),
                "Attribute name '{}' is already registered",
                attr_row.name
            );
        }
        map
    };
    static ref METHOD_NAMES: HashMap<u16, &'static str> = METHODS.iter().copied().collect();
    static ref CLASS_NAMES: HashMap<u8, &'static str> = CLASSES.iter().copied().collect();
}

pub(crate) fn attribute_by_code(code: u16) -> Option<&'static AttributeRow> {
    ATTRIBUTES_BY_CODE.get(&code).copied()
}

pub(crate) fn attribute_by_name(name: &str) -> Option<&'static AttributeRow> {
    ATTRIBUTES_BY_NAME.get(name).copied()
}

pub(crate) fn method_name(method: u16) -> Option<&'static str> {
    METHOD_NAMES.get(&method).copied()
}

pub(crate) fn class_name(class: u8) -> Option<&'static str> {
    CLASS_NAMES.get(&class).copied()
}
