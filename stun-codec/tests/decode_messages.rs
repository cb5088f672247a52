use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use stun_codec::methods::BINDING;
use stun_codec::{
    IntegrityKey, MessageClass, MessageDecoderBuilder, StunErrorType, TransactionId,
};
use stun_codec::error::StunErrorLevel;

// RFC5769 2.1. Sample Request
const SAMPLE_REQUEST: [u8; 108] = [
    0x00, 0x01, 0x00, 0x58, // Request type and message length
    0x21, 0x12, 0xa4, 0x42, // Magic cookie
    0xb7, 0xe7, 0xa7, 0x01, // }
    0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
    0xfa, 0x87, 0xdf, 0xae, // }
    0x80, 0x22, 0x00, 0x10, // SOFTWARE attribute header
    0x53, 0x54, 0x55, 0x4e, // }
    0x20, 0x74, 0x65, 0x73, // }  User-agent...
    0x74, 0x20, 0x63, 0x6c, // }  ...name
    0x69, 0x65, 0x6e, 0x74, // }
    0x00, 0x24, 0x00, 0x04, // PRIORITY attribute header
    0x6e, 0x00, 0x01, 0xff, // ICE priority value
    0x80, 0x29, 0x00, 0x08, // ICE-CONTROLLED attribute header
    0x93, 0x2f, 0xf9, 0xb1, // }  Pseudo-random tie breaker...
    0x51, 0x26, 0x3b, 0x36, // }  ...for ICE control
    0x00, 0x06, 0x00, 0x09, // USERNAME attribute header
    0x65, 0x76, 0x74, 0x6a, // }
    0x3a, 0x68, 0x36, 0x76, // }  Username (9 bytes) and padding (3 bytes)
    0x59, 0x20, 0x20, 0x20, // }
    0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
    0x9a, 0xea, 0xa7, 0x0c, // }
    0xbf, 0xd8, 0xcb, 0x56, // }
    0x78, 0x1e, 0xf2, 0xb5, // }  HMAC-SHA1 fingerprint
    0xb2, 0xd3, 0xf2, 0x49, // }
    0xc1, 0xb5, 0x71, 0xa2, // }
    0x80, 0x28, 0x00, 0x04, // FINGERPRINT attribute header
    0xe5, 0x7a, 0x3b, 0xcf, // CRC32 fingerprint
];

// RFC5769 2.3. Sample IPv6 Response
const SAMPLE_IPV6_RESPONSE: [u8; 92] = [
    0x01, 0x01, 0x00, 0x48, // Response type and message length
    0x21, 0x12, 0xa4, 0x42, // Magic cookie
    0xb7, 0xe7, 0xa7, 0x01, // }
    0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
    0xfa, 0x87, 0xdf, 0xae, // }
    0x80, 0x22, 0x00, 0x0b, // SOFTWARE attribute header
    0x74, 0x65, 0x73, 0x74, // }
    0x20, 0x76, 0x65, 0x63, // }  UTF-8 server name
    0x74, 0x6f, 0x72, 0x20, // }
    0x00, 0x20, 0x00, 0x14, // XOR-MAPPED-ADDRESS attribute header
    0x00, 0x02, 0xa1, 0x47, // Address family (IPv6) and xor'd mapped port number
    0x01, 0x13, 0xa9, 0xfa, // }
    0xa5, 0xd3, 0xf1, 0x79, // }  Xor'd mapped IPv6 address
    0xbc, 0x25, 0xf4, 0xb5, // }
    0xbe, 0xd2, 0xb9, 0xd9, // }
    0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
    0xa3, 0x82, 0x95, 0x4e, // }
    0x4b, 0xe6, 0x7b, 0xf1, // }
    0x17, 0x84, 0xc9, 0x7c, // }  HMAC-SHA1 fingerprint
    0x82, 0x92, 0xc2, 0x75, // }
    0xbf, 0xe3, 0xed, 0x41, // }
    0x80, 0x28, 0x00, 0x04, // FINGERPRINT attribute header
    0xc8, 0xfb, 0x0b, 0x4c, // CRC32 fingerprint
];

// RFC5769 2.4. Sample Request with Long-Term Authentication
const SAMPLE_REQUEST_LONG_TERM_AUTH: [u8; 116] = [
    0x00, 0x01, 0x00, 0x60, // Request type and message length
    0x21, 0x12, 0xa4, 0x42, // Magic cookie
    0x78, 0xad, 0x34, 0x33, // }
    0xc6, 0xad, 0x72, 0xc0, // }  Transaction ID
    0x29, 0xda, 0x41, 0x2e, // }
    0x00, 0x06, 0x00, 0x12, // USERNAME attribute header
    0xe3, 0x83, 0x9e, 0xe3, // }
    0x83, 0x88, 0xe3, 0x83, // }
    0xaa, 0xe3, 0x83, 0x83, // }  Username (18 bytes) and padding (2 bytes)
    0xe3, 0x82, 0xaf, 0xe3, // }
    0x82, 0xb9, 0x00, 0x00, // }
    0x00, 0x15, 0x00, 0x1c, // NONCE attribute header
    0x66, 0x2f, 0x2f, 0x34, // }
    0x39, 0x39, 0x6b, 0x39, // }
    0x35, 0x34, 0x64, 0x36, // }
    0x4f, 0x4c, 0x33, 0x34, // }  Nonce value
    0x6f, 0x4c, 0x39, 0x46, // }
    0x53, 0x54, 0x76, 0x79, // }
    0x36, 0x34, 0x73, 0x41, // }
    0x00, 0x14, 0x00, 0x0b, // REALM attribute header
    0x65, 0x78, 0x61, 0x6d, // }
    0x70, 0x6c, 0x65, 0x2e, // }  Realm value (11 bytes) and padding (1 byte)
    0x6f, 0x72, 0x67, 0x00, // }
    0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
    0xf6, 0x70, 0x24, 0x65, // }
    0x6d, 0xd6, 0x4a, 0x3e, // }
    0x02, 0xb8, 0xe0, 0x71, // }  HMAC-SHA1 fingerprint
    0x2e, 0x85, 0xc9, 0xa2, // }
    0x8c, 0xa8, 0x96, 0x66, // }
];

// Binding request sent by a pjnath client, no authentication
const PJNATH_BINDING_REQUEST: [u8; 36] = [
    0x00, 0x01, 0x00, 0x10, // Request type and message length
    0x21, 0x12, 0xa4, 0x42, // Magic cookie
    0x93, 0x31, 0x8d, 0x1f, // }
    0x56, 0x11, 0x7e, 0x41, // }  Transaction ID
    0x82, 0x26, 0x01, 0x00, // }
    0x80, 0x22, 0x00, 0x0c, // SOFTWARE attribute header
    0x70, 0x6a, 0x6e, 0x61, // }
    0x74, 0x68, 0x2d, 0x31, // }  "pjnath-1.4\0\0"
    0x2e, 0x34, 0x00, 0x00, // }
];

// Binding success response in the shape a Vovida server produces, with the
// RFC3489 legacy attributes and the pre-standard XOR-MAPPED-ADDRESS
const LEGACY_BINDING_RESPONSE: [u8; 88] = [
    0x01, 0x01, 0x00, 0x44, // Response type and message length
    0x21, 0x12, 0xa4, 0x42, // Magic cookie
    0xe7, 0x57, 0x09, 0xab, // }
    0x2d, 0x1c, 0x1d, 0xad, // }  Transaction ID
    0x91, 0xd5, 0xa6, 0x4c, // }
    0x00, 0x01, 0x00, 0x08, // MAPPED-ADDRESS attribute header
    0x00, 0x01, 0xe0, 0xfc, // Address family (IPv4) and port
    0x58, 0xc6, 0x35, 0x71, // IPv4 address
    0x00, 0x04, 0x00, 0x08, // SOURCE-ADDRESS attribute header
    0x00, 0x01, 0x0d, 0x96, // Address family (IPv4) and port
    0xd0, 0x6d, 0xde, 0x89, // IPv4 address
    0x00, 0x05, 0x00, 0x08, // CHANGED-ADDRESS attribute header
    0x00, 0x01, 0x0d, 0x97, // Address family (IPv4) and port
    0xd0, 0x6d, 0xde, 0x94, // IPv4 address
    0x80, 0x20, 0x00, 0x08, // X-VOVIDA-XOR-MAPPED-ADDRESS attribute header
    0x00, 0x01, 0xc1, 0xee, // Address family (IPv4) and xor'd port
    0x79, 0xd4, 0x91, 0x33, // Xor'd IPv4 address
    0x80, 0x22, 0x00, 0x10, // SOFTWARE attribute header
    0x56, 0x6f, 0x76, 0x69, // }
    0x64, 0x61, 0x2e, 0x6f, // }  "Vovida.org 0.96\0"
    0x72, 0x67, 0x20, 0x30, // }
    0x2e, 0x39, 0x36, 0x00, // }
];

// 2.1. Sample Request
#[test]
fn test_sample_request() {
    let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");

    let msg = stun_codec::decode(&SAMPLE_REQUEST, Some(&key)).expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::Request);
    assert!(msg.integrity());
    assert!(msg.fingerprint());

    // Both trailers are stripped; four plain attributes remain, in wire
    // order
    assert_eq!(msg.attributes().len(), 4);
    let mut iter = msg.attributes().iter();
    assert_eq!(iter.next().unwrap().name(), Some("software"));
    assert_eq!(iter.next().unwrap().name(), Some("priority"));
    assert_eq!(iter.next().unwrap().name(), Some("ice_controlled"));
    assert_eq!(iter.next().unwrap().name(), Some("username"));

    let software = msg.get("software").expect("Software attribute not found");
    assert_eq!(software.as_bytes(), Some(&b"STUN test client"[..]));

    let priority = msg.get("priority").expect("Priority attribute not found");
    assert_eq!(priority.as_bytes(), Some(&[0x6e, 0x00, 0x01, 0xff][..]));

    let ice_controlled = msg
        .get("ice_controlled")
        .expect("IceControlled attribute not found");
    assert_eq!(
        ice_controlled.as_bytes(),
        Some(&[0x93, 0x2f, 0xf9, 0xb1, 0x51, 0x26, 0x3b, 0x36][..])
    );

    let username = msg.get("username").expect("Username attribute not found");
    assert_eq!(username.as_bytes(), Some(&b"evtj:h6vY"[..]));
}

// 2.1. Sample Request, decoded with the wrong key: the MESSAGE-INTEGRITY
// trailer can not be verified and stays in the attribute stream
#[test]
fn test_sample_request_wrong_key() {
    let key = IntegrityKey::short_term("wrong password");

    let msg = stun_codec::decode(&SAMPLE_REQUEST, Some(&key)).expect("Can not decode StunMessage");

    assert!(!msg.integrity());
    // The fingerprint covers the integrity trailer and still verifies
    assert!(msg.fingerprint());

    assert_eq!(msg.attributes().len(), 5);
    let integrity = msg
        .get("message_integrity")
        .expect("MessageIntegrity attribute not found");
    assert_eq!(integrity.as_bytes(), Some(&SAMPLE_REQUEST[80..100]));
}

// 2.1. Sample Request without any key: integrity is not even attempted
#[test]
fn test_sample_request_no_key() {
    let msg = stun_codec::decode(&SAMPLE_REQUEST, None).expect("Can not decode StunMessage");

    assert!(!msg.integrity());
    assert!(msg.fingerprint());
    assert_eq!(msg.attributes().len(), 5);
}

// 2.2. Sample IPv4 Response
#[test]
fn test_sample_ipv4_response() {
    let sample_ipv4_response = [
        0x01, 0x01, 0x00, 0x3c, // Response type and message length
        0x21, 0x12, 0xa4, 0x42, // Magic cookie
        0xb7, 0xe7, 0xa7, 0x01, // }
        0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
        0xfa, 0x87, 0xdf, 0xae, // }
        0x80, 0x22, 0x00, 0x0b, // SOFTWARE attribute header
        0x74, 0x65, 0x73, 0x74, // }
        0x20, 0x76, 0x65, 0x63, // }  UTF-8 server name
        0x74, 0x6f, 0x72, 0x20, // }
        0x00, 0x20, 0x00, 0x08, // XOR-MAPPED-ADDRESS attribute header
        0x00, 0x01, 0xa1, 0x47, // Address family (IPv4) and xor'd mapped port number
        0xe1, 0x12, 0xa6, 0x43, // Xor'd mapped IPv4 address
        0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
        0x2b, 0x91, 0xf5, 0x99, // }
        0xfd, 0x9e, 0x90, 0xc3, // }
        0x8c, 0x74, 0x89, 0xf9, // } HMAC-SHA1 fingerprint
        0x2a, 0xf9, 0xba, 0x53, // }
        0xf0, 0x6b, 0xe7, 0xd7, // }
        0x80, 0x28, 0x00, 0x04, // FINGERPRINT attribute header
        0xc0, 0x7d, 0x4c, 0x96, // CRC32 fingerprint
    ];
    let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");

    let msg =
        stun_codec::decode(&sample_ipv4_response, Some(&key)).expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::SuccessResponse);
    assert!(msg.integrity());
    assert!(msg.fingerprint());
    assert_eq!(msg.attributes().len(), 2);

    let socket = msg
        .get("xor_mapped_address")
        .expect("XorMappedAddress attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert_eq!(socket.ip(), IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1)));
    assert_eq!(socket.port(), 32853);
}

// 2.3. Sample IPv6 Response
#[test]
fn test_sample_ipv6_response() {
    let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");

    let msg =
        stun_codec::decode(&SAMPLE_IPV6_RESPONSE, Some(&key)).expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::SuccessResponse);
    assert!(msg.integrity());
    assert!(msg.fingerprint());
    assert_eq!(msg.attributes().len(), 2);

    let socket = msg
        .get("xor_mapped_address")
        .expect("XorMappedAddress attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert!(socket.is_ipv6());
    assert_eq!(
        socket.ip(),
        IpAddr::V6(Ipv6Addr::new(
            0x2001, 0x0db8, 0x1234, 0x5678, 0x0011, 0x2233, 0x4455, 0x6677
        ))
    );
    assert_eq!(socket.port(), 32853);
}

// 2.4. Sample Request with Long-Term Authentication
#[test]
fn test_sample_request_with_long_term_auth() {
    let username = "\u{30DE}\u{30C8}\u{30EA}\u{30C3}\u{30AF}\u{30B9}";
    let key = IntegrityKey::long_term(username, "example.org", "TheMatrIX");

    let msg = stun_codec::decode(&SAMPLE_REQUEST_LONG_TERM_AUTH, Some(&key))
        .expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::Request);
    assert!(msg.integrity());
    assert!(!msg.fingerprint());
    assert_eq!(msg.attributes().len(), 3);

    let value = msg.get("username").expect("Username attribute not found");
    assert_eq!(value.as_bytes(), Some(username.as_bytes()));

    let nonce = msg.get("nonce").expect("Nonce attribute not found");
    assert_eq!(nonce.as_bytes(), Some(&b"f//499k954d6OL34oL9FSTvy64sA"[..]));

    let realm = msg.get("realm").expect("Realm attribute not found");
    assert_eq!(realm.as_bytes(), Some(&b"example.org"[..]));
}

#[test]
fn test_pjnath_binding_request() {
    let msg =
        stun_codec::decode(&PJNATH_BINDING_REQUEST, None).expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::Request);
    assert_eq!(
        msg.transaction_id(),
        &TransactionId::from(0x93318D1F_56117E41_82260100u128)
    );
    assert!(!msg.integrity());
    assert!(!msg.fingerprint());

    assert_eq!(msg.attributes().len(), 1);
    let software = msg.get("software").expect("Software attribute not found");
    assert_eq!(software.as_bytes(), Some(&b"pjnath-1.4\0\0"[..]));
}

#[test]
fn test_legacy_binding_response() {
    let msg =
        stun_codec::decode(&LEGACY_BINDING_RESPONSE, None).expect("Can not decode StunMessage");

    assert_eq!(msg.method(), BINDING);
    assert_eq!(msg.class(), MessageClass::SuccessResponse);
    assert_eq!(msg.attributes().len(), 5);

    let mapped = msg
        .get("mapped_address")
        .expect("MappedAddress attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert_eq!(mapped.ip(), IpAddr::V4(Ipv4Addr::new(88, 198, 53, 113)));
    assert_eq!(mapped.port(), 57596);

    let source = msg
        .get("source_address")
        .expect("SourceAddress attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert_eq!(source.ip(), IpAddr::V4(Ipv4Addr::new(208, 109, 222, 137)));
    assert_eq!(source.port(), 3478);

    let changed = msg
        .get("changed_address")
        .expect("ChangedAddress attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert_eq!(changed.ip(), IpAddr::V4(Ipv4Addr::new(208, 109, 222, 148)));
    assert_eq!(changed.port(), 3479);

    // The pre-standard attribute uses the same XOR masking as
    // XOR-MAPPED-ADDRESS and must decode to the mapped address
    let xor_mapped = msg
        .get("x_vovida_xor_mapped_address")
        .expect("X-Vovida attribute not found")
        .as_socket_address()
        .expect("Expected socket address");
    assert_eq!(xor_mapped, mapped);

    let software = msg.get("software").expect("Software attribute not found");
    assert_eq!(software.as_bytes(), Some(&b"Vovida.org 0.96\0"[..]));
}

#[test]
fn test_unknown_attribute_passthrough() {
    let buffer = [
        0x00, 0x01, 0x00, 0x0c, // Request type and message length
        0x21, 0x12, 0xa4, 0x42, // Magic cookie
        0xb7, 0xe7, 0xa7, 0x01, // }
        0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
        0xfa, 0x87, 0xdf, 0xae, // }
        0x7f, 0x21, 0x00, 0x05, // Unassigned comprehension-required type
        0x01, 0x02, 0x03, 0x04, // }  5 bytes of opaque value
        0x05, 0x00, 0x00, 0x00, // }  and padding (3 bytes)
    ];

    let msg = stun_codec::decode(&buffer, None).expect("Can not decode StunMessage");
    assert_eq!(msg.attributes().len(), 1);

    let attr = &msg.attributes()[0];
    assert_eq!(attr.code(), 0x7f21);
    assert_eq!(attr.name(), None);
    assert_eq!(
        attr.value().as_bytes(),
        Some(&[0x01, 0x02, 0x03, 0x04, 0x05][..])
    );
}

#[test]
fn test_unknown_method_passthrough() {
    // Method 0xffd does not exist in the method registry, the raw id is
    // carried through
    let buffer = [
        0x3e, 0xed, 0x00, 0x00, // Request type (method 0xffd) and length
        0x21, 0x12, 0xa4, 0x42, // Magic cookie
        0xb7, 0xe7, 0xa7, 0x01, // }
        0xbc, 0x34, 0xd6, 0x86, // }  Transaction ID
        0xfa, 0x87, 0xdf, 0xae, // }
    ];

    let msg = stun_codec::decode(&buffer, None).expect("Can not decode StunMessage");
    assert_eq!(msg.method().as_u16(), 0x0ffd);
    assert_eq!(msg.method().name(), None);
    assert_eq!(msg.class(), MessageClass::Request);
}

#[test]
fn test_decode_errors() {
    // Buffer shorter than the header
    let error = stun_codec::decode(&SAMPLE_REQUEST[..15], None).expect_err("Error expected");
    assert!(match &error.0 {
        StunErrorLevel::Message(e) => e.0 == StunErrorType::MalformedHeader,
        _ => false,
    });

    // Wrong magic cookie
    let mut buffer = PJNATH_BINDING_REQUEST;
    buffer[4] = 0x42;
    let error = stun_codec::decode(&buffer, None).expect_err("Error expected");
    assert!(match &error.0 {
        StunErrorLevel::Message(e) => e.0 == StunErrorType::MalformedHeader,
        _ => false,
    });

    // Marker bits set
    let mut buffer = PJNATH_BINDING_REQUEST;
    buffer[0] |= 0xc0;
    let error = stun_codec::decode(&buffer, None).expect_err("Error expected");
    assert!(match &error.0 {
        StunErrorLevel::Message(e) => e.0 == StunErrorType::MalformedHeader,
        _ => false,
    });

    // An attribute that overruns the attribute section
    let mut buffer = PJNATH_BINDING_REQUEST;
    buffer[23] = 0x20; // software attribute claims 32 bytes
    let error = stun_codec::decode(&buffer, None).expect_err("Error expected");
    assert!(match &error.0 {
        StunErrorLevel::Attribute(e) => {
            e.error == StunErrorType::TruncatedAttribute && e.position == 0
        }
        _ => false,
    });
}

#[test]
fn test_decoder_reuse() {
    // A decoder is a value that can be reused across messages
    let key = IntegrityKey::short_term("VOkJxbRl1RmTxUk/WvJxBt");
    let decoder = MessageDecoderBuilder::default().with_key(key).build();

    let (msg, size) = decoder
        .decode(&SAMPLE_REQUEST)
        .expect("Can not decode StunMessage");
    assert_eq!(size, SAMPLE_REQUEST.len());
    assert!(msg.integrity());

    let (msg, size) = decoder
        .decode(&SAMPLE_IPV6_RESPONSE)
        .expect("Can not decode StunMessage");
    assert_eq!(size, SAMPLE_IPV6_RESPONSE.len());
    assert!(msg.integrity());
}
