//! decoding a packet whose header follows network byte order while its embedded vendor
//! payload uses little-endian counters.

use endian_serde::{EndianSerde, Endianness};

#[derive(Debug, Default, EndianSerde)]
struct VendorPayload {
    // the vendor's firmware writes everything little-endian
    #[endian(little)]
    uptime_seconds: u32,
    #[endian(little)]
    error_count: u16,
    link_up: bool,
}

#[derive(Debug, Default, EndianSerde)]
struct Packet {
    // network header, big-endian like the rest of the stream
    message_type: u16,
    length: u16,
    payload: VendorPayload,
}

fn main() -> Result<(), endian_serde::Error> {
    let wire: Vec<u8> = vec![
        0x00, 0x07, // message_type = 7
        0x00, 0x0B, // length = 11, the whole packet
        0x10, 0x27, 0x00, 0x00, // uptime_seconds = 10000, little-endian
        0x03, 0x00, // error_count = 3, little-endian
        0x01, // link_up = true
    ];

    let mut packet = Packet::default();
    endian_serde::decode(&mut wire.as_slice(), Endianness::Big, &mut packet)?;
    println!("{packet:#?}");

    // the packet re-encodes to the exact bytes it came from
    let bytes = endian_serde::encode_to_vec(&packet, Endianness::Big)?;
    assert_eq!(bytes, wire);
    Ok(())
}
