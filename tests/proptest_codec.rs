use std::net::Ipv4Addr;
use std::sync::Arc;

use proptest::prelude::*;

use nanolease::{find_option, Config, DhcpMessage, Engine, OptionTag, OptionValue};

const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];
const OPTIONS_OFFSET: usize = 240;

fn valid_header() -> Vec<u8> {
    let mut data = vec![0u8; OPTIONS_OFFSET];
    data[0] = 1; // BOOTREQUEST
    data[1] = 1;
    data[2] = 6;
    data[236..240].copy_from_slice(&DHCP_MAGIC_COOKIE);
    data
}

fn test_engine() -> Engine {
    Engine::new(Arc::new(Config::default()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10000))]

    #[test]
    fn find_option_never_panics_on_arbitrary_bytes(
        options in prop::collection::vec(any::<u8>(), 0..512),
        tag_byte: u8
    ) {
        let tag = OptionTag::try_from(tag_byte).unwrap_or(OptionTag::MessageType);
        let _ = find_option(&options, tag);
    }

    #[test]
    fn find_option_result_lies_within_buffer(
        options in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        if let Ok(view) = find_option(&options, OptionTag::MessageType) {
            prop_assert!(view.len() <= options.len());
        }
    }

    #[test]
    fn parse_never_panics_on_arbitrary_bytes(data in prop::collection::vec(any::<u8>(), 0..700)) {
        let _ = DhcpMessage::parse(&data);
    }

    #[test]
    fn parse_accepts_valid_header_with_random_options(
        options in prop::collection::vec(any::<u8>(), 3..300)
    ) {
        let mut data = valid_header();
        data.extend_from_slice(&options);
        let msg = DhcpMessage::parse(&data).unwrap();
        prop_assert_eq!(msg.options, options);
    }

    #[test]
    fn engine_never_panics_on_arbitrary_datagrams(
        data in prop::collection::vec(any::<u8>(), 0..700),
        now in any::<u32>()
    ) {
        let _ = test_engine().handle(&data, u64::from(now));
    }

    #[test]
    fn engine_never_panics_on_valid_header_with_random_options(
        options in prop::collection::vec(any::<u8>(), 3..300),
        now in any::<u32>()
    ) {
        let mut data = valid_header();
        data.extend_from_slice(&options);
        let _ = test_engine().handle(&data, u64::from(now));
    }

    #[test]
    fn u32_roundtrips_through_wire_encoding(value: u32) {
        let mut buf = Vec::new();
        value.put(&mut buf);
        prop_assert_eq!(buf.len(), u32::WIDTH);
        prop_assert_eq!(u32::decode(&buf).unwrap(), value);
    }

    #[test]
    fn u16_roundtrips_through_wire_encoding(value: u16) {
        let mut buf = Vec::new();
        value.put(&mut buf);
        prop_assert_eq!(buf.len(), u16::WIDTH);
        prop_assert_eq!(u16::decode(&buf).unwrap(), value);
    }

    #[test]
    fn ipv4_roundtrips_through_wire_encoding(octets: [u8; 4]) {
        let addr = Ipv4Addr::from(octets);
        let mut buf = Vec::new();
        addr.put(&mut buf);
        prop_assert_eq!(buf.len(), <Ipv4Addr as OptionValue>::WIDTH);
        prop_assert_eq!(Ipv4Addr::decode(&buf).unwrap(), addr);
    }

    #[test]
    fn message_header_roundtrips(
        xid: u32,
        secs: u16,
        flags: u16,
        ciaddr: [u8; 4],
        yiaddr: [u8; 4],
        siaddr: [u8; 4],
        giaddr: [u8; 4],
        chaddr: [u8; 16],
    ) {
        let mut data = valid_header();
        data[4..8].copy_from_slice(&xid.to_be_bytes());
        data[8..10].copy_from_slice(&secs.to_be_bytes());
        data[10..12].copy_from_slice(&flags.to_be_bytes());
        data[12..16].copy_from_slice(&ciaddr);
        data[16..20].copy_from_slice(&yiaddr);
        data[20..24].copy_from_slice(&siaddr);
        data[24..28].copy_from_slice(&giaddr);
        data[28..44].copy_from_slice(&chaddr);
        data.extend_from_slice(&[53, 1, 1]);

        let msg = DhcpMessage::parse(&data).unwrap();
        let encoded = msg.encode();
        prop_assert_eq!(encoded, data);
    }

    #[test]
    fn short_datagrams_always_rejected(data in prop::collection::vec(any::<u8>(), 0..243)) {
        prop_assert!(DhcpMessage::parse(&data).is_err());
    }

    #[test]
    fn bad_magic_cookie_always_rejected(cookie: [u8; 4]) {
        prop_assume!(cookie != DHCP_MAGIC_COOKIE);

        let mut data = valid_header();
        data[236..240].copy_from_slice(&cookie);
        data.extend_from_slice(&[53, 1, 1]);

        prop_assert!(DhcpMessage::parse(&data).is_err());
    }
}
