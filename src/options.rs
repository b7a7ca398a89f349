//! DHCP option (TLV) codec.
//!
//! Options are stored back-to-back in the message's options area as
//! tag(1) + length(1) + data(length), terminated by tag 255 (END). This
//! module provides the read direction ([`find_option`]) as a zero-copy scan
//! returning a borrowed slice into the message buffer, and the write
//! direction ([`OptionWriter`]) used to serialize reply options.
//!
//! # Compatibility note
//!
//! RFC 2132 defines PAD (tag 0) as a bare single byte with no length
//! field. This scanner instead reads a length byte after *every* tag except
//! END, PAD included, matching the firmware this server replaces. Any buffer
//! containing PAD bytes therefore parses differently from a strict RFC
//! parser; see the `pad_*` tests below before "fixing" this.
//!
//! # References
//!
//! - RFC 2132: DHCP Options and BOOTP Vendor Extensions

use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// DHCP option tags as defined in RFC 2132.
///
/// Only tags this server reads or writes are enumerated; anything else is
/// skipped over by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OptionTag {
    /// Padding (RFC 2132 §3.1).
    Pad = 0,
    /// Subnet mask (RFC 2132 §3.3).
    SubnetMask = 1,
    /// Router/gateway address (RFC 2132 §3.5).
    Router = 3,
    /// DNS server address (RFC 2132 §3.8).
    Dns = 6,
    /// Broadcast address (RFC 2132 §5.3).
    BroadcastAddr = 28,
    /// Requested IP address (RFC 2132 §9.1).
    RequestedIp = 50,
    /// IP address lease time in seconds (RFC 2132 §9.2).
    LeaseTime = 51,
    /// DHCP message type (RFC 2132 §9.6).
    MessageType = 53,
    /// Server identifier (RFC 2132 §9.7).
    ServerIdentifier = 54,
    /// Parameter request list (RFC 2132 §9.8).
    ParameterRequestList = 55,
    /// Renewal time T1 (RFC 2132 §9.11).
    RenewalTime = 58,
    /// Rebinding time T2 (RFC 2132 §9.12).
    RebindingTime = 59,
    /// Client identifier (RFC 2132 §9.14).
    ClientId = 61,
    /// End of options marker.
    End = 255,
}

impl TryFrom<u8> for OptionTag {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Pad),
            1 => Ok(Self::SubnetMask),
            3 => Ok(Self::Router),
            6 => Ok(Self::Dns),
            28 => Ok(Self::BroadcastAddr),
            50 => Ok(Self::RequestedIp),
            51 => Ok(Self::LeaseTime),
            53 => Ok(Self::MessageType),
            54 => Ok(Self::ServerIdentifier),
            55 => Ok(Self::ParameterRequestList),
            58 => Ok(Self::RenewalTime),
            59 => Ok(Self::RebindingTime),
            61 => Ok(Self::ClientId),
            255 => Ok(Self::End),
            other => Err(other),
        }
    }
}

/// DHCP message types (option 53) as defined in RFC 2132 §9.6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    /// Client broadcast to locate servers.
    Discover = 1,
    /// Server response to DISCOVER with an address offer.
    Offer = 2,
    /// Client request for offered parameters.
    Request = 3,
    /// Client indicates the address is already in use.
    Decline = 4,
    /// Server acknowledgement with configuration.
    Ack = 5,
    /// Server negative acknowledgement.
    Nak = 6,
    /// Client releases its address.
    Release = 7,
    /// Client requests config without address allocation.
    Inform = 8,
}

impl TryFrom<u8> for MessageType {
    type Error = u8;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Discover),
            2 => Ok(Self::Offer),
            3 => Ok(Self::Request),
            4 => Ok(Self::Decline),
            5 => Ok(Self::Ack),
            6 => Ok(Self::Nak),
            7 => Ok(Self::Release),
            8 => Ok(Self::Inform),
            other => Err(other),
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discover => write!(f, "DISCOVER"),
            Self::Offer => write!(f, "OFFER"),
            Self::Request => write!(f, "REQUEST"),
            Self::Decline => write!(f, "DECLINE"),
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
            Self::Release => write!(f, "RELEASE"),
            Self::Inform => write!(f, "INFORM"),
        }
    }
}

/// Scans the options area for the option with `tag` and returns its data
/// bytes as a borrowed slice into `options`.
///
/// The scan stops at the first END tag or at the end of the buffer,
/// whichever comes first; either case yields [`Error::OptionNotFound`]. A
/// missing END is not an error by itself.
///
/// If the matching option declares more data bytes than remain in the
/// buffer, the scan fails with [`Error::MalformedOption`] — no partial
/// slice is returned. A bogus length on a *non*-matching option merely
/// skips the scan position past the end, terminating with "not found";
/// the scan never reads at or past the end of the slice.
pub fn find_option(options: &[u8], tag: OptionTag) -> Result<&[u8]> {
    let search = tag as u8;
    let mut pos = 0;

    while pos < options.len() {
        let current = options[pos];
        pos += 1;

        if current == OptionTag::End as u8 {
            break;
        }

        // A length byte follows every other tag, PAD included (see the
        // module-level compatibility note).
        let Some(&len) = options.get(pos) else {
            break;
        };
        pos += 1;
        let len = usize::from(len);

        if current == search {
            let remaining = options.len() - pos;
            if remaining < len {
                return Err(Error::MalformedOption {
                    tag,
                    declared: len,
                    remaining,
                });
            }
            return Ok(&options[pos..pos + len]);
        }

        pos += len;
    }

    Err(Error::OptionNotFound(tag))
}

/// A fixed-width option value with a big-endian wire representation.
///
/// Decoding and encoding are parameterized only by [`WIDTH`](Self::WIDTH);
/// an IPv4 address is representationally identical to a 4-byte unsigned
/// integer.
pub trait OptionValue: Sized {
    /// Wire width in bytes.
    const WIDTH: usize;

    /// Decodes a value from exactly [`WIDTH`](Self::WIDTH) big-endian bytes.
    fn decode(raw: &[u8]) -> Result<Self>;

    /// Appends the big-endian encoding to `out`, advancing the write cursor
    /// by [`WIDTH`](Self::WIDTH) bytes.
    fn put(&self, out: &mut Vec<u8>);
}

fn check_width<T: OptionValue>(raw: &[u8]) -> Result<()> {
    if raw.len() != T::WIDTH {
        return Err(Error::ValueWidth {
            expected: T::WIDTH,
            actual: raw.len(),
        });
    }
    Ok(())
}

impl OptionValue for u8 {
    const WIDTH: usize = 1;

    fn decode(raw: &[u8]) -> Result<Self> {
        check_width::<Self>(raw)?;
        Ok(raw[0])
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl OptionValue for u16 {
    const WIDTH: usize = 2;

    fn decode(raw: &[u8]) -> Result<Self> {
        check_width::<Self>(raw)?;
        Ok(u16::from_be_bytes([raw[0], raw[1]]))
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_be_bytes());
    }
}

impl OptionValue for u32 {
    const WIDTH: usize = 4;

    fn decode(raw: &[u8]) -> Result<Self> {
        check_width::<Self>(raw)?;
        Ok(u32::from_be_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_be_bytes());
    }
}

impl OptionValue for Ipv4Addr {
    const WIDTH: usize = 4;

    fn decode(raw: &[u8]) -> Result<Self> {
        check_width::<Self>(raw)?;
        Ok(Ipv4Addr::new(raw[0], raw[1], raw[2], raw[3]))
    }

    fn put(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.octets());
    }
}

/// Serializer for the options area of a reply.
///
/// Appends TLV entries in insertion order; the caller finishes with
/// [`end`](Self::end) to write the terminator and take the bytes.
#[derive(Debug, Default)]
pub struct OptionWriter {
    buf: Vec<u8>,
}

impl OptionWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one fixed-width option as tag + length + big-endian value.
    pub fn put<T: OptionValue>(&mut self, tag: OptionTag, value: T) -> &mut Self {
        self.buf.push(tag as u8);
        self.buf.push(T::WIDTH as u8);
        value.put(&mut self.buf);
        self
    }

    /// Current write position in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes the END terminator and returns the serialized options area.
    pub fn end(mut self) -> Vec<u8> {
        self.buf.push(OptionTag::End as u8);
        self.buf
    }
}
