//! DHCP message layout per RFC 2131.
//!
//! A message is a fixed 236-byte header, a 4-byte magic cookie, and a
//! variable-length options area. This module decodes inbound datagrams into
//! [`DhcpMessage`] and re-encodes replies; all option interpretation lives
//! in [`crate::options`].
//!
//! ```text
//! 0                   1                   2                   3
//! 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |     op (1)    |   htype (1)   |   hlen (1)    |   hops (1)    |
//! +---------------+---------------+---------------+---------------+
//! |                            xid (4)                            |
//! +-------------------------------+-------------------------------+
//! |           secs (2)            |           flags (2)           |
//! +-------------------------------+-------------------------------+
//! |                          ciaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          yiaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          siaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          giaddr (4)                           |
//! +---------------------------------------------------------------+
//! |                          chaddr (16)                          |
//! +---------------------------------------------------------------+
//! |                          sname (64)                           |
//! +---------------------------------------------------------------+
//! |                          file (128)                           |
//! +---------------------------------------------------------------+
//! |                    magic cookie (4) = 99.130.83.99            |
//! +---------------------------------------------------------------+
//! |                          options (variable)                   |
//! +---------------------------------------------------------------+
//! ```
//!
//! # References
//!
//! - RFC 2131: Dynamic Host Configuration Protocol

use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Magic cookie that identifies DHCP messages, in wire order.
pub const DHCP_MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

const SNAME_OFFSET: usize = 44;
const FILE_OFFSET: usize = 108;
const COOKIE_OFFSET: usize = 236;

/// Offset of the options area: fixed header plus magic cookie.
pub const OPTIONS_OFFSET: usize = COOKIE_OFFSET + DHCP_MAGIC_COOKIE.len();

/// Minimum accepted datagram: header through options offset plus one
/// mandatory 3-byte message-type option.
pub const MESSAGE_MIN_LEN: usize = OPTIONS_OFFSET + 3;

/// Size of the message backing buffer; datagrams must be strictly shorter.
pub const MESSAGE_MAX_LEN: usize = 576;

/// BOOTP/DHCP operation code for client requests.
pub const BOOTREQUEST: u8 = 1;

/// BOOTP/DHCP operation code for server replies.
pub const BOOTREPLY: u8 = 2;

/// A decoded DHCP message.
///
/// Holds the fixed header fields in native representation and the options
/// area as raw bytes; option lookups borrow slices from `options` via
/// [`crate::options::find_option`].
#[derive(Debug, Clone)]
pub struct DhcpMessage {
    /// Operation code: [`BOOTREQUEST`] or [`BOOTREPLY`].
    pub op: u8,
    /// Hardware address type (1 for Ethernet).
    pub htype: u8,
    /// Hardware address length in bytes.
    pub hlen: u8,
    /// Hop count, incremented by relay agents.
    pub hops: u8,
    /// Transaction ID chosen by the client, echoed in replies.
    pub xid: u32,
    /// Seconds elapsed since the client began address acquisition.
    pub secs: u16,
    /// Flags. Bit 15 (0x8000) = broadcast flag.
    pub flags: u16,
    /// Client address (set by clients in RENEWING/REBINDING states).
    pub ciaddr: Ipv4Addr,
    /// "Your" address - the address being assigned to the client.
    pub yiaddr: Ipv4Addr,
    /// Server address.
    pub siaddr: Ipv4Addr,
    /// Gateway address, set by relay agents.
    pub giaddr: Ipv4Addr,
    /// Client hardware address, zero-padded to 16 bytes.
    pub chaddr: [u8; 16],
    /// Server host name field.
    pub sname: [u8; 64],
    /// Boot file name field.
    pub file: [u8; 128],
    /// Raw options area bytes (everything after the magic cookie).
    pub options: Vec<u8>,
}

impl DhcpMessage {
    /// Decodes a DHCP message from raw datagram bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMessage`] if the datagram is shorter than
    /// [`MESSAGE_MIN_LEN`], not strictly shorter than [`MESSAGE_MAX_LEN`],
    /// or carries a bad magic cookie. The operation code is *not* checked
    /// here; the engine discards non-BOOTREQUEST messages itself.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < MESSAGE_MIN_LEN || data.len() >= MESSAGE_MAX_LEN {
            return Err(Error::InvalidMessage(format!(
                "datagram of {} bytes outside accepted range {}..{}",
                data.len(),
                MESSAGE_MIN_LEN,
                MESSAGE_MAX_LEN
            )));
        }

        if data[COOKIE_OFFSET..OPTIONS_OFFSET] != DHCP_MAGIC_COOKIE {
            return Err(Error::InvalidMessage("bad magic cookie".to_string()));
        }

        let mut chaddr = [0u8; 16];
        chaddr.copy_from_slice(&data[28..44]);
        let mut sname = [0u8; 64];
        sname.copy_from_slice(&data[SNAME_OFFSET..FILE_OFFSET]);
        let mut file = [0u8; 128];
        file.copy_from_slice(&data[FILE_OFFSET..COOKIE_OFFSET]);

        Ok(Self {
            op: data[0],
            htype: data[1],
            hlen: data[2],
            hops: data[3],
            xid: u32::from_be_bytes([data[4], data[5], data[6], data[7]]),
            secs: u16::from_be_bytes([data[8], data[9]]),
            flags: u16::from_be_bytes([data[10], data[11]]),
            ciaddr: Ipv4Addr::new(data[12], data[13], data[14], data[15]),
            yiaddr: Ipv4Addr::new(data[16], data[17], data[18], data[19]),
            siaddr: Ipv4Addr::new(data[20], data[21], data[22], data[23]),
            giaddr: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
            chaddr,
            sname,
            file,
            options: data[OPTIONS_OFFSET..].to_vec(),
        })
    }

    /// Encodes the message: header, cookie, then the options area verbatim.
    ///
    /// The caller is responsible for `options` ending in an END tag; replies
    /// built through [`crate::options::OptionWriter::end`] always do. The
    /// result is the exact byte range to send, header through terminator.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(OPTIONS_OFFSET + self.options.len());

        out.push(self.op);
        out.push(self.htype);
        out.push(self.hlen);
        out.push(self.hops);
        out.extend_from_slice(&self.xid.to_be_bytes());
        out.extend_from_slice(&self.secs.to_be_bytes());
        out.extend_from_slice(&self.flags.to_be_bytes());
        out.extend_from_slice(&self.ciaddr.octets());
        out.extend_from_slice(&self.yiaddr.octets());
        out.extend_from_slice(&self.siaddr.octets());
        out.extend_from_slice(&self.giaddr.octets());
        out.extend_from_slice(&self.chaddr);
        out.extend_from_slice(&self.sname);
        out.extend_from_slice(&self.file);
        out.extend_from_slice(&DHCP_MAGIC_COOKIE);
        out.extend_from_slice(&self.options);

        out
    }

    /// Client hardware address bytes of declared length, clamped to the
    /// 16-byte field.
    pub fn chaddr_bytes(&self) -> &[u8] {
        &self.chaddr[..usize::from(self.hlen).min(self.chaddr.len())]
    }

    /// Formats the hardware address as a colon-separated hex string.
    pub fn format_mac(&self) -> String {
        use std::fmt::Write;
        let mut result = String::new();
        for (index, byte) in self.chaddr_bytes().iter().enumerate() {
            if index > 0 {
                result.push(':');
            }
            let _ = write!(result, "{:02x}", byte);
        }
        result
    }
}
