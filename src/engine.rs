//! Message engine: interprets one inbound datagram and produces zero or one
//! reply.
//!
//! The engine is the pure protocol core. It owns the lease table, receives
//! the current time as a parameter, and never touches a socket or clock
//! itself; the transport in [`crate::server`] feeds it raw bytes and
//! broadcasts whatever it returns.
//!
//! All DHCP state is implicit in the message-type option; the lease table is
//! the only state carried across messages. Every malformed input or failed
//! precondition drops the current message with no reply and no table
//! mutation beyond the per-message expiration flush — the client's own
//! retransmission timers take care of the rest.

use std::net::Ipv4Addr;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::hash::client_hash;
use crate::lease::LeaseTable;
use crate::options::{find_option, MessageType, OptionTag, OptionValue, OptionWriter};
use crate::packet::{DhcpMessage, BOOTREPLY, BOOTREQUEST};

/// Reservation window for a provisional lease created on DISCOVER, in
/// seconds. Extended to the full configured duration by a matching REQUEST.
const PROVISIONAL_LEASE_SECS: u64 = 15;

/// Maximum number of parameter-request-list entries honored per message;
/// excess entries are silently ignored.
const MAX_REQUESTED_PARAMS: usize = 16;

/// Single-instance protocol engine: config plus lease table.
pub struct Engine {
    config: Arc<Config>,
    leases: LeaseTable,
}

impl Engine {
    pub fn new(config: Arc<Config>) -> Self {
        let leases = LeaseTable::new(config.lease_count);
        Self { config, leases }
    }

    /// Number of currently held leases, for diagnostics.
    pub fn active_leases(&self) -> usize {
        self.leases.active_leases()
    }

    /// Handles one inbound datagram received at `now` (seconds since an
    /// arbitrary fixed epoch) and returns the reply bytes to broadcast, or
    /// `None` when the message is dropped.
    pub fn handle(&mut self, datagram: &[u8], now: u64) -> Option<Vec<u8>> {
        let mut msg = match DhcpMessage::parse(datagram) {
            Ok(msg) => msg,
            Err(error) => {
                debug!("dropping datagram: {error}");
                return None;
            }
        };

        if msg.op != BOOTREQUEST {
            debug!(op = msg.op, "dropping non-BOOTREQUEST message");
            return None;
        }

        // Every DHCP message carries its protocol state in the message-type
        // option; take the first value byte like the firmware did rather
        // than insisting on a length of exactly 1.
        let msg_type = find_option(&msg.options, OptionTag::MessageType)
            .ok()
            .and_then(|view| view.first().copied())?;
        let msg_type = match MessageType::try_from(msg_type) {
            Ok(msg_type) => msg_type,
            Err(raw) => {
                debug!(raw, "dropping message with unknown message type");
                return None;
            }
        };

        // Exactly one flush per inbound message, before identity
        // resolution; later lookups must not observe stale leases.
        self.leases.flush_expired(now);

        // Client identity: prefer the client-id option, fall back to the
        // hardware address of declared length.
        let hash = match find_option(&msg.options, OptionTag::ClientId) {
            Ok(client_id) => client_hash(client_id),
            Err(_) => client_hash(msg.chaddr_bytes()),
        };

        let mut requested = [OptionTag::Pad; MAX_REQUESTED_PARAMS];
        let mut requested_len = 0;
        if let Ok(params) = find_option(&msg.options, OptionTag::ParameterRequestList) {
            for &raw in params.iter().take(MAX_REQUESTED_PARAMS) {
                if let Ok(tag) = OptionTag::try_from(raw) {
                    requested[requested_len] = tag;
                    requested_len += 1;
                }
            }
        }

        let mac = msg.format_mac();
        let (slot, resp_type) = match msg_type {
            MessageType::Discover => {
                info!(%mac, "DISCOVER client_hash={hash:#010x}");

                let slot = match self.leases.get_lease(hash) {
                    // Retransmitted DISCOVER; reuse the reserved slot.
                    Some(slot) => slot,
                    None => {
                        match self.leases.new_lease(hash, now + PROVISIONAL_LEASE_SECS) {
                            Some(slot) => slot,
                            None => {
                                // Table full: no OFFER is the backpressure.
                                warn!(%mac, "lease table exhausted, dropping DISCOVER");
                                return None;
                            }
                        }
                    }
                };

                (slot, MessageType::Offer)
            }

            MessageType::Request => {
                info!(%mac, "REQUEST client_hash={hash:#010x}");

                let server_id = find_option(&msg.options, OptionTag::ServerIdentifier)
                    .ok()
                    .and_then(|view| Ipv4Addr::decode(view).ok())?;
                if server_id != self.config.server_ip {
                    debug!(%server_id, "REQUEST addressed to another server, dropping");
                    return None;
                }

                // The DISCOVER must have reserved a slot already; a REQUEST
                // without one is stale client state.
                let Some(slot) = self.leases.get_lease(hash) else {
                    debug!(%mac, "REQUEST without prior lease, dropping");
                    return None;
                };

                self.leases.update_lease(
                    hash,
                    now + u64::from(self.config.lease_duration_seconds),
                );

                (slot, MessageType::Ack)
            }

            other => {
                debug!(%other, "dropping unsupported message type");
                return None;
            }
        };

        let yiaddr = self.config.lease_addr(slot);

        // RFC 2131 table 3: xid, flags, giaddr, chaddr (and htype/hlen) are
        // kept from the request; hops, secs and ciaddr are zeroed.
        msg.op = BOOTREPLY;
        msg.hops = 0;
        msg.secs = 0;
        msg.ciaddr = Ipv4Addr::UNSPECIFIED;
        msg.yiaddr = yiaddr;
        msg.siaddr = self.config.server_ip;

        let lease_secs = self.config.lease_duration_seconds;
        let mut writer = OptionWriter::new();
        writer
            .put(OptionTag::MessageType, resp_type as u8)
            .put(OptionTag::ServerIdentifier, self.config.server_ip)
            .put(OptionTag::LeaseTime, lease_secs)
            .put(OptionTag::RenewalTime, lease_secs / 2)
            .put(
                OptionTag::RebindingTime,
                (u64::from(lease_secs) * 2 / 3) as u32,
            );

        // Requested options we have a configured value for; everything
        // else is skipped.
        for &tag in &requested[..requested_len] {
            match tag {
                OptionTag::SubnetMask => {
                    writer.put(tag, self.config.subnet_mask);
                }
                OptionTag::Router => {
                    if let Some(gateway) = self.config.gateway {
                        writer.put(tag, gateway);
                    }
                }
                OptionTag::Dns => {
                    if let Some(dns) = self.config.dns {
                        writer.put(tag, dns);
                    }
                }
                OptionTag::BroadcastAddr => {
                    writer.put(tag, self.config.broadcast());
                }
                _ => {}
            }
        }

        msg.options = writer.end();

        info!(%resp_type, %yiaddr, active = self.leases.active_leases(), "replying");

        Some(msg.encode())
    }
}
