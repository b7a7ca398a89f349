//! UDP transport and clock for the message engine.
//!
//! This is the thin I/O shell around [`Engine`]: receive a datagram on port
//! 67, hand the raw bytes plus the current time to the engine, broadcast
//! whatever it returns to port 68. Processing is strictly sequential — one
//! datagram runs to completion before the next is read — so the engine needs
//! no locking.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Instant;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::engine::Engine;
use crate::error::{Error, Result};

const DHCP_SERVER_PORT: u16 = 67;
const DHCP_CLIENT_PORT: u16 = 68;

/// Receive buffer size; oversized datagrams arrive whole and are rejected
/// by the engine rather than silently truncated at the message maximum.
const RECV_BUFFER_SIZE: usize = 1500;

pub struct DhcpServer {
    config: Arc<Config>,
    engine: Engine,
    socket: UdpSocket,
    /// Fixed epoch for lease timekeeping; monotonic by construction.
    started: Instant,
}

impl DhcpServer {
    pub fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let engine = Engine::new(Arc::clone(&config));
        let socket = Self::create_socket()?;

        info!(
            "DHCP server starting on {}:{}",
            config.server_ip, DHCP_SERVER_PORT
        );
        info!(
            "lease range: {} + {} slots, {} s leases",
            config.lease_start, config.lease_count, config.lease_duration_seconds
        );

        Ok(Self {
            config,
            engine,
            socket,
            started: Instant::now(),
        })
    }

    fn create_socket() -> Result<UdpSocket> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|error| Error::Socket(format!("Failed to create socket: {}", error)))?;

        socket
            .set_reuse_address(true)
            .map_err(|error| Error::Socket(format!("Failed to set SO_REUSEADDR: {}", error)))?;

        socket
            .set_broadcast(true)
            .map_err(|error| Error::Socket(format!("Failed to set SO_BROADCAST: {}", error)))?;

        socket
            .set_nonblocking(true)
            .map_err(|error| Error::Socket(format!("Failed to set non-blocking: {}", error)))?;

        let bind_addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DHCP_SERVER_PORT);
        socket
            .bind(&bind_addr.into())
            .map_err(|error| Error::Socket(format!("Failed to bind to {}: {}", bind_addr, error)))?;

        let std_socket: std::net::UdpSocket = socket.into();
        UdpSocket::from_std(std_socket)
            .map_err(|error| Error::Socket(format!("Failed to convert to tokio socket: {}", error)))
    }

    /// Seconds since server start.
    fn now_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    /// Receives and handles datagrams until cancelled.
    pub async fn run(&mut self) -> Result<()> {
        let mut buffer = [0u8; RECV_BUFFER_SIZE];
        let destination = SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DHCP_CLIENT_PORT);

        info!("DHCP server ready and listening");

        loop {
            match self.socket.recv_from(&mut buffer).await {
                Ok((size, source)) => {
                    let now = self.now_secs();
                    if let Some(reply) = self.engine.handle(&buffer[..size], now) {
                        if let Err(error) = self.socket.send_to(&reply, destination).await {
                            warn!("Failed to send reply for {}: {}", source, error);
                        }
                    }
                }
                Err(error) => {
                    error!("Error receiving datagram: {}", error);
                }
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ports() {
        assert_eq!(DHCP_SERVER_PORT, 67);
        assert_eq!(DHCP_CLIENT_PORT, 68);
    }

    #[test]
    fn recv_buffer_exceeds_message_maximum() {
        assert!(RECV_BUFFER_SIZE > crate::packet::MESSAGE_MAX_LEN);
    }
}
