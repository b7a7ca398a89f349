//! # nanolease
//!
//! A minimal DHCP server (RFC 2131/2132) for small, fixed-size networks.
//!
//! Clients are assigned addresses from a fixed-capacity slot table: slot N
//! maps to `lease_start + N`. Only the DISCOVER/OFFER and REQUEST/ACK legs
//! of the protocol are implemented; anything else — and anything malformed —
//! is silently dropped and left to the client's own retransmission timers.
//!
//! ## Architecture
//!
//! - [`Config`] - Server configuration (addresses, lease range, duration)
//! - [`DhcpServer`] - UDP transport on port 67, broadcasting replies to 68
//! - [`Engine`] - The protocol core: one datagram in, zero or one reply out
//! - [`LeaseTable`] - Fixed-capacity client-hash → slot-index store
//! - [`DhcpMessage`] - Wire-level message decode/encode
//!
//! ## Quick Start
//!
//! ```no_run
//! use nanolease::{Config, DhcpServer};
//!
//! #[tokio::main]
//! async fn main() -> nanolease::Result<()> {
//!     let config = Config::load_or_create("config.json")?;
//!     let mut server = DhcpServer::new(config)?;
//!     server.run().await
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hash;
pub mod lease;
pub mod options;
pub mod packet;
pub mod server;

pub use config::Config;
pub use engine::Engine;
pub use error::{Error, Result};
pub use lease::LeaseTable;
pub use options::{find_option, MessageType, OptionTag, OptionValue, OptionWriter};
pub use packet::DhcpMessage;
pub use server::DhcpServer;
