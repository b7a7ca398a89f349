use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::path::Path;

use crate::error::{Error, Result};

/// Server configuration, loaded from a JSON file.
///
/// All values are fixed for the lifetime of the server; the engine receives
/// them at construction and never re-reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// This server's own address, also sent as the server-identifier option.
    pub server_ip: Ipv4Addr,
    /// Subnet mask handed to clients that request it.
    pub subnet_mask: Ipv4Addr,
    /// Base address of the lease range; slot index N maps to
    /// `lease_start + N`.
    pub lease_start: Ipv4Addr,
    /// Number of lease slots (maximum concurrent clients).
    pub lease_count: usize,
    /// Full lease duration granted on REQUEST, in seconds.
    pub lease_duration_seconds: u32,
    /// Router handed to clients that request it.
    pub gateway: Option<Ipv4Addr>,
    /// DNS server handed to clients that request it.
    pub dns: Option<Ipv4Addr>,
    /// Broadcast address; derived from `server_ip` and `subnet_mask` when
    /// absent.
    pub broadcast_address: Option<Ipv4Addr>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_ip: Ipv4Addr::new(10, 0, 0, 2),
            subnet_mask: Ipv4Addr::new(255, 255, 255, 0),
            lease_start: Ipv4Addr::new(10, 0, 0, 10),
            lease_count: 16,
            lease_duration_seconds: 8 * 60 * 60,
            gateway: Some(Ipv4Addr::new(10, 0, 0, 1)),
            dns: Some(Ipv4Addr::new(192, 168, 2, 1)),
            broadcast_address: Some(Ipv4Addr::new(10, 0, 0, 255)),
        }
    }
}

impl Config {
    /// Loads the config from `path`, or writes the default config there if
    /// the file does not exist yet.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.lease_count == 0 {
            return Err(Error::InvalidConfig(
                "lease_count must be greater than 0".to_string(),
            ));
        }

        if self.lease_duration_seconds == 0 {
            return Err(Error::InvalidConfig(
                "lease_duration_seconds must be greater than 0".to_string(),
            ));
        }

        let start = u64::from(u32::from(self.lease_start));
        let end = start + self.lease_count as u64 - 1;
        if end > u64::from(u32::MAX) {
            return Err(Error::InvalidConfig(
                "lease range wraps the address space".to_string(),
            ));
        }

        let server = u64::from(u32::from(self.server_ip));
        if server >= start && server <= end {
            return Err(Error::InvalidConfig(
                "server_ip must not be within the lease range".to_string(),
            ));
        }

        Ok(())
    }

    /// Maps a lease slot index to the client address it represents.
    pub fn lease_addr(&self, slot: usize) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.lease_start).wrapping_add(slot as u32))
    }

    /// Broadcast address for client option replies: explicit value if
    /// configured, otherwise `server_ip | !subnet_mask`.
    pub fn broadcast(&self) -> Ipv4Addr {
        if let Some(broadcast) = self.broadcast_address {
            return broadcast;
        }
        Ipv4Addr::from(u32::from(self.server_ip) | !u32::from(self.subnet_mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_lease_count_rejected() {
        let config = Config {
            lease_count: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_lease_duration_rejected() {
        let config = Config {
            lease_duration_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn server_ip_inside_lease_range_rejected() {
        let config = Config {
            server_ip: Ipv4Addr::new(10, 0, 0, 12),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn wrapping_lease_range_rejected() {
        let config = Config {
            lease_start: Ipv4Addr::new(255, 255, 255, 250),
            lease_count: 16,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn lease_addr_offsets_from_base() {
        let config = Config::default();
        assert_eq!(config.lease_addr(0), Ipv4Addr::new(10, 0, 0, 10));
        assert_eq!(config.lease_addr(4), Ipv4Addr::new(10, 0, 0, 14));
    }

    #[test]
    fn broadcast_falls_back_to_subnet_broadcast() {
        let config = Config {
            broadcast_address: None,
            ..Default::default()
        };
        assert_eq!(config.broadcast(), Ipv4Addr::new(10, 0, 0, 255));

        let explicit = Config::default();
        assert_eq!(explicit.broadcast(), Ipv4Addr::new(10, 0, 0, 255));
    }
}
