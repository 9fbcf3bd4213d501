//! Listener and shutdown settings.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::ensure;
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Lowest port accepted without elevated privileges.
const MIN_PORT: u16 = 1024;
/// Accepted graceful shutdown window, in seconds.
const SHUTDOWN_TIMEOUT_RANGE: RangeInclusive<u64> = 1..=300;
const DEFAULT_PORT: u16 = 3000;

/// Where the server listens and how long it drains on shutdown.
///
/// ```bash
/// weave --host 0.0.0.0 --port 8080
/// HOST=0.0.0.0 PORT=8080 SHUTDOWN_TIMEOUT=10 weave
/// ```
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Address to bind. `0.0.0.0` listens on every interface.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on (1024-65535).
    #[arg(short = 'p', long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Seconds that in-flight requests get to finish after a shutdown
    /// signal (1-300).
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl ServerConfig {
    /// Checks the port and shutdown window.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.port >= MIN_PORT,
            "port {} requires elevated privileges, use {MIN_PORT} or above",
            self.port
        );
        ensure!(
            SHUTDOWN_TIMEOUT_RANGE.contains(&self.shutdown_timeout),
            "shutdown timeout must be within {}..={} seconds, got {}",
            SHUTDOWN_TIMEOUT_RANGE.start(),
            SHUTDOWN_TIMEOUT_RANGE.end(),
            self.shutdown_timeout
        );
        Ok(())
    }

    #[must_use]
    pub const fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// True for `0.0.0.0` and `::`.
    #[must_use]
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            addr = %self.server_addr(),
            shutdown_timeout_secs = self.shutdown_timeout,
            "Server configuration"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: DEFAULT_PORT,
            shutdown_timeout: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_local() -> anyhow::Result<()> {
        let config = ServerConfig::default();
        config.validate()?;
        assert_eq!(config.server_addr(), SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert!(!config.binds_to_all_interfaces());
        Ok(())
    }

    #[test]
    fn privileged_ports_are_rejected() {
        let config = ServerConfig {
            port: 443,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn shutdown_timeout_bounds() {
        for (secs, valid) in [(0, false), (1, true), (300, true), (301, false)] {
            let config = ServerConfig {
                shutdown_timeout: secs,
                ..ServerConfig::default()
            };
            assert_eq!(config.validate().is_ok(), valid, "{secs}");
        }
    }

    #[test]
    fn unspecified_hosts_bind_everywhere() {
        for host in ["0.0.0.0", "::"] {
            let config = ServerConfig {
                host: host.parse().unwrap(),
                ..ServerConfig::default()
            };
            assert!(config.binds_to_all_interfaces(), "{host}");
        }
    }
}
