use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// The smallest read buffer hyper accepts for HTTP/1 connections.
const MIN_HEADER_BYTES: usize = 8 * 1024;

/// Listener and connection settings, parsed from the command line or the environment.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// HTTP port to bind to
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Address to bind to
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Seconds allowed for a client to send the request head
    #[arg(long, default_value_t = 2)]
    pub header_read_timeout: u64,

    /// Seconds allowed for reading the body and running the handler
    #[arg(long, default_value_t = 5)]
    pub request_timeout: u64,

    /// Upper bound for the request head, in bytes, never below 8 KiB
    #[arg(long, default_value_t = MIN_HEADER_BYTES)]
    pub max_header_bytes: usize,

    /// Seconds to wait for in-flight connections on shutdown
    #[arg(long, default_value_t = 5)]
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            header_read_timeout: 2,
            request_timeout: 5,
            max_header_bytes: MIN_HEADER_BYTES,
            shutdown_timeout: 5,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn header_read_timeout(&self) -> Duration {
        Duration::from_secs(self.header_read_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes.max(MIN_HEADER_BYTES)
    }
}
