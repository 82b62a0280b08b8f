//! Connection configuration.
//!
//! Socket options applied when a [`Connection`](super::Connection) opens its
//! socket. Nothing here is read from files or the environment.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use genetlink::netlink::{Connection, ConnectionConfig};
//!
//! # fn example() -> genetlink::Result<()> {
//! let config = ConnectionConfig::new()
//!     .recv_timeout(Duration::from_secs(2))
//!     .ext_ack(true)
//!     .build();
//!
//! let conn = Connection::open_with(config)?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

/// Where a connection takes the port ID it stamps on requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PortId {
    /// The ID of the owning process.
    #[default]
    Process,
    /// The address the kernel assigned when the socket was bound.
    ///
    /// Differs from the process ID when a process binds more than one
    /// netlink socket of the same protocol.
    Bound,
}

/// Socket options for a generic netlink connection.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Receive timeout (`SO_RCVTIMEO`). `None` blocks indefinitely.
    pub recv_timeout: Option<Duration>,
    /// Send timeout (`SO_SNDTIMEO`). `None` blocks indefinitely.
    pub send_timeout: Option<Duration>,
    /// Kernel receive buffer size (`SO_RCVBUF`).
    pub recv_buffer_size: Option<usize>,
    /// Request extended ACK messages (`NETLINK_EXT_ACK`).
    pub ext_ack: bool,
    /// Port ID source.
    pub port_id: PortId,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            recv_timeout: None,
            send_timeout: None,
            recv_buffer_size: None,
            ext_ack: true,
            port_id: PortId::Process,
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the time a request waits for each reply datagram.
    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.recv_timeout = Some(timeout);
        self
    }

    /// Bound the time a request waits to be sent.
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = Some(timeout);
        self
    }

    /// Set the kernel receive buffer size in bytes.
    pub fn recv_buffer_size(mut self, bytes: usize) -> Self {
        self.recv_buffer_size = Some(bytes);
        self
    }

    /// Enable or disable extended ACK (default: enabled).
    pub fn ext_ack(mut self, enable: bool) -> Self {
        self.ext_ack = enable;
        self
    }

    /// Set the port ID source (default: [`PortId::Process`]).
    pub fn port_id(mut self, source: PortId) -> Self {
        self.port_id = source;
        self
    }

    /// Build the configuration (returns self, for API consistency).
    pub fn build(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConnectionConfig::new();
        assert!(config.recv_timeout.is_none());
        assert!(config.send_timeout.is_none());
        assert!(config.recv_buffer_size.is_none());
        assert!(config.ext_ack);
        assert_eq!(config.port_id, PortId::Process);
    }

    #[test]
    fn test_builder() {
        let config = ConnectionConfig::new()
            .recv_timeout(Duration::from_millis(500))
            .send_timeout(Duration::from_secs(1))
            .recv_buffer_size(1 << 20)
            .ext_ack(false)
            .port_id(PortId::Bound)
            .build();

        assert_eq!(config.recv_timeout, Some(Duration::from_millis(500)));
        assert_eq!(config.send_timeout, Some(Duration::from_secs(1)));
        assert_eq!(config.recv_buffer_size, Some(1 << 20));
        assert!(!config.ext_ack);
        assert_eq!(config.port_id, PortId::Bound);
    }
}
