use std::net::SocketAddr;
use std::time::Duration;

/// Receive timeout applied to every socket.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound for a single connect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Address families accepted when resolving a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IpFamily {
    /// Try every resolved address in resolver order.
    #[default]
    Any,
    V4,
    V6,
}

impl IpFamily {
    pub fn accepts(&self, addr: &SocketAddr) -> bool {
        match self {
            IpFamily::Any => true,
            IpFamily::V4 => addr.is_ipv4(),
            IpFamily::V6 => addr.is_ipv6(),
        }
    }
}

/// Settings shared by every transport opened during one run.
///
/// # Examples
///
/// ```
/// use snag_net::{IpFamily, TransportOptions};
///
/// let options = TransportOptions::default()
///     .verify_peer(true)
///     .ip_family(IpFamily::V4);
/// assert!(options.verify_peer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportOptions {
    /// Receive timeout for plain sockets and for the socket under a TLS session.
    ///
    /// Default: 30s
    pub read_timeout: Duration,

    /// Timeout for each connect attempt.
    ///
    /// Default: 30s
    pub connect_timeout: Duration,

    /// Verify the peer certificate chain and hostname.
    ///
    /// Default: false
    pub verify_peer: bool,

    /// Accept TLS 1.0 handshakes.
    ///
    /// Default: false
    pub allow_tls10: bool,

    /// Accept TLS 1.1 handshakes.
    ///
    /// Default: false
    pub allow_tls11: bool,

    /// Address family filter applied after resolution.
    ///
    /// Default: [`IpFamily::Any`]
    pub ip_family: IpFamily,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            verify_peer: false,
            allow_tls10: false,
            allow_tls11: false,
            ip_family: IpFamily::Any,
        }
    }
}

impl TransportOptions {
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn verify_peer(mut self, verify: bool) -> Self {
        self.verify_peer = verify;
        self
    }

    pub fn allow_tls10(mut self, allow: bool) -> Self {
        self.allow_tls10 = allow;
        self
    }

    pub fn allow_tls11(mut self, allow: bool) -> Self {
        self.allow_tls11 = allow;
        self
    }

    pub fn ip_family(mut self, family: IpFamily) -> Self {
        self.ip_family = family;
        self
    }
}
