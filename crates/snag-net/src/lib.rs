//! Blocking byte-stream transports for snag.
//!
//! # Architecture
//!
//! - `transport.rs` - The [`Transport`] capability and the buffered channel behind it
//! - `tcp.rs` / `tls.rs` - Plain and encrypted implementations
//! - `resolve.rs` - Address resolution and connect-to-first-reachable
//! - `progress.rs` - Byte-count observers
//!
//! A transport owns exactly one connection. Nothing here retries: a failed
//! connect, a timeout or a short read is reported to the caller as-is.

pub use error::{Error, Result};
pub use options::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT, IpFamily, TransportOptions};
pub use progress::{ByteCounter, NoProgress, Tracker, TrackerFactory};
pub use resolve::{connect_tcp, resolve};
pub use tcp::TcpTransport;
pub use tls::TlsTransport;
pub use transport::{BUFFER_SIZE, MAX_LINE, Transport};

mod error;
mod options;
pub mod progress;
mod resolve;
mod tcp;
mod tls;
mod transport;

/// Create an unconnected transport, encrypted when `secure` is set.
pub fn open_transport(secure: bool, options: &TransportOptions) -> Box<dyn Transport> {
    if secure {
        Box::new(TlsTransport::new(options.clone()))
    } else {
        Box::new(TcpTransport::new(options.clone()))
    }
}
