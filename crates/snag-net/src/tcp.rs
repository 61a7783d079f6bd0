use std::net::TcpStream;

use tracing::debug;

use crate::error::Result;
use crate::options::TransportOptions;
use crate::resolve::connect_tcp;
use crate::transport::{Channel, Transport, delegate_io};

/// Plaintext TCP transport.
pub struct TcpTransport {
    options: TransportOptions,
    channel: Option<Channel<TcpStream>>,
}

impl TcpTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            channel: None,
        }
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.close();
        let stream = connect_tcp(host, port, &self.options)?;
        self.channel = Some(Channel::new(stream));
        Ok(())
    }

    fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.shutdown() {
                debug!(error = %e, "tcp shutdown failed");
            }
        }
    }

    delegate_io!();
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}
