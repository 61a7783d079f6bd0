use std::io;
use std::net::{Shutdown, TcpStream};

use native_tls::{HandshakeError, Protocol, TlsConnector, TlsStream};
use tracing::debug;

use crate::error::{Error, Result};
use crate::options::TransportOptions;
use crate::resolve::connect_tcp;
use crate::transport::{Channel, Stream, Transport, delegate_io};

impl Stream for TlsStream<TcpStream> {
    fn shutdown(&mut self) -> io::Result<()> {
        let notify = TlsStream::shutdown(self);
        let close = TcpStream::shutdown(self.get_mut(), Shutdown::Both);
        notify.and(close)
    }
}

/// Lowest protocol version the connector accepts.
fn min_protocol(options: &TransportOptions) -> Protocol {
    if options.allow_tls10 {
        Protocol::Tlsv10
    } else if options.allow_tls11 {
        Protocol::Tlsv11
    } else {
        Protocol::Tlsv12
    }
}

fn build_connector(options: &TransportOptions) -> Result<TlsConnector> {
    TlsConnector::builder()
        .danger_accept_invalid_certs(!options.verify_peer)
        .danger_accept_invalid_hostnames(!options.verify_peer)
        .min_protocol_version(Some(min_protocol(options)))
        .build()
        .map_err(Error::TlsSetup)
}

/// TLS-encrypted transport.
///
/// The receive timeout is set on the TCP socket before the handshake, so it
/// bounds reads through the session as well.
pub struct TlsTransport {
    options: TransportOptions,
    channel: Option<Channel<TlsStream<TcpStream>>>,
}

impl TlsTransport {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            options,
            channel: None,
        }
    }
}

impl Transport for TlsTransport {
    fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.close();

        let connector = build_connector(&self.options)?;
        let tcp = connect_tcp(host, port, &self.options)?;
        let stream = connector.connect(host, tcp).map_err(|e| {
            let message = match e {
                HandshakeError::Failure(e) => e.to_string(),
                HandshakeError::WouldBlock(_) => "handshake timed out".to_string(),
            };
            Error::Handshake {
                host: host.to_string(),
                message,
            }
        })?;

        debug!(%host, port, verify = self.options.verify_peer, "TLS session established");
        self.channel = Some(Channel::new(stream));
        Ok(())
    }

    fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(e) = channel.shutdown() {
                debug!(error = %e, "TLS shutdown failed");
            }
        }
    }

    delegate_io!();
}

impl Drop for TlsTransport {
    fn drop(&mut self) {
        self.close();
    }
}
