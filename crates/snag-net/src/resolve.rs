use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use tracing::debug;

use crate::error::{Error, Result};
use crate::options::TransportOptions;

/// Resolve `host` and return every address accepted by the family filter, in
/// resolver order.
pub fn resolve(host: &str, port: u16, options: &TransportOptions) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| Error::Resolve {
            host: host.to_string(),
            source,
        })?
        .filter(|addr| options.ip_family.accepts(addr))
        .collect();

    if addrs.is_empty() {
        return Err(Error::NoAddress {
            host: host.to_string(),
        });
    }

    Ok(addrs)
}

/// Open a TCP connection to the first resolved address that accepts it.
///
/// The receive timeout from `options` is applied before the stream is returned.
/// Fails only after every candidate address has failed, reporting the last
/// error seen.
pub fn connect_tcp(host: &str, port: u16, options: &TransportOptions) -> Result<TcpStream> {
    let mut last_error = None;

    for addr in resolve(host, port, options)? {
        match TcpStream::connect_timeout(&addr, options.connect_timeout) {
            Ok(stream) => {
                debug!(%host, %addr, port, "connected");
                stream.set_read_timeout(Some(options.read_timeout))?;
                return Ok(stream);
            }
            Err(e) => {
                debug!(%host, %addr, error = %e, "connect failed, trying next address");
                last_error = Some(e);
            }
        }
    }

    Err(Error::Connect {
        host: host.to_string(),
        port,
        source: last_error
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no address to try")),
    })
}
