use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to resolve host '{host}': {source}")]
    Resolve { host: String, source: io::Error },

    #[error("no address of the requested family found for host '{host}'")]
    NoAddress { host: String },

    #[error("connect() for host '{host}' on port {port} failed: {source}")]
    Connect {
        host: String,
        port: u16,
        source: io::Error,
    },

    #[error("failed to set up TLS: {0}")]
    TlsSetup(#[source] native_tls::Error),

    #[error("TLS handshake with '{host}' failed: {message}")]
    Handshake { host: String, message: String },

    #[error("not connected")]
    NotConnected,

    #[error("connection timed out")]
    Timeout,

    #[error("connection closed by peer")]
    UnexpectedEof,

    #[error("received line longer than {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("connection closed after {received} of {expected} bytes")]
    Truncated { received: u64, expected: u64 },

    #[error("failed to write received data: {0}")]
    Sink(#[source] io::Error),

    #[error(transparent)]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            io::ErrorKind::UnexpectedEof => Self::UnexpectedEof,
            _ => Self::Io(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
