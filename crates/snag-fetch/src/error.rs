//! Error types for snag-fetch.

use std::io;
use std::path::PathBuf;

/// Broad class of a failure, used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input from the user or the server could not be parsed.
    Parse,
    /// The server answered, but not in a way that lets the transfer continue.
    Protocol,
    /// Resolution, connection, TLS or socket I/O failed.
    Transport,
    /// Local file or terminal I/O failed.
    Io,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse url: {0}")]
    MalformedUrl(String),

    #[error("URL does not have a valid object name: {0}")]
    NoObjectName(String),

    #[error("received malformed HTTP header line: {line:?}")]
    MalformedHeader { line: String },

    #[error("redirect response ({status}) without a Location header")]
    MissingLocation { status: u16 },

    #[error("received garbage from FTP server: {line:?}")]
    GarbledReply { line: String },

    #[error("failed to parse {what} from {line:?}")]
    MalformedReply { what: &'static str, line: String },

    #[error("the requested object {object} cannot be found on the server")]
    NotFound { object: String },

    #[error("received unexpected response code from server: {0}")]
    UnexpectedStatus(u16),

    #[error("received unexpected reply {code} from FTP server while one of {expected:?} was expected: {text}")]
    UnexpectedReply {
        code: u16,
        expected: Vec<u16>,
        text: String,
    },

    #[error("FTP server doesn't support PASV nor EPSV")]
    NoPassiveMode,

    #[error("the method {0} is not supported")]
    UnsupportedMethod(String),

    #[error("redirect limit of {limit} exceeded")]
    TooManyRedirects { limit: usize },

    #[error("SFTP: {0}")]
    Sftp(String),

    #[error("failed to open output file {path}: {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("failed to read user input: {0}")]
    Input(#[source] io::Error),

    #[error(transparent)]
    Transport(#[from] snag_net::Error),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedUrl(_)
            | Error::NoObjectName(_)
            | Error::MalformedHeader { .. }
            | Error::MissingLocation { .. }
            | Error::GarbledReply { .. }
            | Error::MalformedReply { .. } => ErrorKind::Parse,
            Error::NotFound { .. }
            | Error::UnexpectedStatus(_)
            | Error::UnexpectedReply { .. }
            | Error::NoPassiveMode
            | Error::UnsupportedMethod(_)
            | Error::TooManyRedirects { .. }
            | Error::Sftp(_) => ErrorKind::Protocol,
            Error::Transport(snag_net::Error::Sink(_)) => ErrorKind::Io,
            Error::Transport(_) => ErrorKind::Transport,
            Error::Output { .. } | Error::Input(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::MalformedUrl("x".into()).kind(), ErrorKind::Parse);
        assert_eq!(Error::NoPassiveMode.kind(), ErrorKind::Protocol);
        assert_eq!(
            Error::Transport(snag_net::Error::Timeout).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            Error::Transport(snag_net::Error::Sink(io::Error::other("disk full"))).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn test_unexpected_reply_lists_accepted_codes() {
        let err = Error::UnexpectedReply {
            code: 550,
            expected: vec![150, 125],
            text: "No such file".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("550"));
        assert!(msg.contains("[150, 125]"));
    }
}
