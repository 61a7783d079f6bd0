use std::env;
use std::io::{self, Read, Write};
use std::net::TcpStream;

use snag_net::BUFFER_SIZE;
use tracing::{debug, info, warn};

use super::{Context, Method, TransferOutcome};
use crate::error::{Error, Result};
use crate::output::open_output;
use crate::prompt::Prompter;
use crate::request::Request;

const SFTP_PORT: u16 = 22;

/// Who to log in as, and with what.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshAuth {
    pub host: String,
    pub user: String,
    /// Password authentication when set, public keys otherwise.
    pub password: Option<String>,
}

/// Performs the SSH handshake and authentication over an open socket.
pub trait SftpConnector {
    fn connect(
        &self,
        stream: TcpStream,
        auth: &SshAuth,
        prompter: &dyn Prompter,
    ) -> Result<Box<dyn SftpSession>>;
}

/// An authenticated SFTP session. Dropping it disconnects.
pub trait SftpSession {
    /// Size of a remote file, when the server reports one.
    fn size(&mut self, path: &str) -> Result<Option<u64>>;

    /// Open a remote file for sequential reading starting at `offset`.
    fn open(&mut self, path: &str, offset: u64) -> Result<Box<dyn Read + '_>>;
}

/// Connector for builds without SFTP support.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl SftpConnector for Unsupported {
    fn connect(
        &self,
        _stream: TcpStream,
        _auth: &SshAuth,
        _prompter: &dyn Prompter,
    ) -> Result<Box<dyn SftpSession>> {
        Err(Error::Sftp("built without SFTP support".into()))
    }
}

/// The connector compiled into this build.
pub fn default_connector() -> Box<dyn SftpConnector> {
    #[cfg(feature = "sftp")]
    {
        Box::new(super::Ssh2Connector)
    }
    #[cfg(not(feature = "sftp"))]
    {
        Box::new(Unsupported)
    }
}

/// Local login name, used when the URL names no user.
fn login_name() -> Option<String> {
    env::var("USER")
        .or_else(|_| env::var("USERNAME"))
        .ok()
        .filter(|u| !u.is_empty())
}

/// File retrieval over SSH.
#[derive(Debug, Clone, Copy, Default)]
pub struct SftpMethod;

impl Method for SftpMethod {
    fn fetch(&self, cx: &Context<'_>, request: &Request) -> Result<TransferOutcome> {
        let user = match request.user() {
            Some(user) => user.to_string(),
            None => login_name().ok_or_else(|| Error::Sftp("no user name given".into()))?,
        };
        let auth = SshAuth {
            host: request.host().to_string(),
            user,
            password: request.password().map(str::to_string),
        };

        let port = request.port().unwrap_or(SFTP_PORT);
        let stream = snag_net::connect_tcp(request.host(), port, &cx.config.transport)?;
        let mut session = cx.sftp.connect(stream, &auth, cx.prompter)?;

        let path = request.absolute_object();
        let size = session.size(&path)?;
        let offset = request.resume_offset();
        if let Some(size) = size {
            if request.is_resuming() && offset == size {
                info!(path = %path, size, "output is already complete");
                return Ok(TransferOutcome::Completed);
            }
            if request.is_resuming() && offset > size {
                warn!(
                    path = %path,
                    size,
                    local = offset,
                    "local file is larger than the remote one, leaving it untouched"
                );
                return Ok(TransferOutcome::Completed);
            }
        }

        let mut reader = session.open(&path, offset)?;
        let mut output = open_output(request.output(), request.is_resuming())?;
        let mut tracker = cx.tracker(size, offset);

        let received = copy(reader.as_mut(), &mut output, |n| tracker.step(n))?;
        tracker.finish();
        debug!(received, "remote file read");
        Ok(TransferOutcome::Completed)
    }
}

fn copy(reader: &mut dyn Read, sink: &mut dyn Write, mut step: impl FnMut(u64)) -> Result<u64> {
    let mut buf = [0u8; BUFFER_SIZE];
    let mut received = 0;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(snag_net::Error::from(e).into()),
        };
        sink.write_all(&buf[..n]).map_err(snag_net::Error::Sink)?;
        received += n as u64;
        step(n as u64);
    }
    sink.flush().map_err(snag_net::Error::Sink)?;
    Ok(received)
}
