//! SFTP sessions backed by libssh2.

use std::io::{Read, Seek, SeekFrom};
use std::net::TcpStream;
use std::path::{Path, PathBuf};

use ssh2::{HashType, Session, Sftp};
use tracing::{debug, info, warn};

use super::sftp::{SftpConnector, SftpSession, SshAuth};
use crate::error::{Error, Result};
use crate::prompt::Prompter;

/// Key pairs tried for public-key authentication, in order.
const KEY_NAMES: [&str; 2] = ["id_rsa", "id_dsa"];

fn ssh_error(e: ssh2::Error) -> Error {
    Error::Sftp(e.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Ssh2Connector;

impl SftpConnector for Ssh2Connector {
    fn connect(
        &self,
        stream: TcpStream,
        auth: &SshAuth,
        prompter: &dyn Prompter,
    ) -> Result<Box<dyn SftpSession>> {
        let mut session = Session::new().map_err(ssh_error)?;
        session.set_tcp_stream(stream);
        session.handshake().map_err(ssh_error)?;

        if let Some(hash) = session.host_key_hash(HashType::Sha1) {
            info!(host = %auth.host, fingerprint = %hex::encode(hash), "server host key");
        }

        authenticate(&session, auth, prompter)?;
        let sftp = session.sftp().map_err(ssh_error)?;
        Ok(Box::new(Ssh2Session { session, sftp }))
    }
}

fn authenticate(session: &Session, auth: &SshAuth, prompter: &dyn Prompter) -> Result<()> {
    let methods = session.auth_methods(&auth.user).map_err(ssh_error)?;
    debug!(methods, user = %auth.user, "server authentication methods");
    let offers = |name: &str| methods.split(',').any(|m| m == name);

    match &auth.password {
        Some(password) => {
            if !offers("password") {
                return Err(Error::Sftp(format!(
                    "server does not accept password authentication (offers {methods})"
                )));
            }
            session
                .userauth_password(&auth.user, password)
                .map_err(ssh_error)?;
        }
        None => {
            if !offers("publickey") {
                return Err(Error::Sftp(format!(
                    "server does not accept public key authentication (offers {methods})"
                )));
            }
            authenticate_with_keys(session, &auth.user, prompter)?;
        }
    }

    if !session.authenticated() {
        return Err(Error::Sftp(format!("authentication failed for {}", auth.user)));
    }
    Ok(())
}

fn authenticate_with_keys(session: &Session, user: &str, prompter: &dyn Prompter) -> Result<()> {
    let ssh_dir = home::home_dir()
        .ok_or_else(|| Error::Sftp("cannot determine home directory".into()))?
        .join(".ssh");

    for name in KEY_NAMES {
        let private = ssh_dir.join(name);
        if !private.is_file() {
            continue;
        }
        let public = ssh_dir.join(format!("{name}.pub"));
        let public: Option<PathBuf> = public.is_file().then_some(public);

        match session.userauth_pubkey_file(user, public.as_deref(), &private, None) {
            Ok(()) => return Ok(()),
            Err(e) => debug!(key = %private.display(), error = %e, "key rejected without passphrase"),
        }

        let passphrase = prompter
            .secret(&format!("Passphrase for {}", private.display()))
            .map_err(Error::Input)?;
        match session.userauth_pubkey_file(user, public.as_deref(), &private, Some(&passphrase)) {
            Ok(()) => return Ok(()),
            Err(e) => warn!(key = %private.display(), error = %e, "key rejected"),
        }
    }

    Err(Error::Sftp(format!(
        "no usable key in {} for {user}",
        ssh_dir.display()
    )))
}

struct Ssh2Session {
    session: Session,
    sftp: Sftp,
}

impl SftpSession for Ssh2Session {
    fn size(&mut self, path: &str) -> Result<Option<u64>> {
        let stat = self.sftp.stat(Path::new(path)).map_err(ssh_error)?;
        Ok(stat.size)
    }

    fn open(&mut self, path: &str, offset: u64) -> Result<Box<dyn Read + '_>> {
        let mut file = self.sftp.open(Path::new(path)).map_err(ssh_error)?;
        if offset > 0 {
            file.seek(SeekFrom::Start(offset))
                .map_err(snag_net::Error::from)?;
        }
        Ok(Box::new(file))
    }
}

impl Drop for Ssh2Session {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "transfer finished", None) {
            debug!(error = %e, "SSH disconnect failed");
        }
    }
}
