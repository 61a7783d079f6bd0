//! Per-scheme wire conversations.
//!
//! Each method owns the transports it opens and releases them before
//! returning, on success and on every error path.

mod ftp;
mod http;
mod sftp;
#[cfg(feature = "sftp")]
mod ssh;

pub use ftp::{FtpMethod, Reply, parse_epsv_port, parse_pasv_port, parse_reply};
pub use http::{HttpMethod, ResponseHead, parse_status};
pub use sftp::{SftpConnector, SftpMethod, SftpSession, SshAuth, Unsupported, default_connector};

#[cfg(feature = "sftp")]
pub use ssh::Ssh2Connector;

use snag_net::{NoProgress, Tracker, TrackerFactory};

use crate::config::Config;
use crate::error::Result;
use crate::prompt::Prompter;
use crate::request::Request;

/// Result of one method invocation.
///
/// Redirects and authentication challenges are ordinary outcomes handled by
/// the dispatcher, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The object was written to the output file.
    Completed,
    /// The server pointed elsewhere. The target may be relative.
    Redirected(String),
    /// The server wants credentials.
    AuthRequired { realm: Option<String> },
}

/// Collaborators shared by every method for the duration of one dispatch.
pub struct Context<'a> {
    pub config: &'a Config,
    pub progress: &'a dyn TrackerFactory,
    pub prompter: &'a dyn Prompter,
    pub sftp: &'a dyn SftpConnector,
}

impl Context<'_> {
    /// Start a tracker for one transfer, or a silent one when progress
    /// display is off.
    pub fn tracker(&self, total: Option<u64>, position: u64) -> Box<dyn Tracker> {
        if self.config.show_progress {
            self.progress.start(total, position)
        } else {
            Box::new(NoProgress)
        }
    }
}

pub trait Method {
    fn fetch(&self, cx: &Context<'_>, request: &Request) -> Result<TransferOutcome>;
}

/// The protocols snag speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Http { secure: bool },
    Ftp,
    Sftp,
}

static REGISTRY: &[(&str, MethodKind)] = &[
    ("http", MethodKind::Http { secure: false }),
    ("https", MethodKind::Http { secure: true }),
    ("ftp", MethodKind::Ftp),
    ("sftp", MethodKind::Sftp),
];

impl MethodKind {
    /// Look up the method for a scheme. Matching ignores case.
    pub fn for_scheme(scheme: &str) -> Option<Self> {
        REGISTRY
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(scheme))
            .map(|(_, kind)| *kind)
    }
}

impl Method for MethodKind {
    fn fetch(&self, cx: &Context<'_>, request: &Request) -> Result<TransferOutcome> {
        match *self {
            MethodKind::Http { secure } => HttpMethod::new(secure).fetch(cx, request),
            MethodKind::Ftp => FtpMethod.fetch(cx, request),
            MethodKind::Sftp => SftpMethod.fetch(cx, request),
        }
    }
}
