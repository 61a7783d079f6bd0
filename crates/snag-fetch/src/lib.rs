//! Single-resource retrieval over HTTP(S), FTP and SFTP.
//!
//! # Architecture
//!
//! - [`url`] - Decomposes `scheme://[user[:password]@]host[:port]/object`
//! - [`Request`] - One fetch operation, rebuilt for every dispatch iteration
//! - [`method`] - Wire conversations per scheme, selected through a static registry
//! - [`Dispatcher`] - The redirect/authentication loop
//!
//! Redirects and authentication challenges come back from a method as a
//! [`TransferOutcome`], never as an error. Everything else that goes wrong is
//! an [`Error`] and ends the run.
//!
//! # Features
//!
//! - `sftp` (default) - SFTP through libssh2. Without it `sftp://` URLs fail
//!   with [`Error::Sftp`].

mod config;
mod dispatch;
mod error;
pub mod method;
mod output;
mod prompt;
mod request;
pub mod url;

pub use config::{Config, DEFAULT_MAX_REDIRECTS};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{Error, ErrorKind, Result};
pub use method::{Method, MethodKind, TransferOutcome};
pub use prompt::{NonInteractive, Prompter};
pub use request::{Credentials, Request};
pub use url::Url;
