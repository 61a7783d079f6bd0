use std::time::Duration;

use snag_net::{IpFamily, TransportOptions};

/// Default bound on followed redirects.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Settings for one dispatch run.
///
/// Built once from command-line flags and passed by reference to the
/// dispatcher and every method it invokes.
///
/// # Examples
///
/// ```
/// use snag_fetch::Config;
///
/// let config = Config::default()
///     .show_progress(true)
///     .follow_redirects(false)
///     .resume(true);
/// assert!(!config.follow_redirects);
/// assert!(!config.transport.verify_peer);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Render progress while bodies stream in.
    ///
    /// Default: false
    pub show_progress: bool,

    /// Follow HTTP redirects instead of stopping at the first one.
    ///
    /// Default: true
    pub follow_redirects: bool,

    /// Maximum number of redirects followed in one run.
    ///
    /// Default: 10
    pub max_redirects: usize,

    /// Continue a partial download if the output file already exists.
    ///
    /// Default: false
    pub resume: bool,

    /// Emit protocol-level debug output.
    ///
    /// Default: false
    pub debug: bool,

    /// Socket, TLS and resolution settings.
    pub transport: TransportOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_progress: false,
            follow_redirects: true,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            resume: false,
            debug: false,
            transport: TransportOptions::default(),
        }
    }
}

impl Config {
    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn verify_peer(mut self, verify: bool) -> Self {
        self.transport.verify_peer = verify;
        self
    }

    pub fn allow_tls10(mut self, allow: bool) -> Self {
        self.transport.allow_tls10 = allow;
        self
    }

    pub fn allow_tls11(mut self, allow: bool) -> Self {
        self.transport.allow_tls11 = allow;
        self
    }

    pub fn ip_family(mut self, family: IpFamily) -> Self {
        self.transport.ip_family = family;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.transport.read_timeout = timeout;
        self
    }
}
