use std::path::{Path, PathBuf};

use snag_net::{NoProgress, TrackerFactory};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::method::{Context, Method, MethodKind, SftpConnector, TransferOutcome, default_connector};
use crate::output::existing_len;
use crate::prompt::{NonInteractive, Prompter};
use crate::request::{Credentials, Request};
use crate::url::Url;

/// How a dispatch run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The object was written to this file.
    Saved(PathBuf),
    /// A redirect arrived while following was disabled. Nothing was written.
    RedirectNotFollowed { location: String },
}

/// Drives one URL through parse, method selection, redirects and
/// authentication until it completes or fails.
///
/// # Examples
///
/// ```no_run
/// use snag_fetch::{Config, Credentials, Dispatcher};
///
/// let config = Config::default().follow_redirects(true);
/// let dispatcher = Dispatcher::new(&config);
/// let outcome = dispatcher.dispatch("http://example.com/file.txt", Credentials::default(), None)?;
/// println!("{outcome:?}");
/// # Ok::<(), snag_fetch::Error>(())
/// ```
pub struct Dispatcher<'a> {
    config: &'a Config,
    progress: &'a dyn TrackerFactory,
    prompter: &'a dyn Prompter,
    sftp: Box<dyn SftpConnector + 'a>,
}

impl<'a> Dispatcher<'a> {
    /// Dispatcher without progress display or interactive prompts.
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            progress: &NoProgress,
            prompter: &NonInteractive,
            sftp: default_connector(),
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn TrackerFactory) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_prompter(mut self, prompter: &'a dyn Prompter) -> Self {
        self.prompter = prompter;
        self
    }

    pub fn with_sftp(mut self, sftp: Box<dyn SftpConnector + 'a>) -> Self {
        self.sftp = sftp;
        self
    }

    /// Fetch `url`, saving to `output` or to the object's file name in the
    /// current directory.
    ///
    /// `credentials` seed the run and take precedence over credentials in the
    /// URL; answers to authentication prompts replace them.
    pub fn dispatch(
        &self,
        url: &str,
        mut credentials: Credentials,
        output: Option<&Path>,
    ) -> Result<DispatchOutcome> {
        let cx = Context {
            config: self.config,
            progress: self.progress,
            prompter: self.prompter,
            sftp: self.sftp.as_ref(),
        };

        let mut current = url.to_string();
        let mut redirects = 0;

        loop {
            let parsed = Url::parse(&current)?;
            debug!(url = %parsed, "dispatching");

            let output = match output {
                Some(path) => path.to_path_buf(),
                None => output_name(&parsed.object)?,
            };
            let resume_offset = if self.config.resume {
                existing_len(&output)
            } else {
                0
            };
            if resume_offset > 0 {
                info!(offset = resume_offset, path = %output.display(), "continuing partial download");
            }

            let method = MethodKind::for_scheme(&parsed.scheme)
                .ok_or_else(|| Error::UnsupportedMethod(parsed.scheme.clone()))?;
            let request = Request::new(parsed.clone(), &output)
                .with_credentials(&credentials)
                .with_resume_offset(resume_offset);

            match method.fetch(&cx, &request)? {
                TransferOutcome::Completed => {
                    info!("File saved to {}", output.display());
                    return Ok(DispatchOutcome::Saved(output));
                }
                TransferOutcome::Redirected(location) => {
                    let target = parsed.join(&location);
                    if !self.config.follow_redirects {
                        warn!(location = %target, "redirect not followed");
                        return Ok(DispatchOutcome::RedirectNotFollowed { location: target });
                    }
                    redirects += 1;
                    if redirects > self.config.max_redirects {
                        return Err(Error::TooManyRedirects {
                            limit: self.config.max_redirects,
                        });
                    }
                    info!(location = %target, "following redirect");
                    current = target;
                }
                TransferOutcome::AuthRequired { realm } => {
                    credentials = self.ask_credentials(realm.as_deref())?;
                }
            }
        }
    }

    fn ask_credentials(&self, realm: Option<&str>) -> Result<Credentials> {
        if let Some(realm) = realm {
            info!("Authentication required for {realm}");
        }
        let user = self.prompter.input("Username").map_err(Error::Input)?;
        let password = self.prompter.secret("Password").map_err(Error::Input)?;
        Ok(Credentials::new(Some(user), Some(password)))
    }
}

/// Local file name for an object: its final path component.
fn output_name(object: &str) -> Result<PathBuf> {
    Path::new(object)
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| Error::NoObjectName(object.to_string()))
}
