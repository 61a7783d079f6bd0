use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::url::Url;

/// Username and password carried between dispatch iterations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub user: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    pub fn new(user: Option<String>, password: Option<String>) -> Self {
        Self {
            user: user.filter(|u| !u.is_empty()),
            password: password.filter(|p| !p.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.password.is_none()
    }
}

/// One fetch operation, fixed for the duration of a method invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    host: String,
    port: Option<u16>,
    object: String,
    output: PathBuf,
    user: Option<String>,
    password: Option<String>,
    resume_offset: u64,
}

impl Request {
    /// Build a request from a parsed URL. Credentials embedded in the URL are
    /// kept unless [`Request::with_credentials`] supplies others.
    pub fn new(url: Url, output: impl Into<PathBuf>) -> Self {
        Self {
            host: url.host,
            port: url.port,
            object: url.object,
            output: output.into(),
            user: url.user,
            password: url.password,
            resume_offset: 0,
        }
    }

    /// Override URL credentials with ones obtained earlier in the run.
    pub fn with_credentials(mut self, credentials: &Credentials) -> Self {
        if credentials.is_empty() {
            return self;
        }
        if credentials.user.is_some() {
            self.user = credentials.user.clone();
            self.password = credentials.password.clone();
        } else if credentials.password.is_some() {
            self.password = credentials.password.clone();
        }
        self
    }

    pub fn with_resume_offset(mut self, offset: u64) -> Self {
        self.resume_offset = offset;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Object path with a leading `/`.
    pub fn absolute_object(&self) -> Cow<'_, str> {
        if self.object.starts_with('/') {
            Cow::Borrowed(&self.object)
        } else {
            Cow::Owned(format!("/{}", self.object))
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn resume_offset(&self) -> u64 {
        self.resume_offset
    }

    pub fn is_resuming(&self) -> bool {
        self.resume_offset > 0
    }
}
