use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use once_cell::sync::Lazy;
use regex::Regex;
use snag_net::{Tracker, Transport};
use tracing::{debug, info, warn};

use super::{Context, Method, TransferOutcome};
use crate::error::{Error, Result};
use crate::output::open_output;
use crate::request::Request;

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// Header blocks longer than this are rejected.
const MAX_HEADER_LINES: usize = 128;

const USER_AGENT: &str = concat!("snag/", env!("CARGO_PKG_VERSION"));

static STATUS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^HTTP/\d\.\d (\d{3})(?: |\r?$)").expect("valid status pattern"));

static REALM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\brealm\s*=\s*(?:"([^"]*)"|([^\s,]+))"#).expect("valid realm pattern")
});

/// HTTP/1.1 GET, plain or over TLS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpMethod {
    secure: bool,
}

impl HttpMethod {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn default_port(&self) -> u16 {
        if self.secure { HTTPS_PORT } else { HTTP_PORT }
    }
}

impl Method for HttpMethod {
    fn fetch(&self, cx: &Context<'_>, request: &Request) -> Result<TransferOutcome> {
        let port = request.port().unwrap_or(self.default_port());
        let mut transport = snag_net::open_transport(self.secure, &cx.config.transport);
        transport.connect(request.host(), port)?;

        let message = build_request(request, port, self.default_port());
        for line in message.lines().filter(|l| !l.is_empty()) {
            if line.starts_with("Authorization:") {
                debug!("> Authorization: Basic ***");
            } else {
                debug!("> {line}");
            }
        }
        transport.write(message.as_bytes())?;

        let head = read_head(transport.as_mut())?;
        if let Disposition::Outcome(outcome) = head.disposition(request.object())? {
            transport.close();
            return Ok(outcome);
        }

        receive_body(cx, request, transport.as_mut(), &head)?;
        transport.close();
        Ok(TransferOutcome::Completed)
    }
}

fn build_request(request: &Request, port: u16, default_port: u16) -> String {
    let host = if request.host().contains(':') {
        format!("[{}]", request.host())
    } else {
        request.host().to_string()
    };
    let host = if port == default_port {
        host
    } else {
        format!("{host}:{port}")
    };

    let mut message = format!(
        "GET {} HTTP/1.1\r\nHost: {host}\r\nUser-Agent: {USER_AGENT}\r\nAccept: */*\r\nConnection: close\r\n",
        request.absolute_object()
    );
    if request.is_resuming() {
        message.push_str(&format!("Range: bytes={}-\r\n", request.resume_offset()));
    }
    if let Some(user) = request.user() {
        let token = STANDARD.encode(format!("{user}:{}", request.password().unwrap_or("")));
        message.push_str(&format!("Authorization: Basic {token}\r\n"));
    }
    message.push_str("\r\n");
    message
}

/// Parse a status line into its three-digit code.
pub fn parse_status(line: &str) -> Result<u16> {
    STATUS_LINE
        .captures(line.trim_end_matches('\n'))
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| Error::MalformedHeader {
            line: line.trim_end().to_string(),
        })
}

/// Status code and header fields of one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: u16,
    headers: Vec<(String, String)>,
}

enum Disposition {
    Outcome(TransferOutcome),
    Body,
}

impl ResponseHead {
    /// Parse a header block. The first line is the status line; the blank
    /// terminator must not be included.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let (status_line, fields) = lines.split_first().ok_or_else(|| Error::MalformedHeader {
            line: String::new(),
        })?;
        let status = parse_status(status_line.as_ref())?;

        let mut headers = Vec::with_capacity(fields.len());
        for line in fields {
            let line = line.as_ref().trim_end();
            match line.split_once(':') {
                Some((name, value)) if !name.is_empty() && !name.contains(' ') => {
                    headers.push((name.to_string(), value.trim().to_string()));
                }
                _ => {
                    return Err(Error::MalformedHeader {
                        line: line.to_string(),
                    });
                }
            }
        }

        Ok(Self { status, headers })
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers(name).next()
    }

    /// Every value of a repeated header, in order.
    pub fn headers<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Declared body length, 0 when absent or unparsable.
    pub fn content_length(&self) -> u64 {
        self.header("Content-Length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0)
    }

    pub fn is_chunked(&self) -> bool {
        self.header("Transfer-Encoding")
            .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    }

    /// Realm of the first `Basic` challenge among all `WWW-Authenticate`
    /// headers. Other schemes are skipped; credentials are still sent as Basic.
    fn basic_realm(&self) -> Option<String> {
        let mut offered = Vec::new();
        for challenge in self.headers("WWW-Authenticate") {
            match basic_challenge(challenge) {
                Some(realm) => {
                    match &realm {
                        Some(realm) => info!(%realm, "authentication required"),
                        None => info!("authentication required"),
                    }
                    return realm;
                }
                None => offered.push(challenge.split_whitespace().next().unwrap_or("")),
            }
        }

        if offered.is_empty() {
            info!("authentication required");
        } else {
            warn!(schemes = ?offered, "server offers no Basic challenge, trying Basic anyway");
        }
        None
    }

    fn disposition(&self, object: &str) -> Result<Disposition> {
        match self.status {
            404 => Err(Error::NotFound {
                object: object.to_string(),
            }),
            301 | 302 | 303 | 307 | 308 => {
                let location = self
                    .header("Location")
                    .filter(|l| !l.is_empty())
                    .ok_or(Error::MissingLocation {
                        status: self.status,
                    })?;
                info!(status = self.status, %location, "redirected");
                Ok(Disposition::Outcome(TransferOutcome::Redirected(
                    location.to_string(),
                )))
            }
            401 => Ok(Disposition::Outcome(TransferOutcome::AuthRequired {
                realm: self.basic_realm(),
            })),
            200 | 206 => Ok(Disposition::Body),
            other => Err(Error::UnexpectedStatus(other)),
        }
    }
}

/// Realm of a `Basic` challenge, `None` for any other scheme.
fn basic_challenge(challenge: &str) -> Option<Option<String>> {
    let scheme = challenge.split_whitespace().next()?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    Some(REALM.captures(challenge).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .map(|m| m.as_str().to_string())
    }))
}

fn read_head(transport: &mut dyn Transport) -> Result<ResponseHead> {
    let mut lines = Vec::new();
    loop {
        let line = transport.read_line()?;
        let line = line.trim_end_matches(['\r', '\n']).to_string();
        if line.is_empty() {
            break;
        }
        debug!("< {line}");
        if lines.len() == MAX_HEADER_LINES {
            return Err(Error::MalformedHeader { line });
        }
        lines.push(line);
    }
    ResponseHead::parse(&lines)
}

fn receive_body(
    cx: &Context<'_>,
    request: &Request,
    transport: &mut dyn Transport,
    head: &ResponseHead,
) -> Result<()> {
    let partial = head.status == 206 && request.is_resuming();
    if request.is_resuming() && !partial {
        info!("server ignored the range request, downloading from the start");
    }

    let position = if partial { request.resume_offset() } else { 0 };
    let length = head.content_length();
    let total = if length > 0 {
        position.checked_add(length)
    } else {
        None
    };

    let mut output = open_output(request.output(), partial)?;
    let mut tracker = cx.tracker(total, position);

    let received = if head.is_chunked() {
        read_chunked(transport, &mut output, tracker.as_mut())?
    } else {
        transport.stream_to_sink(&mut output, (length > 0).then_some(length), tracker.as_mut())?
    };
    tracker.finish();

    debug!(received, "body complete");
    if length == 0 && received == 0 {
        warn!("server sent an empty body");
    }
    Ok(())
}

fn read_chunked(
    transport: &mut dyn Transport,
    sink: &mut dyn Write,
    tracker: &mut dyn Tracker,
) -> Result<u64> {
    let mut received = 0;
    loop {
        let line = transport.read_line()?;
        let size = line
            .trim_end()
            .split(';')
            .next()
            .and_then(|s| u64::from_str_radix(s.trim(), 16).ok())
            .ok_or_else(|| Error::MalformedHeader {
                line: line.trim_end().to_string(),
            })?;

        if size == 0 {
            // Trailer fields up to the final blank line.
            while !transport.read_line()?.trim_end().is_empty() {}
            return Ok(received);
        }

        received += transport.stream_to_sink(sink, Some(size), tracker)?;
        transport.read_line()?;
    }
}
