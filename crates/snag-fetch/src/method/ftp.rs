use once_cell::sync::Lazy;
use regex::Regex;
use snag_net::Transport;
use tracing::{debug, info};

use super::{Context, Method, TransferOutcome};
use crate::error::{Error, Result};
use crate::output::open_output;
use crate::request::Request;

const FTP_PORT: u16 = 21;
const ANONYMOUS_USER: &str = "anonymous";
const ANONYMOUS_PASSWORD: &str = "asdf";

static REPLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{3})([ -])\s*(.*?)\r?\n?$").expect("valid reply pattern"));

static PASV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3})\)")
        .expect("valid PASV pattern")
});

static EPSV: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\|\|\|(\d{1,5})\|\)").expect("valid EPSV pattern"));

/// One control-channel reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

/// Parse a single reply line.
///
/// A `-` after the code marks the first line of a multi-line reply; it is
/// accepted here and the caller reads the continuation.
pub fn parse_reply(line: &str) -> Result<Reply> {
    parse_line(line).map(|(reply, _)| reply)
}

fn parse_line(line: &str) -> Result<(Reply, bool)> {
    let garbled = || Error::GarbledReply {
        line: line.trim_end().to_string(),
    };
    let c = REPLY.captures(line).ok_or_else(garbled)?;
    let code = c[1].parse().map_err(|_| garbled())?;
    Ok((
        Reply {
            code,
            text: c[3].to_string(),
        },
        &c[2] == "-",
    ))
}

/// Data port from a `227` reply: `p1 * 256 + p2`.
pub fn parse_pasv_port(line: &str) -> Result<u16> {
    let malformed = || Error::MalformedReply {
        what: "PASV address",
        line: line.trim_end().to_string(),
    };
    let c = PASV.captures(line).ok_or_else(malformed)?;
    let mut fields = [0u8; 6];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = c[i + 1].parse().map_err(|_| malformed())?;
    }
    Ok(u16::from(fields[4]) * 256 + u16::from(fields[5]))
}

/// Data port from a `229` reply: `(|||port|)`.
pub fn parse_epsv_port(line: &str) -> Result<u16> {
    EPSV.captures(line)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| Error::MalformedReply {
            what: "EPSV port",
            line: line.trim_end().to_string(),
        })
}

/// Control connection with command/reply bookkeeping.
struct Control {
    transport: Box<dyn Transport>,
}

impl Control {
    fn read_reply(&mut self) -> Result<Reply> {
        let line = self.transport.read_line()?;
        debug!("< {}", line.trim_end());
        let (reply, mut more) = parse_line(&line)?;

        let terminator = format!("{} ", reply.code);
        let mut text = reply.text;
        while more {
            let line = self.transport.read_line()?;
            debug!("< {}", line.trim_end());
            if let Some(rest) = line.strip_prefix(&terminator) {
                more = false;
                text.push('\n');
                text.push_str(rest.trim());
            } else {
                text.push('\n');
                text.push_str(line.trim_end());
            }
        }

        Ok(Reply {
            code: reply.code,
            text,
        })
    }

    fn send(&mut self, command: &str) -> Result<()> {
        if command.starts_with("PASS ") {
            debug!("> PASS ***");
        } else {
            debug!("> {command}");
        }
        self.transport.write(format!("{command}\r\n").as_bytes())?;
        Ok(())
    }

    fn command(&mut self, command: &str) -> Result<Reply> {
        self.send(command)?;
        self.read_reply()
    }
}

/// Fail unless the reply code is one of `codes`.
fn expect(reply: Reply, codes: &[u16]) -> Result<Reply> {
    if codes.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(Error::UnexpectedReply {
            code: reply.code,
            expected: codes.to_vec(),
            text: reply.text,
        })
    }
}

/// Passive-mode FTP retrieval in binary mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtpMethod;

impl Method for FtpMethod {
    fn fetch(&self, cx: &Context<'_>, request: &Request) -> Result<TransferOutcome> {
        let options = &cx.config.transport;
        let mut control = Control {
            transport: snag_net::open_transport(false, options),
        };
        control
            .transport
            .connect(request.host(), request.port().unwrap_or(FTP_PORT))?;
        expect(control.read_reply()?, &[220])?;

        login(&mut control, request)?;
        expect(control.command("TYPE I")?, &[200])?;

        let size = query_size(&mut control, request.object())?;
        let data_port = enter_passive(&mut control)?;

        if request.is_resuming() {
            expect(
                control.command(&format!("REST {}", request.resume_offset()))?,
                &[350],
            )?;
        }

        let mut data = snag_net::open_transport(false, options);
        control.send(&format!("RETR {}", request.object()))?;
        data.connect(request.host(), data_port)?;
        expect(control.read_reply()?, &[150, 125])?;

        let mut output = open_output(request.output(), request.is_resuming())?;
        let mut tracker = cx.tracker(size, request.resume_offset());
        let received = data.stream_to_sink(&mut output, None, tracker.as_mut())?;
        tracker.finish();
        data.close();
        debug!(received, "data channel closed");

        expect(control.read_reply()?, &[226])?;
        expect(control.command("QUIT")?, &[221])?;
        control.transport.close();
        Ok(TransferOutcome::Completed)
    }
}

fn login(control: &mut Control, request: &Request) -> Result<()> {
    let user = request.user().unwrap_or(ANONYMOUS_USER);
    let reply = control.command(&format!("USER {user}"))?;
    if reply.code == 230 {
        return Ok(());
    }
    expect(reply, &[331])?;

    let password = request.password().unwrap_or(ANONYMOUS_PASSWORD);
    expect(control.command(&format!("PASS {password}"))?, &[230])?;
    Ok(())
}

/// Size of the remote object, for progress display only.
fn query_size(control: &mut Control, object: &str) -> Result<Option<u64>> {
    let reply = control.command(&format!("SIZE {object}"))?;
    if reply.code != 213 {
        debug!(code = reply.code, "SIZE not available");
        return Ok(None);
    }
    let size = reply.text.trim().parse().ok();
    if size.is_none() {
        debug!(text = %reply.text, "unparsable SIZE reply");
    }
    Ok(size)
}

/// Ask for a passive data port, falling back to EPSV when PASV is refused.
fn enter_passive(control: &mut Control) -> Result<u16> {
    let reply = control.command("PASV")?;
    match reply.code {
        227 => parse_pasv_port(&reply.text),
        501 => {
            info!("PASV refused, trying EPSV");
            let reply = control.command("EPSV")?;
            if reply.code != 229 {
                return Err(Error::NoPassiveMode);
            }
            parse_epsv_port(&reply.text)
        }
        _ => Err(Error::NoPassiveMode),
    }
}
