use std::io::{self, BufRead, BufReader, Read, Write};
use std::net::{Shutdown, TcpStream};

use crate::error::{Error, Result};
use crate::progress::Tracker;

/// Read buffer size for bulk transfers.
pub const BUFFER_SIZE: usize = 8192;

/// Longest control line accepted by [`Transport::read_line`].
pub const MAX_LINE: usize = 64 * 1024;

/// Byte-stream capability shared by plain and encrypted connections.
///
/// A transport is either connected or not; every I/O method on an unconnected
/// transport fails with [`Error::NotConnected`]. Dropping a connected transport
/// shuts it down.
pub trait Transport {
    /// Connect to `host`, replacing any existing connection.
    fn connect(&mut self, host: &str, port: u16) -> Result<()>;

    /// Shut down and release the connection. Idempotent.
    fn close(&mut self);

    fn is_connected(&self) -> bool;

    fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Read up to and including the next `\n`.
    fn read_line(&mut self) -> Result<String>;

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>>;

    /// Copy bytes into `sink` until the peer closes or `length` bytes are
    /// consumed, reporting every chunk to `tracker`. Returns the number of
    /// bytes copied.
    fn stream_to_sink(
        &mut self,
        sink: &mut dyn Write,
        length: Option<u64>,
        tracker: &mut dyn Tracker,
    ) -> Result<u64>;
}

/// Stream that knows how to shut itself down in an orderly way.
pub(crate) trait Stream: Read + Write {
    fn shutdown(&mut self) -> io::Result<()>;
}

impl Stream for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// Buffered connection state shared by the transport implementations.
pub(crate) struct Channel<S: Stream> {
    reader: BufReader<S>,
}

impl<S: Stream> Channel<S> {
    pub(crate) fn new(stream: S) -> Self {
        Self {
            reader: BufReader::with_capacity(BUFFER_SIZE, stream),
        }
    }

    pub(crate) fn shutdown(mut self) -> io::Result<()> {
        self.reader.get_mut().shutdown()
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> Result<()> {
        let stream = self.reader.get_mut();
        stream.write_all(data)?;
        stream.flush()?;
        Ok(())
    }

    pub(crate) fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let read = (&mut self.reader)
            .take(MAX_LINE as u64)
            .read_until(b'\n', &mut line)?;

        if line.last() != Some(&b'\n') {
            if read >= MAX_LINE {
                return Err(Error::LineTooLong { limit: MAX_LINE });
            }
            return Err(Error::UnexpectedEof);
        }

        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    pub(crate) fn read_exact(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0; len];
        self.reader.read_exact(&mut buf)?;
        Ok(buf)
    }

    pub(crate) fn stream_to_sink(
        &mut self,
        sink: &mut dyn Write,
        length: Option<u64>,
        tracker: &mut dyn Tracker,
    ) -> Result<u64> {
        let mut buf = [0u8; BUFFER_SIZE];
        let mut received = 0u64;

        loop {
            let want = match length {
                Some(expected) if received >= expected => break,
                Some(expected) => BUFFER_SIZE.min((expected - received) as usize),
                None => BUFFER_SIZE,
            };

            let n = match self.reader.read(&mut buf[..want]) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if n == 0 {
                if let Some(expected) = length {
                    return Err(Error::Truncated { received, expected });
                }
                break;
            }

            sink.write_all(&buf[..n]).map_err(Error::Sink)?;
            received += n as u64;
            tracker.step(n as u64);
        }

        sink.flush().map_err(Error::Sink)?;
        Ok(received)
    }
}

/// Shared body of the `Transport` methods that only need a live channel.
macro_rules! delegate_io {
    () => {
        fn is_connected(&self) -> bool {
            self.channel.is_some()
        }

        fn write(&mut self, data: &[u8]) -> $crate::error::Result<()> {
            self.channel
                .as_mut()
                .ok_or($crate::error::Error::NotConnected)?
                .write(data)
        }

        fn read_line(&mut self) -> $crate::error::Result<String> {
            self.channel
                .as_mut()
                .ok_or($crate::error::Error::NotConnected)?
                .read_line()
        }

        fn read_exact(&mut self, len: usize) -> $crate::error::Result<Vec<u8>> {
            self.channel
                .as_mut()
                .ok_or($crate::error::Error::NotConnected)?
                .read_exact(len)
        }

        fn stream_to_sink(
            &mut self,
            sink: &mut dyn std::io::Write,
            length: Option<u64>,
            tracker: &mut dyn $crate::progress::Tracker,
        ) -> $crate::error::Result<u64> {
            self.channel
                .as_mut()
                .ok_or($crate::error::Error::NotConnected)?
                .stream_to_sink(sink, length, tracker)
        }
    };
}

pub(crate) use delegate_io;
