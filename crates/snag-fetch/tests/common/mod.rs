//! In-process fake servers shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread::{self, JoinHandle};

use snag_fetch::Prompter;

/// Serve one canned response per connection, in order. Returns the request
/// heads received.
pub fn http_server(responses: Vec<Vec<u8>>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for response in responses {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            requests.push(head);

            let mut stream = reader.into_inner();
            stream.write_all(&response).unwrap();
        }
        requests
    });

    (port, handle)
}

pub fn response(status: &str, headers: &[&str], body: &[u8]) -> Vec<u8> {
    let mut out = format!("HTTP/1.1 {status}\r\n");
    for header in headers {
        out.push_str(header);
        out.push_str("\r\n");
    }
    out.push_str("\r\n");
    let mut out = out.into_bytes();
    out.extend_from_slice(body);
    out
}

pub fn ok(body: &[u8]) -> Vec<u8> {
    let length = format!("Content-Length: {}", body.len());
    response("200 OK", &[length.as_str()], body)
}

/// How the fake FTP server answers `PASV`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Passive {
    Pasv,
    EpsvOnly,
    Neither,
}

/// Single-session FTP server handing out `body` on `RETR`. Returns every
/// command received, passwords included.
pub fn ftp_server(body: Vec<u8>, passive: Passive) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let data_listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let data_port = data_listener.local_addr().unwrap().port();

        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut control = stream;
        let mut commands = Vec::new();
        let mut rest = 0usize;

        reply(&mut control, "220-Welcome to the fake server\r\n220 Ready\r\n");
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap() == 0 {
                break;
            }
            let command = line.trim_end().to_string();
            commands.push(command.clone());
            let (verb, arg) = command.split_once(' ').unwrap_or((command.as_str(), ""));

            match verb {
                "USER" if arg == "anonymous" => reply(&mut control, "230 Logged in\r\n"),
                "USER" => reply(&mut control, "331 Password required\r\n"),
                "PASS" => reply(&mut control, "230 Logged in\r\n"),
                "TYPE" => reply(&mut control, "200 Type set to I\r\n"),
                "SIZE" => reply(&mut control, &format!("213 {}\r\n", body.len())),
                "PASV" if passive == Passive::Pasv => reply(
                    &mut control,
                    &format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{}).\r\n",
                        data_port / 256,
                        data_port % 256
                    ),
                ),
                "PASV" if passive == Passive::EpsvOnly => {
                    reply(&mut control, "501 Use EPSV\r\n")
                }
                "PASV" => reply(&mut control, "502 Not implemented\r\n"),
                "EPSV" => reply(
                    &mut control,
                    &format!("229 Entering Extended Passive Mode (|||{data_port}|)\r\n"),
                ),
                "REST" => {
                    rest = arg.parse().unwrap();
                    reply(&mut control, "350 Restarting\r\n");
                }
                "RETR" => {
                    let (mut data, _) = data_listener.accept().unwrap();
                    reply(&mut control, "150 Opening BINARY mode data connection\r\n");
                    data.write_all(&body[rest..]).unwrap();
                    drop(data);
                    reply(&mut control, "226 Transfer complete\r\n");
                }
                "QUIT" => {
                    reply(&mut control, "221 Goodbye\r\n");
                    break;
                }
                _ => reply(&mut control, "502 Not implemented\r\n"),
            }
        }
        commands
    });

    (port, handle)
}

fn reply(control: &mut TcpStream, text: &str) {
    control.write_all(text.as_bytes()).unwrap();
}

/// Prompter answering from a fixed script.
pub struct Scripted {
    answers: RefCell<VecDeque<String>>,
    pub asked: RefCell<Vec<String>>,
}

impl Scripted {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().map(|s| s.to_string()).collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    fn next(&self, prompt: &str) -> io::Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

impl Prompter for Scripted {
    fn input(&self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }

    fn secret(&self, prompt: &str) -> io::Result<String> {
        self.next(prompt)
    }
}
