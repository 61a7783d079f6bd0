use std::io;

/// Interactive input used for HTTP credentials and SSH key passphrases.
pub trait Prompter {
    /// Read one line of visible input.
    fn input(&self, prompt: &str) -> io::Result<String>;

    /// Read one line without echoing it.
    fn secret(&self, prompt: &str) -> io::Result<String>;
}

/// Prompter for runs without a terminal. Every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonInteractive;

impl Prompter for NonInteractive {
    fn input(&self, prompt: &str) -> io::Result<String> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("cannot ask for {prompt}: not running interactively"),
        ))
    }

    fn secret(&self, prompt: &str) -> io::Result<String> {
        self.input(prompt)
    }
}
