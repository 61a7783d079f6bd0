use std::io;

use console::Term;
use snag_fetch::Prompter;

/// Prompts on stderr so downloaded data piped through stdout stays clean.
pub struct TerminalPrompter {
    term: Term,
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self {
            term: Term::stderr(),
        }
    }
}

impl Prompter for TerminalPrompter {
    fn input(&self, prompt: &str) -> io::Result<String> {
        self.term.write_str(&format!("{prompt}: "))?;
        self.term.read_line()
    }

    fn secret(&self, prompt: &str) -> io::Result<String> {
        self.term.write_str(&format!("{prompt}: "))?;
        self.term.read_secure_line()
    }
}
