use std::io::{Stderr, Stdout, Write};

/// Where command output and user-facing notices go.
///
/// Command results are written to stdout; notices (short status messages
/// meant for the user rather than for pipes) go to stderr.
pub trait Console<OUT: Write, ERR: Write> {
    fn stdout(&mut self) -> &mut OUT;
    fn stderr(&mut self) -> &mut ERR;

    /// Show a one-line notice to the user.
    fn notice(&mut self, message: &str) -> std::io::Result<()> {
        writeln!(self.stderr(), "{message}")
    }
}

/// Console bound to the process's stdout and stderr.
pub struct StdConsole {
    stdout: Stdout,
    stderr: Stderr,
}

impl StdConsole {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
            stderr: std::io::stderr(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console<Stdout, Stderr> for StdConsole {
    fn stdout(&mut self) -> &mut Stdout {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Stderr {
        &mut self.stderr
    }
}

/// In-memory console for tests.
#[derive(Default)]
pub struct BufferedConsole {
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    notices: Vec<String>,
}

impl BufferedConsole {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub fn stderr_to_string(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Notices shown so far, in order.
    pub fn notices(&self) -> &[String] {
        &self.notices
    }
}

impl Console<Vec<u8>, Vec<u8>> for BufferedConsole {
    fn stdout(&mut self) -> &mut Vec<u8> {
        &mut self.stdout
    }

    fn stderr(&mut self) -> &mut Vec<u8> {
        &mut self.stderr
    }

    fn notice(&mut self, message: &str) -> std::io::Result<()> {
        self.notices.push(message.to_string());
        writeln!(self.stderr, "{message}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffered_console_captures_streams() {
        let mut console = BufferedConsole::new();
        writeln!(console.stdout(), "result").unwrap();
        writeln!(console.stderr(), "diagnostic").unwrap();
        assert_eq!(console.stdout_to_string(), "result\n");
        assert_eq!(console.stderr_to_string(), "diagnostic\n");
        assert!(console.notices().is_empty());
    }

    #[test]
    fn notices_are_recorded_and_echoed() {
        let mut console = BufferedConsole::new();
        console.notice("Inserted 2 links.").unwrap();
        assert_eq!(console.notices(), ["Inserted 2 links."]);
        assert_eq!(console.stderr_to_string(), "Inserted 2 links.\n");
        assert!(console.stdout_to_string().is_empty());
    }
}
