//! Terminal presenter and line input for the interactive session.
//!
//! Input lines are read on a dedicated thread and forwarded over a channel so
//! the owner thread can keep applying launch completions while it waits for
//! the user. Output goes to any [`Write`] sink.

use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use elevator_launch::Presenter;
use tracing::debug;

const CONSOLE_TARGET: &str = "elevator_cli::console";

/// Name of the thread reading console input.
pub const INPUT_THREAD_NAME: &str = "elevator-stdin";

/// Result of waiting for an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputPoll {
    /// A complete line, without its terminator.
    Line(String),
    /// Nothing arrived before the timeout.
    Idle,
    /// Input has ended.
    Closed,
}

/// Reader waiting to be handed to the input thread.
struct PendingInput {
    reader: Box<dyn BufRead + Send>,
    sender: Sender<String>,
}

impl fmt::Debug for PendingInput {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("PendingInput")
    }
}

/// Line-oriented console acting as the application's presenter.
#[derive(Debug)]
pub struct Console<W> {
    input: Receiver<String>,
    pending: Option<PendingInput>,
    output: W,
}

impl<W: Write> Console<W> {
    /// Creates a console fed by `input`.
    pub const fn new(input: Receiver<String>, output: W) -> Self {
        Self {
            input,
            pending: None,
            output,
        }
    }

    /// Creates a console whose lines will be read from `reader`.
    ///
    /// Nothing is read until [`Console::start_input`] runs or a line is first
    /// requested, so an instance that relaunches itself leaves its input to
    /// the new instance.
    pub fn from_reader<R>(reader: R, output: W) -> Self
    where
        R: BufRead + Send + 'static,
    {
        let (sender, input) = mpsc::channel();
        Self {
            input,
            pending: Some(PendingInput {
                reader: Box::new(reader),
                sender,
            }),
            output,
        }
    }

    /// Creates a console and starts reading `reader` on a background thread
    /// straight away.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the reader thread cannot be spawned.
    pub fn spawn_reader<R>(reader: R, output: W) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let mut console = Self::from_reader(reader, output);
        console.start_input()?;
        Ok(console)
    }

    /// Whether input is being read, or was supplied as a channel.
    #[must_use]
    pub const fn input_started(&self) -> bool {
        self.pending.is_none()
    }

    /// Starts the input thread if it is not already running.
    ///
    /// # Errors
    ///
    /// Returns an IO error when the reader thread cannot be spawned. The
    /// console then reports its input as closed.
    pub fn start_input(&mut self) -> io::Result<()> {
        let Some(PendingInput { reader, sender }) = self.pending.take() else {
            return Ok(());
        };
        thread::Builder::new()
            .name(INPUT_THREAD_NAME.to_owned())
            .spawn(move || forward_lines(reader, &sender))?;
        debug!(target: CONSOLE_TARGET, "console input started");
        Ok(())
    }

    fn lines(&mut self) -> &Receiver<String> {
        if let Err(error) = self.start_input() {
            debug!(target: CONSOLE_TARGET, error = %error, "console input unavailable");
        }
        &self.input
    }

    /// Waits up to `timeout` for the next input line.
    pub fn poll_line(&mut self, timeout: Duration) -> InputPoll {
        match self.lines().recv_timeout(timeout) {
            Ok(line) => InputPoll::Line(line),
            Err(RecvTimeoutError::Timeout) => InputPoll::Idle,
            Err(RecvTimeoutError::Disconnected) => InputPoll::Closed,
        }
    }

    /// Writes one line of plain output.
    pub fn write_line(&mut self, line: &str) {
        if let Err(error) = writeln!(self.output, "{line}").and_then(|()| self.output.flush()) {
            debug!(target: CONSOLE_TARGET, error = %error, "console write failed");
        }
    }

    /// Consumes the console and returns its output sink.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<W: Write> Presenter for Console<W> {
    fn show_status(&mut self, message: &str, is_error: bool) {
        if is_error {
            self.write_line(&format!("error: {message}"));
        } else {
            self.write_line(message);
        }
    }

    fn alert(&mut self, title: &str, message: &str) {
        self.write_line(&format!("== {title} =="));
        for line in message.lines() {
            self.write_line(line);
        }
        self.write_line("");
    }

    fn confirm(&mut self, question: &str) -> bool {
        if let Err(error) = write!(self.output, "{question} [y/N] ").and_then(|()| self.output.flush())
        {
            debug!(target: CONSOLE_TARGET, error = %error, "console write failed");
        }
        self.lines()
            .recv()
            .is_ok_and(|answer| matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
    }
}

fn forward_lines(reader: Box<dyn BufRead + Send>, sender: &Sender<String>) {
    for line in reader.lines() {
        let Ok(line) = line else { break };
        if sender.send(line).is_err() {
            break;
        }
    }
}
