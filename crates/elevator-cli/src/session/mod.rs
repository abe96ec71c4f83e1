//! Interactive console session.
//!
//! The session is the owner thread of the launcher: it reads commands,
//! manages the shortcut list and hands launches to the
//! [`LaunchDispatcher`]. Between input polls it applies broker completions,
//! so every presenter call happens on this thread.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

use elevator_launch::{
    BrokerInvoker, DirectInvoker, EpmBrokerInvoker, LaunchDispatcher, LaunchTarget, Offload,
    Presenter, ShellDirectInvoker, ThreadOffload, report_failure,
};
use thiserror::Error;
use tracing::{debug, info};

use crate::bootstrap::{Application, StartupContext};
use crate::console::{Console, InputPoll};
use crate::store::{Shortcut, ShortcutStore};

mod commands;

use commands::{ConsoleCommand, describe_error, help_text};

const SESSION_TARGET: &str = "elevator_cli::session";

/// How long the owner loop waits for input before applying completions.
pub const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors that stop the interactive session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Console input could not be set up.
    #[error("console input is unavailable: {0}")]
    Input(#[source] io::Error),
}

/// The interactive launcher application.
pub struct Session<S, D = ShellDirectInvoker, O = ThreadOffload> {
    store: S,
    broker: Arc<dyn BrokerInvoker>,
    direct: D,
    offload: O,
}

impl<S> Session<S> {
    /// Creates a session launching through the EPM client and the shell.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_invokers(
            store,
            Arc::new(EpmBrokerInvoker::default()),
            ShellDirectInvoker::new(),
            ThreadOffload,
        )
    }
}

impl<S, D, O> Session<S, D, O> {
    /// Creates a session with explicit launch collaborators.
    #[must_use]
    pub fn with_invokers(store: S, broker: Arc<dyn BrokerInvoker>, direct: D, offload: O) -> Self {
        Self {
            store,
            broker,
            direct,
            offload,
        }
    }
}

impl<S, D, O, W> Application<Console<W>> for Session<S, D, O>
where
    S: ShortcutStore,
    D: DirectInvoker,
    O: Offload,
    W: Write,
{
    fn run(self, context: &StartupContext, console: &mut Console<W>) -> Result<(), SessionError> {
        let Self {
            store,
            broker,
            direct,
            offload,
        } = self;
        console.start_input().map_err(SessionError::Input)?;
        let (sender, completions) = mpsc::channel();
        let dispatcher = LaunchDispatcher::new(broker, direct, offload, sender);

        info!(
            target: SESSION_TARGET,
            mode = %context.routing.mode,
            reason = %context.routing.reason,
            "interactive session starting"
        );
        let mut shortcuts = Shortcuts::load(store, console);
        console.show_status(
            &format!(
                "Elevator ready ({}). Type 'help' for commands.",
                context.routing.reason
            ),
            false,
        );
        shortcuts.list(console);

        loop {
            dispatcher.drain(&completions, console);
            let line = match console.poll_line(POLL_INTERVAL) {
                InputPoll::Line(line) => line,
                InputPoll::Idle => continue,
                InputPoll::Closed => break,
            };
            if line.trim().is_empty() {
                continue;
            }
            match ConsoleCommand::parse_line(&line) {
                Ok(ConsoleCommand::Quit) => break,
                Ok(command) => shortcuts.execute(command, &dispatcher, console),
                Err(error) => console.show_status(&describe_error(&error), true),
            }
        }

        dispatcher.drain(&completions, console);
        debug!(target: SESSION_TARGET, "interactive session finished");
        Ok(())
    }
}

/// The shortcut list and its backing store.
struct Shortcuts<S> {
    store: S,
    entries: Vec<Shortcut>,
}

impl<S: ShortcutStore> Shortcuts<S> {
    fn load<P: Presenter + ?Sized>(store: S, presenter: &mut P) -> Self {
        let entries = store.load().unwrap_or_else(|error| {
            presenter.show_status(&format!("Error loading shortcuts: {error}"), true);
            Vec::new()
        });
        Self { store, entries }
    }

    fn execute<D, O, W>(
        &mut self,
        command: ConsoleCommand,
        dispatcher: &LaunchDispatcher<D, O>,
        console: &mut Console<W>,
    ) where
        D: DirectInvoker,
        O: Offload,
        W: Write,
    {
        match command {
            ConsoleCommand::List => self.list(console),
            ConsoleCommand::Launch { key } => self.launch(&key, false, dispatcher, console),
            ConsoleCommand::Admin { key } => self.launch(&key, true, dispatcher, console),
            ConsoleCommand::Add { key, path } => self.add(&key, &path.concat(), console),
            ConsoleCommand::Remove { key } => self.remove(&key, console),
            ConsoleCommand::Help => {
                for line in help_text().lines() {
                    console.write_line(line);
                }
            }
            ConsoleCommand::Quit => {}
        }
    }

    fn find(&self, key: &str) -> Option<&Shortcut> {
        self.entries.iter().find(|shortcut| shortcut.matches_key(key))
    }

    fn list<W: Write>(&self, console: &mut Console<W>) {
        if self.entries.is_empty() {
            console.write_line("No shortcuts configured. Use 'add <key> <path>'.");
            return;
        }
        for shortcut in &self.entries {
            console.write_line(&format!("  [{}] {}", shortcut.key, shortcut.path.display()));
        }
    }

    fn launch<D, O, P>(
        &self,
        key: &str,
        elevated: bool,
        dispatcher: &LaunchDispatcher<D, O>,
        presenter: &mut P,
    ) where
        D: DirectInvoker,
        O: Offload,
        P: Presenter + ?Sized,
    {
        match self.find(key) {
            Some(shortcut) => {
                dispatcher.launch(LaunchTarget::new(shortcut.path.clone(), elevated), presenter);
            }
            None => report_failure(presenter, &format!("No shortcut bound to '{key}'")),
        }
    }

    fn add<P: Presenter + ?Sized>(&mut self, key: &str, path: &str, presenter: &mut P) {
        if key.chars().count() != 1 || self.find(key).is_some() {
            report_failure(presenter, "Key already exists or is invalid.");
            return;
        }
        self.entries.push(Shortcut::new(key, PathBuf::from(path)));
        self.save(presenter);
        presenter.show_status(&format!("Added shortcut '{key}' for {path}"), false);
    }

    fn remove<P: Presenter + ?Sized>(&mut self, key: &str, presenter: &mut P) {
        let Some(index) = self.entries.iter().position(|shortcut| shortcut.matches_key(key)) else {
            report_failure(presenter, &format!("No shortcut bound to '{key}'"));
            return;
        };
        let question = format!("Are you sure you want to remove the shortcut for '{key}'?");
        if !presenter.confirm(&question) {
            presenter.show_status(&format!("Kept shortcut '{key}'"), false);
            return;
        }
        self.entries.remove(index);
        self.save(presenter);
        presenter.show_status(&format!("Removed shortcut '{key}'"), false);
    }

    fn save<P: Presenter + ?Sized>(&self, presenter: &mut P) {
        if let Err(error) = self.store.save(&self.entries) {
            presenter.show_status(&format!("Error saving shortcuts: {error}"), true);
        }
    }
}
