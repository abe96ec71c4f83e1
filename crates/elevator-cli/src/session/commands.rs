//! Console command grammar.

use clap::{CommandFactory, Parser, Subcommand};

/// One line of console input.
#[derive(Parser, Debug)]
#[command(
    name = "elevator",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub(crate) struct CommandLine {
    #[command(subcommand)]
    pub(crate) command: ConsoleCommand,
}

/// Commands understood by the interactive session.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    /// List the configured shortcuts.
    #[command(visible_alias = "ls")]
    List,
    /// Launch the shortcut bound to KEY.
    Launch { key: String },
    /// Launch the shortcut bound to KEY as administrator.
    Admin { key: String },
    /// Bind KEY (a single character) to PATH.
    Add {
        key: String,
        /// After parsing, a single element holding the rest of the line
        /// exactly as typed.
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        path: Vec<String>,
    },
    /// Remove the shortcut bound to KEY.
    #[command(visible_alias = "rm")]
    Remove { key: String },
    /// Show this help.
    Help,
    /// Leave the launcher.
    #[command(visible_alias = "exit")]
    Quit,
}

impl ConsoleCommand {
    /// Parses a non-blank console line. Words are separated by whitespace;
    /// everything after the key of `add` is the path, inner whitespace
    /// included.
    pub(crate) fn parse_line(line: &str) -> Result<Self, clap::Error> {
        let mut command = CommandLine::try_parse_from(line.split_whitespace())?.command;
        if let Self::Add { path, .. } = &mut command {
            *path = vec![skip_words(line, 2).to_owned()];
        }
        Ok(command)
    }
}

/// The text of `line` after its first `count` words, without surrounding
/// whitespace.
fn skip_words(line: &str, count: usize) -> &str {
    let mut rest = line.trim_start();
    for _ in 0..count {
        rest = rest
            .split_once(char::is_whitespace)
            .map_or("", |(_, tail)| tail)
            .trim_start();
    }
    rest.trim_end()
}

/// Rendered help for the console commands.
pub(crate) fn help_text() -> String {
    CommandLine::command()
        .help_template("Commands:\n{subcommands}")
        .render_help()
        .to_string()
}

/// First line of a clap error, without the `error: ` prefix.
pub(crate) fn describe_error(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let first = rendered.lines().next().unwrap_or_default();
    first.strip_prefix("error: ").unwrap_or(first).to_owned()
}
