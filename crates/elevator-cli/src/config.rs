//! Splits the process arguments between the configuration loader and the
//! bootstrap sequence.
//!
//! Only a leading run of configuration flags reaches `ortho-config`; the
//! first launch flag such as `--direct-run` ends that run.

use std::ffi::{OsStr, OsString};

use elevator_config::{CONFIG_CLI_FLAGS, Config};
use ortho_config::OrthoConfig;

use crate::AppError;

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name plus leading configuration
    /// flags.
    ///
    /// Configuration flags placed after a launch flag are not seen here; they
    /// travel with the launch arguments and are forwarded on relaunch.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

/// How a single token relates to the configuration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    /// `--flag=value`.
    Inline,
    /// `--flag` followed by its value.
    Separated,
    /// Anything the loader does not understand.
    Launch,
}

fn classify(argument: &OsStr) -> Token {
    let text = argument.to_string_lossy();
    let (name, inline) = text
        .split_once('=')
        .map_or((&*text, false), |(name, _)| (name, true));
    if !name.starts_with("--") || !CONFIG_CLI_FLAGS.contains(&name) {
        return Token::Launch;
    }
    if inline { Token::Inline } else { Token::Separated }
}

pub(crate) struct ConfigArgumentSplit {
    pub(crate) config_arguments: Vec<OsString>,
}

pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let mut config_arguments = Vec::with_capacity(args.len());
    let mut tokens = args.iter();
    if let Some(program) = tokens.next() {
        config_arguments.push(program.clone());
    }

    while let Some(argument) = tokens.next() {
        match classify(argument) {
            Token::Launch => break,
            Token::Inline => config_arguments.push(argument.clone()),
            Token::Separated => {
                config_arguments.push(argument.clone());
                config_arguments.extend(tokens.next().cloned());
            }
        }
    }

    ConfigArgumentSplit { config_arguments }
}
