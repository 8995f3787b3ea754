//! Error types for command resolution and execution.
//!
//! Every failure the engine detects carries the command path (for example
//! `"app db migrate"`) together with the flag, argument or token involved,
//! so callers can render their own messages and pick exit codes.

use thiserror::Error;

use crate::validate::ValidationError;
use crate::value::ConversionError;

/// Opaque error returned by hooks and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while resolving, parsing or executing a command.
#[derive(Debug, Error)]
pub enum Error {
    /// A non-flag token selected a subcommand that does not exist.
    #[error("unknown command '{name}' for '{command}'")]
    CommandNotFound { name: String, command: String },

    /// A flag token matched no flag in the effective flag set.
    #[error("unknown flag '{flag}' for '{command}'")]
    UnknownFlag { flag: String, command: String },

    /// A non-boolean flag was given without `=value`.
    #[error("flag '{flag}' requires a value (use --{flag}=value)")]
    MissingFlagValue { flag: String, command: String },

    /// A flag value could not be converted to the flag's type.
    #[error("invalid value {:?} for flag '{flag}': {source}", .source.token)]
    InvalidFlagValue {
        flag: String,
        command: String,
        #[source]
        source: ConversionError,
    },

    /// A required flag was not set on the command line.
    #[error("required flag '{flag}' not set")]
    MissingRequiredFlag { flag: String, command: String },

    /// A required positional argument had no token.
    #[error("argument '{argument}': required argument missing")]
    MissingArgument { argument: String, command: String },

    /// More positional tokens than declared arguments.
    #[error("too many arguments for '{command}': expected {expected}, got {actual}")]
    TooManyArguments {
        expected: usize,
        actual: usize,
        command: String,
    },

    /// A positional token could not be converted to its parameter type.
    #[error("argument '{argument}': {source}")]
    InvalidArgument {
        argument: String,
        command: String,
        #[source]
        source: ConversionError,
    },

    /// The command tree failed setup-time validation.
    #[error("invalid command configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// A hook or handler failed; the error is passed through unmodified.
    #[error(transparent)]
    Callback(BoxError),
}

impl Error {
    /// Returns the command path the error was raised for, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::CommandNotFound { command, .. }
            | Self::UnknownFlag { command, .. }
            | Self::MissingFlagValue { command, .. }
            | Self::InvalidFlagValue { command, .. }
            | Self::MissingRequiredFlag { command, .. }
            | Self::MissingArgument { command, .. }
            | Self::TooManyArguments { command, .. }
            | Self::InvalidArgument { command, .. } => Some(command.as_str()),
            Self::InvalidConfiguration(_) | Self::Callback(_) => None,
        }
    }

    /// Returns the hook or handler error, if this is one.
    pub fn callback(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Callback(err) => Some(err.as_ref()),
            _ => None,
        }
    }

    /// Consumes the error, returning the hook or handler error if this is
    /// one.
    pub fn into_callback(self) -> Option<BoxError> {
        match self {
            Self::Callback(err) => Some(err),
            _ => None,
        }
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
