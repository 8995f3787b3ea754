//! Command tree validation.
//!
//! Checks structural invariants of a command tree before it executes:
//! well-formed names, unique flag names per command, positional
//! declarations that can be bound in order, and handlers whose fixed
//! parameters all have a declaration to bind from.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::*;
//!
//! let verbose = Slot::new(false);
//! let app = Command::new("app")
//!     .with_flag(Flag::new(&verbose, "verbose", false).with_short("v"))
//!     .with_subcommand(Command::new("deploy"));
//! assert!(validate_command(&app).is_empty());
//!
//! // Invalid: required positional after an optional one
//! let bad = Command::new("app")
//!     .with_arg(Argument::optional("env", ""))
//!     .with_arg(Argument::required("name", ""));
//! assert!(!validate_command(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::command::Command;
use crate::flag::FlagSet;

/// Command tree validation errors.
///
/// Each variant names the command path it was found on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Command name is empty or whitespace-only.
    #[error("command name cannot be empty (under '{0}')")]
    EmptyCommandName(String),
    /// Flag name is empty, starts with `-`, or contains `=` or whitespace.
    #[error("invalid flag name {name:?} on '{command}'")]
    InvalidFlagName { command: String, name: String },
    /// Short alias breaks the same rules as [`InvalidFlagName`](Self::InvalidFlagName).
    #[error("invalid short flag {name:?} on '{command}'")]
    InvalidShortFlag { command: String, name: String },
    /// Two bindings on one command answer to the same name.
    #[error("duplicate flag name '{name}' on '{command}'")]
    DuplicateFlag { command: String, name: String },
    #[error("argument name cannot be empty on '{0}'")]
    EmptyArgumentName(String),
    #[error("duplicate argument '{argument}' on '{command}'")]
    DuplicateArgument { command: String, argument: String },
    /// A required positional follows an optional one.
    #[error("required argument '{argument}' follows an optional argument on '{command}'")]
    RequiredAfterOptional { command: String, argument: String },
    /// The handler has fixed parameters that no declaration can feed.
    #[error("handler on '{command}' takes {parameters} positionals but {declared} are declared")]
    UndeclaredParameters {
        command: String,
        parameters: usize,
        declared: usize,
    },
}

/// Validates a command and all of its descendants.
///
/// Stops at the first problem; the returned list is empty for a valid
/// tree.
///
/// ```
/// use command_tree_core::*;
///
/// let cmd = Command::new("app")
///     .handler(Handler::fixed1(|_, _, _name: String| Ok(())));
/// let errors = validate_command(&cmd);
/// assert!(matches!(
///     errors.as_slice(),
///     [ValidationError::UndeclaredParameters { parameters: 1, declared: 0, .. }]
/// ));
/// ```
pub fn validate_command(command: &Command) -> Vec<ValidationError> {
    let mut path = Vec::new();
    validate_node(command, &mut path)
}

fn validate_node<'a>(command: &'a Command, path: &mut Vec<&'a str>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if command.name().trim().is_empty() {
        errors.push(ValidationError::EmptyCommandName(path.join(" ")));
        return errors;
    }

    path.push(command.name());
    let here = path.join(" ");

    errors.extend(validate_flags(command.flags(), &here));
    if errors.is_empty() {
        errors.extend(validate_args(command, &here));
    }
    if !errors.is_empty() {
        path.pop();
        return errors;
    }

    for child in command.subcommands().values() {
        errors.extend(validate_node(child, path));
        if !errors.is_empty() {
            break;
        }
    }

    path.pop();
    errors
}

fn is_valid_flag_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.contains('=')
        && !name.chars().any(char::is_whitespace)
}

fn validate_flags(flags: &FlagSet, command: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for flag in flags {
        if !is_valid_flag_name(flag.name()) {
            errors.push(ValidationError::InvalidFlagName {
                command: command.to_string(),
                name: flag.name().to_string(),
            });
            return errors;
        }
        if let Some(short) = flag.short() {
            if !is_valid_flag_name(short) {
                errors.push(ValidationError::InvalidShortFlag {
                    command: command.to_string(),
                    name: short.to_string(),
                });
                return errors;
            }
        }

        for name in flag.names() {
            if !seen.insert(name) {
                errors.push(ValidationError::DuplicateFlag {
                    command: command.to_string(),
                    name: name.to_string(),
                });
                return errors;
            }
        }
    }

    errors
}

fn validate_args(command: &Command, path: &str) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut optional_seen = false;

    for arg in command.args() {
        if arg.name.trim().is_empty() {
            errors.push(ValidationError::EmptyArgumentName(path.to_string()));
            return errors;
        }
        if !seen.insert(arg.name.as_str()) {
            errors.push(ValidationError::DuplicateArgument {
                command: path.to_string(),
                argument: arg.name.clone(),
            });
            return errors;
        }
        if arg.required && optional_seen {
            errors.push(ValidationError::RequiredAfterOptional {
                command: path.to_string(),
                argument: arg.name.clone(),
            });
            return errors;
        }
        optional_seen |= !arg.required;
    }

    if let Some(handler) = command.handler_ref() {
        let signature = handler.signature();
        let parameters = signature.fixed().len();
        if !signature.is_variadic() && parameters > command.args().len() {
            errors.push(ValidationError::UndeclaredParameters {
                command: path.to_string(),
                parameters,
                declared: command.args().len(),
            });
        }
    }

    errors
}
