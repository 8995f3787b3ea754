//! Flag token parsing.
//!
//! Wire syntax: `--name=value`, `-n=value`, and the bare forms `--name` /
//! `-n` for boolean flags (implying `true`). A non-boolean flag without
//! `=value` is an error. Any token not starting with `-` is a positional
//! candidate.

use tracing::trace;

use crate::error::{Error, Result};
use crate::resolve::EffectiveFlags;
use crate::value::ValueKind;

/// One classified command-line token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    /// `--name`, `-n`, `--name=value` or `-n=value`, dashes stripped.
    Flag {
        name: &'t str,
        value: Option<&'t str>,
    },
    Positional(&'t str),
}

impl<'t> Token<'t> {
    /// Classifies a raw token.
    ///
    /// ```
    /// use command_tree_core::Token;
    ///
    /// assert_eq!(
    ///     Token::classify("--port=8080"),
    ///     Token::Flag { name: "port", value: Some("8080") }
    /// );
    /// assert_eq!(Token::classify("-v"), Token::Flag { name: "v", value: None });
    /// assert_eq!(Token::classify("file.txt"), Token::Positional("file.txt"));
    /// ```
    pub fn classify(raw: &'t str) -> Self {
        let Some(body) = raw.strip_prefix('-') else {
            return Self::Positional(raw);
        };
        let body = body.strip_prefix('-').unwrap_or(body);
        match body.split_once('=') {
            Some((name, value)) => Self::Flag {
                name,
                value: Some(value),
            },
            None => Self::Flag {
                name: body,
                value: None,
            },
        }
    }
}

/// Returns `true` when `raw` is a flag token.
pub fn is_flag_token(raw: &str) -> bool {
    raw.starts_with('-')
}

/// Parses `tokens` against `flags`, writing each flag occurrence into its
/// bound slot. Returns the positional candidates in encountered order.
pub(crate) fn parse_flags(
    flags: &EffectiveFlags<'_>,
    tokens: &[String],
    command: &str,
) -> Result<Vec<String>> {
    let mut positionals = Vec::new();

    for raw in tokens {
        let (name, value) = match Token::classify(raw) {
            Token::Positional(token) => {
                positionals.push(token.to_string());
                continue;
            }
            Token::Flag { name, value } => (name, value),
        };

        let flag = flags.lookup(name).ok_or_else(|| Error::UnknownFlag {
            flag: name.to_string(),
            command: command.to_string(),
        })?;

        let token = match (value, flag.kind()) {
            (Some(value), _) => value,
            (None, ValueKind::Bool) => "true",
            (None, _) => {
                return Err(Error::MissingFlagValue {
                    flag: name.to_string(),
                    command: command.to_string(),
                });
            }
        };

        flag.assign(token).map_err(|source| Error::InvalidFlagValue {
            flag: name.to_string(),
            command: command.to_string(),
            source,
        })?;

        if flag.is_hidden() {
            trace!(command, flag = flag.name(), "Set hidden flag");
        } else {
            trace!(command, flag = flag.name(), value = token, "Set flag");
        }
    }

    Ok(positionals)
}

/// Fails on the first required flag that was not set.
pub(crate) fn check_required(flags: &EffectiveFlags<'_>, command: &str) -> Result<()> {
    match flags.iter().find(|flag| flag.is_required() && !flag.is_set()) {
        Some(flag) => Err(Error::MissingRequiredFlag {
            flag: flag.name().to_string(),
            command: command.to_string(),
        }),
        None => Ok(()),
    }
}
