//! Command tree nodes.
//!
//! A [`Command`] owns its own flags, positional argument declarations,
//! handler, lifecycle hooks and children. Trees are built with chained
//! `with_*` calls and are read-only while they execute.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::{Argument, Command, Flag, Slot};
//!
//! let verbose = Slot::new(false);
//! let app = Command::new("app")
//!     .with_description("Example application")
//!     .with_flag(Flag::new(&verbose, "verbose", false).with_short("v"))
//!     .with_subcommand(
//!         Command::new("deploy")
//!             .with_arg(Argument::required("name", "Application name")),
//!     );
//!
//! assert_eq!(app.subcommand_names(), vec!["deploy"]);
//! assert!(app.flags().lookup("v").is_some());
//! assert_eq!(app.subcommand("deploy").unwrap().args().len(), 1);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::args::Handler;
use crate::context::Context;
use crate::error::BoxError;
use crate::flag::{Flag, FlagSet};
use crate::resolve::Invocation;

/// A lifecycle hook: receives the context and the resolved invocation.
pub type Hook = Box<dyn Fn(&Context, &Invocation<'_>) -> Result<(), BoxError>>;

/// A positional argument declaration.
///
/// Declarations are bound to handler parameters by position.
///
/// ```
/// use command_tree_core::Argument;
///
/// let name = Argument::required("name", "Application name");
/// assert!(name.required);
///
/// let env = Argument::optional("env", "Target environment");
/// assert!(!env.required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// Name used in usage lines and error messages.
    pub name: String,
    pub description: String,
    pub required: bool,
}

impl Argument {
    pub fn required(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            required: false,
        }
    }
}

/// Automatic help flag settings for one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpSettings {
    pub enabled: bool,
    /// Long form, without dashes.
    pub long: String,
    /// Short form, without the dash.
    pub short: String,
}

impl Default for HelpSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            long: "help".to_string(),
            short: "h".to_string(),
        }
    }
}

impl HelpSettings {
    /// Checks if `token` requests help (`--help` or `-h`).
    pub fn matches(&self, token: &str) -> bool {
        if !self.enabled {
            return false;
        }
        match token.strip_prefix("--") {
            Some(long) => long == self.long,
            None => token.strip_prefix('-') == Some(self.short.as_str()),
        }
    }
}

#[derive(Default)]
pub(crate) struct Hooks {
    pub(crate) persistent_pre_run: Option<Hook>,
    pub(crate) pre_run: Option<Hook>,
    pub(crate) post_run: Option<Hook>,
    pub(crate) persistent_post_run: Option<Hook>,
}

/// A node in the command tree.
pub struct Command {
    name: String,
    description: String,
    hidden: bool,
    flags: FlagSet,
    args: Vec<Argument>,
    subcommands: BTreeMap<String, Command>,
    handler: Option<Handler>,
    pub(crate) hooks: Hooks,
    help: HelpSettings,
}

impl Command {
    /// Creates a command with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            hidden: false,
            flags: FlagSet::new(),
            args: Vec::new(),
            subcommands: BTreeMap::new(),
            handler: None,
            hooks: Hooks::default(),
            help: HelpSettings::default(),
        }
    }

    /// Sets the description shown in help output.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Hides the command from subcommand listings. It still executes.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Makes a hidden command visible again.
    pub fn show(mut self) -> Self {
        self.hidden = false;
        self
    }

    /// Adds a flag. Re-adding a primary name replaces the earlier binding.
    pub fn with_flag(mut self, flag: Flag) -> Self {
        self.flags.add(flag);
        self
    }

    /// Adds a positional argument declaration.
    pub fn with_arg(mut self, arg: Argument) -> Self {
        self.args.push(arg);
        self
    }

    /// Attaches a child command, replacing any child with the same name.
    pub fn with_subcommand(mut self, command: Command) -> Self {
        self.subcommands.insert(command.name.clone(), command);
        self
    }

    /// Sets a handler that takes no positional parameters.
    ///
    /// Raw positional tokens remain available through
    /// [`Invocation::args`].
    pub fn action<F>(self, f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> + 'static,
    {
        self.handler(Handler::new(f))
    }

    /// Sets a handler with typed positional parameters.
    pub fn handler(mut self, handler: Handler) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Runs before this command and every descendant, root first.
    pub fn persistent_pre_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> + 'static,
    {
        self.hooks.persistent_pre_run = Some(Box::new(f));
        self
    }

    /// Runs before this command's handler only.
    pub fn pre_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> + 'static,
    {
        self.hooks.pre_run = Some(Box::new(f));
        self
    }

    /// Runs after this command's handler only, even when it failed.
    pub fn post_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> + 'static,
    {
        self.hooks.post_run = Some(Box::new(f));
        self
    }

    /// Runs after this command and every descendant, leaf first, even when
    /// an earlier stage failed.
    pub fn persistent_post_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> + 'static,
    {
        self.hooks.persistent_post_run = Some(Box::new(f));
        self
    }

    /// Disables the automatic `--help`/`-h` flag on this command.
    pub fn disable_help(mut self) -> Self {
        self.help.enabled = false;
        self
    }

    /// Re-enables the automatic help flag.
    pub fn enable_help(mut self) -> Self {
        self.help.enabled = true;
        self
    }

    /// Renames the automatic help flag (names given without dashes).
    pub fn help_flag(mut self, long: &str, short: &str) -> Self {
        self.help.long = long.to_string();
        self.help.short = short.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns the flags declared directly on this command.
    pub fn flags(&self) -> &FlagSet {
        &self.flags
    }

    pub(crate) fn flags_mut(&mut self) -> &mut FlagSet {
        &mut self.flags
    }

    /// Returns this command's own positional declarations. Positionals do
    /// not inherit.
    pub fn args(&self) -> &[Argument] {
        &self.args
    }

    /// Returns the children keyed by name.
    pub fn subcommands(&self) -> &BTreeMap<String, Command> {
        &self.subcommands
    }

    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.get(name)
    }

    pub(crate) fn subcommand_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.subcommands.get_mut(name)
    }

    /// Gets all subcommand names, sorted.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.keys().map(String::as_str).collect()
    }

    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    pub fn handler_ref(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub fn help_settings(&self) -> &HelpSettings {
        &self.help
    }

    /// Resolves a path of subcommand names below this command.
    ///
    /// ```
    /// use command_tree_core::Command;
    ///
    /// let app = Command::new("app")
    ///     .with_subcommand(Command::new("db").with_subcommand(Command::new("migrate")));
    ///
    /// let found = app.find(&["db", "migrate"]).unwrap();
    /// assert_eq!(found.path_string(), "app db migrate");
    /// assert!(app.find(&["db", "seed"]).is_none());
    /// ```
    pub fn find(&self, path: &[&str]) -> Option<Invocation<'_>> {
        let mut invocation = Invocation::root(self);
        for name in path {
            let child = invocation.command().subcommand(name)?;
            invocation.push(child);
        }
        Some(invocation)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("hidden", &self.hidden)
            .field("flags", &self.flags)
            .field("args", &self.args)
            .field("subcommands", &self.subcommands)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::Slot;

    #[test]
    fn test_builder_records_configuration() {
        let verbose = Slot::new(false);
        let cmd = Command::new("test")
            .with_description("Test command")
            .with_flag(Flag::new(&verbose, "verbose", false).with_short("v"))
            .with_arg(Argument::required("name", "Name"))
            .with_arg(Argument::optional("env", "Environment"))
            .hidden();

        assert_eq!(cmd.name(), "test");
        assert_eq!(cmd.description(), "Test command");
        assert!(cmd.is_hidden());
        assert_eq!(cmd.flags().len(), 1);
        assert_eq!(cmd.args()[0].name, "name");
        assert!(!cmd.args()[1].required);
        assert!(cmd.handler_ref().is_none());
        assert!(!cmd.show().is_hidden());
    }

    #[test]
    fn test_subcommands_are_keyed_by_name() {
        let cmd = Command::new("git")
            .with_subcommand(Command::new("push"))
            .with_subcommand(Command::new("commit"))
            .with_subcommand(Command::new("push").with_description("replacement"));

        assert_eq!(cmd.subcommand_names(), vec!["commit", "push"]);
        assert_eq!(cmd.subcommand("push").unwrap().description(), "replacement");
        assert!(cmd.subcommand("pull").is_none());
    }

    #[test]
    fn test_help_settings_match_tokens() {
        let default = HelpSettings::default();
        assert!(default.matches("--help"));
        assert!(default.matches("-h"));
        assert!(!default.matches("-help"));
        assert!(!default.matches("help"));

        let cmd = Command::new("app").help_flag("usage", "u");
        assert!(cmd.help_settings().matches("--usage"));
        assert!(!cmd.help_settings().matches("--help"));

        let cmd = cmd.disable_help();
        assert!(!cmd.help_settings().matches("--usage"));
    }
}
