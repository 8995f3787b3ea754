//! Flag inheritance and shadowing.
//!
//! The effective flag set of a command is computed from its ancestor chain:
//! walking from the command outward to the root, each flag's primary name is
//! recorded the first time it is seen and later (ancestor) bindings of the
//! same name are discarded. A descendant's flag therefore masks an
//! ancestor's flag of the same name, while every non-conflicting ancestor
//! flag stays reachable.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::{Command, Flag, Slot};
//!
//! let root_timeout = Slot::new(0u32);
//! let db_timeout = Slot::new(0u32);
//! let verbose = Slot::new(false);
//!
//! let app = Command::new("app")
//!     .with_flag(Flag::new(&root_timeout, "timeout", 30))
//!     .with_flag(Flag::new(&verbose, "verbose", false))
//!     .with_subcommand(Command::new("db").with_flag(Flag::new(&db_timeout, "timeout", 60)));
//!
//! let db = app.find(&["db"]).unwrap();
//! let flags = db.effective_flags();
//! assert_eq!(flags.len(), 2);
//! assert_eq!(flags.lookup("timeout").unwrap().default_value().to_string(), "60");
//! assert!(flags.lookup("verbose").is_some());
//! ```

use std::collections::HashSet;

use crate::command::{Argument, Command};
use crate::flag::Flag;

/// The shadow-resolved flags visible to one command, nearest declaration
/// first.
#[derive(Debug, Clone, Default)]
pub struct EffectiveFlags<'a> {
    flags: Vec<&'a Flag>,
}

impl<'a> EffectiveFlags<'a> {
    /// Finds a flag by primary name or short alias.
    pub fn lookup(&self, name: &str) -> Option<&'a Flag> {
        self.flags.iter().copied().find(|flag| flag.matches(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Flag> + '_ {
        self.flags.iter().copied()
    }

    /// Flags that are advertised in help output.
    pub fn visible(&self) -> impl Iterator<Item = &'a Flag> + '_ {
        self.iter().filter(|flag| !flag.is_hidden())
    }

    pub fn as_slice(&self) -> &[&'a Flag] {
        &self.flags
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

/// Computes the effective flag set for the last command of `path`
/// (root first).
pub fn effective_flags<'a>(path: &[&'a Command]) -> EffectiveFlags<'a> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut flags = Vec::new();

    for command in path.iter().rev().copied() {
        for flag in command.flags() {
            if seen.insert(flag.name()) {
                flags.push(flag);
            }
        }
    }

    EffectiveFlags { flags }
}

/// Returns the positional declarations of `command`. Positionals never
/// inherit.
pub fn effective_positionals(command: &Command) -> &[Argument] {
    command.args()
}

/// A command together with its ancestor chain and positional tokens.
///
/// Hooks and handlers receive an invocation; its path replaces a parent
/// pointer for ancestor walks.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
    root: &'a Command,
    path: Vec<&'a Command>,
    args: Vec<String>,
}

impl<'a> Invocation<'a> {
    pub(crate) fn root(root: &'a Command) -> Self {
        Self {
            root,
            path: vec![root],
            args: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, child: &'a Command) {
        self.path.push(child);
    }

    pub(crate) fn set_args(&mut self, args: Vec<String>) {
        self.args = args;
    }

    /// The command being executed.
    pub fn command(&self) -> &'a Command {
        self.path.last().copied().unwrap_or(self.root)
    }

    /// The parent of the command being executed.
    pub fn parent(&self) -> Option<&'a Command> {
        self.path.len().checked_sub(2).map(|idx| self.path[idx])
    }

    pub fn root_command(&self) -> &'a Command {
        self.root
    }

    /// Ancestors of the executing command, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = &'a Command> + '_ {
        self.path.iter().rev().skip(1).copied()
    }

    /// Commands from the root to the executing command, inclusive.
    pub fn path(&self) -> &[&'a Command] {
        &self.path
    }

    /// Space-separated command path, e.g. `"app db migrate"`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(|command| command.name())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Positional tokens left after flag parsing, in command-line order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn effective_flags(&self) -> EffectiveFlags<'a> {
        effective_flags(&self.path)
    }

    /// Looks up a flag in the effective flag set.
    pub fn flag(&self, name: &str) -> Option<&'a Flag> {
        self.effective_flags().lookup(name)
    }

    pub fn positionals(&self) -> &'a [Argument] {
        effective_positionals(self.command())
    }
}
