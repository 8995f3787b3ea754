//! Command tree resolution and execution engine.
//!
//! This crate builds multi-level command-line tools out of a tree of
//! commands:
//!
//! - [`Command`]: a tree node owning its flags, positional declarations,
//!   handler, lifecycle hooks and children.
//! - [`Flag`]: a named, typed, defaultable binding that writes into a
//!   caller-owned [`Slot`].
//! - [`Argument`] and [`Handler`]: positional declarations and a command
//!   body with typed positional parameters, optionally ending in a variadic
//!   tail.
//! - [`Context`]: a cancellation/deadline carrier passed unchanged to every
//!   hook and handler.
//!
//! Flags declared on a command are inherited by its descendants; a
//! descendant's flag of the same name shadows the ancestor's
//! ([`effective_flags`]). Execution routes the token vector to the deepest
//! matching command, parses `--name=value` / `-n=value` / bare boolean
//! flags, binds positionals, then runs `PersistentPreRun` (root first),
//! `PreRun`, the handler, `PostRun` and `PersistentPostRun` (leaf first).
//! The post hooks run even when an earlier stage failed.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use command_tree_core::*;
//!
//! let verbose = Slot::new(false);
//! let trace = Slot::new(false);
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let seen = Rc::clone(&log);
//!
//! let app = Command::new("app")
//!     .with_flag(Flag::new(&verbose, "verbose", false).with_short("v"))
//!     .with_subcommand(
//!         Command::new("db").with_subcommand(
//!             Command::new("migrate")
//!                 .with_flag(Flag::new(&trace, "trace", false))
//!                 .with_arg(Argument::optional("target", "Target version"))
//!                 .handler(Handler::fixed1(move |_ctx, inv, target: String| {
//!                     seen.borrow_mut().push(format!("{} -> {target:?}", inv.path_string()));
//!                     Ok(())
//!                 })),
//!         ),
//!     );
//!
//! app.execute_with_args(["-v", "db", "migrate", "--trace"]).unwrap();
//! assert!(verbose.get());
//! assert!(trace.get());
//! assert_eq!(log.borrow().as_slice(), ["app db migrate -> \"\""]);
//! assert!(validate_command(&app).is_empty());
//! ```

mod args;
mod command;
mod config;
mod context;
mod error;
mod execute;
mod flag;
pub mod help;
mod lifecycle;
mod parse;
mod resolve;
mod router;
mod slot;
mod validate;
mod value;

pub use args::{BoundArgs, Handler, Signature, bind};
pub use command::{Argument, Command, HelpSettings, Hook};
pub use config::{ConfigError, DefaultValue, FlagDefaults};
pub use context::{CancelHandle, Context, ContextError};
pub use error::{BoxError, Error, Result};
pub use flag::{Flag, FlagSet};
pub use lifecycle::Stage;
pub use parse::{Token, is_flag_token};
pub use resolve::{EffectiveFlags, Invocation, effective_flags, effective_positionals};
pub use slot::{FlagValue, Slot, Storage};
pub use validate::{ValidationError, validate_command};
pub use value::{
    ArgValue, ConversionError, Value, ValueKind, convert, format_duration, parse_bool,
    parse_duration,
};
