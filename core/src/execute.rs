//! Execution entry points.
//!
//! One execution validates the tree, resolves the token vector to a
//! command, binds its positional tokens and runs the lifecycle. Parsing and
//! binding errors are returned before any hook runs.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::{Command, Error, Flag, Slot};
//!
//! let key = Slot::new(String::new());
//! let app = Command::new("app")
//!     .with_flag(Flag::new(&key, "api-key", String::new()).required());
//!
//! let err = app.execute_with_args(Vec::<String>::new()).unwrap_err();
//! assert!(matches!(err, Error::MissingRequiredFlag { ref flag, .. } if flag == "api-key"));
//!
//! app.execute_with_args(["--api-key=secret"]).unwrap();
//! assert_eq!(key.get(), "secret");
//! ```

use tracing::debug;

use crate::args::{BoundArgs, bind};
use crate::command::Command;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::help;
use crate::lifecycle;
use crate::parse::Token;
use crate::resolve::Invocation;
use crate::router::{locate, route};
use crate::validate::validate_command;

impl Command {
    /// Executes with the process arguments (program name skipped) and a
    /// background context.
    pub fn execute(&self) -> Result<()> {
        self.execute_context(&Context::background())
    }

    /// Executes with the process arguments and the given context.
    pub fn execute_context(&self, ctx: &Context) -> Result<()> {
        self.execute_with(ctx, std::env::args().skip(1))
    }

    /// Executes with an explicit token vector and a background context.
    pub fn execute_with_args<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.execute_with(&Context::background(), args)
    }

    /// Executes with an explicit token vector and context.
    ///
    /// # Errors
    ///
    /// Returns the first configuration, routing, parsing or binding error,
    /// or the first hook/handler error of the forward phase wrapped in
    /// [`Error::Callback`].
    pub fn execute_with<I, S>(&self, ctx: &Context, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = args.into_iter().map(Into::into).collect();

        if let Some(problem) = validate_command(self).into_iter().next() {
            return Err(Error::InvalidConfiguration(problem));
        }

        if let Some(target) = help_target(self, &tokens) {
            print!("{}", help::render(&target));
            return Ok(());
        }

        let invocation = route(self, &tokens)?;
        let bound = bind_positionals(&invocation)?;
        lifecycle::run(ctx, &invocation, bound)
    }
}

fn bind_positionals(invocation: &Invocation<'_>) -> Result<BoundArgs> {
    let command = invocation.command();
    let path = invocation.path_string();
    match command.handler_ref() {
        Some(handler) => bind(command.args(), handler.signature(), invocation.args(), &path),
        // Without a handler only the count is checked.
        None if invocation.args().len() > command.args().len() => Err(Error::TooManyArguments {
            expected: command.args().len(),
            actual: invocation.args().len(),
            command: path,
        }),
        None => Ok(BoundArgs::default()),
    }
}

/// Returns the command whose help was requested, if any token asks for it.
fn help_target<'a>(root: &'a Command, tokens: &[String]) -> Option<Invocation<'a>> {
    let target = locate(root, tokens);
    let settings = target.command().help_settings();
    if !settings.enabled {
        return None;
    }

    let flags = target.effective_flags();
    let requested = tokens.iter().any(|raw| {
        settings.matches(raw)
            && match Token::classify(raw) {
                Token::Flag { name, .. } => !flags.contains(name),
                Token::Positional(_) => false,
            }
    });

    if requested {
        debug!(command = %target.path_string(), "Help requested");
        Some(target)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::args::Handler;
    use crate::command::Argument;
    use crate::flag::Flag;
    use crate::slot::Slot;
    use crate::validate::ValidationError;

    #[test]
    fn test_help_request_skips_lifecycle() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let app = Command::new("app").with_subcommand(
            Command::new("db")
                .persistent_pre_run(move |_, _| {
                    flag.set(true);
                    Ok(())
                })
                .with_arg(Argument::required("name", "")),
        );

        assert!(app.execute_with_args(["db", "--help"]).is_ok());
        assert!(!ran.get());

        let target = help_target(&app, &["db".to_string(), "-h".to_string()]).unwrap();
        assert_eq!(target.path_string(), "app db");
    }

    #[test]
    fn test_user_flag_shadows_help() {
        let host = Slot::new(String::new());
        let app = Command::new("app")
            .with_flag(Flag::new(&host, "host", String::new()).with_short("h"));

        assert!(help_target(&app, &["-h=db.local".to_string()]).is_none());
        assert!(help_target(&app, &["-h".to_string()]).is_none());
        assert!(help_target(&app, &["--help".to_string()]).is_some());
    }

    #[test]
    fn test_disabled_help_is_an_unknown_flag() {
        let app = Command::new("app").disable_help();
        let err = app.execute_with_args(["--help"]).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { .. }));
    }

    #[test]
    fn test_invalid_tree_is_rejected_before_parsing() {
        let app = Command::new("app")
            .with_arg(Argument::optional("a", ""))
            .with_arg(Argument::required("b", ""));
        let err = app.execute_with_args(["x", "y"]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration(ValidationError::RequiredAfterOptional { .. })
        ));
    }

    #[test]
    fn test_binding_error_runs_no_hooks() {
        let ran = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ran);
        let app = Command::new("app")
            .persistent_post_run(move |_, _| {
                counter.set(counter.get() + 1);
                Ok(())
            })
            .with_arg(Argument::required("port", ""))
            .handler(Handler::fixed1(|_, _, _port: u16| Ok(())));

        let err = app.execute_with_args(["http"]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert_eq!(ran.get(), 0);
    }

    #[test]
    fn test_declared_positionals_without_handler() {
        let app = Command::new("app").with_arg(Argument::required("name", ""));
        assert!(app.execute_with_args(Vec::<String>::new()).is_ok());
        assert!(matches!(
            app.execute_with_args(["a", "b"]).unwrap_err(),
            Error::TooManyArguments { expected: 1, actual: 2, .. }
        ));
        assert!(app.execute_with_args(["a"]).is_ok());
    }

    #[test]
    fn test_parameterless_action_matches_handlerless_binding() {
        let app = Command::new("app")
            .with_arg(Argument::required("name", ""))
            .action(|_, _| Ok(()));
        assert!(app.execute_with_args(Vec::<String>::new()).is_ok());
        assert!(app.execute_with_args(["a"]).is_ok());
        assert!(matches!(
            app.execute_with_args(["a", "b"]).unwrap_err(),
            Error::TooManyArguments { expected: 1, actual: 2, .. }
        ));
    }
}
