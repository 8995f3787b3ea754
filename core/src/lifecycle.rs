//! Hook sequencing around the handler.
//!
//! The forward phase runs `PersistentPreRun` for every command on the path
//! (root first), then `PreRun` and the handler of the executing command.
//! The first failure ends the forward phase. The unwind phase always runs
//! afterwards: `PostRun` of the executing command, then `PersistentPostRun`
//! for every command on the path (leaf first).
//!
//! Unwind failures are logged and dropped; the caller receives the forward
//! phase result.

use std::fmt;

use tracing::{debug, warn};

use crate::args::BoundArgs;
use crate::command::{Command, Hook};
use crate::context::Context;
use crate::error::{BoxError, Error, Result};
use crate::resolve::Invocation;

/// One step of the lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    PersistentPreRun,
    PreRun,
    Handler,
    PostRun,
    PersistentPostRun,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 5] = [
        Stage::PersistentPreRun,
        Stage::PreRun,
        Stage::Handler,
        Stage::PostRun,
        Stage::PersistentPostRun,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::PersistentPreRun => "persistent-pre-run",
            Self::PreRun => "pre-run",
            Self::Handler => "handler",
            Self::PostRun => "post-run",
            Self::PersistentPostRun => "persistent-post-run",
        }
    }

    /// Returns `true` for stages that run even after a failure.
    pub fn is_unwind(self) -> bool {
        matches!(self, Self::PostRun | Self::PersistentPostRun)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs the full lifecycle for a resolved invocation.
pub(crate) fn run(ctx: &Context, invocation: &Invocation<'_>, args: BoundArgs) -> Result<()> {
    let outcome = forward(ctx, invocation, args);
    if let Err(err) = &outcome {
        debug!(command = %invocation.path_string(), error = %err, "Forward phase failed");
    }
    unwind(ctx, invocation);
    outcome.map_err(Error::Callback)
}

fn forward(
    ctx: &Context,
    invocation: &Invocation<'_>,
    args: BoundArgs,
) -> std::result::Result<(), BoxError> {
    for command in invocation.path() {
        if let Some(hook) = &command.hooks.persistent_pre_run {
            call(Stage::PersistentPreRun, command, hook, ctx, invocation)?;
        }
    }

    let leaf = invocation.command();
    if let Some(hook) = &leaf.hooks.pre_run {
        call(Stage::PreRun, leaf, hook, ctx, invocation)?;
    }

    match leaf.handler_ref() {
        Some(handler) => {
            debug!(command = leaf.name(), stage = %Stage::Handler, "Entering stage");
            handler.call(ctx, invocation, args)
        }
        None => {
            debug!(command = leaf.name(), "No handler registered");
            Ok(())
        }
    }
}

fn unwind(ctx: &Context, invocation: &Invocation<'_>) {
    let leaf = invocation.command();
    if let Some(hook) = &leaf.hooks.post_run {
        cleanup(Stage::PostRun, leaf, hook, ctx, invocation);
    }

    for command in invocation.path().iter().rev() {
        if let Some(hook) = &command.hooks.persistent_post_run {
            cleanup(Stage::PersistentPostRun, command, hook, ctx, invocation);
        }
    }
}

fn call(
    stage: Stage,
    owner: &Command,
    hook: &Hook,
    ctx: &Context,
    invocation: &Invocation<'_>,
) -> std::result::Result<(), BoxError> {
    debug!(command = owner.name(), %stage, "Entering stage");
    hook(ctx, invocation)
}

fn cleanup(stage: Stage, owner: &Command, hook: &Hook, ctx: &Context, invocation: &Invocation<'_>) {
    if let Err(err) = call(stage, owner, hook, ctx, invocation) {
        warn!(
            command = %invocation.path_string(),
            owner = owner.name(),
            %stage,
            error = %err,
            "Cleanup hook failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    type Log = Rc<RefCell<Vec<String>>>;

    fn record(
        log: &Log,
        entry: &str,
    ) -> impl Fn(&Context, &Invocation<'_>) -> std::result::Result<(), BoxError> + use<> {
        let log = Rc::clone(log);
        let entry = entry.to_string();
        move |_, _| {
            log.borrow_mut().push(entry.clone());
            Ok(())
        }
    }

    fn fail(
        log: &Log,
        entry: &str,
    ) -> impl Fn(&Context, &Invocation<'_>) -> std::result::Result<(), BoxError> + use<> {
        let log = Rc::clone(log);
        let entry = entry.to_string();
        move |_, _| {
            log.borrow_mut().push(entry.clone());
            Err(format!("{entry} failed").into())
        }
    }

    fn tree(log: &Log, leaf: Command) -> Command {
        Command::new("root")
            .persistent_pre_run(record(log, "root:ppre"))
            .persistent_post_run(record(log, "root:ppost"))
            .with_subcommand(
                Command::new("mid")
                    .persistent_pre_run(record(log, "mid:ppre"))
                    .persistent_post_run(record(log, "mid:ppost"))
                    .with_subcommand(leaf),
            )
    }

    fn run_leaf(root: &Command) -> Result<()> {
        let invocation = root.find(&["mid", "leaf"]).unwrap();
        run(&Context::background(), &invocation, BoundArgs::default())
    }

    #[test]
    fn test_full_order() {
        let log = Log::default();
        let leaf = Command::new("leaf")
            .persistent_pre_run(record(&log, "leaf:ppre"))
            .pre_run(record(&log, "leaf:pre"))
            .action(record(&log, "leaf:run"))
            .post_run(record(&log, "leaf:post"))
            .persistent_post_run(record(&log, "leaf:ppost"));
        let root = tree(&log, leaf);

        run_leaf(&root).unwrap();
        assert_eq!(
            log.borrow().as_slice(),
            [
                "root:ppre", "mid:ppre", "leaf:ppre", "leaf:pre", "leaf:run", "leaf:post",
                "leaf:ppost", "mid:ppost", "root:ppost",
            ]
        );
    }

    #[test]
    fn test_persistent_pre_run_failure_still_unwinds() {
        let log = Log::default();
        let leaf = Command::new("leaf")
            .pre_run(record(&log, "leaf:pre"))
            .action(record(&log, "leaf:run"))
            .post_run(record(&log, "leaf:post"));
        let root = Command::new("root")
            .persistent_pre_run(fail(&log, "root:ppre"))
            .persistent_post_run(record(&log, "root:ppost"))
            .with_subcommand(
                Command::new("mid")
                    .persistent_pre_run(record(&log, "mid:ppre"))
                    .with_subcommand(leaf),
            );

        let err = run_leaf(&root).unwrap_err();
        assert_eq!(err.to_string(), "root:ppre failed");
        assert_eq!(
            log.borrow().as_slice(),
            ["root:ppre", "leaf:post", "root:ppost"]
        );
    }

    #[test]
    fn test_handler_failure_is_returned_after_unwind() {
        let log = Log::default();
        let leaf = Command::new("leaf")
            .action(fail(&log, "leaf:run"))
            .post_run(record(&log, "leaf:post"));
        let root = tree(&log, leaf);

        let err = run_leaf(&root).unwrap_err();
        assert!(matches!(err, Error::Callback(_)));
        assert_eq!(err.to_string(), "leaf:run failed");
        assert_eq!(log.borrow().last().map(String::as_str), Some("root:ppost"));
    }

    #[test]
    fn test_cleanup_failures_are_not_surfaced() {
        let log = Log::default();
        let leaf = Command::new("leaf")
            .action(record(&log, "leaf:run"))
            .post_run(fail(&log, "leaf:post"))
            .persistent_post_run(fail(&log, "leaf:ppost"));
        let root = tree(&log, leaf);

        assert!(run_leaf(&root).is_ok());
        assert_eq!(
            log.borrow().as_slice(),
            [
                "root:ppre", "mid:ppre", "leaf:run", "leaf:post", "leaf:ppost", "mid:ppost",
                "root:ppost",
            ]
        );
    }

    #[test]
    fn test_missing_handler_is_not_an_error() {
        let log = Log::default();
        let root = tree(&log, Command::new("leaf").pre_run(record(&log, "leaf:pre")));
        assert!(run_leaf(&root).is_ok());
        assert_eq!(log.borrow().len(), 5);
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            ["persistent-pre-run", "pre-run", "handler", "post-run", "persistent-post-run"]
        );
        assert!(Stage::PostRun.is_unwind());
        assert!(!Stage::Handler.is_unwind());
    }
}
