//! Subcommand routing.
//!
//! Walks the token vector left to right. Flag tokens are deferred; the
//! first non-flag token either names a child of the current command (the
//! subcommand boundary), fails as an unknown command when the current
//! command has children, or starts the positional tokens of a leaf. Flags
//! before a boundary are parsed against the current command's effective
//! flags, then routing restarts at the child with the tokens after it.

use tracing::debug;

use crate::command::Command;
use crate::error::{Error, Result};
use crate::parse::{check_required, is_flag_token, parse_flags};
use crate::resolve::Invocation;

/// Resolves `tokens` to the deepest matching command.
///
/// Every flag occurrence is written to its slot along the way. The returned
/// invocation carries the positional tokens left for the executing command.
pub(crate) fn route<'a>(root: &'a Command, tokens: &[String]) -> Result<Invocation<'a>> {
    let mut invocation = Invocation::root(root);
    let mut remaining = tokens;
    root.flags().reset();

    while let Some((idx, child)) = find_boundary(&invocation, remaining)? {
        let path = invocation.path_string();
        parse_flags(&invocation.effective_flags(), &remaining[..idx], &path)?;
        debug!(command = %path, subcommand = child.name(), "Found subcommand boundary");

        child.flags().reset();
        invocation.push(child);
        remaining = &remaining[idx + 1..];
    }

    let path = invocation.path_string();
    let flags = invocation.effective_flags();
    let positionals = parse_flags(&flags, remaining, &path)?;
    check_required(&flags, &path)?;

    debug!(
        command = %path,
        positionals = positionals.len(),
        "Resolved command"
    );
    invocation.set_args(positionals);
    Ok(invocation)
}

/// Finds the subcommand boundary in `tokens` for the invocation's current
/// command.
fn find_boundary<'a>(
    invocation: &Invocation<'a>,
    tokens: &[String],
) -> Result<Option<(usize, &'a Command)>> {
    let command = invocation.command();
    if !command.has_subcommands() {
        return Ok(None);
    }

    let Some((idx, token)) = tokens
        .iter()
        .enumerate()
        .find(|(_, token)| !is_flag_token(token))
    else {
        return Ok(None);
    };

    match command.subcommand(token) {
        Some(child) => Ok(Some((idx, child))),
        None => Err(Error::CommandNotFound {
            name: token.clone(),
            command: invocation.path_string(),
        }),
    }
}

/// Returns the deepest command reachable through the leading non-flag
/// tokens, without parsing anything.
pub(crate) fn locate<'a>(root: &'a Command, tokens: &[String]) -> Invocation<'a> {
    let mut invocation = Invocation::root(root);
    for token in tokens.iter().filter(|token| !is_flag_token(token)) {
        match invocation.command().subcommand(token) {
            Some(child) => invocation.push(child),
            None => break,
        }
    }
    invocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;
    use crate::slot::Slot;

    fn strings(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_flags_before_boundary_belong_to_parent() {
        let verbose = Slot::new(false);
        let force = Slot::new(false);
        let app = Command::new("app")
            .with_flag(Flag::new(&verbose, "verbose", false).with_short("v"))
            .with_subcommand(Command::new("rm").with_flag(Flag::new(&force, "force", false)));

        let invocation = route(&app, &strings(&["-v", "rm", "--force", "file"])).unwrap();
        assert_eq!(invocation.path_string(), "app rm");
        assert_eq!(invocation.args(), ["file"]);
        assert!(verbose.get());
        assert!(force.get());
    }

    #[test]
    fn test_child_flag_before_boundary_is_unknown() {
        let force = Slot::new(false);
        let app = Command::new("app")
            .with_subcommand(Command::new("rm").with_flag(Flag::new(&force, "force", false)));

        let err = route(&app, &strings(&["--force", "rm"])).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { ref command, .. } if command == "app"));
    }

    #[test]
    fn test_unmatched_token_with_children_fails() {
        let app = Command::new("app").with_subcommand(Command::new("db"));
        let err = route(&app, &strings(&["dbx"])).unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'dbx' for 'app'");
    }

    #[test]
    fn test_leaf_stops_scanning() {
        let app = Command::new("app")
            .with_subcommand(Command::new("echo").with_subcommand(Command::new("twice")));
        let invocation = route(&app, &strings(&["echo", "twice", "echo", "twice"])).unwrap();
        assert_eq!(invocation.path_string(), "app echo twice");
        assert_eq!(invocation.args(), ["echo", "twice"]);
    }

    #[test]
    fn test_flags_reset_on_every_route() {
        let tags = Slot::new(Vec::<String>::new());
        let app = Command::new("app").with_flag(Flag::new(&tags, "tag", Vec::new()));

        route(&app, &strings(&["--tag=a"])).unwrap();
        route(&app, &strings(&["--tag=b"])).unwrap();
        assert_eq!(tags.get(), vec!["b".to_string()]);

        route(&app, &[]).unwrap();
        assert!(tags.get().is_empty());
        assert!(!app.flags().lookup("tag").unwrap().is_set());
    }

    #[test]
    fn test_locate_follows_leading_names() {
        let app = Command::new("app")
            .with_subcommand(Command::new("db").with_subcommand(Command::new("migrate")));

        assert_eq!(
            locate(&app, &strings(&["-v", "db", "migrate", "--help"])).path_string(),
            "app db migrate"
        );
        assert_eq!(locate(&app, &strings(&["db", "nope", "migrate"])).path_string(), "app db");
    }
}
