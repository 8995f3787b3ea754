//! Plain-text help rendering.
//!
//! # Examples
//!
//! ```
//! use command_tree_core::{Argument, Command, Flag, Slot, help};
//!
//! let verbose = Slot::new(false);
//! let app = Command::new("app")
//!     .with_flag(
//!         Flag::new(&verbose, "verbose", false)
//!             .with_short("v")
//!             .with_usage("Verbose output"),
//!     )
//!     .with_subcommand(
//!         Command::new("deploy")
//!             .with_description("Deploy an application")
//!             .with_arg(Argument::required("name", "Application name")),
//!     );
//!
//! let text = help::render(&app.find(&["deploy"]).unwrap());
//! assert!(text.starts_with("Deploy an application\n\nUsage: app deploy <name> [flags]"));
//! assert!(text.contains("-v, --verbose"));
//! assert!(text.contains("(inherited)"));
//! ```

use std::fmt::Write;

use crate::command::Command;
use crate::flag::Flag;
use crate::resolve::Invocation;
use crate::value::{Value, ValueKind};

/// Renders the help text for the invocation's command.
pub fn render(invocation: &Invocation<'_>) -> String {
    let command = invocation.command();
    let path = invocation.path_string();
    let mut out = String::new();

    if !command.description().is_empty() {
        out.push_str(command.description());
        out.push_str("\n\n");
    }

    let _ = writeln!(out, "Usage: {}", usage_line(command, &path));

    if !command.args().is_empty() {
        out.push_str("\nArguments:\n");
        let rows = command
            .args()
            .iter()
            .map(|arg| {
                let mut text = arg.description.clone();
                if !arg.required {
                    text.push_str(" (optional)");
                }
                (arg.name.clone(), text)
            })
            .collect::<Vec<_>>();
        write_rows(&mut out, &rows);
    }

    let mut flag_rows = invocation
        .effective_flags()
        .visible()
        .map(|flag| {
            let inherited = command.flags().lookup(flag.name()).is_none();
            (flag_column(flag), flag_text(flag, inherited))
        })
        .collect::<Vec<_>>();
    let help = command.help_settings();
    if help.enabled {
        let column = if help.short.is_empty() {
            format!("    --{}", help.long)
        } else {
            format!("-{}, --{}", help.short, help.long)
        };
        flag_rows.push((column, format!("Show help for {}", command.name())));
    }
    if !flag_rows.is_empty() {
        out.push_str("\nFlags:\n");
        write_rows(&mut out, &flag_rows);
    }

    let commands = command
        .subcommands()
        .values()
        .filter(|child| !child.is_hidden())
        .map(|child| (child.name().to_string(), child.description().to_string()))
        .collect::<Vec<_>>();
    if !commands.is_empty() {
        out.push_str("\nCommands:\n");
        write_rows(&mut out, &commands);
        if help.enabled {
            let _ = writeln!(
                out,
                "\nUse \"{path} [command] --{}\" for more information about a command.",
                help.long
            );
        }
    }

    out
}

fn usage_line(command: &Command, path: &str) -> String {
    let mut parts = vec![path.to_string()];
    if command.has_subcommands() {
        parts.push("[command]".to_string());
    }
    for arg in command.args() {
        if arg.required {
            parts.push(format!("<{}>", arg.name));
        } else {
            parts.push(format!("[{}]", arg.name));
        }
    }
    let variadic = command
        .handler_ref()
        .is_some_and(|handler| handler.signature().is_variadic());
    if variadic {
        parts.push("[args...]".to_string());
    }
    parts.push("[flags]".to_string());
    parts.join(" ")
}

fn flag_column(flag: &Flag) -> String {
    let mut column = match flag.short() {
        Some(short) => format!("-{short}, --{}", flag.name()),
        None => format!("    --{}", flag.name()),
    };
    if flag.kind() != ValueKind::Bool {
        let _ = write!(column, "={}", flag.kind());
    }
    column
}

fn flag_text(flag: &Flag, inherited: bool) -> String {
    let mut text = flag.usage().to_string();
    let default = flag.default_value();
    if *default != Value::zero(flag.kind()) {
        let _ = write!(text, " (default: {default})");
    }
    if flag.is_required() {
        text.push_str(" (required)");
    }
    if inherited {
        text.push_str(" (inherited)");
    }
    text.trim_start().to_string()
}

fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows.iter().map(|(left, _)| left.len()).max().unwrap_or(0);
    for (left, right) in rows {
        let line = format!("  {left:<width$}   {right}");
        out.push_str(line.trim_end());
        out.push('\n');
    }
}
