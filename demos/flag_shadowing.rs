//! Flag inheritance and shadowing example.
//!
//! The root declares `--timeout` and `--verbose`. The `db` subcommand
//! redeclares `--timeout` with its own storage and default, so setting it
//! after `db` never changes the root's value. `--verbose` is inherited
//! unchanged.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example flag_shadowing -- db --timeout=5s
//! cargo run -p command-tree-demos --example flag_shadowing -- --timeout=2m db -v
//! cargo run -p command-tree-demos --example flag_shadowing -- db --help
//! ```

use std::time::Duration;

use command_tree_core::{Command, Flag, Slot, format_duration};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let root_timeout = Slot::new(Duration::ZERO);
    let db_timeout = Slot::new(Duration::ZERO);
    let verbose = Slot::new(false);

    let (root_seen, db_seen, verbose_seen) =
        (root_timeout.clone(), db_timeout.clone(), verbose.clone());

    let app = Command::new("app")
        .with_description("Demonstrates flag shadowing")
        .with_flag(
            Flag::new(&root_timeout, "timeout", Duration::from_secs(30))
                .with_usage("Request timeout"),
        )
        .with_flag(
            Flag::new(&verbose, "verbose", false)
                .with_short("v")
                .with_usage("Verbose output"),
        )
        .with_subcommand(
            Command::new("db")
                .with_description("Database commands")
                .with_flag(
                    Flag::new(&db_timeout, "timeout", Duration::from_secs(60))
                        .with_usage("Query timeout"),
                )
                .action(move |_, invocation| {
                    println!("command:       {}", invocation.path_string());
                    println!("root timeout:  {}", format_duration(root_seen.get()));
                    println!("db timeout:    {}", format_duration(db_seen.get()));
                    println!("verbose:       {}", verbose_seen.get());
                    for flag in invocation.effective_flags().iter() {
                        println!("  --{:<10} {}", flag.name(), flag.value());
                    }
                    Ok(())
                }),
        );

    if let Err(err) = app.execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
