//! Deadline-aware handler example.
//!
//! The engine hands the context to the handler untouched. The handler
//! derives a child context limited by `--deadline`, polls it between work
//! steps and stops with the context's error once it expires.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example execute_context -- --steps=5
//! cargo run -p command-tree-demos --example execute_context -- --steps=50 --deadline=300ms
//! ```

use std::time::Duration;

use command_tree_core::{Command, Context, Flag, Slot};
use tracing::info;

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let steps = Slot::new(0u32);
    let deadline = Slot::new(Duration::ZERO);
    let (steps_seen, deadline_seen) = (steps.clone(), deadline.clone());

    let app = Command::new("worker")
        .with_description("Runs work steps until done or out of time")
        .with_flag(Flag::new(&steps, "steps", 10).with_usage("Number of work steps"))
        .with_flag(
            Flag::new(&deadline, "deadline", Duration::from_secs(1))
                .with_usage("Time budget for the whole run"),
        )
        .action(move |ctx, _| {
            let ctx = ctx.with_timeout(deadline_seen.get());
            for step in 1..=steps_seen.get() {
                if let Some(err) = ctx.err() {
                    return Err(err.into());
                }
                std::thread::sleep(Duration::from_millis(100));
                info!(step, "Finished step");
            }
            Ok(())
        });

    // An outer hard limit; the handler narrows it with --deadline.
    let ctx = Context::background().with_timeout(Duration::from_secs(30));
    if let Err(err) = app.execute_context(&ctx) {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
