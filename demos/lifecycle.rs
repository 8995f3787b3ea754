//! Lifecycle hook ordering example.
//!
//! Every hook prints when it runs, so the order is visible:
//! persistent pre-run hooks root first, then pre-run, the handler,
//! post-run, and persistent post-run hooks leaf first. Passing `--fail`
//! makes the subcommand's pre-run hook fail; the post hooks still run.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example lifecycle -- sub
//! cargo run -p command-tree-demos --example lifecycle -- sub --fail
//! RUST_LOG=command_tree_core=debug cargo run -p command-tree-demos --example lifecycle -- sub
//! ```

use command_tree_core::{BoxError, Command, Context, Flag, Invocation, Slot};

fn announce(label: &'static str) -> impl Fn(&Context, &Invocation<'_>) -> Result<(), BoxError> {
    move |_, invocation| {
        println!("[{label}] {}", invocation.path_string());
        Ok(())
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let fail = Slot::new(false);
    let should_fail = fail.clone();

    let root = Command::new("lifecycle")
        .with_description("Demonstrates lifecycle hooks")
        .with_flag(Flag::new(&fail, "fail", false).with_usage("Make the pre-run hook fail"))
        .persistent_pre_run(announce("root persistent-pre-run"))
        .pre_run(announce("root pre-run"))
        .action(|_, _| {
            println!("[root handler]");
            Ok(())
        })
        .post_run(announce("root post-run"))
        .persistent_post_run(announce("root persistent-post-run"))
        .with_subcommand(
            Command::new("sub")
                .with_description("Subcommand with its own hooks")
                .persistent_pre_run(announce("sub persistent-pre-run"))
                .pre_run(move |_, _| {
                    println!("[sub pre-run]");
                    if should_fail.get() {
                        return Err("pre-run refused to continue".into());
                    }
                    Ok(())
                })
                .action(|_, _| {
                    println!("[sub handler]");
                    Ok(())
                })
                .post_run(announce("sub post-run"))
                .persistent_post_run(announce("sub persistent-post-run")),
        );

    if let Err(err) = root.execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
