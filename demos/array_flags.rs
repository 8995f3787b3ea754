//! Repeatable string-list flags example.
//!
//! Each occurrence of `--tag` or `-t` appends one element, in command-line
//! order, on top of the declared default.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example array_flags -- --tag=web -t=api --tag=db
//! cargo run -p command-tree-demos --example array_flags -- --exclude=tmp
//! ```

use command_tree_core::{Command, Flag, Slot};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let tags = Slot::new(Vec::<String>::new());
    let exclude = Slot::new(Vec::<String>::new());
    let (tags_seen, exclude_seen) = (tags.clone(), exclude.clone());

    let app = Command::new("arrays")
        .with_description("Demonstrates string list flags")
        .with_flag(Flag::new(&tags, "tag", Vec::new()).with_short("t").with_usage("Tag to apply"))
        .with_flag(
            Flag::new(&exclude, "exclude", vec![".git".to_string()])
                .with_usage("Path to skip"),
        )
        .action(move |_, _| {
            println!("tags:    {:?}", tags_seen.borrow());
            println!("exclude: {:?}", exclude_seen.borrow());
            Ok(())
        });

    if let Err(err) = app.execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
