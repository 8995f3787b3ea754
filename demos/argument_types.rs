//! Typed positional arguments example.
//!
//! Each subcommand registers a handler whose parameter types decide how
//! positional tokens are converted. `sum` collects any number of integers,
//! `scale` takes a service name and an optional replica count, and `cp`
//! takes a destination followed by a variadic list of sources.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example argument_types -- sum 1 2 3
//! cargo run -p command-tree-demos --example argument_types -- scale web 3
//! cargo run -p command-tree-demos --example argument_types -- scale web
//! cargo run -p command-tree-demos --example argument_types -- cp out a.txt b.txt
//! cargo run -p command-tree-demos --example argument_types -- scale web many
//! ```

use command_tree_core::{Argument, Command, Handler};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let app = Command::new("args")
        .with_description("Demonstrates typed positional arguments")
        .with_subcommand(
            Command::new("sum")
                .with_description("Add integers")
                .handler(Handler::variadic0(|_, _, numbers: Vec<i64>| {
                    let total: i64 = numbers.iter().sum();
                    let terms: Vec<String> = numbers.iter().map(i64::to_string).collect();
                    println!("{} = {total}", terms.join(" + "));
                    Ok(())
                })),
        )
        .with_subcommand(
            Command::new("scale")
                .with_description("Scale a service")
                .with_arg(Argument::required("service", "Service name"))
                .with_arg(Argument::optional("replicas", "Replica count (0 keeps current)"))
                .handler(Handler::fixed2(|_, _, service: String, replicas: u32| {
                    if replicas == 0 {
                        println!("{service}: keeping current replica count");
                    } else {
                        println!("{service}: scaling to {replicas}");
                    }
                    Ok(())
                })),
        )
        .with_subcommand(
            Command::new("cp")
                .with_description("Copy files into a destination")
                .with_arg(Argument::required("dest", "Destination directory"))
                .handler(Handler::variadic1(|_, _, dest: String, sources: Vec<String>| {
                    if sources.is_empty() {
                        return Err("nothing to copy".into());
                    }
                    for source in &sources {
                        println!("{source} -> {dest}/");
                    }
                    Ok(())
                })),
        );

    if let Err(err) = app.execute() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
