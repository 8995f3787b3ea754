//! Flag defaults file example.
//!
//! Writes a YAML defaults document to a temporary directory, applies it to
//! the command tree, then executes. Command-line values still win over the
//! file, and string lists extend the file's list.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p command-tree-demos --example config_defaults -- deploy
//! cargo run -p command-tree-demos --example config_defaults -- deploy --replicas=9 --label=canary
//! ```

use std::time::Duration;

use command_tree_core::{Command, Flag, FlagDefaults, Slot, format_duration};

const DEFAULTS: &str = r#"
deployer:
  region: eu-north-1
deployer deploy:
  replicas: 3
  timeout: 2m30s
  label: [prod]
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::temp_dir().join("command_tree_defaults.yml");
    std::fs::write(&path, DEFAULTS)?;

    let region = Slot::new(String::new());
    let replicas = Slot::new(0u16);
    let timeout = Slot::new(Duration::ZERO);
    let labels = Slot::new(Vec::<String>::new());
    let (region_seen, replicas_seen, timeout_seen, labels_seen) = (
        region.clone(),
        replicas.clone(),
        timeout.clone(),
        labels.clone(),
    );

    let mut app = Command::new("deployer")
        .with_flag(Flag::new(&region, "region", "us-east-1".to_string()))
        .with_subcommand(
            Command::new("deploy")
                .with_flag(Flag::new(&replicas, "replicas", 1))
                .with_flag(Flag::new(&timeout, "timeout", Duration::from_secs(60)))
                .with_flag(Flag::new(&labels, "label", Vec::new()))
                .action(move |_, _| {
                    println!("region:   {}", region_seen.get());
                    println!("replicas: {}", replicas_seen.get());
                    println!("timeout:  {}", format_duration(timeout_seen.get()));
                    println!("labels:   {:?}", labels_seen.borrow());
                    Ok(())
                }),
        );

    let defaults = FlagDefaults::load(&path)?;
    let applied = defaults.apply(&mut app)?;
    println!("applied {applied} defaults from {}", path.display());

    app.execute()?;
    std::fs::remove_file(&path).ok();
    Ok(())
}
