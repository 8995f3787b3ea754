//! Flag defaults loaded from a file.
//!
//! A defaults document maps command paths to flag defaults. Applying it to
//! a command tree replaces each named flag's declared default after
//! converting the value to the flag's kind, so a bad entry fails at setup
//! time instead of on the command line.
//!
//! # Example YAML
//!
//! ```yaml
//! app:
//!   verbose: true
//!   tag: [base, ci]
//! app db:
//!   timeout: 90s
//!   pool-size: 16
//! ```
//!
//! Files with a `.json` extension are read and written as JSON; anything
//! else is YAML.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::command::Command;
use crate::value::{ConversionError, Value, ValueKind, convert};

/// Errors raised while loading, saving or applying flag defaults.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A key names no command in the tree.
    #[error("unknown command path '{0}'")]
    UnknownCommand(String),

    #[error("unknown flag '{flag}' for '{command}'")]
    UnknownFlag { command: String, flag: String },

    /// A value cannot be converted to the flag's kind.
    #[error("invalid default for flag '{flag}' on '{command}': {source}")]
    InvalidValue {
        command: String,
        flag: String,
        #[source]
        source: ConversionError,
    },
}

/// One default as written in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<String>),
}

impl DefaultValue {
    /// Converts this default to a value of `kind`.
    ///
    /// Scalars go through the regular token converter, so `"90s"` works for
    /// a duration and `200` fails for an `i8`. A single string is accepted
    /// for a string list.
    ///
    /// ```
    /// use command_tree_core::{DefaultValue, Value, ValueKind};
    ///
    /// let value = DefaultValue::Integer(8).to_value(ValueKind::U16).unwrap();
    /// assert_eq!(value, Value::U16(8));
    /// assert!(DefaultValue::Integer(-1).to_value(ValueKind::U16).is_err());
    /// ```
    pub fn to_value(&self, kind: ValueKind) -> Result<Value, ConversionError> {
        match (self, kind) {
            (Self::List(items), ValueKind::StringList) => Ok(Value::StringList(items.clone())),
            (Self::List(items), _) => Err(ConversionError {
                token: format!("[{}]", items.join(", ")),
                kind,
                reason: "a list is only valid for string list flags".to_string(),
            }),
            (Self::Text(text), ValueKind::StringList) => Ok(Value::StringList(vec![text.clone()])),
            (scalar, _) => convert(&scalar.token(), kind),
        }
    }

    fn token(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Text(text) => text.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for DefaultValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Flag defaults keyed by command path, then by flag primary name.
///
/// # Examples
///
/// ```
/// use command_tree_core::{Command, Flag, FlagDefaults, Slot};
///
/// let retries = Slot::new(0u8);
/// let mut app = Command::new("app").with_flag(Flag::new(&retries, "retries", 3));
///
/// let defaults = FlagDefaults::from_yaml_str("app:\n  retries: 5\n").unwrap();
/// defaults.apply(&mut app).unwrap();
/// assert_eq!(retries.get(), 5);
///
/// app.execute_with_args(Vec::<String>::new()).unwrap();
/// assert_eq!(retries.get(), 5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagDefaults {
    commands: BTreeMap<String, BTreeMap<String, DefaultValue>>,
}

impl FlagDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default for `flag` on the command at `command_path`.
    pub fn set(
        &mut self,
        command_path: &str,
        flag: &str,
        value: impl Into<DefaultValue>,
    ) -> &mut Self {
        self.commands
            .entry(normalize_path(command_path))
            .or_default()
            .insert(flag.to_string(), value.into());
        self
    }

    pub fn get(&self, command_path: &str, flag: &str) -> Option<&DefaultValue> {
        self.commands
            .get(&normalize_path(command_path))
            .and_then(|flags| flags.get(flag))
    }

    /// Command paths with at least one entry, sorted.
    pub fn command_paths(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.values().all(BTreeMap::is_empty)
    }

    /// Loads defaults from a YAML or JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or a
    /// [`Json`](ConfigError::Json)/[`Yaml`](ConfigError::Yaml) error if
    /// parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let defaults = if is_json(path) {
            serde_json::from_reader(reader)?
        } else {
            serde_yaml::from_reader(reader)?
        };
        debug!(path = %path.display(), "Loaded flag defaults");
        Ok(defaults)
    }

    /// Saves the defaults as YAML, or JSON for a `.json` path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        if is_json(path) {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_yaml::to_writer(writer, self)?;
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Applies every entry to the tree rooted at `root`.
    ///
    /// Each value replaces the flag's declared default and resets its slot.
    /// Flags are not marked as set, so required flags still need a
    /// command-line value. Returns the number of flags updated.
    ///
    /// # Errors
    ///
    /// Fails on the first unknown command path, unknown flag or
    /// unconvertible value. Entries before it stay applied.
    pub fn apply(&self, root: &mut Command) -> Result<usize, ConfigError> {
        let mut applied = 0;

        for (path, flags) in &self.commands {
            let command = find_mut(root, path)
                .ok_or_else(|| ConfigError::UnknownCommand(path.clone()))?;

            for (name, default) in flags {
                let flag = command.flags_mut().lookup_mut(name).ok_or_else(|| {
                    ConfigError::UnknownFlag {
                        command: path.clone(),
                        flag: name.clone(),
                    }
                })?;
                let value = default
                    .to_value(flag.kind())
                    .map_err(|source| ConfigError::InvalidValue {
                        command: path.clone(),
                        flag: name.clone(),
                        source,
                    })?;
                if flag.replace_default(value) {
                    applied += 1;
                }
            }
        }

        debug!(applied, "Applied flag defaults");
        Ok(applied)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn normalize_path(path: &str) -> String {
    path.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn find_mut<'a>(root: &'a mut Command, path: &str) -> Option<&'a mut Command> {
    let mut segments = path.split_whitespace();
    if segments.next()? != root.name() {
        return None;
    }
    segments.try_fold(root, |command, name| command.subcommand_mut(name))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tempfile::TempDir;

    use super::*;
    use crate::error::Error;
    use crate::flag::Flag;
    use crate::slot::Slot;

    fn sample_yaml() -> &'static str {
        r#"
app:
  verbose: true
  tag: [base, ci]
app db:
  timeout: 90s
  pool-size: 16
  ratio: 0.25
"#
    }

    struct Slots {
        verbose: Slot<bool>,
        tags: Slot<Vec<String>>,
        timeout: Slot<Duration>,
        pool: Slot<u16>,
        ratio: Slot<f64>,
    }

    fn tree() -> (Command, Slots) {
        let slots = Slots {
            verbose: Slot::new(false),
            tags: Slot::new(Vec::new()),
            timeout: Slot::new(Duration::ZERO),
            pool: Slot::new(0),
            ratio: Slot::new(0.0),
        };
        let app = Command::new("app")
            .with_flag(Flag::new(&slots.verbose, "verbose", false))
            .with_flag(Flag::new(&slots.tags, "tag", Vec::new()))
            .with_subcommand(
                Command::new("db")
                    .with_flag(Flag::new(&slots.timeout, "timeout", Duration::from_secs(30)))
                    .with_flag(Flag::new(&slots.pool, "pool-size", 4).required())
                    .with_flag(Flag::new(&slots.ratio, "ratio", 1.0)),
            );
        (app, slots)
    }

    #[test]
    fn test_parse_yaml() {
        let defaults = FlagDefaults::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(defaults.get("app", "verbose"), Some(&DefaultValue::Bool(true)));
        assert_eq!(defaults.get("app  db", "pool-size"), Some(&DefaultValue::Integer(16)));
        assert_eq!(defaults.get("app db", "ratio"), Some(&DefaultValue::Float(0.25)));
        assert_eq!(
            defaults.get("app db", "timeout"),
            Some(&DefaultValue::Text("90s".to_string()))
        );
        assert_eq!(defaults.command_paths().collect::<Vec<_>>(), vec!["app", "app db"]);
    }

    #[test]
    fn test_apply_replaces_defaults_and_slots() {
        let (mut app, slots) = tree();
        let defaults = FlagDefaults::from_yaml_str(sample_yaml()).unwrap();

        assert_eq!(defaults.apply(&mut app).unwrap(), 5);
        assert!(slots.verbose.get());
        assert_eq!(slots.tags.get(), vec!["base".to_string(), "ci".to_string()]);
        assert_eq!(slots.timeout.get(), Duration::from_secs(90));
        assert_eq!(slots.pool.get(), 16);
        assert_eq!(slots.ratio.get(), 0.25);

        let db = app.subcommand("db").unwrap();
        assert_eq!(db.flags().lookup("timeout").unwrap().default_value().to_string(), "1m30s");
        assert!(!db.flags().lookup("pool-size").unwrap().is_set());
    }

    #[test]
    fn test_applied_default_does_not_satisfy_required() {
        let (mut app, slots) = tree();
        FlagDefaults::from_yaml_str(sample_yaml())
            .unwrap()
            .apply(&mut app)
            .unwrap();

        let err = app.execute_with_args(["db"]).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredFlag { ref flag, .. } if flag == "pool-size"));

        app.execute_with_args(["--tag=extra", "db", "--pool-size=2"]).unwrap();
        assert_eq!(slots.pool.get(), 2);
        assert_eq!(
            slots.tags.get(),
            vec!["base".to_string(), "ci".to_string(), "extra".to_string()]
        );
    }

    #[test]
    fn test_apply_rejects_unknown_entries() {
        let (mut app, _slots) = tree();

        let mut defaults = FlagDefaults::new();
        defaults.set("app cache", "size", 1i64);
        assert!(matches!(
            defaults.apply(&mut app),
            Err(ConfigError::UnknownCommand(ref path)) if path == "app cache"
        ));

        let mut defaults = FlagDefaults::new();
        defaults.set("other", "verbose", true);
        assert!(matches!(defaults.apply(&mut app), Err(ConfigError::UnknownCommand(_))));

        let mut defaults = FlagDefaults::new();
        defaults.set("app db", "verbose", true);
        assert!(matches!(defaults.apply(&mut app), Err(ConfigError::UnknownFlag { .. })));
    }

    #[test]
    fn test_apply_rejects_unconvertible_values() {
        let (mut app, slots) = tree();

        let mut defaults = FlagDefaults::new();
        defaults.set("app db", "pool-size", 70_000i64);
        let err = defaults.apply(&mut app).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref flag, .. } if flag == "pool-size"));
        assert_eq!(slots.pool.get(), 4);

        let mut defaults = FlagDefaults::new();
        defaults.set("app db", "timeout", vec!["1s".to_string()]);
        assert!(defaults.apply(&mut app).is_err());
    }

    #[test]
    fn test_save_and_load_by_extension() {
        let dir = TempDir::new().unwrap();
        let mut defaults = FlagDefaults::new();
        defaults
            .set("app", "verbose", true)
            .set("app db", "timeout", "2m")
            .set("app", "tag", vec!["a".to_string()]);

        let yaml_path = dir.path().join("defaults.yml");
        defaults.save(&yaml_path).unwrap();
        assert_eq!(FlagDefaults::load(&yaml_path).unwrap(), defaults);

        let json_path = dir.path().join("defaults.json");
        defaults.save(&json_path).unwrap();
        let raw = std::fs::read_to_string(&json_path).unwrap();
        assert!(raw.trim_start().starts_with('{'));
        assert_eq!(FlagDefaults::load(&json_path).unwrap(), defaults);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = FlagDefaults::load(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
