//! Flag bindings and the per-command flag registry.

use std::cell::Cell;

use crate::slot::{FlagValue, Slot, Storage};
use crate::value::{ConversionError, Value, ValueKind, convert};

/// A named, typed, defaultable flag bound to caller-owned storage.
///
/// Use [`Flag::new`] to bind a [`Slot`], then chain builder methods like
/// [`with_short`](Flag::with_short) and [`with_usage`](Flag::with_usage).
///
/// # Examples
///
/// ```
/// use command_tree_core::{Flag, Slot, Value, ValueKind};
///
/// let verbose = Slot::new(false);
/// let flag = Flag::new(&verbose, "verbose", false)
///     .with_short("v")
///     .with_usage("Enable verbose output");
///
/// assert_eq!(flag.name(), "verbose");
/// assert!(flag.matches("v"));
/// assert_eq!(flag.kind(), ValueKind::Bool);
/// assert_eq!(flag.default_value(), &Value::Bool(false));
/// ```
#[derive(Debug)]
pub struct Flag {
    name: String,
    short: Option<String>,
    usage: String,
    default: Value,
    storage: Storage,
    required: bool,
    hidden: bool,
    set: Cell<bool>,
}

impl Flag {
    /// Binds `slot` as a flag named `name` with the given default.
    ///
    /// The slot is immediately overwritten with `default`, and is reset to it
    /// at the start of every execution that routes through the owning
    /// command. Only tokens on the command line change it afterwards.
    pub fn new<T: FlagValue>(slot: &Slot<T>, name: &str, default: T) -> Self {
        let storage = T::storage(slot.clone());
        let default = default.into_value();
        storage.store(default.clone());
        Self {
            name: name.to_string(),
            short: None,
            usage: String::new(),
            default,
            storage,
            required: false,
            hidden: false,
            set: Cell::new(false),
        }
    }

    /// Adds a short alias (given without the leading dash).
    pub fn with_short(mut self, short: &str) -> Self {
        self.short = (!short.is_empty()).then(|| short.to_string());
        self
    }

    /// Adds a usage string.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    /// Marks the flag as required: parsing fails unless it is set on the
    /// command line.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hides the flag from help output. Hidden flags still parse and inherit.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Returns the primary (long) name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the short alias, if any.
    pub fn short(&self) -> Option<&str> {
        self.short.as_deref()
    }

    /// Returns the primary name followed by the short alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.short.as_deref())
    }

    /// Checks if `name` is this flag's primary name or short alias.
    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.short.as_deref() == Some(name)
    }

    pub fn kind(&self) -> ValueKind {
        self.storage.kind()
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Returns the value currently held by the bound slot.
    pub fn value(&self) -> Value {
        self.storage.current()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Returns `true` once the flag was set on the command line during the
    /// current execution.
    pub fn is_set(&self) -> bool {
        self.set.get()
    }

    /// Restores the default and clears the "set" marker.
    pub(crate) fn reset(&self) {
        self.storage.store(self.default.clone());
        self.set.set(false);
    }

    /// Converts `token` and applies it to the bound slot.
    pub(crate) fn assign(&self, token: &str) -> Result<(), ConversionError> {
        let value = convert(token, self.kind())?;
        self.storage.apply(value);
        self.set.set(true);
        Ok(())
    }

    /// Replaces the declared default, resetting the slot to it.
    ///
    /// Returns `false` when `value` is of a different kind.
    pub(crate) fn replace_default(&mut self, value: Value) -> bool {
        if value.kind() != self.kind() {
            return false;
        }
        self.default = value;
        self.reset();
        true
    }
}

/// The flags declared directly on one command, in declaration order.
#[derive(Debug, Default)]
pub struct FlagSet {
    flags: Vec<Flag>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a flag. A flag with the same primary name replaces the earlier
    /// binding in place.
    pub fn add(&mut self, flag: Flag) {
        match self.flags.iter_mut().find(|f| f.name == flag.name) {
            Some(existing) => *existing = flag,
            None => self.flags.push(flag),
        }
    }

    /// Finds a flag by primary name or short alias.
    pub fn lookup(&self, name: &str) -> Option<&Flag> {
        self.flags.iter().find(|f| f.matches(name))
    }

    pub(crate) fn lookup_mut(&mut self, name: &str) -> Option<&mut Flag> {
        self.flags.iter_mut().find(|f| f.matches(name))
    }

    /// Returns all flags in declaration order.
    pub fn all(&self) -> &[Flag] {
        &self.flags
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Flag> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Resets every flag to its default.
    pub(crate) fn reset(&self) {
        for flag in &self.flags {
            flag.reset();
        }
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = &'a Flag;
    type IntoIter = std::slice::Iter<'a, Flag>;

    fn into_iter(self) -> Self::IntoIter {
        self.flags.iter()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_flag_creation_applies_default() {
        let count = Slot::new(0i32);
        let flag = Flag::new(&count, "count", 5).with_short("c");

        assert_eq!(count.get(), 5);
        assert_eq!(flag.kind(), ValueKind::I32);
        assert_eq!(flag.short(), Some("c"));
        assert_eq!(flag.names().collect::<Vec<_>>(), vec!["count", "c"]);
        assert!(!flag.is_set());
    }

    #[test]
    fn test_empty_short_is_ignored() {
        let name = Slot::new(String::new());
        let flag = Flag::new(&name, "name", String::new()).with_short("");
        assert_eq!(flag.short(), None);
    }

    #[test]
    fn test_lookup_by_primary_or_short() {
        let verbose = Slot::new(false);
        let timeout = Slot::new(Duration::ZERO);
        let mut set = FlagSet::new();
        set.add(Flag::new(&verbose, "verbose", false).with_short("v"));
        set.add(Flag::new(&timeout, "timeout", Duration::from_secs(30)));

        assert_eq!(set.lookup("verbose").unwrap().name(), "verbose");
        assert_eq!(set.lookup("v").unwrap().name(), "verbose");
        assert_eq!(set.lookup("timeout").unwrap().kind(), ValueKind::Duration);
        assert!(set.lookup("t").is_none());
    }

    #[test]
    fn test_readding_primary_name_replaces_in_place() {
        let first = Slot::new(0u8);
        let second = Slot::new(String::new());
        let other = Slot::new(false);
        let mut set = FlagSet::new();
        set.add(Flag::new(&first, "level", 1));
        set.add(Flag::new(&other, "quiet", false));
        set.add(Flag::new(&second, "level", "high".to_string()));

        assert_eq!(set.len(), 2);
        assert_eq!(set.all()[0].name(), "level");
        assert_eq!(set.all()[0].kind(), ValueKind::String);
    }

    #[test]
    fn test_assign_and_reset() {
        let tags = Slot::new(Vec::new());
        let flag = Flag::new(&tags, "tag", vec!["base".to_string()]);

        flag.assign("a").unwrap();
        flag.assign("b").unwrap();
        assert!(flag.is_set());
        assert_eq!(tags.get(), vec!["base", "a", "b"]);

        flag.reset();
        assert!(!flag.is_set());
        assert_eq!(tags.get(), vec!["base"]);
    }

    #[test]
    fn test_assign_conversion_error_leaves_slot_untouched() {
        let level = Slot::new(0i8);
        let flag = Flag::new(&level, "level", 3);

        let err = flag.assign("200").unwrap_err();
        assert_eq!(err.kind, ValueKind::I8);
        assert_eq!(level.get(), 3);
        assert!(!flag.is_set());
    }

    #[test]
    fn test_replace_default_checks_kind() {
        let port = Slot::new(0u16);
        let mut flag = Flag::new(&port, "port", 8080);

        assert!(!flag.replace_default(Value::String("x".into())));
        assert!(flag.replace_default(Value::U16(9090)));
        assert_eq!(port.get(), 9090);
        assert_eq!(flag.default_value(), &Value::U16(9090));
    }
}
