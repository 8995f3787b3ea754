//! Caller-owned flag storage.
//!
//! A [`Slot`] is a shared cell the caller keeps a handle to. Registering a
//! flag hands the registry another handle to the same cell, so values set
//! while parsing are visible to hooks and handlers without a lookup step.
//!
//! ```
//! use command_tree_core::{Command, Flag, Slot};
//!
//! let port = Slot::new(0u16);
//! let app = Command::new("serve").with_flag(Flag::new(&port, "port", 8080));
//!
//! app.execute_with_args(["--port=9000"]).unwrap();
//! assert_eq!(port.get(), 9000);
//! ```

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::value::{Value, ValueKind};

/// Shared, caller-owned storage for one flag value.
pub struct Slot<T>(Rc<RefCell<T>>);

impl<T> Slot<T> {
    /// Creates a slot holding `value`.
    ///
    /// The initial value is overwritten with the flag's default once the
    /// slot is bound to a flag. Each execution resets the slot to that
    /// default again when its command is entered, so a value stored between
    /// runs survives only until the next run that reaches the command.
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Replaces the stored value.
    pub fn set(&self, value: T) {
        *self.0.borrow_mut() = value;
    }

    /// Replaces the stored value, returning the previous one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }

    /// Borrows the stored value.
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    fn update(&self, f: impl FnOnce(&mut T)) {
        let mut guard = self.0.borrow_mut();
        f(&mut *guard);
    }
}

impl<T: Clone> Slot<T> {
    /// Returns a copy of the stored value.
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: Default> Default for Slot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Slot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot").field(&*self.0.borrow()).finish()
    }
}

/// A Rust type that can back a flag.
///
/// Implemented for `bool`, the fixed-width integers, `f32`, `f64`,
/// `String`, [`Duration`] and `Vec<String>`. Any other type is rejected at
/// compile time.
pub trait FlagValue: Clone + 'static {
    /// The converter kind for this type.
    const KIND: ValueKind;

    /// Wraps a slot of this type into the closed [`Storage`] set.
    fn storage(slot: Slot<Self>) -> Storage;

    /// Converts a value of this type into a [`Value`].
    fn into_value(self) -> Value;
}

/// Type-erased handle to a caller's [`Slot`], one variant per kind.
#[derive(Debug, Clone)]
pub enum Storage {
    Bool(Slot<bool>),
    I8(Slot<i8>),
    I16(Slot<i16>),
    I32(Slot<i32>),
    I64(Slot<i64>),
    U8(Slot<u8>),
    U16(Slot<u16>),
    U32(Slot<u32>),
    U64(Slot<u64>),
    F32(Slot<f32>),
    F64(Slot<f64>),
    String(Slot<String>),
    Duration(Slot<Duration>),
    StringList(Slot<Vec<String>>),
}

macro_rules! impl_flag_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FlagValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn storage(slot: Slot<Self>) -> Storage {
                    Storage::$variant(slot)
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }
            }
        )*

        impl Storage {
            /// Returns the kind of the underlying slot.
            pub fn kind(&self) -> ValueKind {
                match self {
                    $(Self::$variant(_) => ValueKind::$variant,)*
                }
            }

            /// Returns the current value held by the caller's slot.
            pub fn current(&self) -> Value {
                match self {
                    $(Self::$variant(slot) => Value::$variant(slot.get()),)*
                }
            }

            /// Overwrites the slot with `value`.
            ///
            /// Returns `false` without touching the slot when the kinds
            /// differ.
            pub(crate) fn store(&self, value: Value) -> bool {
                match (self, value) {
                    $((Self::$variant(slot), Value::$variant(inner)) => {
                        slot.set(inner);
                        true
                    })*
                    _ => false,
                }
            }
        }
    };
}

impl_flag_value!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
    String => String,
    Duration => Duration,
    Vec<String> => StringList,
);

impl Storage {
    /// Applies one parsed occurrence: string lists append, everything else
    /// overwrites.
    pub(crate) fn apply(&self, value: Value) -> bool {
        match (self, value) {
            (Self::StringList(slot), Value::StringList(items)) => {
                slot.update(|current| current.extend(items));
                true
            }
            (_, value) => self.store(value),
        }
    }
}
