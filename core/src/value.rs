//! Typed value conversion.
//!
//! Every flag and positional argument has a statically declared
//! [`ValueKind`]. The converter turns a raw command-line token into a
//! [`Value`] of that kind, or fails with a [`ConversionError`] that names the
//! offending token and the target kind.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use command_tree_core::{Value, ValueKind, convert};
//!
//! assert_eq!(convert("42", ValueKind::U16).unwrap(), Value::U16(42));
//! assert_eq!(convert("T", ValueKind::Bool).unwrap(), Value::Bool(true));
//! assert_eq!(
//!     convert("1h30m", ValueKind::Duration).unwrap(),
//!     Value::Duration(Duration::from_secs(5400)),
//! );
//!
//! // Values must fit the declared width.
//! assert!(convert("200", ValueKind::I8).is_err());
//! ```

use std::fmt;
use std::num::{IntErrorKind, ParseIntError};
use std::time::Duration;

use thiserror::Error;

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Static type of a flag or positional argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Duration,
    /// Repeatable string flag; each occurrence appends one element.
    StringList,
}

impl ValueKind {
    /// Returns the lowercase type name used in messages and help output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::String => "string",
            Self::Duration => "duration",
            Self::StringList => "string list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A converted value of one of the supported kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Duration(Duration),
    StringList(Vec<String>),
}

impl Value {
    /// Returns the zero value for `kind` (`false`, `0`, `""`, empty list).
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Bool => Self::Bool(false),
            ValueKind::I8 => Self::I8(0),
            ValueKind::I16 => Self::I16(0),
            ValueKind::I32 => Self::I32(0),
            ValueKind::I64 => Self::I64(0),
            ValueKind::U8 => Self::U8(0),
            ValueKind::U16 => Self::U16(0),
            ValueKind::U32 => Self::U32(0),
            ValueKind::U64 => Self::U64(0),
            ValueKind::F32 => Self::F32(0.0),
            ValueKind::F64 => Self::F64(0.0),
            ValueKind::String => Self::String(String::new()),
            ValueKind::Duration => Self::Duration(Duration::ZERO),
            ValueKind::StringList => Self::StringList(Vec::new()),
        }
    }

    /// Returns the kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::I8(_) => ValueKind::I8,
            Self::I16(_) => ValueKind::I16,
            Self::I32(_) => ValueKind::I32,
            Self::I64(_) => ValueKind::I64,
            Self::U8(_) => ValueKind::U8,
            Self::U16(_) => ValueKind::U16,
            Self::U32(_) => ValueKind::U32,
            Self::U64(_) => ValueKind::U64,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::String(_) => ValueKind::String,
            Self::Duration(_) => ValueKind::Duration,
            Self::StringList(_) => ValueKind::StringList,
        }
    }

    /// Returns `true` for an empty string or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) => s.is_empty(),
            Self::StringList(items) => items.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Duration(v) => f.write_str(&format_duration(*v)),
            Self::StringList(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// A token that could not be converted to its target kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {token:?} to {kind}: {reason}")]
pub struct ConversionError {
    /// The raw token as it appeared on the command line.
    pub token: String,
    /// The declared target kind.
    pub kind: ValueKind,
    /// Why the conversion failed.
    pub reason: String,
}

impl ConversionError {
    fn new(token: &str, kind: ValueKind, reason: impl Into<String>) -> Self {
        Self {
            token: token.to_string(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Converts `token` into a value of `kind`.
///
/// For [`ValueKind::StringList`] the result is a one-element list; the flag
/// registry appends it to the accumulated list.
///
/// # Errors
///
/// Returns a [`ConversionError`] when the token is malformed or does not fit
/// the declared width.
pub fn convert(token: &str, kind: ValueKind) -> Result<Value, ConversionError> {
    let value = match kind {
        ValueKind::Bool => Value::Bool(parse_bool(token).ok_or_else(|| {
            ConversionError::new(token, kind, "expected one of 1, t, true, 0, f, false")
        })?),
        ValueKind::I8 => Value::I8(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::I16 => Value::I16(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::I32 => Value::I32(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::I64 => Value::I64(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::U8 => Value::U8(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::U16 => Value::U16(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::U32 => Value::U32(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::U64 => Value::U64(token.parse().map_err(|e| int_error(token, kind, e))?),
        ValueKind::F32 => {
            let parsed: f32 = token
                .parse()
                .map_err(|_| ConversionError::new(token, kind, "invalid floating point number"))?;
            Value::F32(check_float_range(token, kind, parsed)?)
        }
        ValueKind::F64 => {
            let parsed: f64 = token
                .parse()
                .map_err(|_| ConversionError::new(token, kind, "invalid floating point number"))?;
            Value::F64(check_float_range(token, kind, parsed)?)
        }
        ValueKind::String => Value::String(token.to_string()),
        ValueKind::Duration => Value::Duration(
            parse_duration(token).map_err(|reason| ConversionError::new(token, kind, reason))?,
        ),
        ValueKind::StringList => Value::StringList(vec![token.to_string()]),
    };
    Ok(value)
}

/// Parses the accepted boolean spellings.
///
/// ```
/// use command_tree_core::parse_bool;
///
/// assert_eq!(parse_bool("TRUE"), Some(true));
/// assert_eq!(parse_bool("0"), Some(false));
/// assert_eq!(parse_bool("yes"), None);
/// ```
pub fn parse_bool(token: &str) -> Option<bool> {
    match token {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parses a compound duration such as `1h30m`, `1.5s` or `500ms`.
///
/// Supported units are `ns`, `us` (also `µs`/`μs`), `ms`, `s`, `m` and `h`.
/// Every number needs a unit except the literal `0`.
///
/// ```
/// use std::time::Duration;
/// use command_tree_core::parse_duration;
///
/// assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
/// assert_eq!(parse_duration("1.5s"), Ok(Duration::from_millis(1500)));
/// assert!(parse_duration("90").is_err());
/// ```
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    if input == "0" {
        return Ok(Duration::ZERO);
    }
    if input.starts_with('-') {
        return Err("negative durations are not supported".to_string());
    }
    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.is_empty() {
        return Err("empty duration".to_string());
    }

    let overflow = || "duration out of range".to_string();
    let mut total: u128 = 0;

    while !rest.is_empty() {
        let int_len = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        let (int_part, after) = rest.split_at(int_len);
        let (frac_part, after) = match after.strip_prefix('.') {
            Some(stripped) => {
                let frac_len = stripped
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or(stripped.len());
                stripped.split_at(frac_len)
            }
            None => ("", after),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format!("invalid duration {input:?}"));
        }

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);
        let scale: u128 = match unit {
            "ns" => 1,
            "us" | "µs" | "μs" => 1_000,
            "ms" => 1_000_000,
            "s" => NANOS_PER_SEC,
            "m" => 60 * NANOS_PER_SEC,
            "h" => 3_600 * NANOS_PER_SEC,
            "" => return Err(format!("missing unit in duration {input:?}")),
            other => return Err(format!("unknown unit {other:?} in duration {input:?}")),
        };

        let whole: u128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };
        let mut nanos = whole.checked_mul(scale).ok_or_else(overflow)?;
        if !frac_part.is_empty() {
            // Digits past nanosecond precision cannot change the result.
            let digits = &frac_part[..frac_part.len().min(18)];
            let fraction: u128 = digits.parse().map_err(|_| overflow())?;
            let denominator = 10u128.pow(digits.len() as u32);
            nanos = nanos
                .checked_add(fraction * scale / denominator)
                .ok_or_else(overflow)?;
        }
        total = total.checked_add(nanos).ok_or_else(overflow)?;
        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).map_err(|_| overflow())?;
    Ok(Duration::new(secs, (total % NANOS_PER_SEC) as u32))
}

/// Formats a duration in the compact `1h30m0s` / `500ms` style accepted by
/// [`parse_duration`].
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < 1_000 {
        return format!("{nanos}ns");
    }
    if nanos < 1_000_000 {
        return format!("{}µs", nanos as f64 / 1e3);
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", nanos as f64 / 1e6);
    }

    let total_secs = duration.as_secs();
    let hours = total_secs / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h"));
    }
    if hours > 0 || minutes > 0 {
        out.push_str(&format!("{minutes}m"));
    }
    let subsec = duration.subsec_nanos();
    if subsec == 0 {
        out.push_str(&format!("{seconds}s"));
    } else {
        let fraction = format!("{subsec:09}");
        out.push_str(&format!("{seconds}.{}s", fraction.trim_end_matches('0')));
    }
    out
}

fn int_error(token: &str, kind: ValueKind, err: ParseIntError) -> ConversionError {
    let reason = match err.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            format!("value out of range for {kind}")
        }
        IntErrorKind::Empty => "empty value".to_string(),
        _ => "invalid integer".to_string(),
    };
    ConversionError::new(token, kind, reason)
}

fn check_float_range<F: Into<f64> + Copy>(
    token: &str,
    kind: ValueKind,
    parsed: F,
) -> Result<F, ConversionError> {
    let explicit_infinity = token
        .trim_start_matches(['+', '-'])
        .to_ascii_lowercase()
        .starts_with("inf");
    if parsed.into().is_infinite() && !explicit_infinity {
        return Err(ConversionError::new(
            token,
            kind,
            format!("value out of range for {kind}"),
        ));
    }
    Ok(parsed)
}

/// A type that can receive a positional argument.
///
/// Implemented for every scalar kind. String lists are flag-only; a
/// variadic handler parameter collects into a `Vec<T>` of a scalar `T`
/// instead.
pub trait ArgValue: Sized + 'static {
    /// The kind used to convert tokens for this parameter.
    const KIND: ValueKind;

    /// Extracts `Self` from a value of [`Self::KIND`].
    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! impl_arg_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ArgValue for $ty {
                const KIND: ValueKind = ValueKind::$variant;

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_arg_value!(
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
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_spellings() {
        for token in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(convert(token, ValueKind::Bool).unwrap(), Value::Bool(true));
        }
        for token in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(convert(token, ValueKind::Bool).unwrap(), Value::Bool(false));
        }
        assert!(convert("yes", ValueKind::Bool).is_err());
    }

    #[test]
    fn test_integer_width_is_enforced() {
        let err = convert("200", ValueKind::I8).unwrap_err();
        assert_eq!(err.token, "200");
        assert_eq!(err.kind, ValueKind::I8);
        assert!(err.reason.contains("out of range"));

        assert_eq!(convert("-128", ValueKind::I8).unwrap(), Value::I8(-128));
        assert_eq!(convert("255", ValueKind::U8).unwrap(), Value::U8(255));
        assert!(convert("256", ValueKind::U8).is_err());
        assert!(convert("-1", ValueKind::U32).is_err());
        assert!(convert("0x10", ValueKind::I32).is_err());
    }

    #[test]
    fn test_float_widths() {
        assert_eq!(convert("1.5", ValueKind::F32).unwrap(), Value::F32(1.5));
        assert_eq!(convert("2.25", ValueKind::F64).unwrap(), Value::F64(2.25));
        assert!(convert("1e40", ValueKind::F32).is_err());
        assert!(convert("1e40", ValueKind::F64).is_ok());
        assert!(convert("abc", ValueKind::F64).is_err());
    }

    #[test]
    fn test_duration_compound_units() {
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5_400)));
        assert_eq!(parse_duration("2m3s"), Ok(Duration::from_secs(123)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5_400)));
        assert_eq!(parse_duration("10us"), Ok(Duration::from_micros(10)));
        assert_eq!(parse_duration("10µs"), Ok(Duration::from_micros(10)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn test_duration_rejects_malformed_input() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("30").is_err());
        assert!(parse_duration("5x").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration(".s").is_err());
    }

    #[test]
    fn test_duration_fraction_overflow_is_an_error() {
        assert!(parse_duration("94522879700260684295381835.9h").is_err());
        assert!(parse_duration("94522879700260684295381835h").is_err());
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5_400));
    }

    #[test]
    fn test_format_duration_matches_parse() {
        assert_eq!(format_duration(Duration::from_secs(5_400)), "1h30m0s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_millis(1_500)), "1.5s");
        assert_eq!(format_duration(Duration::ZERO), "0s");
        for text in ["1h30m0s", "500ms", "1.5s", "45s"] {
            let parsed = parse_duration(text).unwrap();
            assert_eq!(format_duration(parsed), text);
        }
    }

    #[test]
    fn test_string_list_token_is_single_element() {
        assert_eq!(
            convert("a", ValueKind::StringList).unwrap(),
            Value::StringList(vec!["a".to_string()])
        );
    }

    #[test]
    fn test_zero_values_match_kind() {
        for kind in [
            ValueKind::Bool,
            ValueKind::I64,
            ValueKind::U16,
            ValueKind::F32,
            ValueKind::String,
            ValueKind::Duration,
            ValueKind::StringList,
        ] {
            assert_eq!(Value::zero(kind).kind(), kind);
        }
    }

    #[test]
    fn test_arg_value_extraction() {
        assert_eq!(u16::from_value(Value::U16(8080)), Some(8080));
        assert_eq!(u16::from_value(Value::U32(8080)), None);
        assert_eq!(<String as ArgValue>::KIND, ValueKind::String);
    }
}
