//! Settable cells handed to the flag set.
//!
//! A [`Value`] is what the flag set stores per registered name. Each cell
//! writes either into storage it owns or into a caller-supplied
//! [`Destination`].

use crate::error::ValueError;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A mutable cell the flag set can update from a raw string.
pub trait Value: fmt::Debug {
    /// Parse `raw` and store it. On error the previous value is kept.
    fn set(&mut self, raw: &str) -> Result<(), ValueError>;

    /// Render the current value in the form `set` accepts.
    fn render(&self) -> String;

    /// Short type name used in error messages.
    fn kind(&self) -> &'static str;

    /// Whether the flag's presence alone means `true`.
    fn is_bool_flag(&self) -> bool {
        false
    }

    /// Whether writes go to caller storage shared with other cells.
    fn is_bound(&self) -> bool {
        false
    }
}

/// Caller-owned storage a flag writes its resolved value into.
///
/// Cloning shares the same storage, so the caller keeps one handle and hands
/// another to the flag declaration.
#[derive(Debug, Default)]
pub struct Destination<T>(Rc<RefCell<T>>);

impl<T> Clone for Destination<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> Destination<T> {
    pub fn new(initial: T) -> Self {
        Self(Rc::new(RefCell::new(initial)))
    }

    /// Current contents.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.borrow().clone()
    }

    /// Whether a write would succeed right now.
    pub fn is_writable(&self) -> bool {
        self.0.try_borrow_mut().is_ok()
    }

    /// Replace the contents.
    ///
    /// Fails without writing when the storage is currently borrowed.
    pub fn store(&self, value: T) -> Result<(), ValueError> {
        let mut slot = self
            .0
            .try_borrow_mut()
            .map_err(|_| ValueError::new("destination is borrowed elsewhere"))?;
        *slot = value;
        Ok(())
    }

    /// Borrow the storage for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.0.borrow())
    }
}

/// Storage behind a cell: owned by the flag, or the caller's destination.
#[derive(Debug)]
pub(crate) enum Slot<T> {
    Owned(T),
    Bound(Destination<T>),
}

impl<T> Slot<T> {
    /// Own `initial`, or point at `destination` when one is given.
    ///
    /// Binding never writes; the flag seeds its destination once before
    /// registering its names.
    pub(crate) fn new(initial: T, destination: Option<&Destination<T>>) -> Self {
        match destination {
            Some(dest) => Self::Bound(dest.clone()),
            None => Self::Owned(initial),
        }
    }

    pub(crate) fn is_bound(&self) -> bool {
        matches!(self, Self::Bound(_))
    }

    pub(crate) fn write(&mut self, value: T) -> Result<(), ValueError> {
        match self {
            Self::Owned(slot) => {
                *slot = value;
                Ok(())
            }
            Self::Bound(dest) => dest.store(value),
        }
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self {
            Self::Owned(slot) => f(slot),
            Self::Bound(dest) => dest.with(f),
        }
    }
}

/// Cell for the built-in scalar kinds (bool, u64, path).
pub(crate) struct Scalar<T> {
    slot: Slot<T>,
    kind: &'static str,
    parse: fn(&str) -> Result<T, ValueError>,
    format: fn(&T) -> String,
    is_bool: bool,
}

impl<T> Scalar<T> {
    pub(crate) fn new(
        slot: Slot<T>,
        kind: &'static str,
        parse: fn(&str) -> Result<T, ValueError>,
        format: fn(&T) -> String,
    ) -> Self {
        Self {
            slot,
            kind,
            parse,
            format,
            is_bool: false,
        }
    }

    pub(crate) fn boolean(mut self) -> Self {
        self.is_bool = true;
        self
    }
}

impl<T> fmt::Debug for Scalar<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scalar")
            .field("kind", &self.kind)
            .field("value", &self.render())
            .finish()
    }
}

impl<T> Value for Scalar<T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let parsed = (self.parse)(raw)?;
        self.slot.write(parsed)
    }

    fn render(&self) -> String {
        self.slot.read(self.format)
    }

    fn kind(&self) -> &'static str {
        self.kind
    }

    fn is_bool_flag(&self) -> bool {
        self.is_bool
    }

    fn is_bound(&self) -> bool {
        self.slot.is_bound()
    }
}

/// Parse a boolean the way the command line spells it.
pub fn parse_bool(raw: &str) -> Result<bool, ValueError> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ValueError::new("invalid syntax")),
    }
}

/// Parse an unsigned integer, honouring `0x`, `0o`, `0b` and leading-zero
/// octal prefixes.
///
/// Underscores may separate digits, or follow a base prefix, as in integer
/// literals: `1_000` and `0x_ff` parse, `_1`, `1__0` and `0x_f_` do not.
pub fn parse_u64(raw: &str) -> Result<u64, ValueError> {
    if raw.contains('_') && !underscores_ok(raw) {
        return Err(ValueError::new("invalid syntax"));
    }
    let cleaned = raw.replace('_', "");
    let raw = cleaned.as_str();

    let (digits, radix) = if let Some(rest) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        (rest, 16)
    } else if let Some(rest) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
        (rest, 8)
    } else if let Some(rest) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
        (rest, 2)
    } else if raw.len() > 1 && raw.starts_with('0') {
        (&raw[1..], 8)
    } else {
        (raw, 10)
    };

    // from_str_radix tolerates a leading '+', the command line does not.
    if digits.is_empty() || digits.starts_with('+') {
        return Err(ValueError::new("invalid syntax"));
    }
    u64::from_str_radix(digits, radix).map_err(|err| ValueError::new(err.to_string()))
}

/// Every `_` sits between two digits, or between a base prefix and a digit.
fn underscores_ok(raw: &str) -> bool {
    #[derive(PartialEq)]
    enum Seen {
        Start,
        Digit,
        Underscore,
        Other,
    }

    let bytes = raw.as_bytes();
    let mut seen = Seen::Start;
    let mut hex = false;
    let mut start = 0;
    if bytes.len() >= 2 && bytes[0] == b'0' && matches!(bytes[1].to_ascii_lowercase(), b'b' | b'o' | b'x') {
        start = 2;
        seen = Seen::Digit;
        hex = bytes[1].to_ascii_lowercase() == b'x';
    }

    for &byte in &bytes[start..] {
        if byte.is_ascii_digit() || (hex && byte.is_ascii_hexdigit()) {
            seen = Seen::Digit;
        } else if byte == b'_' {
            if seen != Seen::Digit {
                return false;
            }
            seen = Seen::Underscore;
        } else if seen == Seen::Underscore {
            return false;
        } else {
            seen = Seen::Other;
        }
    }
    seen != Seen::Underscore
}

pub(crate) fn render_bool(value: &bool) -> String {
    value.to_string()
}

pub(crate) fn render_u64(value: &u64) -> String {
    value.to_string()
}

pub(crate) fn parse_path(raw: &str) -> Result<String, ValueError> {
    Ok(raw.to_string())
}

pub(crate) fn render_path(value: &String) -> String {
    value.clone()
}
