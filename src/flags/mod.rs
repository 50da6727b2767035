//! Concrete flag kinds.

mod boolean;
mod path;
mod uint64;

pub use crate::choice::ChoiceFlag;
pub use boolean::BoolFlag;
pub use path::PathFlag;
pub use uint64::Uint64Flag;

use crate::error::{FlagError, ValueError};
use crate::flagset::FlagSet;
use crate::source;
use crate::value::{Destination, Value};

/// Resolve a flag's environment/file fallback into a typed default.
///
/// Returns `Ok(None)` when no source matched, or when `skip_empty` is set
/// and the matched source was empty. A value that does not parse aborts
/// setup.
pub(crate) fn resolve_default<T>(
    flag: &str,
    kind: &'static str,
    env_vars: &[String],
    file_path: &str,
    skip_empty: bool,
    parse: impl FnOnce(&str) -> Result<T, ValueError>,
) -> Result<Option<T>, FlagError> {
    let Some(raw) = source::resolve_value(env_vars, file_path) else {
        return Ok(None);
    };
    if skip_empty && raw.is_empty() {
        return Ok(None);
    }
    parse(&raw).map(Some).map_err(|err| FlagError::InvalidValue {
        flag: flag.to_string(),
        kind,
        value: raw,
        reason: err.to_string(),
    })
}

/// Reject a declaration with an empty name form before anything is registered.
pub(crate) fn check_names(names: &[String]) -> Result<(), FlagError> {
    if names.iter().any(|name| name.trim().is_empty()) {
        return Err(FlagError::EmptyName(names.to_vec()));
    }
    Ok(())
}

/// Write the resolved default into a caller destination, once per apply.
///
/// `None` leaves the destination as the caller left it, but it must still be
/// writable for parsing to succeed later.
pub(crate) fn seed_destination<T>(
    flag: &str,
    destination: Option<&Destination<T>>,
    initial: Option<T>,
) -> Result<(), FlagError> {
    let Some(dest) = destination else {
        return Ok(());
    };
    let ok = match initial {
        Some(value) => dest.store(value).is_ok(),
        None => dest.is_writable(),
    };
    if ok {
        Ok(())
    } else {
        Err(FlagError::DestinationUnavailable(flag.to_string()))
    }
}

/// Register one cell per name, building each with `make_cell`.
pub(crate) fn register_names(
    set: &mut FlagSet,
    names: &[String],
    usage: &str,
    mut make_cell: impl FnMut() -> Box<dyn Value>,
) -> Result<(), FlagError> {
    for name in names {
        set.register(name, make_cell(), usage)?;
    }
    Ok(())
}

/// The `(default: ...)` text for help output.
///
/// A non-empty `default_text` replaces the rendered value.
pub(crate) fn default_for_doc(value: String, default_text: &str) -> Option<String> {
    if !default_text.is_empty() {
        Some(default_text.to_string())
    } else if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
