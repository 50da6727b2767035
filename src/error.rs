//! Error types shared by every flag kind.

use thiserror::Error;

/// A settable cell rejected a raw string.
///
/// Carries only the reason; the flag set adds the flag name and raw value
/// when it turns this into a [`FlagError::InvalidValue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValueError(pub String);

impl ValueError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Errors raised while applying, parsing or validating flags.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagError {
    #[error("could not parse {value:?} as {kind} value for flag {flag}: {reason}")]
    InvalidValue {
        flag: String,
        kind: &'static str,
        value: String,
        reason: String,
    },

    #[error("choice must be provided for flag {0}")]
    MissingChoice(String),

    #[error("destination for flag {0} is not writable")]
    DestinationUnavailable(String),

    #[error("cannot use two forms of the same flag: {first}={first_value:?} {second}={second_value:?}")]
    ConflictingForms {
        first: String,
        first_value: String,
        second: String,
        second_value: String,
    },

    #[error("flag name must not be empty (declared as {0:?})")]
    EmptyName(Vec<String>),

    #[error("{}", missing_required_message(.0))]
    MissingRequired(Vec<String>),

    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("flag redefined: {0}")]
    Redefined(String),
}

fn missing_required_message(names: &[String]) -> String {
    let noun = if names.len() == 1 { "flag" } else { "flags" };
    format!("required {} \"{}\" not set", noun, names.join(", "))
}
