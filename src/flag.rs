//! The contract every flag kind implements, and the scope-level operations
//! built on it.

use crate::error::{FlagError, ValueError};
use crate::flags::BoolFlag;
use crate::flagset::FlagSet;
use std::fmt;

/// What help rendering needs to know about a flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagDoc {
    pub names: Vec<String>,
    pub usage: String,
    pub placeholder: String,
    /// Current default rendered for display, `None` when there is nothing to show.
    pub default: Option<String>,
    /// Whether `default` should be shown quoted.
    pub quote_default: bool,
    pub env_vars: Vec<String>,
    pub file_path: String,
    pub takes_value: bool,
    /// The closed set of accepted tokens, for choice flags.
    pub choices: Option<Vec<String>>,
}

/// A named, typed command-line option.
pub trait Flag: fmt::Debug {
    /// Primary name followed by aliases, normalised.
    fn names(&self) -> Vec<String>;

    /// True once a value arrived from the command line, environment or file.
    fn is_set(&self) -> bool;

    /// Record that a command-line token supplied this flag.
    fn mark_set(&mut self);

    /// Take the value a command-line token gave this flag, in the form
    /// its cells render, so [`Flag::value_string`] reports it.
    fn sync(&mut self, raw: &str) -> Result<(), ValueError>;

    fn is_required(&self) -> bool;

    /// False only for flags whose presence alone means `true`.
    fn takes_value(&self) -> bool {
        true
    }

    fn usage(&self) -> &str;

    /// Current value as a string; empty for flags that take no value.
    fn value_string(&self) -> String;

    fn is_visible(&self) -> bool {
        true
    }

    /// Resolve environment/file sources and register one cell per name.
    fn apply(&mut self, set: &mut FlagSet) -> Result<(), FlagError>;

    fn doc(&self) -> FlagDoc;
}

/// Build the full name set from a primary name and its aliases.
///
/// Anything after the first comma or space in a name is dropped, so a
/// legacy `"output, o"` style name degrades to `"output"`.
pub fn flag_names(name: &str, aliases: &[String]) -> Vec<String> {
    std::iter::once(name)
        .chain(aliases.iter().map(String::as_str))
        .map(|part| {
            part.split(|c| c == ',' || c == ' ')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Apply every flag to a fresh flag set for the scope called `name`.
pub fn build_flag_set(name: &str, flags: &mut [Box<dyn Flag>]) -> Result<FlagSet, FlagError> {
    let mut set = FlagSet::new(name);
    for flag in flags.iter_mut() {
        flag.apply(&mut set)?;
    }
    Ok(set)
}

/// Make every name form of a flag agree after parsing.
///
/// When exactly one form of a flag was given on the command line, its value
/// is copied into the other forms. Forms bound to a destination already share
/// the value and are only marked visited. Two forms given in the same scope
/// is an error.
pub fn normalize_flags(flags: &[Box<dyn Flag>], set: &mut FlagSet) -> Result<(), FlagError> {
    for flag in flags {
        let names = flag.names();
        if names.len() < 2 {
            continue;
        }

        let mut given: Option<&str> = None;
        for name in &names {
            let name = name.trim();
            if set.is_visited(name) {
                if let Some(first) = given {
                    let render = |name: &str| {
                        set.lookup(name)
                            .map(|entry| entry.value().render())
                            .unwrap_or_default()
                    };
                    return Err(FlagError::ConflictingForms {
                        first: first.to_string(),
                        first_value: render(first),
                        second: name.to_string(),
                        second_value: render(name),
                    });
                }
                given = Some(name);
            }
        }

        let Some(source) = given else {
            continue;
        };
        let Some(raw) = set.lookup(source).map(|entry| entry.value().render()) else {
            continue;
        };

        for name in &names {
            let name = name.trim();
            if set.is_visited(name) {
                continue;
            }
            let bound = set.lookup(name).is_some_and(|entry| entry.value().is_bound());
            if bound {
                set.mark_visited(name)?;
            } else {
                tracing::debug!(from = source, to = name, "copying flag value to alias");
                set.set(name, &raw)?;
            }
        }
    }
    Ok(())
}

/// The flags that are not hidden, in declaration order.
pub fn visible_flags(flags: &[Box<dyn Flag>]) -> Vec<&dyn Flag> {
    flags
        .iter()
        .map(|flag| flag.as_ref())
        .filter(|flag| flag.is_visible())
        .collect()
}

/// Sort flags by primary name, case-insensitively, ties broken by case.
pub fn sort_by_name(flags: &mut [&dyn Flag]) {
    flags.sort_by(|a, b| {
        let a = a.names().into_iter().next().unwrap_or_default();
        let b = b.names().into_iter().next().unwrap_or_default();
        a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(&b))
    });
}

/// `--help` / `-h`.
pub fn help_flag() -> BoolFlag {
    BoolFlag {
        name: "help".to_string(),
        aliases: vec!["h".to_string()],
        usage: "Show help".to_string(),
        hide_default_value: true,
        ..BoolFlag::default()
    }
}

/// `--version` / `-V`.
pub fn version_flag() -> BoolFlag {
    BoolFlag {
        name: "version".to_string(),
        aliases: vec!["V".to_string()],
        usage: "Print the version and exit".to_string(),
        hide_default_value: true,
        ..BoolFlag::default()
    }
}

/// Hidden flag requesting shell completion output.
pub fn completion_flag() -> BoolFlag {
    BoolFlag {
        name: "generate-completion".to_string(),
        hidden: true,
        ..BoolFlag::default()
    }
}
