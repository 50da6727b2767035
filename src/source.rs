//! Environment and file fallback for flag values.
//!
//! Every flag kind consults this before it registers itself with the flag
//! set. A value found here becomes the flag's new default, so an explicit
//! command-line token can still override it.

use std::env;
use std::fs;

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An environment variable with this name.
    Env(String),
    /// A file at this path.
    File(String),
}

/// A raw value found outside the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub source: Source,
}

/// Look up the first available value for a flag.
///
/// Environment variables are consulted in declared order and the first one
/// that exists wins, even when it is empty. Otherwise `file_path` is split on
/// commas and the entire contents of the first readable file are returned,
/// untrimmed. A candidate that cannot be read falls through to the next one.
pub fn resolve(env_vars: &[String], file_path: &str) -> Option<Resolved> {
    for env_var in env_vars {
        let env_var = env_var.trim();
        if env_var.is_empty() {
            continue;
        }
        if let Some(value) = env::var_os(env_var) {
            tracing::debug!(env = env_var, "flag value found in environment");
            return Some(Resolved {
                value: value.to_string_lossy().into_owned(),
                source: Source::Env(env_var.to_string()),
            });
        }
    }

    for path in file_path.split(',') {
        if path.is_empty() {
            continue;
        }
        match fs::read_to_string(path) {
            Ok(value) => {
                tracing::debug!(path, "flag value read from file");
                return Some(Resolved {
                    value,
                    source: Source::File(path.to_string()),
                });
            }
            Err(err) => {
                tracing::trace!(path, error = %err, "skipping unreadable flag file");
            }
        }
    }

    None
}

/// Convenience wrapper returning only the raw value.
pub fn resolve_value(env_vars: &[String], file_path: &str) -> Option<String> {
    resolve(env_vars, file_path).map(|resolved| resolved.value)
}
