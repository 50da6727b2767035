//! Single-level flag set: one name → cell table per command scope.
//!
//! This is the raw layer the flag kinds register against. It knows nothing
//! about aliases, environment variables or parent scopes; it only records
//! which names received an explicit token.

use crate::error::FlagError;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A registered name.
#[derive(Debug)]
pub struct Entry {
    pub name: String,
    pub usage: String,
    /// Rendering of the value at registration time.
    pub default: String,
    value: Box<dyn Value>,
}

impl Entry {
    /// The cell behind this name.
    pub fn value(&self) -> &dyn Value {
        self.value.as_ref()
    }
}

/// Flat table of flags for one scope.
#[derive(Debug, Default)]
pub struct FlagSet {
    name: String,
    entries: BTreeMap<String, Entry>,
    visited: BTreeSet<String>,
    args: Vec<String>,
}

impl FlagSet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a cell under `name`. A name may only be registered once.
    pub fn register(
        &mut self,
        name: &str,
        value: Box<dyn Value>,
        usage: &str,
    ) -> Result<(), FlagError> {
        if name.is_empty() {
            return Err(FlagError::EmptyName(vec![String::new()]));
        }
        if self.entries.contains_key(name) {
            return Err(FlagError::Redefined(name.to_string()));
        }
        let default = value.render();
        self.entries.insert(
            name.to_string(),
            Entry {
                name: name.to_string(),
                usage: usage.to_string(),
                default,
                value,
            },
        );
        Ok(())
    }

    /// Declared entry for `name`, visited or not.
    pub fn lookup(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Entry for `name` only if it received an explicit value.
    pub fn lookup_visited(&self, name: &str) -> Option<&Entry> {
        if self.visited.contains(name) {
            self.entries.get(name)
        } else {
            None
        }
    }

    pub fn is_visited(&self, name: &str) -> bool {
        self.visited.contains(name)
    }

    /// Call `f` for every visited entry, in name order.
    pub fn visit(&self, mut f: impl FnMut(&Entry)) {
        for name in &self.visited {
            if let Some(entry) = self.entries.get(name) {
                f(entry);
            }
        }
    }

    /// Call `f` for every declared entry, in name order.
    pub fn visit_all(&self, mut f: impl FnMut(&Entry)) {
        for entry in self.entries.values() {
            f(entry);
        }
    }

    /// Number of names that received an explicit value.
    pub fn num_visited(&self) -> usize {
        self.visited.len()
    }

    /// Set `name` from a raw string and mark it visited.
    pub fn set(&mut self, name: &str, raw: &str) -> Result<(), FlagError> {
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?;
        let kind = entry.value.kind();
        entry
            .value
            .set(raw)
            .map_err(|err| FlagError::InvalidValue {
                flag: name.to_string(),
                kind,
                value: raw.to_string(),
                reason: err.to_string(),
            })?;
        self.visited.insert(name.to_string());
        Ok(())
    }

    /// Mark `name` visited without touching its cell.
    ///
    /// Used for name forms whose cell shares storage with a form that was
    /// already set.
    pub fn mark_visited(&mut self, name: &str) -> Result<(), FlagError> {
        if !self.entries.contains_key(name) {
            return Err(FlagError::UnknownFlag(name.to_string()));
        }
        self.visited.insert(name.to_string());
        Ok(())
    }

    /// Positional arguments left after parsing.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Parse command-line tokens.
    ///
    /// `-name` and `--name` are equivalent and `--name=value` is accepted.
    /// Boolean flags never consume the following token. Parsing stops at
    /// `--` or at the first token that is not a flag; everything after that
    /// is kept as positional arguments.
    pub fn parse(&mut self, args: &[String]) -> Result<(), FlagError> {
        let mut args_iter = args.iter();

        while let Some(arg) = args_iter.next() {
            if arg == "--" {
                break;
            }
            if arg.len() < 2 || !arg.starts_with('-') {
                self.args.push(arg.clone());
                break;
            }
            self.parse_one(arg, &mut args_iter)?;
        }

        self.args.extend(args_iter.cloned());
        Ok(())
    }

    fn parse_one(
        &mut self,
        arg: &str,
        args_iter: &mut std::slice::Iter<'_, String>,
    ) -> Result<(), FlagError> {
        let option_str = arg
            .strip_prefix("--")
            .or_else(|| arg.strip_prefix('-'))
            .unwrap_or(arg);

        if option_str.is_empty() || option_str.starts_with('-') || option_str.starts_with('=') {
            return Err(FlagError::UnknownFlag(option_str.to_string()));
        }

        // Check for --option=value format
        let (name, inline_value) = match option_str.split_once('=') {
            Some((n, v)) => (n, Some(v)),
            None => (option_str, None),
        };

        let is_bool = self
            .entries
            .get(name)
            .ok_or_else(|| FlagError::UnknownFlag(name.to_string()))?
            .value
            .is_bool_flag();

        let value = match (inline_value, is_bool) {
            (Some(v), _) => v.to_string(),
            (None, true) => "true".to_string(),
            (None, false) => args_iter
                .next()
                .ok_or_else(|| FlagError::MissingValue(name.to_string()))?
                .clone(),
        };

        self.set(name, &value)
    }
}
