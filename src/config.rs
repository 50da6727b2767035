//! JSON flag declarations for the `flagchain` binary.
//!
//! A document declares a root command and one level of subcommands:
//!
//! ```json
//! {
//!   "name": "app",
//!   "flags": [{"name": "timeout", "kind": "uint64", "env_vars": ["APP_TIMEOUT"]}],
//!   "subcommands": [{"name": "run", "flags": []}]
//! }
//! ```

use crate::choice::{Choice, Choices};
use crate::command::Command;
use crate::flag::{flag_names, Flag};
use crate::flags::{BoolFlag, ChoiceFlag, PathFlag, Uint64Flag};
use crate::value::{parse_bool, parse_u64};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during config parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse JSON config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("flag names must not be empty")]
    EmptyName,

    #[error("duplicate flag name: {0}")]
    DuplicateName(String),

    #[error("duplicate subcommand name: {0}")]
    DuplicateSubcommandName(String),

    #[error("'choices' on flag '{0}' is empty: must have at least one token")]
    EmptyChoices(String),

    #[error("'choices' on flag '{0}' has duplicate token: {1}")]
    DuplicateChoice(String, String),

    #[error("'choices' can only be used with the choice kind on flag '{0}'")]
    ChoicesOnNonChoice(String),

    #[error("choice flag '{0}' has no 'choices'")]
    MissingChoices(String),

    #[error("invalid default {1:?} for flag '{0}': {2}")]
    InvalidDefault(String, String, String),
}

/// The kind of value a flag holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    /// Presence means true (e.g., --verbose)
    Bool,
    /// Unsigned integer, base prefixes allowed
    Uint64,
    /// Filesystem path, kept verbatim
    Path,
    /// One token out of `choices`
    Choice,
}

/// Declaration of a single flag.
#[derive(Debug, Clone, Deserialize)]
pub struct FlagConfig {
    /// Primary name (e.g., "output" for --output)
    pub name: String,
    /// Alternative names (e.g., ["o"] for -o)
    #[serde(default)]
    pub aliases: Vec<String>,
    pub kind: FlagKind,
    /// Help text for this flag
    #[serde(default)]
    pub usage: String,
    /// Environment variables consulted in order
    #[serde(default)]
    pub env_vars: Vec<String>,
    /// Comma-separated files consulted when no variable is present
    #[serde(default)]
    pub file_path: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub hidden: bool,
    /// Compiled-in default, in the kind's command-line syntax
    pub default: Option<String>,
    /// Accepted tokens, for the choice kind only
    pub choices: Option<Vec<String>>,
}

/// Declaration of a subcommand.
#[derive(Debug, Clone, Deserialize)]
pub struct SubcommandConfig {
    pub name: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
}

/// Top-level declaration document.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub name: String,
    #[serde(default)]
    pub usage: String,
    #[serde(default)]
    pub flags: Vec<FlagConfig>,
    #[serde(default)]
    pub subcommands: Vec<SubcommandConfig>,
}

/// The commands built from a [`Config`].
///
/// Subcommands live beside the root rather than inside it, so a child can
/// be prepared while the root's context still borrows the root.
#[derive(Debug)]
pub struct CommandTree {
    pub root: Command,
    pub subcommands: Vec<Command>,
}

impl CommandTree {
    pub fn subcommand_mut(&mut self, name: &str) -> Option<&mut Command> {
        self.subcommands.iter_mut().find(|cmd| cmd.name == name)
    }
}

impl Config {
    /// Parse a JSON string into a Config.
    pub fn from_json(json: &str) -> Result<Config, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::validate_flags(&self.flags)?;

        let mut subcmd_names = HashSet::new();
        for subcmd in &self.subcommands {
            if !subcmd_names.insert(&subcmd.name) {
                return Err(ConfigError::DuplicateSubcommandName(subcmd.name.clone()));
            }
            Self::validate_flags(&subcmd.flags)?;
        }

        Ok(())
    }

    /// Check one scope: every name form is unique, and every flag builds.
    fn validate_flags(flags: &[FlagConfig]) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for flag in flags {
            for name in flag_names(&flag.name, &flag.aliases) {
                if name.is_empty() {
                    return Err(ConfigError::EmptyName);
                }
                if !names.insert(name.clone()) {
                    return Err(ConfigError::DuplicateName(name));
                }
            }
            flag.build()?;
        }
        Ok(())
    }

    /// Validate, then build the root command and its subcommands.
    pub fn build(&self) -> Result<CommandTree, ConfigError> {
        self.validate()?;

        let root = build_command(&self.name, &self.usage, &self.flags)?;
        let subcommands = self
            .subcommands
            .iter()
            .map(|sub| build_command(&sub.name, &sub.usage, &sub.flags))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CommandTree { root, subcommands })
    }
}

fn build_command(name: &str, usage: &str, flags: &[FlagConfig]) -> Result<Command, ConfigError> {
    let mut command = Command::new(name).usage(usage);
    for flag in flags {
        command.flags.push(flag.build()?);
    }
    Ok(command)
}

impl FlagConfig {
    /// Build the declared flag.
    pub fn build(&self) -> Result<Box<dyn Flag>, ConfigError> {
        if self.kind != FlagKind::Choice && self.choices.is_some() {
            return Err(ConfigError::ChoicesOnNonChoice(self.name.clone()));
        }

        let invalid_default = |raw: &str, reason: String| {
            ConfigError::InvalidDefault(self.name.clone(), raw.to_string(), reason)
        };

        let flag: Box<dyn Flag> = match self.kind {
            FlagKind::Bool => {
                let value = match &self.default {
                    Some(raw) => parse_bool(raw).map_err(|e| invalid_default(raw, e.to_string()))?,
                    None => false,
                };
                Box::new(BoolFlag {
                    aliases: self.aliases.clone(),
                    usage: self.usage.clone(),
                    env_vars: self.env_vars.clone(),
                    file_path: self.file_path.clone(),
                    required: self.required,
                    hidden: self.hidden,
                    value,
                    ..BoolFlag::new(self.name.clone())
                })
            }
            FlagKind::Uint64 => {
                let value = match &self.default {
                    Some(raw) => parse_u64(raw).map_err(|e| invalid_default(raw, e.to_string()))?,
                    None => 0,
                };
                Box::new(Uint64Flag {
                    aliases: self.aliases.clone(),
                    usage: self.usage.clone(),
                    env_vars: self.env_vars.clone(),
                    file_path: self.file_path.clone(),
                    required: self.required,
                    hidden: self.hidden,
                    value,
                    ..Uint64Flag::new(self.name.clone())
                })
            }
            FlagKind::Path => Box::new(PathFlag {
                aliases: self.aliases.clone(),
                usage: self.usage.clone(),
                env_vars: self.env_vars.clone(),
                file_path: self.file_path.clone(),
                required: self.required,
                hidden: self.hidden,
                value: self.default.clone().unwrap_or_default(),
                ..PathFlag::new(self.name.clone())
            }),
            FlagKind::Choice => {
                let choices = self.choices()?;
                let value = match &self.default {
                    Some(raw) => Some(choices.decode(raw).ok_or_else(|| {
                        invalid_default(raw, format!("expected one of {}", choices.tokens().join(", ")))
                    })?),
                    None => None,
                };
                Box::new(ChoiceFlag {
                    aliases: self.aliases.clone(),
                    usage: self.usage.clone(),
                    env_vars: self.env_vars.clone(),
                    file_path: self.file_path.clone(),
                    required: self.required,
                    hidden: self.hidden,
                    value,
                    ..ChoiceFlag::new(self.name.clone(), choices)
                })
            }
        };

        Ok(flag)
    }

    /// The token set of a choice flag.
    fn choices(&self) -> Result<Choices<String>, ConfigError> {
        let Some(ref choices) = self.choices else {
            return Err(ConfigError::MissingChoices(self.name.clone()));
        };

        // Choices must not be empty
        if choices.is_empty() {
            return Err(ConfigError::EmptyChoices(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for choice in choices {
            if !seen.insert(choice) {
                return Err(ConfigError::DuplicateChoice(self.name.clone(), choice.clone()));
            }
        }

        Ok(Choices::from_strings(choices.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "name": "app",
            "usage": "does things",
            "flags": [
                {
                    "name": "verbose",
                    "aliases": ["v"],
                    "kind": "bool",
                    "usage": "Enable verbose output"
                },
                {
                    "name": "timeout",
                    "kind": "uint64",
                    "env_vars": ["APP_TIMEOUT"],
                    "default": "30"
                },
                {
                    "name": "mode",
                    "kind": "choice",
                    "choices": ["fast", "slow"],
                    "default": "fast",
                    "required": true
                }
            ],
            "subcommands": [
                {"name": "run", "usage": "run it", "flags": [{"name": "config", "kind": "path"}]}
            ]
        }"#;

        let config = Config::from_json(json).unwrap();
        assert_eq!(config.name, "app");
        assert_eq!(config.flags.len(), 3);

        let verbose = &config.flags[0];
        assert_eq!(verbose.kind, FlagKind::Bool);
        assert_eq!(verbose.aliases, vec!["v"]);
        assert!(!verbose.required);

        let mode = &config.flags[2];
        assert_eq!(mode.kind, FlagKind::Choice);
        assert!(mode.required);

        assert_eq!(config.subcommands[0].flags[0].kind, FlagKind::Path);
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::from_json(r#"{"name": "minimal"}"#).unwrap();
        assert!(config.flags.is_empty());
        assert!(config.subcommands.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_error_on_invalid_json() {
        let result = Config::from_json(r#"{"name": "x", "flags": [{"name": "a", "kind": "float"}]}"#);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_error_on_duplicate_flag_names() {
        let json = r#"{
            "name": "test",
            "flags": [
                {"name": "dup", "kind": "bool"},
                {"name": "dup", "kind": "path"}
            ]
        }"#;
        let config = Config::from_json(json).unwrap();
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::DuplicateName(name)) if name == "dup"));
    }

    #[test]
    fn test_error_on_alias_shared_across_flags() {
        let json = r#"{
            "name": "test",
            "flags": [
                {"name": "output", "aliases": ["o"], "kind": "path"},
                {"name": "offset", "aliases": ["o"], "kind": "uint64"}
            ]
        }"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::DuplicateName(name)) if name == "o"));
    }

    #[test]
    fn test_same_name_allowed_in_different_scopes() {
        let json = r#"{
            "name": "test",
            "flags": [{"name": "timeout", "kind": "uint64"}],
            "subcommands": [{"name": "run", "flags": [{"name": "timeout", "kind": "uint64"}]}]
        }"#;
        Config::from_json(json).unwrap().validate().unwrap();
    }

    #[test]
    fn test_error_duplicate_subcommand_name() {
        let json = r#"{
            "name": "test",
            "subcommands": [{"name": "run"}, {"name": "run"}]
        }"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateSubcommandName(name)) if name == "run"
        ));
    }

    #[test]
    fn test_error_empty_name() {
        let json = r#"{"name": "test", "flags": [{"name": "", "kind": "bool"}]}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyName)));
    }

    #[test]
    fn test_error_choices_on_non_choice() {
        let json = r#"{"name": "test", "flags": [{"name": "a", "kind": "path", "choices": ["x"]}]}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::ChoicesOnNonChoice(name)) if name == "a"));
    }

    #[test]
    fn test_error_missing_and_empty_choices() {
        let json = r#"{"name": "test", "flags": [{"name": "a", "kind": "choice"}]}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::MissingChoices(_))));

        let json = r#"{"name": "test", "flags": [{"name": "a", "kind": "choice", "choices": []}]}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::EmptyChoices(_))));
    }

    #[test]
    fn test_error_duplicate_choices() {
        let json = r#"{"name": "test", "flags": [{"name": "a", "kind": "choice", "choices": ["x", "y", "x"]}]}"#;
        let config = Config::from_json(json).unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateChoice(name, token)) if name == "a" && token == "x"
        ));
    }

    #[test]
    fn test_error_invalid_defaults() {
        for (kind, default) in [("bool", "maybe"), ("uint64", "-1"), ("choice", "medium")] {
            let json = format!(
                r#"{{"name": "test", "flags": [{{"name": "a", "kind": "{}", "default": "{}", "choices": {}}}]}}"#,
                kind,
                default,
                if kind == "choice" { r#"["fast", "slow"]"# } else { "null" }
            );
            let config = Config::from_json(&json).unwrap();
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidDefault(ref name, _, _)) if name == "a"),
                "kind {} should reject default {}",
                kind,
                default
            );
        }
    }

    #[test]
    fn test_build_tree() {
        let json = r#"{
            "name": "app",
            "flags": [{"name": "timeout", "kind": "uint64", "default": "0x1e"}],
            "subcommands": [{"name": "run", "flags": [{"name": "mode", "kind": "choice", "choices": ["a", "b"], "default": "b"}]}]
        }"#;
        let mut tree = Config::from_json(json).unwrap().build().unwrap();
        assert_eq!(tree.root.name, "app");
        assert_eq!(tree.root.flags[0].value_string(), "30");
        assert!(tree.subcommand_mut("missing").is_none());

        let run = tree.subcommand_mut("run").unwrap();
        assert_eq!(run.flags[0].value_string(), "b");
        assert_eq!(run.flags[0].doc().choices, Some(vec!["a".to_string(), "b".to_string()]));
    }
}
