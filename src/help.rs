//! Help text generation for flag declarations.
//!
//! Each flag is stringified into a `names<TAB>usage` line by a
//! [`FlagFormatter`]; [`render_flags`] then aligns the two columns. Nothing
//! here is global: callers pass a [`HelpConfig`], whose default uses
//! [`DefaultFlagFormatter`].

use crate::command::Command;
use crate::flag::{sort_by_name, visible_flags, Flag, FlagDoc};
use std::fmt;

/// Placeholder shown for value-taking flags that do not name their own.
pub const DEFAULT_PLACEHOLDER: &str = "VALUE";

/// How environment variable hints are spelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvHintStyle {
    /// `[$A, $B]`
    #[default]
    Unix,
    /// `[%A%, %B%]`
    Windows,
}

/// Turns a flag description into one `names<TAB>usage` help line.
pub trait FlagFormatter: fmt::Debug {
    fn format(&self, doc: &FlagDoc) -> String;
}

/// The stock formatter.
///
/// Names are prefixed with `-` or `--` and followed by the placeholder when
/// the flag takes a value. The usage column carries the default, the
/// supported tokens of a choice flag, and the environment and file hints.
#[derive(Debug, Clone, Default)]
pub struct DefaultFlagFormatter {
    pub env_hint: EnvHintStyle,
}

impl DefaultFlagFormatter {
    pub fn new(env_hint: EnvHintStyle) -> Self {
        Self { env_hint }
    }

    fn env_hint(&self, env_vars: &[String]) -> String {
        if env_vars.is_empty() {
            return String::new();
        }
        match self.env_hint {
            EnvHintStyle::Unix => format!(" [${}]", env_vars.join(", $")),
            EnvHintStyle::Windows => format!(" [%{}%]", env_vars.join("%, %")),
        }
    }
}

impl FlagFormatter for DefaultFlagFormatter {
    fn format(&self, doc: &FlagDoc) -> String {
        let (quoted, usage) = unquote_usage(&doc.usage);

        let placeholder = if !doc.takes_value {
            String::new()
        } else if let Some(quoted) = quoted {
            quoted
        } else if !doc.placeholder.is_empty() {
            doc.placeholder.clone()
        } else {
            DEFAULT_PLACEHOLDER.to_string()
        };

        let default = match &doc.default {
            Some(value) if doc.quote_default => format!(" (default: {:?})", value),
            Some(value) if !value.is_empty() => format!(" (default: {})", value),
            _ => String::new(),
        };

        let mut line = format!(
            "{}\t{}",
            prefixed_names(&doc.names, &placeholder),
            format!("{}{}", usage, default).trim()
        );

        if let Some(choices) = &doc.choices {
            let quoted: Vec<String> = choices.iter().map(|c| format!("\"{}\"", c)).collect();
            line.push_str(&format!(" (supported values: {})", quoted.join(", ")));
        }
        line.push_str(&self.env_hint(&doc.env_vars));
        if !doc.file_path.is_empty() {
            line.push_str(&format!(" [{}]", doc.file_path));
        }
        line
    }
}

/// Settings for [`render_flags`] and [`generate_help`].
#[derive(Debug)]
pub struct HelpConfig {
    pub formatter: Box<dyn FlagFormatter>,
    /// Spaces before each flag line.
    pub indent: usize,
    /// List flags by primary name instead of declaration order.
    pub sort: bool,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            formatter: Box::new(DefaultFlagFormatter::default()),
            indent: 3,
            sort: false,
        }
    }
}

/// Split a back-quoted placeholder out of a usage string.
///
/// `"load from `FILE`"` yields `(Some("FILE"), "load from FILE")`. Without a
/// matching pair of back quotes the usage is returned unchanged.
pub fn unquote_usage(usage: &str) -> (Option<String>, String) {
    if let Some(start) = usage.find('`') {
        if let Some(len) = usage[start + 1..].find('`') {
            let name = &usage[start + 1..start + 1 + len];
            let unquoted = format!("{}{}{}", &usage[..start], name, &usage[start + 2 + len..]);
            return (Some(name.to_string()), unquoted);
        }
    }
    (None, usage.to_string())
}

/// `-o FILE, --output FILE` style rendering of a name set.
pub fn prefixed_names(names: &[String], placeholder: &str) -> String {
    names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| {
            let prefix = if name.chars().count() == 1 { "-" } else { "--" };
            if placeholder.is_empty() {
                format!("{}{}", prefix, name)
            } else {
                format!("{}{} {}", prefix, name, placeholder)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the visible flags as aligned help lines.
///
/// The usage column starts two spaces past the widest name column.
pub fn render_flags(flags: &[Box<dyn Flag>], config: &HelpConfig) -> Vec<String> {
    let mut visible = visible_flags(flags);
    if config.sort {
        sort_by_name(&mut visible);
    }

    let indent = " ".repeat(config.indent);
    let columns: Vec<(String, String)> = visible
        .iter()
        .map(|flag| {
            let line = format!("{}{}", indent, config.formatter.format(&flag.doc()));
            match line.split_once('\t') {
                Some((names, usage)) => (names.to_string(), usage.to_string()),
                None => (line, String::new()),
            }
        })
        .collect();

    let width = columns
        .iter()
        .map(|(names, _)| names.chars().count())
        .max()
        .unwrap_or(0)
        + 2;

    columns
        .into_iter()
        .map(|(names, usage)| {
            if usage.is_empty() {
                names
            } else {
                format!("{:<width$}{}", names, usage, width = width)
            }
        })
        .collect()
}

/// Full help text for a command and the subcommands dispatched from it.
pub fn generate_help(command: &Command, subcommands: &[Command], config: &HelpConfig) -> String {
    let indent = " ".repeat(config.indent);
    let mut out = String::new();

    out.push_str("NAME:\n");
    if command.usage.is_empty() {
        out.push_str(&format!("{}{}\n", indent, command.name));
    } else {
        out.push_str(&format!("{}{} - {}\n", indent, command.name, command.usage));
    }

    if !subcommands.is_empty() {
        let width = subcommands
            .iter()
            .map(|c| c.name.chars().count())
            .max()
            .unwrap_or(0)
            + 2;
        out.push_str("\nCOMMANDS:\n");
        for sub in subcommands {
            let line = format!("{}{:<width$}{}", indent, sub.name, sub.usage, width = width);
            out.push_str(line.trim_end());
            out.push('\n');
        }
    }

    let lines = render_flags(&command.flags, config);
    if !lines.is_empty() {
        out.push_str("\nOPTIONS:\n");
        for line in lines {
            out.push_str(&line);
            out.push('\n');
        }
    }

    out
}
