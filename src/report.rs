//! Serializable summary of what a context resolved.

use crate::context::Context;
use serde::Serialize;
use std::collections::BTreeMap;

/// One flag's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagReport {
    pub value: String,
    pub set: bool,
}

/// Every visible flag reachable from a context, by primary name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Command names from the root down to the reporting context.
    pub command: Vec<String>,
    pub flags: BTreeMap<String, FlagReport>,
    pub args: Vec<String>,
}

impl Report {
    /// Collect the flags declared anywhere in the lineage of `ctx`.
    ///
    /// A name declared at several levels is reported once, with the value
    /// the lineage walk resolves for it.
    pub fn from_context(ctx: &Context<'_>) -> Self {
        let lineage = ctx.lineage();

        let command = lineage
            .iter()
            .rev()
            .filter_map(|c| c.command())
            .map(|cmd| cmd.name.clone())
            .collect();

        let mut flags = BTreeMap::new();
        for scope in &lineage {
            let Some(cmd) = scope.command() else {
                continue;
            };
            for flag in cmd.flags.iter().filter(|f| f.is_visible()) {
                let Some(name) = flag.names().into_iter().next() else {
                    continue;
                };
                if flags.contains_key(&name) {
                    continue;
                }
                let report = FlagReport {
                    value: ctx.resolved(&name).unwrap_or_default(),
                    set: ctx.is_set(&name),
                };
                flags.insert(name, report);
            }
        }

        Self {
            command,
            flags,
            args: ctx.args().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
