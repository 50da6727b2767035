//! Execution contexts: one per command invocation, chained to the parent
//! scope they were dispatched from.
//!
//! Every cross-scope lookup walks the [lineage](Context::lineage) from the
//! context itself up to the root. A value explicitly given in a child scope
//! therefore shadows one given to the parent.

use crate::choice::Choice;
use crate::command::Command;
use crate::flagset::FlagSet;
use crate::value::{parse_bool, parse_u64};
use std::time::Instant;

#[derive(Debug)]
pub struct Context<'a> {
    command: Option<&'a Command>,
    flag_set: FlagSet,
    parent: Option<&'a Context<'a>>,
    deadline: Option<Instant>,
    shell_complete: bool,
}

impl<'a> Context<'a> {
    /// Create a context for `command` whose flags were applied to `flag_set`.
    ///
    /// A child inherits the parent's deadline and shell-completion mode.
    pub fn new(
        command: Option<&'a Command>,
        flag_set: FlagSet,
        parent: Option<&'a Context<'a>>,
    ) -> Self {
        let (deadline, shell_complete) = match parent {
            Some(p) => (p.deadline, p.shell_complete),
            None => (None, false),
        };
        Self {
            command,
            flag_set,
            parent,
            deadline,
            shell_complete,
        }
    }

    /// Override the inherited deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_shell_complete(mut self, shell_complete: bool) -> Self {
        self.shell_complete = shell_complete;
        self
    }

    /// Deadline carried for the surrounding dispatch logic; flag resolution
    /// never consults it.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn shell_complete(&self) -> bool {
        self.shell_complete
    }

    pub fn command(&self) -> Option<&'a Command> {
        self.command
    }

    pub fn parent(&self) -> Option<&'a Context<'a>> {
        self.parent
    }

    pub fn flag_set(&self) -> &FlagSet {
        &self.flag_set
    }

    /// This context followed by each ancestor, ending at the root.
    pub fn lineage(&self) -> Vec<&Context<'a>> {
        let mut lineage = Vec::new();
        let mut current = Some(self);
        while let Some(ctx) = current {
            lineage.push(ctx);
            current = ctx.parent;
        }
        lineage
    }

    /// Number of names explicitly given in this scope.
    pub fn num_flags(&self) -> usize {
        self.flag_set.num_visited()
    }

    /// Set a flag of this scope as if it had been given on the command line.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), crate::FlagError> {
        self.flag_set.set(name, value)
    }

    /// Whether `name` was supplied from any source, in any scope of the
    /// lineage.
    ///
    /// Environment and file values never reach the flag set, so the flag
    /// declarations are consulted as well as the visited names.
    pub fn is_set(&self, name: &str) -> bool {
        self.lineage().into_iter().any(|ctx| ctx.is_set_locally(name))
    }

    /// Like [`is_set`](Self::is_set) but for this scope only.
    pub fn is_set_locally(&self, name: &str) -> bool {
        let declared = self.command.map_or(false, |command| {
            command
                .flags
                .iter()
                .any(|flag| flag.is_set() && flag.names().iter().any(|n| n == name))
        });
        declared || self.flag_set.is_visited(name)
    }

    /// The raw value of the nearest scope where `name` was explicitly given.
    ///
    /// A flag that is only declared, never given, resolves to `None`; the
    /// flag declaration's own default is what callers fall back to.
    pub fn value(&self, name: &str) -> Option<String> {
        self.lineage()
            .into_iter()
            .find_map(|ctx| ctx.flag_set.lookup_visited(name))
            .map(|entry| entry.value().render())
    }

    /// The explicitly given value if there is one, otherwise the current
    /// value registered by the nearest scope declaring `name`.
    pub fn resolved(&self, name: &str) -> Option<String> {
        self.value(name).or_else(|| {
            self.lineage()
                .into_iter()
                .find_map(|ctx| ctx.flag_set.lookup(name))
                .map(|entry| entry.value().render())
        })
    }

    /// Boolean value of `name`, `false` when nothing resolves.
    pub fn bool(&self, name: &str) -> bool {
        self.value(name)
            .and_then(|raw| parse_bool(&raw).ok())
            .unwrap_or(false)
    }

    /// Unsigned value of `name`, `0` when nothing resolves.
    pub fn uint64(&self, name: &str) -> u64 {
        self.value(name)
            .and_then(|raw| parse_u64(&raw).ok())
            .unwrap_or(0)
    }

    /// Path value of `name`, empty when nothing resolves.
    pub fn path(&self, name: &str) -> String {
        self.value(name).unwrap_or_default()
    }

    /// Choice value of `name` decoded through `choice`, `None` when nothing
    /// resolves.
    pub fn choice<T>(&self, name: &str, choice: &dyn Choice<T>) -> Option<T> {
        self.value(name).and_then(|raw| choice.decode(&raw))
    }

    /// Positional arguments left over in this scope.
    pub fn args(&self) -> &[String] {
        self.flag_set.args()
    }

    pub fn narg(&self) -> usize {
        self.args().len()
    }

    /// Names explicitly given in this scope.
    pub fn local_flag_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.flag_set.visit(|entry| names.push(entry.name.clone()));
        names
    }

    /// Names explicitly given anywhere in the lineage, child scope first.
    pub fn flag_names(&self) -> Vec<String> {
        self.lineage()
            .into_iter()
            .flat_map(|ctx| ctx.local_flag_names())
            .collect()
    }
}
