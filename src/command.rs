//! A scope of flag declarations and the pipeline that turns raw arguments
//! into an [`Context`].

use crate::context::Context;
use crate::error::FlagError;
use crate::flag::{build_flag_set, normalize_flags, Flag};
use crate::required::check_required_flags;

/// A command: a name, its usage line and the flags it declares.
///
/// Subcommand dispatch is left to the caller; a child is prepared with the
/// parent's context once the parent has consumed its own arguments.
#[derive(Debug, Default)]
pub struct Command {
    pub name: String,
    pub usage: String,
    pub flags: Vec<Box<dyn Flag>>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn flag(mut self, flag: impl Flag + 'static) -> Self {
        self.flags.push(Box::new(flag));
        self
    }

    /// Resolve this command's flags against `args`.
    ///
    /// Runs apply, parse, alias normalisation and the required-flag check,
    /// in that order. Flags given on the command line are marked as set and
    /// take the parsed value, so [`Flag::is_set`] and [`Flag::value_string`]
    /// cover every source.
    pub fn prepare<'a>(
        &'a mut self,
        args: &[String],
        parent: Option<&'a Context<'a>>,
    ) -> Result<Context<'a>, FlagError> {
        let mut set = build_flag_set(&self.name, &mut self.flags)?;
        set.parse(args)?;
        normalize_flags(&self.flags, &mut set)?;

        for flag in self.flags.iter_mut() {
            let names = flag.names();
            let Some(entry) = names.iter().find_map(|name| set.lookup_visited(name)) else {
                continue;
            };
            let raw = entry.value().render();
            flag.sync(&raw).map_err(|err| FlagError::InvalidValue {
                flag: entry.name.clone(),
                kind: entry.value().kind(),
                value: raw.clone(),
                reason: err.to_string(),
            })?;
            flag.mark_set();
        }

        let command: &'a Command = self;
        let ctx = Context::new(Some(command), set, parent);
        check_required_flags(&command.flags, &ctx)?;
        tracing::debug!(command = %command.name, given = ctx.num_flags(), "prepared command");
        Ok(ctx)
    }
}
