//! Post-parse validation of required flags.

use crate::context::Context;
use crate::error::FlagError;
use crate::flag::Flag;

/// Check that every required flag of a scope received a value.
///
/// Only the scope's own declarations and its own flag set are consulted; a
/// value given to a parent scope does not satisfy a child's requirement.
/// All missing flags are reported together, each by its first name longer
/// than one character.
pub fn check_required_flags(flags: &[Box<dyn Flag>], ctx: &Context<'_>) -> Result<(), FlagError> {
    let mut missing = Vec::new();

    for flag in flags.iter().filter(|flag| flag.is_required()) {
        let names = flag.names();
        let satisfied =
            flag.is_set() || names.iter().any(|name| ctx.flag_set().is_visited(name));
        if satisfied {
            continue;
        }

        match names.iter().find(|name| name.chars().count() > 1) {
            Some(name) => missing.push(name.clone()),
            None => {
                tracing::warn!(
                    names = ?names,
                    "required flag with only single-character names is missing but cannot be reported"
                );
            }
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FlagError::MissingRequired(missing))
    }
}
