use super::{check_names, register_names, resolve_default, seed_destination};
use crate::error::{FlagError, ValueError};
use crate::flag::{flag_names, Flag, FlagDoc};
use crate::flagset::FlagSet;
use crate::value::{parse_path, render_path, Destination, Scalar, Slot, Value};

/// A flag holding a filesystem path, kept as the raw string.
#[derive(Debug, Clone, Default)]
pub struct PathFlag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub env_vars: Vec<String>,
    pub file_path: String,
    pub required: bool,
    pub hidden: bool,
    /// Hint for shell completion that the value names a file.
    pub takes_file: bool,
    pub value: String,
    pub default_text: String,
    pub destination: Option<Destination<String>>,
    pub has_been_set: bool,
    pub placeholder: String,
}

impl PathFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Flag for PathFlag {
    fn names(&self) -> Vec<String> {
        flag_names(&self.name, &self.aliases)
    }

    fn is_set(&self) -> bool {
        self.has_been_set
    }

    fn mark_set(&mut self) {
        self.has_been_set = true;
    }

    fn sync(&mut self, raw: &str) -> Result<(), ValueError> {
        self.value = parse_path(raw)?;
        Ok(())
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn value_string(&self) -> String {
        self.value.clone()
    }

    fn is_visible(&self) -> bool {
        !self.hidden
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<(), FlagError> {
        let names = self.names();
        check_names(&names)?;

        // Paths accept any string, including an empty one.
        if let Some(value) = resolve_default(
            &self.name,
            "path",
            &self.env_vars,
            &self.file_path,
            false,
            parse_path,
        )? {
            self.value = value;
            self.has_been_set = true;
        }

        seed_destination(&self.name, self.destination.as_ref(), Some(self.value.clone()))?;

        let value = &self.value;
        let destination = self.destination.as_ref();
        register_names(set, &names, &self.usage, || {
            let slot = Slot::new(value.clone(), destination);
            Box::new(Scalar::new(slot, "path", parse_path, render_path)) as Box<dyn Value>
        })
    }

    fn doc(&self) -> FlagDoc {
        let (default, quote_default) = if !self.default_text.is_empty() {
            (Some(self.default_text.clone()), false)
        } else if !self.value.is_empty() {
            (Some(self.value.clone()), true)
        } else {
            (None, false)
        };
        FlagDoc {
            names: self.names(),
            usage: self.usage.clone(),
            placeholder: self.placeholder.clone(),
            default,
            quote_default,
            env_vars: self.env_vars.clone(),
            file_path: self.file_path.clone(),
            takes_value: true,
            choices: None,
        }
    }
}
