use super::{check_names, default_for_doc, register_names, resolve_default, seed_destination};
use crate::error::{FlagError, ValueError};
use crate::flag::{flag_names, Flag, FlagDoc};
use crate::flagset::FlagSet;
use crate::value::{parse_u64, render_u64, Destination, Scalar, Slot, Value};

/// A flag holding an unsigned 64-bit integer.
#[derive(Debug, Clone, Default)]
pub struct Uint64Flag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub env_vars: Vec<String>,
    pub file_path: String,
    pub required: bool,
    pub hidden: bool,
    pub value: u64,
    pub default_text: String,
    pub destination: Option<Destination<u64>>,
    pub has_been_set: bool,
    pub placeholder: String,
}

impl Uint64Flag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Flag for Uint64Flag {
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
        self.value = parse_u64(raw)?;
        Ok(())
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn value_string(&self) -> String {
        self.value.to_string()
    }

    fn is_visible(&self) -> bool {
        !self.hidden
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<(), FlagError> {
        let names = self.names();
        check_names(&names)?;

        if let Some(value) = resolve_default(
            &self.name,
            "uint64",
            &self.env_vars,
            &self.file_path,
            true,
            parse_u64,
        )? {
            self.value = value;
            self.has_been_set = true;
        }

        seed_destination(&self.name, self.destination.as_ref(), Some(self.value))?;

        let value = self.value;
        let destination = self.destination.as_ref();
        register_names(set, &names, &self.usage, || {
            let slot = Slot::new(value, destination);
            Box::new(Scalar::new(slot, "uint64", parse_u64, render_u64)) as Box<dyn Value>
        })
    }

    fn doc(&self) -> FlagDoc {
        FlagDoc {
            names: self.names(),
            usage: self.usage.clone(),
            placeholder: self.placeholder.clone(),
            default: default_for_doc(self.value.to_string(), &self.default_text),
            quote_default: false,
            env_vars: self.env_vars.clone(),
            file_path: self.file_path.clone(),
            takes_value: true,
            choices: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_compiled_default_when_no_source() {
        let mut flag = Uint64Flag {
            env_vars: vec!["FLAGCHAIN_U64_UNSET".to_string()],
            value: 30,
            ..Uint64Flag::new("timeout")
        };
        let mut set = FlagSet::new("test");
        flag.apply(&mut set).unwrap();
        assert!(!flag.is_set());
        assert_eq!(flag.value_string(), "30");
        assert_eq!(set.lookup("timeout").unwrap().default, "30");
    }

    #[test]
    fn test_env_value_becomes_default() {
        env::set_var("FLAGCHAIN_U64_ENV", "0x10");
        let mut flag = Uint64Flag {
            env_vars: vec!["FLAGCHAIN_U64_ENV".to_string()],
            value: 30,
            ..Uint64Flag::new("timeout")
        };
        let mut set = FlagSet::new("test");
        flag.apply(&mut set).unwrap();
        assert!(flag.is_set());
        assert_eq!(flag.value, 16);
        assert_eq!(set.lookup("timeout").unwrap().value().render(), "16");
    }

    #[test]
    fn test_file_value_is_parsed_whole() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"42").unwrap();
        let mut flag = Uint64Flag {
            file_path: file.path().to_string_lossy().into_owned(),
            ..Uint64Flag::new("workers")
        };
        flag.apply(&mut FlagSet::new("test")).unwrap();
        assert_eq!(flag.value, 42);
        assert!(flag.is_set());
    }

    #[test]
    fn test_file_with_trailing_newline_is_an_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"42\n").unwrap();
        let mut flag = Uint64Flag {
            file_path: file.path().to_string_lossy().into_owned(),
            ..Uint64Flag::new("workers")
        };
        let result = flag.apply(&mut FlagSet::new("test"));
        assert!(matches!(result, Err(FlagError::InvalidValue { kind: "uint64", .. })));
    }

    #[test]
    fn test_malformed_env_names_flag_and_value() {
        env::set_var("FLAGCHAIN_U64_BAD", "ten");
        let mut flag = Uint64Flag {
            env_vars: vec!["FLAGCHAIN_U64_BAD".to_string()],
            ..Uint64Flag::new("timeout")
        };
        let err = flag.apply(&mut FlagSet::new("test")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("timeout"));
        assert!(msg.contains("\"ten\""));
    }

    #[test]
    fn test_destination_seeded_at_apply() {
        env::set_var("FLAGCHAIN_U64_DEST", "8");
        let dest = Destination::new(0u64);
        let mut flag = Uint64Flag {
            env_vars: vec!["FLAGCHAIN_U64_DEST".to_string()],
            destination: Some(dest.clone()),
            ..Uint64Flag::new("jobs")
        };
        flag.apply(&mut FlagSet::new("test")).unwrap();
        assert_eq!(dest.get(), 8);
    }
}
