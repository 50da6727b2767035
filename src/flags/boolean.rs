use super::{check_names, default_for_doc, register_names, resolve_default, seed_destination};
use crate::error::{FlagError, ValueError};
use crate::flag::{flag_names, Flag, FlagDoc};
use crate::flagset::FlagSet;
use crate::value::{parse_bool, render_bool, Destination, Scalar, Slot, Value};

/// A flag whose presence means `true`.
#[derive(Debug, Clone, Default)]
pub struct BoolFlag {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub env_vars: Vec<String>,
    pub file_path: String,
    pub required: bool,
    pub hidden: bool,
    pub value: bool,
    pub default_text: String,
    pub destination: Option<Destination<bool>>,
    pub has_been_set: bool,
    pub hide_default_value: bool,
}

impl BoolFlag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Flag for BoolFlag {
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
        self.value = parse_bool(raw)?;
        Ok(())
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn takes_value(&self) -> bool {
        false
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn value_string(&self) -> String {
        String::new()
    }

    fn is_visible(&self) -> bool {
        !self.hidden
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<(), FlagError> {
        let names = self.names();
        check_names(&names)?;

        // An empty variable or file leaves the flag unset.
        if let Some(value) = resolve_default(
            &self.name,
            "bool",
            &self.env_vars,
            &self.file_path,
            true,
            parse_bool,
        )? {
            self.value = value;
            self.has_been_set = true;
        }

        seed_destination(&self.name, self.destination.as_ref(), Some(self.value))?;

        let value = self.value;
        let destination = self.destination.as_ref();
        register_names(set, &names, &self.usage, || {
            let slot = Slot::new(value, destination);
            Box::new(Scalar::new(slot, "bool", parse_bool, render_bool).boolean()) as Box<dyn Value>
        })
    }

    fn doc(&self) -> FlagDoc {
        let default = if self.hide_default_value {
            None
        } else {
            default_for_doc(self.value.to_string(), &self.default_text)
        };
        FlagDoc {
            names: self.names(),
            usage: self.usage.clone(),
            placeholder: String::new(),
            default,
            quote_default: false,
            env_vars: self.env_vars.clone(),
            file_path: self.file_path.clone(),
            takes_value: false,
            choices: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn args(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unset_by_default() {
        let mut flag = BoolFlag::new("verbose");
        let mut set = FlagSet::new("test");
        flag.apply(&mut set).unwrap();
        assert!(!flag.is_set());
        assert_eq!(set.lookup("verbose").unwrap().value().render(), "false");
        assert!(!flag.takes_value());
        assert_eq!(flag.value_string(), "");
    }

    #[test]
    fn test_env_sets_value_and_marks_set() {
        env::set_var("FLAGCHAIN_BOOL_ENV", "true");
        let mut flag = BoolFlag {
            env_vars: vec!["FLAGCHAIN_BOOL_ENV".to_string()],
            ..BoolFlag::new("debug")
        };
        let mut set = FlagSet::new("test");
        flag.apply(&mut set).unwrap();
        assert!(flag.is_set());
        assert!(flag.value);
        assert!(!set.is_visited("debug"));
        assert_eq!(set.lookup("debug").unwrap().default, "true");
    }

    #[test]
    fn test_empty_env_is_ignored() {
        env::set_var("FLAGCHAIN_BOOL_EMPTY", "");
        let mut flag = BoolFlag {
            env_vars: vec!["FLAGCHAIN_BOOL_EMPTY".to_string()],
            ..BoolFlag::new("debug")
        };
        flag.apply(&mut FlagSet::new("test")).unwrap();
        assert!(!flag.is_set());
        assert!(!flag.value);
    }

    #[test]
    fn test_malformed_env_aborts_apply() {
        env::set_var("FLAGCHAIN_BOOL_BAD", "sure");
        let mut flag = BoolFlag {
            env_vars: vec!["FLAGCHAIN_BOOL_BAD".to_string()],
            ..BoolFlag::new("debug")
        };
        let mut set = FlagSet::new("test");
        let result = flag.apply(&mut set);
        assert!(matches!(
            result,
            Err(FlagError::InvalidValue { flag, value, .. }) if flag == "debug" && value == "sure"
        ));
        assert!(set.lookup("debug").is_none());
    }

    #[test]
    fn test_destination_follows_command_line() {
        let dest = Destination::new(false);
        let mut flag = BoolFlag {
            aliases: vec!["v".to_string()],
            destination: Some(dest.clone()),
            ..BoolFlag::new("verbose")
        };
        let mut set = FlagSet::new("test");
        flag.apply(&mut set).unwrap();
        assert!(!dest.get());
        set.parse(&args(&["-v"])).unwrap();
        assert!(dest.get());
    }

    #[test]
    fn test_busy_destination_is_a_setup_error() {
        let dest = Destination::new(false);
        let mut flag = BoolFlag {
            destination: Some(dest.clone()),
            ..BoolFlag::new("verbose")
        };
        let mut set = FlagSet::new("test");
        dest.with(|_| {
            let result = flag.apply(&mut set);
            assert!(matches!(result, Err(FlagError::DestinationUnavailable(name)) if name == "verbose"));
        });
        assert!(set.lookup("verbose").is_none());
    }

    #[test]
    fn test_empty_name_is_rejected() {
        let mut set = FlagSet::new("test");
        let result = BoolFlag::default().apply(&mut set);
        assert!(matches!(result, Err(FlagError::EmptyName(names)) if names == vec![""]));
        assert!(set.lookup("").is_none());

        let mut flag = BoolFlag {
            aliases: vec![" ".to_string()],
            ..BoolFlag::new("verbose")
        };
        assert!(matches!(flag.apply(&mut set), Err(FlagError::EmptyName(_))));
        assert!(set.lookup("verbose").is_none());
    }

    #[test]
    fn test_sync_takes_command_line_value() {
        let mut flag = BoolFlag::new("verbose");
        flag.sync("true").unwrap();
        assert!(flag.value);
        assert!(flag.sync("maybe").is_err());
        assert!(flag.value);
    }

    #[test]
    fn test_doc_hides_default_when_asked() {
        let flag = BoolFlag {
            hide_default_value: true,
            ..BoolFlag::new("help")
        };
        assert_eq!(flag.doc().default, None);
        assert_eq!(BoolFlag::new("x").doc().default, Some("false".to_string()));
    }
}
