//! Flags over a closed, caller-defined set of values.
//!
//! A [`Choice`] is the pair of operations the engine needs to move a domain
//! value in and out of the command line: decode a token into a value and
//! encode a value back into its token. The engine never looks at `T` itself,
//! so any finite-domain type (an enum, a small struct, a plain string) can
//! back a [`ChoiceFlag`].

use crate::error::{FlagError, ValueError};
use crate::flag::{flag_names, Flag, FlagDoc};
use crate::flags::{check_names, register_names, resolve_default, seed_destination};
use crate::flagset::FlagSet;
use crate::value::{Destination, Value};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// Bidirectional mapping between tokens and values.
pub trait Choice<T>: fmt::Debug {
    /// The value for `token`, or `None` when the token is not recognised.
    fn decode(&self, token: &str) -> Option<T>;

    /// The token for `value`, or an empty string for an unregistered value.
    fn encode(&self, value: &T) -> String;

    /// Every accepted token.
    fn tokens(&self) -> Vec<String>;
}

/// The default [`Choice`]: a token → value table and its inverse.
///
/// Values must be pairwise distinct. The inverse table is built by flipping
/// the forward one, so when two tokens map to equal values the token inserted
/// last is the one `encode` returns.
#[derive(Debug, Clone)]
pub struct Choices<T> {
    forward: HashMap<String, T>,
    reverse: HashMap<T, String>,
    tokens: Vec<String>,
}

impl<T> Choices<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    /// Build from `(token, value)` pairs. Tokens keep their given order.
    pub fn new<I, S>(mapping: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
    {
        let mut forward = HashMap::new();
        let mut reverse = HashMap::new();
        let mut tokens = Vec::new();

        for (token, value) in mapping {
            let token = token.into();
            match forward.insert(token.clone(), value.clone()) {
                Some(previous) => {
                    if reverse.get(&previous) == Some(&token) {
                        reverse.remove(&previous);
                    }
                }
                None => tokens.push(token.clone()),
            }
            if let Some(dropped) = reverse.insert(value, token.clone()) {
                if dropped != token {
                    tracing::warn!(
                        kept = %token,
                        dropped = %dropped,
                        "choice tokens map to the same value; only one can be displayed"
                    );
                }
            }
        }

        Self {
            forward,
            reverse,
            tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<T> Choices<T>
where
    T: Clone + Eq + Hash + fmt::Debug + fmt::Display,
{
    /// Build from values that already know their canonical token.
    pub fn from_display<I>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        Self::new(values.into_iter().map(|v| (v.to_string(), v)))
    }
}

impl Choices<String> {
    /// Each string is both the token and the value.
    pub fn from_strings<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(values.into_iter().map(|s| {
            let s = s.into();
            (s.clone(), s)
        }))
    }
}

impl<T> Choice<T> for Choices<T>
where
    T: Clone + Eq + Hash + fmt::Debug,
{
    fn decode(&self, token: &str) -> Option<T> {
        self.forward.get(token).cloned()
    }

    fn encode(&self, value: &T) -> String {
        self.reverse.get(value).cloned().unwrap_or_default()
    }

    fn tokens(&self) -> Vec<String> {
        self.tokens.clone()
    }
}

fn unknown_token<T>(choice: &dyn Choice<T>) -> ValueError {
    ValueError::new(format!(
        "expected one of {}",
        choice.tokens().join(", ")
    ))
}

/// Where a choice cell keeps its value.
enum Storage<T> {
    /// Flag-owned, possibly empty.
    Owned(Option<T>),
    /// Caller-owned; always holds a value.
    Bound(Destination<T>),
}

/// The cell a [`ChoiceFlag`] registers for each of its names.
pub struct ChoiceValue<T> {
    storage: Storage<T>,
    choice: Rc<dyn Choice<T>>,
}

impl<T: Clone> ChoiceValue<T> {
    /// A cell with its own storage, seeded with `initial`.
    pub fn owned(choice: Rc<dyn Choice<T>>, initial: Option<T>) -> Self {
        Self {
            storage: Storage::Owned(initial),
            choice,
        }
    }

    /// A cell writing through to `destination`.
    ///
    /// Binding does not write; [`ChoiceFlag::apply`] seeds the destination
    /// once before registering its names.
    pub fn bound(choice: Rc<dyn Choice<T>>, destination: &Destination<T>) -> Self {
        Self {
            storage: Storage::Bound(destination.clone()),
            choice,
        }
    }

    /// The current value; `None` when owned storage is still empty.
    pub fn get(&self) -> Option<T> {
        match &self.storage {
            Storage::Owned(value) => value.clone(),
            Storage::Bound(dest) => Some(dest.get()),
        }
    }
}

impl<T: Clone> fmt::Debug for ChoiceValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChoiceValue")
            .field("token", &self.render())
            .finish()
    }
}

impl<T: Clone> Value for ChoiceValue<T> {
    fn set(&mut self, raw: &str) -> Result<(), ValueError> {
        let value = self
            .choice
            .decode(raw)
            .ok_or_else(|| unknown_token(self.choice.as_ref()))?;
        match &mut self.storage {
            Storage::Owned(slot) => {
                *slot = Some(value);
                Ok(())
            }
            Storage::Bound(dest) => dest.store(value),
        }
    }

    fn render(&self) -> String {
        self.get()
            .map(|value| self.choice.encode(&value))
            .unwrap_or_default()
    }

    fn kind(&self) -> &'static str {
        "choice"
    }

    fn is_bound(&self) -> bool {
        matches!(self.storage, Storage::Bound(_))
    }
}

/// A flag whose accepted values are the tokens of a [`Choice`].
#[derive(Debug)]
pub struct ChoiceFlag<T> {
    pub name: String,
    pub aliases: Vec<String>,
    pub usage: String,
    pub env_vars: Vec<String>,
    pub file_path: String,
    pub required: bool,
    pub hidden: bool,
    pub value: Option<T>,
    pub choice: Option<Rc<dyn Choice<T>>>,
    pub default_text: String,
    pub destination: Option<Destination<T>>,
    pub has_been_set: bool,
    pub placeholder: String,
}

impl<T> Default for ChoiceFlag<T> {
    fn default() -> Self {
        Self {
            name: String::new(),
            aliases: Vec::new(),
            usage: String::new(),
            env_vars: Vec::new(),
            file_path: String::new(),
            required: false,
            hidden: false,
            value: None,
            choice: None,
            default_text: String::new(),
            destination: None,
            has_been_set: false,
            placeholder: String::new(),
        }
    }
}

impl<T> ChoiceFlag<T> {
    pub fn new(name: impl Into<String>, choice: impl Choice<T> + 'static) -> Self {
        Self {
            name: name.into(),
            choice: Some(Rc::new(choice)),
            ..Self::default()
        }
    }

    /// The shared registry, if one was supplied.
    pub fn registry(&self) -> Option<&dyn Choice<T>> {
        self.choice.as_deref()
    }
}

impl<T> Flag for ChoiceFlag<T>
where
    T: Clone + fmt::Debug + 'static,
{
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
        let choice = self
            .choice
            .as_deref()
            .ok_or_else(|| ValueError::new("no choices declared"))?;
        let value = choice.decode(raw).ok_or_else(|| unknown_token(choice))?;
        self.value = Some(value);
        Ok(())
    }

    fn is_required(&self) -> bool {
        self.required
    }

    fn usage(&self) -> &str {
        &self.usage
    }

    fn value_string(&self) -> String {
        match (&self.choice, &self.value) {
            (Some(choice), Some(value)) => choice.encode(value),
            _ => String::new(),
        }
    }

    fn is_visible(&self) -> bool {
        !self.hidden
    }

    fn apply(&mut self, set: &mut FlagSet) -> Result<(), FlagError> {
        let names = self.names();
        check_names(&names)?;

        let choice = self
            .choice
            .clone()
            .ok_or_else(|| FlagError::MissingChoice(self.name.clone()))?;

        if let Some(value) = resolve_default(
            &self.name,
            "choice",
            &self.env_vars,
            &self.file_path,
            false,
            |raw| choice.decode(raw).ok_or_else(|| unknown_token(choice.as_ref())),
        )? {
            self.value = Some(value);
            self.has_been_set = true;
        }

        seed_destination(&self.name, self.destination.as_ref(), self.value.clone())?;

        let value = &self.value;
        let destination = self.destination.as_ref();
        register_names(set, &names, &self.usage, || {
            let cell = match destination {
                Some(dest) => ChoiceValue::bound(Rc::clone(&choice), dest),
                None => ChoiceValue::owned(Rc::clone(&choice), value.clone()),
            };
            Box::new(cell) as Box<dyn Value>
        })
    }

    fn doc(&self) -> FlagDoc {
        let (default, quote_default) = if !self.default_text.is_empty() {
            (Some(self.default_text.clone()), false)
        } else if self.value.is_some() {
            (Some(self.value_string()), true)
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
            choices: self.choice.as_ref().map(|c| c.tokens()),
        }
    }
}
