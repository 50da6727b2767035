//! flagchain - layered flag resolution for command-line applications.
//!
//! Flags take their value from the command line, then from environment
//! variables or files, then from a compiled-in default. Commands form a
//! tree of execution contexts, and a lookup in a child context walks up to
//! the root until some scope was explicitly given the flag.

pub mod choice;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod flag;
pub mod flags;
pub mod flagset;
pub mod help;
pub mod report;
pub mod required;
pub mod source;
pub mod value;

pub use choice::{Choice, ChoiceValue, Choices};
pub use command::Command;
pub use config::{CommandTree, Config, ConfigError, FlagConfig, FlagKind};
pub use context::Context;
pub use error::{FlagError, ValueError};
pub use flag::{help_flag, version_flag, Flag, FlagDoc};
pub use flags::{BoolFlag, ChoiceFlag, PathFlag, Uint64Flag};
pub use flagset::FlagSet;
pub use help::{generate_help, render_flags, DefaultFlagFormatter, EnvHintStyle, FlagFormatter, HelpConfig};
pub use report::{FlagReport, Report};
pub use required::check_required_flags;
pub use value::{Destination, Value};
