//! flagchain - resolve declared flags from the command line, environment and files.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use flagchain::{generate_help, CommandTree, Config, HelpConfig, Report};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Layered flag resolution for command-line applications.
#[derive(Parser, Debug)]
#[command(name = "flagchain", version, about, disable_help_subcommand = true)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve flags for the given arguments and print them as JSON
    Resolve {
        /// JSON flag declarations
        #[arg(long)]
        config: String,

        /// Arguments to resolve, optionally starting with a subcommand name
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Print help text for the declared flags
    Help {
        /// JSON flag declarations
        #[arg(long)]
        config: String,

        /// Show the flags of this subcommand instead of the root
        #[arg(long)]
        subcommand: Option<String>,

        /// List flags sorted by name
        #[arg(long)]
        sort: bool,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// `--debug` wins over `RUST_LOG`; without either only warnings are shown.
/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("flagchain=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flagchain=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load(config: &str) -> Result<CommandTree> {
    let cfg = Config::from_json(config).context("failed to parse config JSON")?;
    cfg.build().context("invalid config")
}

/// Prepare the root, then the subcommand named by the first positional.
fn resolve(config: &str, args: &[String]) -> Result<String> {
    let mut tree = load(config)?;
    let CommandTree { root, subcommands } = &mut tree;

    let root_ctx = root.prepare(args, None).context("failed to resolve flags")?;
    let next = match root_ctx.args().first() {
        Some(name) => subcommands.iter_mut().find(|cmd| &cmd.name == name),
        None => None,
    };

    let report = match next {
        Some(sub) => {
            let name = sub.name.clone();
            let rest = root_ctx.args()[1..].to_vec();
            tracing::debug!(subcommand = %name, "dispatching");
            let child = sub
                .prepare(&rest, Some(&root_ctx))
                .with_context(|| format!("failed to resolve flags for subcommand '{}'", name))?;
            Report::from_context(&child)
        }
        None => Report::from_context(&root_ctx),
    };

    report.to_json().context("failed to serialize result")
}

fn help(config: &str, subcommand: Option<&str>, sort: bool) -> Result<String> {
    let tree = load(config)?;
    let help_config = HelpConfig {
        sort,
        ..HelpConfig::default()
    };

    match subcommand {
        Some(name) => {
            let sub = tree
                .subcommands
                .iter()
                .find(|cmd| cmd.name == name)
                .with_context(|| format!("unknown subcommand '{}'", name))?;
            Ok(generate_help(sub, &[], &help_config))
        }
        None => Ok(generate_help(&tree.root, &tree.subcommands, &help_config)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    match cli.command {
        Commands::Resolve { config, args } => {
            println!("{}", resolve(&config, &args)?);
        }
        Commands::Help {
            config,
            subcommand,
            sort,
        } => {
            print!("{}", help(&config, subcommand.as_deref(), sort)?);
        }
    }

    Ok(())
}
