//! votevault binary.
//!
//! # Usage
//!
//! ```bash
//! # Create an event (PIN from the environment, a masked terminal prompt,
//! # or the first line of piped stdin)
//! VOTEVAULT_PIN=1234 votevault register town \
//!     --category "Mayor=Alice,Bob" --category "Sheriff=Carol,Dave"
//!
//! # List the ballot options (no PIN needed)
//! votevault candidates town
//!
//! # Cast a ballot
//! echo 1234 | votevault vote town --choice "Mayor=Alice" --choice "Sheriff=Dave"
//!
//! # Show counts and winners
//! VOTEVAULT_PIN=1234 votevault results town
//! ```

use std::{
    env, fs,
    io::{self, IsTerminal, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use votevault_cli::{
    CategorySpec, Choice, CliError, PIN_ENV_VAR, commands, parse_category, parse_choice,
    prompt_pin, read_pin,
};
use votevault_store::{
    DEFAULT_CANDIDATES_DIR, DEFAULT_PARITY_BYTES, DEFAULT_PIN_SENTINEL_KEY, DEFAULT_VOTES_DIR,
    RecordStore, StoreConfig,
};
use zeroize::Zeroizing;

/// Secure offline vote record store
#[derive(Parser, Debug)]
#[command(name = "votevault")]
#[command(about = "Encrypted, error-corrected vote records")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Directory holding candidate registries
    #[arg(long, global = true, default_value = DEFAULT_CANDIDATES_DIR)]
    candidates_dir: PathBuf,

    /// Directory holding sealed vote files
    #[arg(long, global = true, default_value = DEFAULT_VOTES_DIR)]
    votes_dir: PathBuf,

    /// Reed-Solomon parity bytes per 255-byte codeword (even, 2..=254)
    #[arg(long, global = true, default_value_t = DEFAULT_PARITY_BYTES)]
    parity_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register an event and its candidates
    Register {
        /// Event name
        name: String,

        /// Category and its candidates, as CATEGORY=NAME[,NAME...]
        #[arg(long = "category", required = true, value_parser = parse_category)]
        categories: Vec<CategorySpec>,
    },

    /// List the categories and candidates of an event
    Candidates {
        /// Event name
        name: String,
    },

    /// Cast one ballot
    Vote {
        /// Event name
        name: String,

        /// One pick, as CATEGORY=NAME; at most one per category
        #[arg(long = "choice", value_parser = parse_choice)]
        choices: Vec<Choice>,
    },

    /// Print vote counts and winners
    Results {
        /// Event name
        name: String,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            if e.is_usage_error() { ExitCode::from(2) } else { ExitCode::FAILURE }
        },
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = StoreConfig {
        candidates_dir: args.candidates_dir,
        votes_dir: args.votes_dir,
        parity_bytes: args.parity_bytes,
        pin_sentinel_key: DEFAULT_PIN_SENTINEL_KEY.to_string(),
    };

    fs::create_dir_all(&config.candidates_dir)?;
    fs::create_dir_all(&config.votes_dir)?;

    let store = RecordStore::open(&config)?;

    match args.command {
        Command::Register { name, categories } => {
            commands::register(&store, &name, &pin()?, categories)?;
        },
        Command::Candidates { name } => {
            let menu = commands::candidates(&store, &name)?;
            writeln!(io::stdout().lock(), "{menu}")?;
        },
        Command::Vote { name, choices } => {
            commands::vote(&store, &name, &pin()?, &choices)?;
        },
        Command::Results { name } => {
            let report = commands::results(&store, &name, &pin()?)?;
            writeln!(io::stdout().lock(), "{report}")?;
        },
    }

    Ok(())
}

/// PIN from the environment, a masked prompt, or piped stdin, in that order.
fn pin() -> Result<Zeroizing<Vec<u8>>, CliError> {
    match env::var(PIN_ENV_VAR).ok() {
        None if io::stdin().is_terminal() => prompt_pin("PIN: "),
        from_env => read_pin(from_env, io::stdin().lock()),
    }
}
