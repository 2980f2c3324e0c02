//! votevault command line
//!
//! Library half of the `votevault` binary: argument parsing helpers, PIN
//! input, the subcommands and the result report. The binary only wires
//! these to clap, logging and the process exit code.
//!
//! ```text
//! votevault register town --category "Mayor=Alice,Bob"
//! votevault candidates town
//! votevault vote town --choice "Mayor=Alice"
//! votevault results town
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod ballot;
pub mod commands;
mod error;
pub mod pin;
pub mod report;

pub use ballot::{BallotMenu, CategorySpec, Choice, parse_category, parse_choice};
pub use error::CliError;
pub use pin::{MaskedPin, PIN_ENV_VAR, PinKey, prompt_pin, read_pin};
pub use report::ResultReport;
