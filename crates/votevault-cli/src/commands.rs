//! Subcommand implementations.
//!
//! Generic over the store's backends so tests drive them against memory or
//! temp directories without a terminal.

use tracing::info;
use votevault_store::{BlobStore, CandidateRegistry, Entropy, RecordStore, StoreError};

use crate::{
    ballot::{BallotMenu, CategorySpec, Choice, into_contents, resolve_ballot},
    error::CliError,
    report::ResultReport,
};

/// Register a new event under `name`.
pub fn register<S: BlobStore, E: Entropy>(
    store: &RecordStore<S, E>,
    name: &str,
    pin: &[u8],
    categories: Vec<CategorySpec>,
) -> Result<CandidateRegistry, CliError> {
    let registry = store.register(name, pin, into_contents(categories))?;

    info!(registry = name, categories = registry.categories().len(), "registered event");
    Ok(registry)
}

/// List the categories and candidates of the event `name`.
///
/// The registry is stored in the clear, so no PIN is asked for.
pub fn candidates<S: BlobStore, E: Entropy>(
    store: &RecordStore<S, E>,
    name: &str,
) -> Result<BallotMenu, CliError> {
    Ok(BallotMenu::new(store.load_registry(name)?))
}

/// Cast one ballot for the event `name`.
///
/// The PIN is checked before the ballot is resolved, so a wrong PIN reports
/// as such even when the choices are also wrong. Returns the number of
/// selections recorded.
pub fn vote<S: BlobStore, E: Entropy>(
    store: &RecordStore<S, E>,
    name: &str,
    pin: &[u8],
    choices: &[Choice],
) -> Result<usize, CliError> {
    let registry = store.load_registry(name)?;
    if !store.verify_pin(&registry, pin) {
        return Err(StoreError::PinMismatch.into());
    }

    let selections = resolve_ballot(&registry, choices)?;
    store.store_votes(&registry, pin, &selections)?;

    info!(registry = name, selections = selections.len(), "ballot recorded");
    Ok(selections.len())
}

/// Build the result report for the event `name`.
pub fn results<S: BlobStore, E: Entropy>(
    store: &RecordStore<S, E>,
    name: &str,
    pin: &[u8],
) -> Result<ResultReport, CliError> {
    let registry = store.load_registry(name)?;
    let tally = store.read_votes(&registry, pin)?;

    Ok(ResultReport::new(&registry, &tally))
}
