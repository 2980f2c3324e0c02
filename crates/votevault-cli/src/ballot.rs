//! Parsing of `--category` and `--choice` arguments.
//!
//! ```text
//! --category "Mayor=Alice,Bob"   ->  CategorySpec { Mayor, [Alice, Bob] }
//! --choice   "Mayor=Alice"       ->  Choice { Mayor, Alice }  ->  Fingerprint
//! ```
//!
//! Choices are resolved against the loaded registry, so only registered
//! (category, candidate) pairs ever reach the store. [`BallotMenu`] lists
//! those pairs for a voter before they vote.

use std::{collections::HashSet, fmt};

use votevault_crypto::Fingerprint;
use votevault_store::{CandidateRegistry, RegistryContents};

use crate::error::CliError;

/// One category and its candidates, as given to `register`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySpec {
    /// Category name
    pub name: String,
    /// Candidate names in ballot order
    pub candidates: Vec<String>,
}

/// One pick on a ballot, as given to `vote`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    /// Category voted in
    pub category: String,
    /// Candidate voted for
    pub candidate: String,
}

/// Parse `CATEGORY=NAME[,NAME...]`.
///
/// Whitespace around names is trimmed. At least one candidate is required.
pub fn parse_category(argument: &str) -> Result<CategorySpec, CliError> {
    let malformed = |reason| CliError::MalformedArgument { argument: argument.to_string(), reason };

    let (name, list) = argument
        .split_once('=')
        .ok_or_else(|| malformed("expected CATEGORY=NAME[,NAME...]"))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(malformed("empty category name"));
    }

    let candidates: Vec<String> = list.split(',').map(|c| c.trim().to_string()).collect();
    if candidates.iter().any(String::is_empty) {
        return Err(malformed("empty candidate name"));
    }

    Ok(CategorySpec { name: name.to_string(), candidates })
}

/// Parse `CATEGORY=NAME`.
pub fn parse_choice(argument: &str) -> Result<Choice, CliError> {
    let malformed = |reason| CliError::MalformedArgument { argument: argument.to_string(), reason };

    let (category, candidate) =
        argument.split_once('=').ok_or_else(|| malformed("expected CATEGORY=NAME"))?;

    let (category, candidate) = (category.trim(), candidate.trim());
    if category.is_empty() || candidate.is_empty() {
        return Err(malformed("expected CATEGORY=NAME"));
    }

    Ok(Choice { category: category.to_string(), candidate: candidate.to_string() })
}

/// Turn parsed `--category` arguments into registry contents.
pub fn into_contents(specs: Vec<CategorySpec>) -> RegistryContents {
    specs.into_iter().map(|spec| (spec.name, spec.candidates)).collect()
}

/// Resolve one ballot's choices to fingerprints.
///
/// A ballot may skip categories but picks at most one candidate per
/// category.
///
/// # Errors
///
/// - `UnknownCategory` / `UnknownCandidate`: not in the registry
/// - `DuplicateChoice`: two picks in one category
pub fn resolve_ballot(
    registry: &CandidateRegistry,
    choices: &[Choice],
) -> Result<Vec<Fingerprint>, CliError> {
    let mut voted = HashSet::with_capacity(choices.len());

    choices
        .iter()
        .map(|choice| {
            let category = registry
                .category(&choice.category)
                .ok_or_else(|| CliError::UnknownCategory(choice.category.clone()))?;

            if !voted.insert(category.name()) {
                return Err(CliError::DuplicateChoice(choice.category.clone()));
            }

            category.fingerprint_of(&choice.candidate).ok_or_else(|| CliError::UnknownCandidate {
                category: choice.category.clone(),
                candidate: choice.candidate.clone(),
            })
        })
        .collect()
}

/// Numbered list of every category's candidates, in registry order.
///
/// Built from the registry alone, so showing it needs no PIN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BallotMenu {
    registry: CandidateRegistry,
}

impl BallotMenu {
    /// Menu for `registry`.
    pub fn new(registry: CandidateRegistry) -> Self {
        Self { registry }
    }

    /// Registry the menu lists.
    pub fn registry(&self) -> &CandidateRegistry {
        &self.registry
    }
}

impl fmt::Display for BallotMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, category) in self.registry.categories().iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", category.name())?;
            for (number, candidate) in (1..).zip(category.candidates()) {
                write!(f, "\n  {number}. {candidate}")?;
            }
        }
        Ok(())
    }
}
