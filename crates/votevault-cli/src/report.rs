//! Result report: per-candidate counts and winners per category.
//!
//! Counts are looked up by fingerprint, so a candidate without a recorded
//! vote shows 0. Only candidates with a recorded vote can win; candidates
//! tied at the highest count share the win and are listed in registry
//! order.

use std::{cmp::Ordering, fmt};

use votevault_store::{CandidateRegistry, TallyMapping};

/// Separator between tied winners
const TIE_SEPARATOR: &str = " and ";

/// Count for one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCount {
    /// Candidate name
    pub name: String,
    /// Recorded votes, 0 if none
    pub votes: u64,
}

/// Winning candidate(s) of a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Winner {
    /// Names tied at the highest count, in registry order
    pub names: Vec<String>,
    /// The highest count
    pub votes: u64,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = if self.votes == 1 { "vote" } else { "votes" };
        write!(f, "{} ({} {unit})", self.names.join(TIE_SEPARATOR), self.votes)
    }
}

/// Results for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryResult {
    /// Category name
    pub category: String,
    /// Every registered candidate, in registry order
    pub candidates: Vec<CandidateCount>,
    /// `None` if nobody in the category has a recorded vote
    pub winner: Option<Winner>,
}

/// Full result report for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultReport {
    categories: Vec<CategoryResult>,
}

impl ResultReport {
    /// Build the report for `registry` from its decrypted tally.
    pub fn new(registry: &CandidateRegistry, tally: &TallyMapping) -> Self {
        let categories = registry
            .categories()
            .iter()
            .map(|category| {
                let mut candidates = Vec::with_capacity(category.candidates().len());
                let mut winner: Option<Winner> = None;

                for (name, fingerprint) in category.fingerprints() {
                    let recorded = tally.get(&fingerprint);
                    let votes = recorded.unwrap_or(0);
                    candidates.push(CandidateCount { name: name.to_string(), votes });

                    // Unrecorded candidates are never eligible, even at 0
                    if recorded.is_none() {
                        continue;
                    }
                    match winner.as_ref().map(|current| votes.cmp(&current.votes)) {
                        Some(Ordering::Less) => {},
                        Some(Ordering::Equal) => {
                            if let Some(current) = winner.as_mut() {
                                current.names.push(name.to_string());
                            }
                        },
                        Some(Ordering::Greater) | None => {
                            winner = Some(Winner { names: vec![name.to_string()], votes });
                        },
                    }
                }

                CategoryResult { category: category.name().to_string(), candidates, winner }
            })
            .collect();

        Self { categories }
    }

    /// Per-category results in registry order.
    pub fn categories(&self) -> &[CategoryResult] {
        &self.categories
    }
}

impl fmt::Display for ResultReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.categories {
            writeln!(f, "{}", result.category)?;
            for candidate in &result.candidates {
                writeln!(f, "  {}: {}", candidate.name, candidate.votes)?;
            }
        }

        writeln!(f)?;
        write!(f, "Winners")?;

        let mut any = false;
        for result in &self.categories {
            if let Some(winner) = &result.winner {
                write!(f, "\n  {}: {winner}", result.category)?;
                any = true;
            }
        }
        if !any {
            write!(f, "\n  (no votes recorded)")?;
        }
        Ok(())
    }
}
