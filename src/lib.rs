//! Workspace root package for votevault.
//!
//! Carries no code of its own. It exists so `cargo-husky` can install the
//! repository's git hooks; the crates live under `crates/`.
