//! # Error Suggestions
//!
//! This module provides helper functions for generating helpful error
//! messages with hints and suggestions. Errors should tell users what went
//! wrong AND how to fix it.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use repo_params::suggestions;
//!
//! // Instead of:
//! anyhow::bail!("Not a git repository: {}", path.display());
//!
//! // Use:
//! return Err(suggestions::not_a_repository(path));
//! ```

use std::path::Path;

use crate::defaults::{DEFAULT_PARAMS_FILE, PIPELINE_FILE, ROOT_ENV_VAR};
use crate::error::Error;
use crate::repository::Repo;

/// Generate an error for when no snapshot has any parameters.
pub fn no_params() -> anyhow::Error {
    anyhow::anyhow!(
        "no parameter configs files in this repository\n\n\
         hint: Create a {DEFAULT_PARAMS_FILE} file in the repository root\n\
         hint: Declare 'params' for a stage in {PIPELINE_FILE}\n\
         hint: Pass a parameters file as a target, e.g. 'repo-params show config.json'"
    )
}

/// Generate an error for revisions requested outside a git repository.
pub fn not_a_repository(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Not a git repository: {path}\n\n\
         hint: Run the command inside a git working tree\n\
         hint: Use --repo to point at a repository, or set {ROOT_ENV_VAR}\n\
         hint: Without git only the workspace can be shown; drop --rev/-a/-T/-A",
        path = path.display()
    )
}

/// Generate an error for a repository root that does not exist.
pub fn repo_root_not_found(path: &Path) -> anyhow::Error {
    anyhow::anyhow!(
        "Repository root not found: {path}\n\n\
         hint: Check the --repo argument\n\
         hint: Check the {ROOT_ENV_VAR} environment variable",
        path = path.display()
    )
}

/// Generate an error for a revision git cannot resolve.
///
/// Suggests a close branch or tag name when there is one.
pub fn unknown_revision(rev: &str, known_refs: &[String]) -> anyhow::Error {
    let candidates: Vec<&str> = known_refs.iter().map(String::as_str).collect();
    let did_you_mean = find_similar(rev, &candidates)
        .map(|s| format!("\nhint: Did you mean '{s}'?"))
        .unwrap_or_default();

    anyhow::anyhow!(
        "Unknown revision: {rev}{did_you_mean}\n\n\
         hint: List branches with 'git branch -a' and tags with 'git tag'\n\
         hint: Use --all-branches or --all-tags to show every ref"
    )
}

/// Generate an error for an invalid glob pattern given as a target.
pub fn invalid_glob(error: &glob::PatternError) -> anyhow::Error {
    anyhow::anyhow!(
        "Invalid target pattern\n\
         error: {error}\n\n\
         hint: Use * and ? to match stage names, e.g. 'train*'\n\
         hint: Use [abc] for character classes, [!abc] to negate"
    )
}

/// Turn a library error into a user-facing error, with hints where useful.
pub fn for_error(error: Error, repo: Option<&Repo>) -> anyhow::Error {
    match error {
        Error::NoParams => no_params(),
        Error::NotARepository { path } => not_a_repository(Path::new(&path)),
        Error::UnknownRevision { rev } => {
            let known_refs = repo
                .and_then(|repo| repo.scm().ok())
                .map(|scm| {
                    let mut refs = scm.list_branches().unwrap_or_default();
                    refs.extend(scm.list_tags().unwrap_or_default());
                    refs
                })
                .unwrap_or_default();
            unknown_revision(&rev, &known_refs)
        }
        Error::Glob(error) => invalid_glob(&error),
        other => anyhow::Error::new(other),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Levenshtein distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // Single rolling row
    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    for (i, &a_char) in a_chars.iter().enumerate() {
        let mut current = vec![i + 1; b_chars.len() + 1];
        for (j, &b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        previous = current;
    }

    previous[b_chars.len()]
}
