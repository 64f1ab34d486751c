//! # Diff Command Implementation
//!
//! This module implements the `diff` subcommand, which compares the
//! parameters of two snapshots. By default it compares `HEAD` with the
//! workspace, so it shows parameter edits that are not committed yet.
//!
//! Only changed parameters are printed unless `--all` is given. A repository
//! without any parameters prints nothing.

use anyhow::Result;
use clap::Args;
use log::debug;

use repo_params::brancher::{RepoBrancher, RevSelection};
use repo_params::defaults::WORKSPACE;
use repo_params::diagnostics::LogObserver;
use repo_params::error::Error;
use repo_params::params::{self, ParamsResult, ShowOptions, SnapshotParams};
use repo_params::render;
use repo_params::suggestions;

use crate::cli::GlobalOptions;

/// Show parameter changes between two revisions
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Old revision.
    #[arg(value_name = "A_REV", default_value = "HEAD")]
    pub a_rev: String,

    /// New revision. `workspace` is the working copy.
    #[arg(value_name = "B_REV", default_value = WORKSPACE)]
    pub b_rev: String,

    /// Limit the comparison to these stages or parameter files (repeatable).
    #[arg(long = "targets", value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Include unchanged parameters.
    #[arg(long)]
    pub all: bool,

    /// Compare only the keys stages declare as dependencies.
    #[arg(long)]
    pub deps: bool,

    /// Print JSON.
    #[arg(long, conflicts_with = "md")]
    pub json: bool,

    /// Print a Markdown table.
    #[arg(long)]
    pub md: bool,
}

/// Execute the `diff` command.
pub fn execute(args: DiffArgs, globals: &GlobalOptions) -> Result<()> {
    let repo = super::open_repo(&globals.repo_root)?;
    let selection = RevSelection::revs([args.a_rev.clone(), args.b_rev.clone()]);
    let brancher = RepoBrancher::new(&repo, selection);

    let options = ShowOptions::new()
        .targets(args.targets)
        .deps(args.deps)
        .hide_workspace(false);

    let result = match params::show(&brancher, &options, &LogObserver) {
        Ok(result) => result,
        Err(Error::NoParams) => {
            debug!("No params to compare");
            return Ok(());
        }
        Err(e) => return Err(suggestions::for_error(e, Some(&repo))),
    };

    let old = snapshot_params(&result, &args.a_rev);
    let new = snapshot_params(&result, &args.b_rev);
    let changes = params::diff(&old, &new, args.all);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&changes)?);
    } else if !changes.is_empty() {
        print!(
            "{}",
            render::changes_table(&changes, &args.a_rev, &args.b_rev, args.md, &globals.output)
        );
    }
    Ok(())
}

/// Parameters of the snapshot named `rev`, empty if it had none.
fn snapshot_params(result: &ParamsResult, rev: &str) -> SnapshotParams {
    result
        .iter()
        .find(|(id, _)| id.names().any(|name| name == rev))
        .map(|(_, params)| params.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use repo_params::brancher::SnapshotId;
    use repo_params::loader::ParsedContent;

    fn result() -> ParamsResult {
        let mut content = ParsedContent::new();
        content.insert("lr".to_string(), serde_json::json!(0.1));
        let params = SnapshotParams::from([("params.yaml".to_string(), content)]);

        let mut result = ParamsResult::new();
        result.insert(SnapshotId::workspace(), params.clone());
        result.insert(
            SnapshotId::from_names(&["HEAD".to_string(), "main".to_string()]),
            params.clone(),
        );
        result.insert(SnapshotId::from_names(&["topic,a".to_string()]), params);
        result
    }

    #[test]
    fn test_snapshot_params_matches_grouped_names() {
        let result = result();
        assert_eq!(snapshot_params(&result, "main").len(), 1);
        assert_eq!(snapshot_params(&result, "HEAD").len(), 1);
        assert_eq!(snapshot_params(&result, "workspace").len(), 1);
        assert!(snapshot_params(&result, "dev").is_empty());
        assert_eq!(snapshot_params(&result, "topic,a").len(), 1);
        assert!(snapshot_params(&result, "topic").is_empty());
    }
}
