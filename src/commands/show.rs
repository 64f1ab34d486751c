//! # Show Command Implementation
//!
//! This module implements the `show` subcommand, which prints the parameters
//! of the workspace and any requested revisions side by side.
//!
//! ## Functionality
//!
//! - **Targets**: restrict output to stages (by name, address or glob) or to
//!   specific parameter files
//! - **Revisions**: `--rev`, `--all-branches`, `--all-tags`, `--all-commits`
//! - **Declared keys only**: `--deps` reports just the keys stages declare
//! - **Formats**: aligned table (default), `--md` Markdown table, `--json`
//!
//! The workspace column is omitted when it is identical to the checked-out
//! branch, unless `--keep-workspace` is given.

use anyhow::Result;
use clap::Args;

use repo_params::brancher::{RepoBrancher, RevSelection};
use repo_params::diagnostics::LogObserver;
use repo_params::params::{self, ShowOptions};
use repo_params::render;
use repo_params::suggestions;

use crate::cli::GlobalOptions;

/// Show parameters of the workspace and selected revisions
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Stages or parameter files to show. Defaults to all stages and params.yaml.
    #[arg(value_name = "TARGETS")]
    pub targets: Vec<String>,

    /// Also show this revision (repeatable).
    #[arg(long = "rev", value_name = "REV")]
    pub revs: Vec<String>,

    /// Show parameters of every branch.
    #[arg(short = 'a', long)]
    pub all_branches: bool,

    /// Show parameters of every tag.
    #[arg(short = 'T', long)]
    pub all_tags: bool,

    /// Show parameters of every commit.
    #[arg(short = 'A', long)]
    pub all_commits: bool,

    /// Show only the keys stages declare as dependencies.
    #[arg(long)]
    pub deps: bool,

    /// Keep the workspace column even when it matches the current branch.
    #[arg(long)]
    pub keep_workspace: bool,

    /// Print JSON.
    #[arg(long, conflicts_with = "md")]
    pub json: bool,

    /// Print a Markdown table.
    #[arg(long)]
    pub md: bool,
}

impl ShowArgs {
    fn selection(&self) -> RevSelection {
        RevSelection {
            revs: self.revs.clone(),
            all_branches: self.all_branches,
            all_tags: self.all_tags,
            all_commits: self.all_commits,
        }
    }
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs, globals: &GlobalOptions) -> Result<()> {
    let repo = super::open_repo(&globals.repo_root)?;
    let brancher = RepoBrancher::new(&repo, args.selection());

    let options = ShowOptions::new()
        .targets(args.targets)
        .deps(args.deps)
        .hide_workspace(!args.keep_workspace);

    let result = params::show(&brancher, &options, &LogObserver)
        .map_err(|e| suggestions::for_error(e, Some(&repo)))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render::table(&result, args.md, &globals.output));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_show_flags_build_selection() {
        let args = ShowArgs {
            targets: vec![],
            revs: vec!["main".to_string()],
            all_branches: true,
            all_tags: false,
            all_commits: true,
            deps: false,
            keep_workspace: false,
            json: false,
            md: false,
        };
        let selection = args.selection();
        assert_eq!(selection.revs, vec!["main"]);
        assert!(selection.all_branches);
        assert!(!selection.all_tags);
        assert!(selection.all_commits);
    }

    #[test]
    fn test_json_conflicts_with_md() {
        assert!(Cli::try_parse_from(["repo-params", "show", "--json", "--md"]).is_err());
        assert!(Cli::try_parse_from(["repo-params", "show", "-a", "-T", "--rev", "v1"]).is_ok());
    }
}
