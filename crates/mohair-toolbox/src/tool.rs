//! # Tool Interface
//!
//! Argument definitions and the load-and-print flow behind `read-substrait`.
//!
//! The built-in clap help flag is disabled so that `-h` keeps the historical
//! behavior of printing usage and exiting with status 1.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, CommandFactory, Parser};
use mohair_substrait::config::LibraryConfig;
use mohair_substrait::{stringify, PlanError, PlanMessage};

/// Command-line options for `read-substrait`.
#[derive(Debug, Parser)]
#[command(
    name = "read-substrait",
    version,
    about = "Print a serialized Substrait plan",
    disable_help_flag = true
)]
pub struct ToolArgs {
    /// File containing a protobuf-encoded Substrait plan.
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub plan_fpath: Option<PathBuf>,

    /// Print the plan as JSON instead of text.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Resolve the root relation and print only that relation.
    #[arg(short = 'r', long, conflicts_with = "json")]
    pub root: bool,

    /// Print usage and exit.
    #[arg(short = 'h', long, action = ArgAction::SetTrue)]
    pub help: bool,
}

impl ToolArgs {
    /// Rendered help text.
    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }
}

/// Errors that end a `read-substrait` run with a non-zero status.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("File containing serialized plan message is required (-f <path>)")]
    MissingPlanFile,
    #[error("Unable to resolve plan file path {}: {source}", .path.display())]
    PlanPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error("Resolved root relation {index} could not be looked up")]
    RootUnavailable { index: usize },
    #[error("Unable to write plan to stdout: {0}")]
    Output(#[source] io::Error),
}

/// One invocation of the tool.
pub struct ToolInterface {
    args: ToolArgs,
    config: LibraryConfig,
}

impl ToolInterface {
    pub fn new(args: ToolArgs, config: LibraryConfig) -> Self {
        Self { args, config }
    }

    /// Load the plan named on the command line and write its rendering to `out`.
    pub fn start(&self, out: &mut impl Write) -> Result<(), ToolError> {
        let plan_fpath = self
            .args
            .plan_fpath
            .as_deref()
            .ok_or(ToolError::MissingPlanFile)?;
        let plan_fpath = absolute_path(plan_fpath)?;

        tracing::info!(
            path = %plan_fpath.display(),
            version = %self.config.version,
            "loading substrait plan"
        );
        let mut query_plan = PlanMessage::substrait_from_file(&plan_fpath)?;

        let rendered = if self.args.root {
            let root_ndx = query_plan.resolve_root()?;
            tracing::debug!(root = root_ndx, "resolved root relation");
            let root_rel = query_plan
                .root_relation()
                .ok_or(ToolError::RootUnavailable { index: root_ndx })?;
            stringify::stringify_plan_rel(root_rel)
        } else if self.args.json {
            stringify::jsonify_plan(query_plan.substrait_plan())?
        } else {
            stringify::stringify_plan(query_plan.substrait_plan())
        };

        writeln!(out, "{rendered}").map_err(ToolError::Output)?;
        out.flush().map_err(ToolError::Output)
    }
}

fn absolute_path(path: &Path) -> Result<PathBuf, ToolError> {
    std::path::absolute(path).map_err(|source| ToolError::PlanPath {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_flags() {
        let args =
            ToolArgs::try_parse_from(["read-substrait", "-f", "q1.substrait", "-j"]).unwrap();
        assert_eq!(args.plan_fpath, Some(PathBuf::from("q1.substrait")));
        assert!(args.json);
        assert!(!args.root);
        assert!(!args.help);
    }

    #[test]
    fn test_help_is_a_plain_flag() {
        let args = ToolArgs::try_parse_from(["read-substrait", "-h"]).unwrap();
        assert!(args.help);
        assert!(ToolArgs::usage().contains("-f"));
    }

    #[test]
    fn test_missing_file_flag() {
        let args = ToolArgs::try_parse_from(["read-substrait"]).unwrap();
        let tool = ToolInterface::new(args, LibraryConfig::default());
        let mut out = Vec::new();
        assert!(matches!(
            tool.start(&mut out),
            Err(ToolError::MissingPlanFile)
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_root_conflicts_with_json() {
        assert!(ToolArgs::try_parse_from(["read-substrait", "-f", "p", "-r", "-j"]).is_err());
    }
}
