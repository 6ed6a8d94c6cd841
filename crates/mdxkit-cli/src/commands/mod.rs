use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches};
use mdxkit::{
    ContentWalker, DEFAULT_EXCLUSIONS, GroupChange, ImportedDocument, MoveReport, PruneReport,
    WalkReport,
};
use serde::Serialize;

use crate::error::ExitStatus;
use crate::util::display_path;

pub mod check;
pub mod convert;
pub mod frontmatter;
pub mod import;
pub mod nav;
pub mod rebrand;
pub mod reorganize;

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandResult {
    Converted {
        root: String,
        dry_run: bool,
        report: TreeReport,
    },
    Rebranded {
        root: String,
        rules: usize,
        dry_run: bool,
        report: TreeReport,
    },
    FrontMatterEdited {
        root: String,
        action: String,
        key: String,
        dry_run: bool,
        report: TreeReport,
    },
    NavPruned {
        manifest: String,
        dry_run: bool,
        report: PruneReport,
    },
    NavGroupSynced {
        language: String,
        group: String,
        change: GroupChange,
        pages: Vec<String>,
    },
    Imported {
        manifest: String,
        documents: Vec<ImportedDocument>,
    },
    Reorganized {
        section: String,
        dry_run: bool,
        moves: MoveReport,
        index_pages: Vec<String>,
        groups: Vec<reorganize::GroupUpdate>,
    },
    Checked {
        root: String,
        findings: Vec<check::Finding>,
    },
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            CommandResult::Checked { findings, .. } => {
                if findings.is_empty() {
                    ExitStatus::Ok
                } else {
                    ExitStatus::Data
                }
            }
            _ => ExitStatus::Ok,
        }
    }
}

/// A [`WalkReport`] with paths shown relative to the walked root.
#[derive(Debug, Serialize)]
pub struct TreeReport {
    pub examined: usize,
    pub changed: Vec<String>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Serialize)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

impl TreeReport {
    pub fn from_walk(root: &Path, report: WalkReport) -> Self {
        Self {
            examined: report.examined,
            changed: report
                .changed
                .iter()
                .map(|path| display_path(root, path))
                .collect(),
            skipped: report
                .skipped
                .into_iter()
                .map(|skipped| SkippedEntry {
                    path: display_path(root, &skipped.path),
                    reason: skipped.reason,
                })
                .collect(),
        }
    }
}

pub(crate) fn extension_arg(defaults: &'static [&'static str]) -> Arg {
    Arg::new("ext")
        .long("ext")
        .value_name("EXT")
        .action(ArgAction::Append)
        .default_values(defaults.iter().copied())
        .help("File extension to process. Repeat for several.")
}

pub(crate) fn exclude_arg() -> Arg {
    Arg::new("exclude")
        .long("exclude")
        .value_name("GLOB")
        .action(ArgAction::Append)
        .help("Additional gitignore-style glob to skip. .git and node_modules are always skipped.")
}

pub(crate) fn dry_run_arg() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .action(ArgAction::SetTrue)
        .help("Report what would change without writing to disk.")
}

pub(crate) fn string_values(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

/// Walker over `root` honoring `--ext` and `--exclude`.
pub(crate) fn walker_for(root: PathBuf, matches: &ArgMatches) -> ContentWalker {
    let exclusions = DEFAULT_EXCLUSIONS
        .iter()
        .map(|glob| glob.to_string())
        .chain(string_values(matches, "exclude"));
    ContentWalker::new(root)
        .with_extensions(string_values(matches, "ext"))
        .with_exclusions(exclusions)
}
