use clap::{Arg, ArgMatches, Command};
use mdxkit::check_tree;
use serde::Serialize;

use crate::commands::{CommandResult, exclude_arg, extension_arg, walker_for};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util::display_path;

const DEFAULT_ROOT: &str = "en/help-center";

#[derive(Debug, Serialize)]
pub struct Finding {
    pub path: String,
    pub fragments: Vec<String>,
}

pub fn command() -> Command {
    Command::new("check")
        .about("Report raw HTML left in Document bodies")
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .default_value(DEFAULT_ROOT)
                .help("Content directory, relative to the workspace."),
        )
        .arg(extension_arg(&["mdx"]))
        .arg(exclude_arg())
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let raw_root = matches
        .get_one::<String>("root")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ROOT);
    let root = session.resolve_root(raw_root)?;

    let reports = check_tree(&walker_for(root.clone(), matches))?;
    let findings = reports
        .into_iter()
        .map(|report| Finding {
            path: display_path(&root, &report.path),
            fragments: report.fragments,
        })
        .collect();

    Ok(CommandResult::Checked {
        root: display_path(&session.content_base()?, &root),
        findings,
    })
}
