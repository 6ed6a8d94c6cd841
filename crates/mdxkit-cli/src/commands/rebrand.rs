use std::path::Path;

use clap::{Arg, ArgMatches, Command};
use mdxkit::{Rebrand, RuleSet, WriteMode};

use crate::commands::{
    CommandResult, TreeReport, dry_run_arg, exclude_arg, extension_arg, walker_for,
};
use crate::context::{CliSession, absolutize};
use crate::error::{CliError, ExitStatus};
use crate::util::display_path;

pub fn command() -> Command {
    Command::new("rebrand")
        .about("Apply an ordered list of find/replace rules to every matching file")
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .default_value(".")
                .help("Directory to rewrite, relative to the workspace."),
        )
        .arg(
            Arg::new("rules")
                .long("rules")
                .value_name("FILE")
                .required(true)
                .help("YAML file with a `rules:` list of {from, to, regex, case_insensitive} entries."),
        )
        .arg(extension_arg(&["md", "mdx", "json"]))
        .arg(exclude_arg())
        .arg(dry_run_arg())
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let rules_path = matches
        .get_one::<String>("rules")
        .map(|raw| absolutize(Path::new(raw)))
        .transpose()?
        .ok_or_else(|| CliError::new("--rules is required", ExitStatus::Usage))?;
    let rules = RuleSet::load(&rules_path)?;
    let rule_count = rules.len();

    let raw_root = matches
        .get_one::<String>("root")
        .map(String::as_str)
        .unwrap_or(".");
    let root = session.resolve_root(raw_root)?;
    let dry_run = matches.get_flag("dry-run");
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = walker_for(root.clone(), matches).walk(&Rebrand::new(rules), mode)?;
    Ok(CommandResult::Rebranded {
        root: display_path(&session.content_base()?, &root),
        rules: rule_count,
        dry_run,
        report: TreeReport::from_walk(&root, report),
    })
}
