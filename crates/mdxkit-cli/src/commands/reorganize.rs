use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, Command};
use mdxkit::{
    CategoryPlan, GroupChange, NavigationManifest, WriteMode, apply_category_groups,
    category_groups, move_articles, write_index_pages,
};
use serde::Serialize;

use crate::commands::{CommandResult, dry_run_arg};
use crate::context::{CliSession, absolutize};
use crate::error::{CliError, ExitStatus};
use crate::util::display_path;

#[derive(Debug, Serialize)]
pub struct GroupUpdate {
    pub group: String,
    pub change: GroupChange,
}

pub fn command() -> Command {
    Command::new("reorganize")
        .about("Move articles into category folders, add index pages, and rebuild navigation groups")
        .arg(
            Arg::new("plan")
                .long("plan")
                .value_name("FILE")
                .required(true)
                .help("YAML category plan (language, section, legacy_group, index_template, categories)."),
        )
        .arg(
            Arg::new("no-index-pages")
                .long("no-index-pages")
                .action(ArgAction::SetTrue)
                .help("Do not create index.mdx for categories that lack one."),
        )
        .arg(dry_run_arg())
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let plan_path = matches
        .get_one::<String>("plan")
        .ok_or_else(|| CliError::new("--plan is required", ExitStatus::Usage))?;
    let plan = CategoryPlan::load(&absolutize(Path::new(plan_path))?)?;
    let dry_run = matches.get_flag("dry-run");
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let workspace = session.workspace()?;
    let root = workspace.root();
    let section_dir = plan.section_dir(root);

    let moves = move_articles(&section_dir, &plan, mode)?;
    let index_pages = if matches.get_flag("no-index-pages") {
        Vec::new()
    } else {
        let engine = plan.index_engine()?;
        write_index_pages(&section_dir, &plan, &engine, mode)?
    };

    let mut groups = Vec::new();
    if !dry_run {
        let mut manifest = NavigationManifest::load(workspace.manifest_path())?;
        let planned = category_groups(root, &plan)?;
        for (group, change) in apply_category_groups(&mut manifest, &plan, planned)? {
            groups.push(GroupUpdate { group, change });
        }
        manifest.save(workspace.manifest_path())?;
    }

    Ok(CommandResult::Reorganized {
        section: plan.section_ref(),
        dry_run,
        moves,
        index_pages: index_pages
            .iter()
            .map(|path| display_path(root, path))
            .collect(),
        groups,
    })
}
