use clap::{Arg, ArgAction, ArgMatches, Command};
use mdxkit::{NavigationManifest, PageEntry, list_pages};

use crate::commands::{CommandResult, dry_run_arg};
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util::display_path;

pub fn command() -> Command {
    Command::new("nav")
        .about("Keep the docs.json navigation in sync with the files on disk")
        .subcommand_required(true)
        .subcommand(
            Command::new("prune")
                .about("Remove navigation entries whose Document no longer exists")
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .value_name("EXT")
                        .default_value("mdx")
                        .help("Extension page references resolve to."),
                )
                .arg(dry_run_arg()),
        )
        .subcommand(
            Command::new("sync-group")
                .about("Replace a navigation group's pages with the Documents in a directory")
                .arg(
                    Arg::new("language")
                        .long("language")
                        .value_name("LANG")
                        .default_value("en")
                        .help("Language entry that owns the group."),
                )
                .arg(
                    Arg::new("group")
                        .long("group")
                        .value_name("NAME")
                        .required(true)
                        .help("Group title. Appended when no group has this title."),
                )
                .arg(
                    Arg::new("dir")
                        .long("dir")
                        .value_name("DIR")
                        .required(true)
                        .help("Directory to list, relative to the workspace (e.g. en/help-center/publishing)."),
                )
                .arg(
                    Arg::new("include-index")
                        .long("include-index")
                        .action(ArgAction::SetTrue)
                        .help("Also list index pages."),
                )
                .arg(
                    Arg::new("ext")
                        .long("ext")
                        .value_name("EXT")
                        .default_value("mdx")
                        .help("Extension of the Documents to list."),
                ),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    match matches.subcommand() {
        Some(("prune", sub)) => prune(session, sub),
        Some(("sync-group", sub)) => sync_group(session, sub),
        _ => Err(CliError::new(
            "nav requires a subcommand (prune, sync-group)",
            ExitStatus::Usage,
        )),
    }
}

fn prune(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let workspace = session.workspace()?;
    let extension = required(matches, "ext")?;
    let dry_run = matches.get_flag("dry-run");

    let mut manifest = NavigationManifest::load(workspace.manifest_path())?;
    let report = manifest.prune_missing(workspace.root(), extension);
    if !dry_run && !report.is_empty() {
        manifest.save(workspace.manifest_path())?;
    }

    Ok(CommandResult::NavPruned {
        manifest: display_path(workspace.root(), workspace.manifest_path()),
        dry_run,
        report,
    })
}

fn sync_group(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let workspace = session.workspace()?;
    let language = required(matches, "language")?;
    let group = required(matches, "group")?;
    let dir = required(matches, "dir")?;
    let extension = required(matches, "ext")?;
    let skip_index = !matches.get_flag("include-index");

    let pages = list_pages(workspace.root(), dir, extension, skip_index)?;
    if pages.is_empty() {
        return Err(CliError::new(
            format!("no .{extension} documents found in {dir}"),
            ExitStatus::NoInput,
        ));
    }

    let mut manifest = NavigationManifest::load(workspace.manifest_path())?;
    let change = manifest.replace_group(
        language,
        group,
        pages.iter().cloned().map(PageEntry::Ref).collect(),
    )?;
    manifest.save(workspace.manifest_path())?;

    Ok(CommandResult::NavGroupSynced {
        language: language.to_string(),
        group: group.to_string(),
        change,
        pages,
    })
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a str, CliError> {
    matches
        .get_one::<String>(id)
        .map(String::as_str)
        .ok_or_else(|| CliError::new(format!("--{id} is required"), ExitStatus::Usage))
}
