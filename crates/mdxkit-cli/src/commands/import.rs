use std::path::Path;

use clap::{Arg, ArgAction, ArgMatches, Command};
use mdxkit::{ImportBatch, ImportOptions, NavigationManifest, import_articles};

use crate::commands::CommandResult;
use crate::context::{CliSession, absolutize};
use crate::error::{CliError, ExitStatus};
use crate::util::display_path;

pub fn command() -> Command {
    Command::new("import")
        .about("Create Documents and navigation entries from crawler records")
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .required(true)
                .help("JSON file shaped like {\"articles\": [{title, bodyMDX, slug, category, language, groupName}]}."),
        )
        .arg(
            Arg::new("section")
                .long("section")
                .value_name("SECTION")
                .default_value(mdxkit::import::DEFAULT_SECTION)
                .help("Directory under each language that receives the articles."),
        )
        .arg(
            Arg::new("normalize")
                .long("normalize")
                .action(ArgAction::SetTrue)
                .help("Convert HTML bodies to Markdown while importing."),
        )
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let file = matches
        .get_one::<String>("file")
        .ok_or_else(|| CliError::new("an import FILE is required", ExitStatus::Usage))?;
    let batch = ImportBatch::load(&absolutize(Path::new(file))?)?;

    let workspace = session.workspace()?;
    let mut manifest = NavigationManifest::load(workspace.manifest_path())?;
    let options = ImportOptions {
        section: matches
            .get_one::<String>("section")
            .cloned()
            .unwrap_or_else(|| mdxkit::import::DEFAULT_SECTION.to_string()),
        normalize: matches.get_flag("normalize"),
    };

    let documents = import_articles(workspace.root(), &batch, &mut manifest, &options)?;
    manifest.save(workspace.manifest_path())?;

    Ok(CommandResult::Imported {
        manifest: display_path(workspace.root(), workspace.manifest_path()),
        documents,
    })
}
