use clap::{Arg, ArgAction, ArgMatches, Command};
use mdxkit::{HtmlToMarkdown, NormalizeOptions, Normalizer, WriteMode};

use crate::commands::{
    CommandResult, TreeReport, dry_run_arg, exclude_arg, extension_arg, walker_for,
};
use crate::context::CliSession;
use crate::error::CliError;
use crate::util::display_path;

const DEFAULT_ROOT: &str = "en/help-center";

pub fn command() -> Command {
    Command::new("convert")
        .about("Convert HTML article bodies to Markdown in place")
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .default_value(DEFAULT_ROOT)
                .help("Content directory, relative to the workspace."),
        )
        .arg(extension_arg(&["mdx"]))
        .arg(exclude_arg())
        .arg(
            Arg::new("strip-residual")
                .long("strip-residual")
                .action(ArgAction::SetTrue)
                .help("Remove every tag the conversion rules leave behind."),
        )
        .arg(
            Arg::new("repair-front-matter")
                .long("repair-front-matter")
                .action(ArgAction::SetTrue)
                .help("Expand front matter collapsed onto a single line before converting."),
        )
        .arg(dry_run_arg())
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let raw_root = matches
        .get_one::<String>("root")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ROOT);
    let root = session.resolve_root(raw_root)?;
    let dry_run = matches.get_flag("dry-run");

    let normalizer = Normalizer::with_options(NormalizeOptions {
        strip_residual_tags: matches.get_flag("strip-residual"),
    });
    let transform =
        HtmlToMarkdown::new(normalizer).repair_front_matter(matches.get_flag("repair-front-matter"));
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = walker_for(root.clone(), matches).walk(&transform, mode)?;
    Ok(CommandResult::Converted {
        root: display_path(&session.content_base()?, &root),
        dry_run,
        report: TreeReport::from_walk(&root, report),
    })
}
