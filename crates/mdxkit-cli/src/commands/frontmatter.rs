use clap::{Arg, ArgMatches, Command};
use mdxkit::{FrontMatterEdit, WriteMode, is_valid_front_matter_key};

use crate::commands::{
    CommandResult, TreeReport, dry_run_arg, exclude_arg, extension_arg, walker_for,
};
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::util::display_path;

const DEFAULT_ROOT: &str = "en/help-center";

pub fn command() -> Command {
    Command::new("frontmatter")
        .about("Set or remove one front matter key across a content tree")
        .subcommand_required(true)
        .subcommand(tree_args(
            Command::new("set")
                .about("Insert or replace KEY with a quoted VALUE")
                .arg(key_arg())
                .arg(
                    Arg::new("value")
                        .value_name("VALUE")
                        .required(true)
                        .help("Value written as a double-quoted YAML string."),
                ),
        ))
        .subcommand(tree_args(
            Command::new("unset")
                .about("Remove KEY and any indented lines that belong to it")
                .arg(key_arg()),
        ))
}

fn key_arg() -> Arg {
    Arg::new("key")
        .value_name("KEY")
        .required(true)
        .value_parser(parse_key)
        .help("Top-level key, e.g. updatedAt.")
}

fn tree_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("root")
                .long("root")
                .value_name("ROOT")
                .default_value(DEFAULT_ROOT)
                .help("Content directory, relative to the workspace."),
        )
        .arg(extension_arg(&["mdx"]))
        .arg(exclude_arg())
        .arg(dry_run_arg())
}

fn parse_key(raw: &str) -> Result<String, String> {
    if is_valid_front_matter_key(raw) {
        Ok(raw.to_string())
    } else {
        Err(format!(
            "`{raw}` is not a valid key (letters, digits, `_` and `-` only)"
        ))
    }
}

pub fn run(session: &CliSession, matches: &ArgMatches) -> Result<CommandResult, CliError> {
    let (action, sub) = matches.subcommand().ok_or_else(|| {
        CliError::new(
            "frontmatter requires a subcommand (set, unset)",
            ExitStatus::Usage,
        )
    })?;
    let key = sub
        .get_one::<String>("key")
        .ok_or_else(|| CliError::new("KEY is required", ExitStatus::Usage))?;
    let edit = match action {
        "set" => {
            let value = sub
                .get_one::<String>("value")
                .ok_or_else(|| CliError::new("VALUE is required", ExitStatus::Usage))?;
            FrontMatterEdit::set(key.as_str(), value.as_str())?
        }
        "unset" => FrontMatterEdit::unset(key.as_str())?,
        other => {
            return Err(CliError::new(
                format!("unknown frontmatter action `{other}`"),
                ExitStatus::Usage,
            ));
        }
    };

    let raw_root = sub
        .get_one::<String>("root")
        .map(String::as_str)
        .unwrap_or(DEFAULT_ROOT);
    let root = session.resolve_root(raw_root)?;
    let dry_run = sub.get_flag("dry-run");
    let mode = if dry_run {
        WriteMode::DryRun
    } else {
        WriteMode::Write
    };

    let report = walker_for(root.clone(), sub).walk(&edit, mode)?;
    Ok(CommandResult::FrontMatterEdited {
        root: display_path(&session.content_base()?, &root),
        action: action.to_string(),
        key: key.clone(),
        dry_run,
        report: TreeReport::from_walk(&root, report),
    })
}
