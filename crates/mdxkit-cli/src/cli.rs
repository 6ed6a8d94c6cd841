use std::ffi::OsString;
use std::process::ExitCode;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::context::CliSession;
use crate::error::{CliError, ExitStatus};
use crate::formatter::{OutputFormat, emit_result};
use crate::util::Verbosity;

const NAME: &str = "mdxkit";

pub fn run() -> ExitCode {
    match run_cli(std::env::args()) {
        Ok(code) => code,
        Err(err) => {
            err.print();
            err.exit_code()
        }
    }
}

/// Parses CLI arguments and dispatches to the matching command. Returns a
/// `sysexits`-compatible `ExitCode`.
pub fn run_cli<I, S>(args: I) -> Result<ExitCode, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString> + Clone,
{
    let command = build_cli();
    let matches = command.try_get_matches_from(args)?;

    let verbosity = Verbosity {
        json: matches.get_flag("json"),
        verbose: matches.get_flag("verbose"),
    };
    init_tracing(verbosity.verbose);
    let output = if verbosity.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let workspace_override = matches.get_one::<String>("workspace").cloned();
    let session = CliSession::bootstrap(workspace_override)?;

    let result = dispatch(&session, &matches)?;
    emit_result(result, output)
}

/// Logs go to stderr so stdout carries only the command report.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn build_cli() -> Command {
    Command::new(NAME)
        .about("Normalize scraped help-center articles in a Mintlify documentation tree")
        .version(env!("CARGO_PKG_VERSION"))
        .arg(
            Arg::new("workspace")
                .long("workspace")
                .value_name("PATH")
                .global(true)
                .help("Documentation root. Defaults to the nearest ancestor with a docs.json file."),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Emit newline-delimited JSON instead of human-readable text."),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log every file written and every workspace path resolved."),
        )
        .subcommand_required(true)
        .subcommand(commands::convert::command())
        .subcommand(commands::rebrand::command())
        .subcommand(commands::frontmatter::command())
        .subcommand(commands::nav::command())
        .subcommand(commands::import::command())
        .subcommand(commands::reorganize::command())
        .subcommand(commands::check::command())
}

fn dispatch(
    session: &CliSession,
    matches: &ArgMatches,
) -> Result<commands::CommandResult, CliError> {
    match matches.subcommand() {
        Some(("convert", sub)) => commands::convert::run(session, sub),
        Some(("rebrand", sub)) => commands::rebrand::run(session, sub),
        Some(("frontmatter", sub)) => commands::frontmatter::run(session, sub),
        Some(("nav", sub)) => commands::nav::run(session, sub),
        Some(("import", sub)) => commands::import::run(session, sub),
        Some(("reorganize", sub)) => commands::reorganize::run(session, sub),
        Some(("check", sub)) => commands::check::run(session, sub),
        _ => Err(CliError::new("missing command", ExitStatus::Usage)),
    }
}
