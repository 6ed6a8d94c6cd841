use std::process::ExitCode;

use mdxkit::GroupChange;

use crate::commands::{CommandResult, TreeReport};
use crate::error::{CliError, ExitStatus};

pub enum OutputFormat {
    Text,
    Json,
}

/// Prints a `CommandResult` as text or a single JSON line and maps it to an exit code.
pub fn emit_result(result: CommandResult, format: OutputFormat) -> Result<ExitCode, CliError> {
    match format {
        OutputFormat::Text => print_text(&result),
        OutputFormat::Json => print_json(&result)?,
    };
    Ok(ExitCode::from(result.exit_status().code()))
}

fn print_text(result: &CommandResult) {
    match result {
        CommandResult::Converted {
            root,
            dry_run,
            report,
        } => {
            print_tree_report("Converted", root, *dry_run, report);
        }
        CommandResult::Rebranded {
            root,
            rules,
            dry_run,
            report,
        } => {
            println!("Applied {rules} substitution rule(s)");
            print_tree_report("Rebranded", root, *dry_run, report);
        }
        CommandResult::FrontMatterEdited {
            root,
            action,
            key,
            dry_run,
            report,
        } => {
            let verb = if action == "unset" {
                format!("Removed `{key}` in")
            } else {
                format!("Set `{key}` in")
            };
            print_tree_report(&verb, root, *dry_run, report);
        }
        CommandResult::NavPruned {
            manifest,
            dry_run,
            report,
        } => {
            if report.is_empty() {
                println!("{manifest}: every navigation entry resolves to a file");
                return;
            }
            let verb = if *dry_run { "Would remove" } else { "Removed" };
            println!(
                "{verb} {} page(s) and {} group(s) from {manifest}",
                report.removed_pages.len(),
                report.removed_groups.len()
            );
            for page in &report.removed_pages {
                println!("  - page {page}");
            }
            for group in &report.removed_groups {
                println!("  - group {group}");
            }
        }
        CommandResult::NavGroupSynced {
            language,
            group,
            change,
            pages,
        } => {
            println!(
                "{} group '{group}' ({language}) with {} page(s)",
                change_label(*change),
                pages.len()
            );
            for page in pages {
                println!("  - {page}");
            }
        }
        CommandResult::Imported {
            manifest,
            documents,
        } => {
            println!("Imported {} article(s) into {manifest}", documents.len());
            for document in documents {
                let nav = if document.added_to_navigation {
                    ""
                } else {
                    " (already in navigation)"
                };
                println!(
                    "  - {} -> {} / {}{nav}",
                    document.path.display(),
                    document.language,
                    document.group
                );
            }
        }
        CommandResult::Reorganized {
            section,
            dry_run,
            moves,
            index_pages,
            groups,
        } => {
            let prefix = if *dry_run { "Dry run: " } else { "" };
            println!(
                "{prefix}{section}: {} moved, {} already in place, {} missing",
                moves.moved.len(),
                moves.in_place.len(),
                moves.missing.len()
            );
            for moved in &moves.moved {
                println!("  - {} -> {}/", moved.slug, moved.category);
            }
            for slug in &moves.missing {
                println!("  [MISSING] {slug}");
            }
            for page in index_pages {
                println!("  [INDEX] {page}");
            }
            for update in groups {
                println!("  [NAV] {} group '{}'", change_label(update.change), update.group);
            }
        }
        CommandResult::Checked { root, findings } => {
            if findings.is_empty() {
                println!("{root}: no raw HTML found");
                return;
            }
            println!("{root}: raw HTML in {} file(s)", findings.len());
            for finding in findings {
                println!("  [HTML] {}", finding.path);
                for fragment in &finding.fragments {
                    println!("    {fragment}");
                }
            }
        }
    }
}

fn print_tree_report(verb: &str, root: &str, dry_run: bool, report: &TreeReport) {
    if dry_run {
        println!(
            "Dry run: {} of {} file(s) under {root} would change",
            report.changed.len(),
            report.examined
        );
    } else {
        println!(
            "{verb} {} of {} file(s) under {root}",
            report.changed.len(),
            report.examined
        );
    }
    for path in &report.changed {
        println!("  - {path}");
    }
    for skipped in &report.skipped {
        println!("  [SKIP] {}: {}", skipped.path, skipped.reason);
    }
}

fn change_label(change: GroupChange) -> &'static str {
    match change {
        GroupChange::Replaced => "Replaced",
        GroupChange::Appended => "Appended",
    }
}

fn print_json(result: &CommandResult) -> Result<(), CliError> {
    let payload = serde_json::to_string(result).map_err(|err| {
        CliError::new(format!("failed to serialize result: {err}"), ExitStatus::Software)
    })?;
    println!("{payload}");
    Ok(())
}
