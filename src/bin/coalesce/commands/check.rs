//! `coalesce check` command

use anyhow::Result;

use crate::cli::CheckArgs;
use coalesce::ops::{check, CheckReport};
use coalesce::util::diagnostic::{emit, Diagnostic};

pub fn execute(args: CheckArgs, color: bool) -> Result<()> {
    let settings = super::resolve_graph_settings(&args.roots, args.base_dir.as_deref())?;

    let report = check(&settings.roots, &settings.base_dir)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report, color);
    }

    // Exit with error code if the graph would not bundle
    if !report.is_clean() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &CheckReport, color: bool) {
    for issue in &report.missing {
        let mut diag = Diagnostic::error(format!("cannot read include `{}`", issue.include));
        if let Some(referrer) = &issue.referrer {
            diag = diag.with_location(referrer.clone());
        } else {
            diag = diag.with_context("listed as a root".to_string());
        }
        emit(&diag, color);
    }

    for cycle in &report.cycles {
        let members: Vec<String> = cycle.iter().map(|p| p.display().to_string()).collect();
        emit(
            &Diagnostic::error("include cycle")
                .with_context(format!("members: {}", members.join(", "))),
            color,
        );
    }

    for issue in &report.trapped {
        emit(
            &Diagnostic::warning(format!(
                "directive below first content line is copied verbatim: `{}`",
                issue.line
            ))
            .with_location(issue.file.clone()),
            color,
        );
    }

    for orphan in &report.unreachable {
        emit(
            &Diagnostic::warning(format!(
                "header not reachable from any root: {}",
                orphan.display()
            )),
            color,
        );
    }

    if report.is_silent() {
        eprintln!(
            "    Checked {} headers, no problems found",
            report.files_scanned
        );
    } else {
        eprintln!(
            "    Checked {} headers: {} missing, {} cycles, {} warnings",
            report.files_scanned,
            report.missing.len(),
            report.cycles.len(),
            report.trapped.len() + report.unreachable.len()
        );
    }
}
