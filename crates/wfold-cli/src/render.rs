use std::io::IsTerminal;

use anstyle::{AnsiColor, Effects, Style};
use wfold_installer::{FileOutcome, InspectReport, InstallReport, UninstallReport};
use wfold_patcher::Transition;
use wfold_resolver::Candidate;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum OutputStyle {
    Plain,
    Rich,
}

pub(crate) fn current_output_style() -> OutputStyle {
    resolve_output_style(std::io::stdout().is_terminal())
}

pub(crate) fn resolve_output_style(stdout_is_tty: bool) -> OutputStyle {
    if stdout_is_tty {
        OutputStyle::Rich
    } else {
        OutputStyle::Plain
    }
}

pub(crate) fn render_status_line(style: OutputStyle, status: &str, message: &str) -> String {
    match style {
        OutputStyle::Plain => message.to_string(),
        OutputStyle::Rich => {
            let badge = match status {
                "ok" => "[OK]",
                "warn" => "[WARN]",
                "err" => "[ERR]",
                _ => "[..]",
            };
            format!("{badge} {message}")
        }
    }
}

pub(crate) fn render_section_header(style: OutputStyle, title: &str) -> Option<String> {
    match style {
        OutputStyle::Plain => None,
        OutputStyle::Rich => Some(colorize(section_style(), &format!("== {title} =="))),
    }
}

fn section_style() -> Style {
    Style::new()
        .fg_color(Some(AnsiColor::BrightBlue.into()))
        .effects(Effects::BOLD)
}

fn colorize(style: Style, text: &str) -> String {
    format!("{}{}{}", style.render(), text, style.render_reset())
}

pub(crate) fn describe_transition(transition: Transition) -> String {
    match transition {
        Transition::Applied => "applied".to_string(),
        Transition::Unchanged => "already current".to_string(),
        Transition::Upgraded { from } => format!("upgraded from {from}"),
    }
}

pub(crate) fn format_target_line(style: OutputStyle, target: &Candidate) -> String {
    render_status_line(style, "info", &format!("extension: {target}"))
}

pub(crate) fn format_install_lines(report: &InstallReport, style: OutputStyle) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(render_section_header(style, "install"));
    for file in &report.files {
        lines.push(format_file_outcome(file, report.dry_run, style));
        if file.backup_created {
            lines.push(format!(
                "  backup: {}",
                wfold_core::backup_path_for(&file.path).display()
            ));
        }
    }
    let summary = match (report.dry_run, report.changed_count()) {
        (true, 0) => "dry run: nothing to change".to_string(),
        (true, count) => format!("dry run: {count} file(s) would change"),
        (false, 0) => "already installed; nothing changed".to_string(),
        (false, count) => {
            format!("{count} file(s) patched; restart VS Code to load the change")
        }
    };
    lines.push(render_status_line(style, "ok", &summary));
    lines
}

fn format_file_outcome(file: &FileOutcome, dry_run: bool, style: OutputStyle) -> String {
    let verb = match (file.transition, dry_run) {
        (Transition::Unchanged, _) => "unchanged",
        (_, true) => "would patch",
        (_, false) => "patched",
    };
    let shape = file
        .shape
        .map(|shape| format!(", shape: {shape}"))
        .unwrap_or_default();
    let status = if file.transition == Transition::Unchanged {
        "info"
    } else {
        "ok"
    };
    render_status_line(
        style,
        status,
        &format!(
            "{verb} {}: {} ({}{shape})",
            file.role.as_str(),
            file.path.display(),
            describe_transition(file.transition)
        ),
    )
}

pub(crate) fn format_uninstall_lines(report: &UninstallReport, style: OutputStyle) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(render_section_header(style, "uninstall"));
    for file in &report.files {
        let status = match file.status {
            wfold_installer::RestoreStatus::Restored => "ok",
            wfold_installer::RestoreStatus::NoBackup => "info",
            wfold_installer::RestoreStatus::PatchedWithoutBackup => "warn",
        };
        let removed = if file.backup_removed {
            ", backup removed"
        } else {
            ""
        };
        lines.push(render_status_line(
            style,
            status,
            &format!(
                "{} {}: {}{removed}",
                file.status.as_str(),
                file.role.as_str(),
                file.path.display()
            ),
        ));
    }
    lines
}

pub(crate) fn format_inspect_lines(
    target: &Candidate,
    package_version: Option<&semver::Version>,
    report: &InspectReport,
    style: OutputStyle,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.extend(render_section_header(style, "inspect"));
    lines.push(format!("target: {}", target.dir.display()));
    lines.push(format!(
        "package.json version: {}",
        package_version
            .map(ToString::to_string)
            .unwrap_or_else(|| "unreadable".to_string())
    ));
    for file in &report.files {
        lines.push(format!("{}: {}", file.role.as_str(), file.path.display()));
        if let Some(shape) = file.shape {
            lines.push(format!("  shape: {shape}"));
        }
        lines.push(format!("  state: {}", file.state.describe()));
        lines.push(format!("  sha256: {}", file.live_sha256));
        match &file.backup {
            Some(backup) => {
                lines.push(format!("  backup: {}", backup.path.display()));
                lines.push(format!("  backup sha256: {}", backup.sha256));
            }
            None => lines.push("  backup: none".to_string()),
        }
    }
    if !report
        .files
        .iter()
        .any(|file| file.role == wfold_core::ArtifactRole::Locale)
    {
        lines.push("locale: none".to_string());
    }
    lines
}
