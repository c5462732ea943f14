use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use clap::error::ErrorKind;
use clap::Parser;
use wfold_core::{ArtifactRole, Strictness};
use wfold_installer::{FileOutcome, InstallReport};
use wfold_patcher::{BundleShape, Transition};
use wfold_resolver::Candidate;

use super::*;
use crate::completion::write_completions_script;
use crate::config::{default_config_path, load_config, parse_config, FoldConfig};
use crate::manual::{save_manual, DEFAULT_MANUAL_URL, MANUAL_FILE_NAME};
use crate::render::{
    describe_transition, format_install_lines, format_target_line, render_status_line,
    resolve_output_style, OutputStyle,
};

fn sample_install_report(dry_run: bool) -> InstallReport {
    InstallReport {
        root: PathBuf::from("/ext/openai.chatgpt-0.4.71"),
        dry_run,
        files: vec![
            FileOutcome {
                role: ArtifactRole::Host,
                path: PathBuf::from("/ext/openai.chatgpt-0.4.71/out/extension.js"),
                shape: None,
                transition: Transition::Unchanged,
                marker: "/* CODEX_WORKFLOW_FOLD_HOST_V7 */",
                backup_created: false,
            },
            FileOutcome {
                role: ArtifactRole::Bundle,
                path: PathBuf::from("/ext/openai.chatgpt-0.4.71/webview/assets/index-a1.js"),
                shape: Some(BundleShape::WorkedForV71),
                transition: Transition::Applied,
                marker: "/* CODEX_WORKFLOW_FOLD_PATCH_V71_W1 */",
                backup_created: !dry_run,
            },
        ],
    }
}

#[test]
fn parses_install_flags() {
    let cli = Cli::try_parse_from([
        "wfold",
        "install",
        "--ext-dir",
        "/ext/openai.chatgpt-0.4.71",
        "--lenient",
        "--dry-run",
        "--no-manual",
    ])
    .expect("must parse");
    match cli.command {
        Commands::Install {
            target,
            dry_run,
            no_manual,
        } => {
            assert_eq!(
                target,
                TargetArgs {
                    ext_dir: Some(PathBuf::from("/ext/openai.chatgpt-0.4.71")),
                    lenient: true,
                }
            );
            assert!(dry_run);
            assert!(no_manual);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = Cli::try_parse_from([
        "wfold",
        "uninstall",
        "--keep-backups",
        "-vv",
        "--config",
        "/tmp/wfold.toml",
    ])
    .expect("must parse");
    assert_eq!(cli.verbose, 2);
    assert_eq!(cli.config, Some(PathBuf::from("/tmp/wfold.toml")));
    assert!(matches!(
        cli.command,
        Commands::Uninstall {
            keep_backups: true,
            keep_config: false,
            ..
        }
    ));
}

#[test]
fn rejects_unknown_subcommand_and_missing_shell() {
    let err = Cli::try_parse_from(["wfold", "patch"]).expect_err("unknown subcommand");
    assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);

    let err = Cli::try_parse_from(["wfold", "completions"]).expect_err("shell is required");
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn completions_script_names_the_binary() {
    let mut out = Vec::new();
    write_completions_script(clap_complete::Shell::Bash, &mut out).expect("must generate");
    let script = String::from_utf8(out).expect("utf8 script");
    assert!(script.contains("wfold"));
    assert!(script.contains("inspect"));
}

#[test]
fn render_status_line_plain_is_unadorned() {
    assert_eq!(
        render_status_line(OutputStyle::Plain, "ok", "patched bundle"),
        "patched bundle"
    );
}

#[test]
fn render_status_line_rich_includes_ascii_badge() {
    assert_eq!(
        render_status_line(OutputStyle::Rich, "ok", "patched bundle"),
        "[OK] patched bundle"
    );
    assert_eq!(
        render_status_line(OutputStyle::Rich, "warn", "manual download failed"),
        "[WARN] manual download failed"
    );
    assert_eq!(
        render_status_line(OutputStyle::Rich, "info", "unchanged host"),
        "[..] unchanged host"
    );
}

#[test]
fn output_style_follows_stdout_tty() {
    assert_eq!(resolve_output_style(true), OutputStyle::Rich);
    assert_eq!(resolve_output_style(false), OutputStyle::Plain);
}

#[test]
fn install_lines_describe_each_file_and_backup() {
    let lines = format_install_lines(&sample_install_report(false), OutputStyle::Plain);
    assert_eq!(
        lines,
        vec![
            "unchanged host: /ext/openai.chatgpt-0.4.71/out/extension.js (already current)"
                .to_string(),
            "patched bundle: /ext/openai.chatgpt-0.4.71/webview/assets/index-a1.js (applied, shape: worked-for-v71)"
                .to_string(),
            "  backup: /ext/openai.chatgpt-0.4.71/webview/assets/index-a1.js.bak".to_string(),
            "1 file(s) patched; restart VS Code to load the change".to_string(),
        ]
    );
}

#[test]
fn dry_run_lines_use_conditional_wording() {
    let lines = format_install_lines(&sample_install_report(true), OutputStyle::Plain);
    assert!(lines[1].starts_with("would patch bundle:"));
    assert_eq!(
        lines.last().map(String::as_str),
        Some("dry run: 1 file(s) would change")
    );
}

#[test]
fn transitions_are_described_for_operators() {
    assert_eq!(
        describe_transition(Transition::Upgraded {
            from: "/* CODEX_WORKFLOW_FOLD_PATCH_V13 */"
        }),
        "upgraded from /* CODEX_WORKFLOW_FOLD_PATCH_V13 */"
    );
}

#[test]
fn target_line_includes_version() {
    let candidate = Candidate::new(
        "/ext/openai.chatgpt-0.4.71",
        UNIX_EPOCH,
        Some(semver::Version::new(0, 4, 71)),
    );
    assert_eq!(
        format_target_line(OutputStyle::Plain, &candidate),
        "extension: /ext/openai.chatgpt-0.4.71 (version: 0.4.71)"
    );
}

#[test]
fn empty_config_uses_defaults() {
    let config = parse_config("").expect("empty config is valid");
    assert_eq!(config, FoldConfig::default());
    assert!(config.strict_target);
    assert!(config.download_manual);
    assert_eq!(config.manual_url, DEFAULT_MANUAL_URL);
}

#[test]
fn parses_full_config() {
    let config = parse_config(
        r#"
extension_roots = ["/opt/vscode/extensions"]
strict_target = false
manual_url = "https://example.test/manual.md"
manual_dirs = ["/tmp/manuals"]
download_manual = false
"#,
    )
    .expect("must parse");
    assert_eq!(
        config.extension_roots(Path::new("/home/dev")),
        vec![PathBuf::from("/opt/vscode/extensions")]
    );
    assert_eq!(
        config.manual_dirs(Path::new("/home/dev"), None),
        vec![PathBuf::from("/tmp/manuals")]
    );
    assert_eq!(config.strictness(false), Strictness::Lenient);
    assert!(!config.download_manual);
}

#[test]
fn unknown_config_keys_are_rejected() {
    let err = parse_config("strict = true\n").expect_err("unknown key");
    assert!(err.to_string().contains("invalid wfold config"));
}

#[test]
fn default_roots_and_manual_dirs_come_from_home() {
    let config = FoldConfig::default();
    let home = Path::new("/home/dev");
    assert_eq!(
        config.extension_roots(home),
        vec![
            home.join(".vscode/extensions"),
            home.join(".vscode-insiders/extensions"),
            home.join(".vscode-oss/extensions"),
        ]
    );
    assert_eq!(
        config.manual_dirs(home, Some(Path::new("/work"))),
        vec![home.join("Downloads"), home.to_path_buf(), PathBuf::from("/work")]
    );
    assert_eq!(config.strictness(false), Strictness::Strict);
    assert_eq!(config.strictness(true), Strictness::Lenient);
}

#[test]
fn explicit_config_path_must_exist() {
    let tmp = tempfile::tempdir().expect("must create tempdir");
    let missing = tmp.path().join("missing.toml");
    let err = load_config(Some(&missing), tmp.path()).expect_err("missing explicit config");
    assert!(err.to_string().contains("config file not found"));

    let present = tmp.path().join("wfold.toml");
    fs::write(&present, "download_manual = false\n").expect("write config");
    let config = load_config(Some(&present), tmp.path()).expect("must load");
    assert!(!config.download_manual);
}

#[test]
fn default_config_path_lives_under_wfold_dir() {
    let path = default_config_path(Path::new("/home/dev"));
    assert!(path.ends_with("wfold/wfold.toml"));
}

#[test]
fn manual_is_saved_to_first_writable_dir() {
    let tmp = tempfile::tempdir().expect("must create tempdir");
    let blocked = tmp.path().join("blocked");
    fs::write(&blocked, "not a directory").expect("write blocker");
    let fallback = tmp.path().join("fallback");

    let saved = save_manual("# manual\n", &[blocked, fallback.clone()]).expect("must save");
    assert_eq!(saved, fallback.join(MANUAL_FILE_NAME));
    assert_eq!(fs::read_to_string(saved).expect("read manual"), "# manual\n");
}

#[test]
fn manual_save_fails_when_no_dir_accepts_it() {
    let tmp = tempfile::tempdir().expect("must create tempdir");
    let blocked = tmp.path().join("blocked");
    fs::write(&blocked, "not a directory").expect("write blocker");
    let err = save_manual("# manual\n", &[blocked]).expect_err("nowhere to write");
    assert!(err.to_string().contains("no writable directory"));
}
