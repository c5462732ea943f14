use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wfold_core::{backup_path_for, ArtifactRole, FoldError, Strictness};
use wfold_patcher::{BundleShape, PatchState, Transition};

use crate::{
    choose_locale, inspect, install, locate_assets, parse_bundle_refs, remove_collapse_setting,
    restore_file, sha256_hex, strip_collapse_setting, uninstall, verify_marker_present,
    verify_markers_absent, ExtensionLayout, InstallOptions, RestoreStatus, UninstallOptions,
};

const HOST: &str = "class Provider{async getWebviewContentProduction(e){let l=await this.read(e);return l}getWebviewContentDevelopment(e){return this.dev(e)}}";
const ENTRY_HTML: &str = r#"<!doctype html><html><head><script type="module" crossorigin src="./assets/index-Dk3x9.js"></script></head><body></body></html>"#;
const BUNDLE: &str = r#"const locales={"zh-CN":()=>import("./zh-CN-B2q.js")};function mapStateToLocalConversationItems(rt){return rt.items}export{mapStateToLocalConversationItems};"#;
const LOCALE: &str = r#"const e={"chat.send":"发送"};export{e as default};"#;

struct Fixture {
    _tmp: TempDir,
    layout: ExtensionLayout,
}

impl Fixture {
    fn new() -> Self {
        let tmp = tempfile::tempdir().expect("must create tempdir");
        let root = tmp.path().join("openai.chatgpt-0.4.71-linux-x64");
        write(&root.join("out/extension.js"), HOST);
        write(&root.join("webview/index.html"), ENTRY_HTML);
        write(&root.join("webview/assets/index-Dk3x9.js"), BUNDLE);
        write(&root.join("webview/assets/zh-CN-A1p.js"), LOCALE);
        write(&root.join("webview/assets/zh-CN-B2q.js"), LOCALE);
        Self {
            _tmp: tmp,
            layout: ExtensionLayout::new(root),
        }
    }

    fn asset(&self, name: &str) -> PathBuf {
        self.layout.asset_path(name)
    }

    fn snapshot(&self) -> Vec<(PathBuf, Vec<u8>)> {
        [
            self.layout.host_path(),
            self.asset("index-Dk3x9.js"),
            self.asset("zh-CN-A1p.js"),
            self.asset("zh-CN-B2q.js"),
        ]
        .into_iter()
        .map(|path| {
            let bytes = fs::read(&path).expect("must read fixture file");
            (path, bytes)
        })
        .collect()
    }
}

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().expect("fixture path has parent")).expect("must create dirs");
    fs::write(path, content).expect("must write fixture file");
}

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|name| name.to_string()).collect()
}

fn locate_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<FoldError>() {
        Some(FoldError::Locate(message)) => message.clone(),
        other => panic!("expected locate error, got {other:?}"),
    }
}

#[test]
fn locates_referenced_locale_over_lexically_smaller_sibling() {
    let fixture = Fixture::new();
    let assets = locate_assets(&fixture.layout, Strictness::Strict).expect("must locate");
    assert_eq!(assets.host, fixture.layout.host_path());
    assert_eq!(assets.bundle, fixture.asset("index-Dk3x9.js"));
    assert_eq!(assets.locale, Some(fixture.asset("zh-CN-B2q.js")));
}

#[test]
fn install_then_uninstall_is_byte_identical() {
    let fixture = Fixture::new();
    let before = fixture.snapshot();

    let report = install(&fixture.layout, Strictness::Strict, InstallOptions::default())
        .expect("install must succeed");
    assert_eq!(report.changed_count(), 3);
    assert!(report.files.iter().all(|file| file.backup_created));
    assert_eq!(report.files[1].shape, Some(BundleShape::Generic));
    assert!(backup_path_for(&fixture.asset("zh-CN-B2q.js")).is_file());
    assert!(!backup_path_for(&fixture.asset("zh-CN-A1p.js")).exists());
    assert_ne!(fixture.snapshot(), before);

    let restored = uninstall(&fixture.layout, Strictness::Strict, UninstallOptions::default())
        .expect("uninstall must succeed");
    assert!(restored
        .files
        .iter()
        .all(|file| file.status == RestoreStatus::Restored && file.backup_removed));
    assert_eq!(fixture.snapshot(), before);
    for (path, _) in &before {
        assert!(!backup_path_for(path).exists());
    }
}

#[test]
fn second_install_changes_nothing() {
    let fixture = Fixture::new();
    install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("first install");
    let patched = fixture.snapshot();

    let report = install(&fixture.layout, Strictness::Strict, InstallOptions::default())
        .expect("second install");
    assert_eq!(report.changed_count(), 0);
    assert!(report
        .files
        .iter()
        .all(|file| file.transition == Transition::Unchanged && !file.backup_created));
    assert_eq!(fixture.snapshot(), patched);
    assert_eq!(
        fs::read_to_string(backup_path_for(&fixture.layout.host_path())).expect("host backup"),
        HOST
    );
}

#[test]
fn dry_run_writes_nothing() {
    let fixture = Fixture::new();
    let before = fixture.snapshot();
    let report = install(
        &fixture.layout,
        Strictness::Strict,
        InstallOptions { dry_run: true },
    )
    .expect("dry run");
    assert!(report.dry_run);
    assert_eq!(report.changed_count(), 3);
    assert_eq!(fixture.snapshot(), before);
    assert!(!backup_path_for(&fixture.layout.host_path()).exists());
}

#[test]
fn existing_backup_is_never_overwritten() {
    let fixture = Fixture::new();
    let host_backup = backup_path_for(&fixture.layout.host_path());
    fs::write(&host_backup, "earliest original").expect("seed backup");

    let report =
        install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("install");
    assert!(!report.files[0].backup_created);
    assert_eq!(
        fs::read_to_string(&host_backup).expect("read backup"),
        "earliest original"
    );
}

#[test]
fn keep_backups_leaves_bak_files() {
    let fixture = Fixture::new();
    install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("install");
    let report = uninstall(
        &fixture.layout,
        Strictness::Strict,
        UninstallOptions { keep_backups: true },
    )
    .expect("uninstall");
    assert!(report.files.iter().all(|file| !file.backup_removed));
    assert!(backup_path_for(&fixture.asset("index-Dk3x9.js")).is_file());
}

#[test]
fn uninstall_without_backups_is_a_no_op() {
    let fixture = Fixture::new();
    let before = fixture.snapshot();
    let report =
        uninstall(&fixture.layout, Strictness::Strict, UninstallOptions::default()).expect("uninstall");
    assert!(report
        .files
        .iter()
        .all(|file| file.status == RestoreStatus::NoBackup));
    assert_eq!(fixture.snapshot(), before);
}

#[test]
fn patched_file_without_backup_is_reported() {
    let fixture = Fixture::new();
    install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("install");
    let bundle = fixture.asset("index-Dk3x9.js");
    fs::remove_file(backup_path_for(&bundle)).expect("drop backup");

    let outcome = restore_file(ArtifactRole::Bundle, &bundle, UninstallOptions::default())
        .expect("restore");
    assert_eq!(outcome.status, RestoreStatus::PatchedWithoutBackup);
}

#[test]
fn restore_fails_loudly_when_backup_carries_markers() {
    let fixture = Fixture::new();
    install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("install");
    let host = fixture.layout.host_path();
    fs::copy(&host, backup_path_for(&host)).expect("poison backup");

    let err = restore_file(ArtifactRole::Host, &host, UninstallOptions::default())
        .expect_err("markers survive restore");
    assert!(matches!(
        err.downcast_ref::<FoldError>(),
        Some(FoldError::Verification { .. })
    ));
    assert!(backup_path_for(&host).is_file());
}

#[test]
fn verification_names_the_missing_marker() {
    let tmp = tempfile::tempdir().expect("must create tempdir");
    let path = tmp.path().join("extension.js");
    fs::write(&path, "plain text").expect("write");

    let err = verify_marker_present(&path, "/* CODEX_WORKFLOW_FOLD_HOST_V7 */")
        .expect_err("marker is absent");
    assert!(err.to_string().contains("missing after write"));
    verify_markers_absent(&path, &["CODEX_WORKFLOW_FOLD_HOST"]).expect("nothing to find");
}

#[test]
fn missing_host_is_a_locate_error() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.layout.host_path()).expect("remove host");
    let err = locate_assets(&fixture.layout, Strictness::Strict).expect_err("host is missing");
    assert!(locate_message(&err).contains("host script not found"));
}

#[test]
fn bundle_reference_must_be_unique() {
    let fixture = Fixture::new();
    let html = fixture.layout.entry_html_path();

    fs::write(&html, "<html><script src=\"./assets/vendor.js\"></script></html>").expect("write");
    let err = locate_assets(&fixture.layout, Strictness::Lenient).expect_err("no reference");
    assert!(locate_message(&err).contains("no ./assets/index-*.js script reference"));

    fs::write(
        &html,
        r#"<script src="./assets/index-Dk3x9.js"></script><script src="./assets/index-Zz1.js"></script>"#,
    )
    .expect("write");
    let err = locate_assets(&fixture.layout, Strictness::Lenient).expect_err("two references");
    assert!(locate_message(&err).contains("ambiguous webview bundle"));
}

#[test]
fn referenced_bundle_must_exist() {
    let fixture = Fixture::new();
    fs::remove_file(fixture.asset("index-Dk3x9.js")).expect("remove bundle");
    let err = locate_assets(&fixture.layout, Strictness::Strict).expect_err("bundle is missing");
    assert!(locate_message(&err).contains("is missing"));
}

#[test]
fn duplicate_bundle_references_collapse() {
    let html = r#"<link rel="modulepreload" src="./assets/index-a1.js"><script src="./assets/index-a1.js"></script>"#;
    assert_eq!(
        parse_bundle_refs(html).expect("must parse"),
        vec!["index-a1.js".to_string()]
    );
}

#[test]
fn locale_choice_follows_references_then_elimination() {
    let siblings = set(&["zh-CN-A.js", "zh-CN-B.js"]);

    let picked = choose_locale(&siblings, &set(&["zh-CN-B.js"]), Strictness::Strict)
        .expect("referenced locale");
    assert_eq!(picked.as_deref(), Some("zh-CN-B.js"));

    let picked = choose_locale(&set(&["zh-CN-only.js"]), &set(&[]), Strictness::Strict)
        .expect("single sibling");
    assert_eq!(picked.as_deref(), Some("zh-CN-only.js"));

    let picked = choose_locale(&set(&[]), &set(&["zh-CN-B.js"]), Strictness::Strict)
        .expect("no siblings");
    assert_eq!(picked, None);
}

#[test]
fn ambiguous_locale_fails_strict_and_picks_smallest_when_lenient() {
    let siblings = set(&["zh-CN-B.js", "zh-CN-A.js", "zh-CN-C.js"]);
    for referenced in [set(&[]), set(&["zh-CN-C.js", "zh-CN-B.js"])] {
        let err = choose_locale(&siblings, &referenced, Strictness::Strict)
            .expect_err("strict refuses to guess");
        assert!(locate_message(&err).contains("ambiguous locale file"));
    }

    let picked = choose_locale(&siblings, &set(&[]), Strictness::Lenient).expect("lenient");
    assert_eq!(picked.as_deref(), Some("zh-CN-A.js"));
    let picked = choose_locale(
        &siblings,
        &set(&["zh-CN-C.js", "zh-CN-B.js"]),
        Strictness::Lenient,
    )
    .expect("lenient");
    assert_eq!(picked.as_deref(), Some("zh-CN-B.js"));
}

#[test]
fn inspect_reports_state_and_digests() {
    let fixture = Fixture::new();
    let clean = inspect(&fixture.layout, Strictness::Strict).expect("inspect clean");
    assert!(clean
        .files
        .iter()
        .all(|file| file.state == PatchState::Unpatched && file.backup.is_none()));

    install(&fixture.layout, Strictness::Strict, InstallOptions::default()).expect("install");
    let patched = inspect(&fixture.layout, Strictness::Strict).expect("inspect patched");
    let host = &patched.files[0];
    assert_eq!(
        host.state,
        PatchState::Current {
            marker: "/* CODEX_WORKFLOW_FOLD_HOST_V7 */"
        }
    );
    let backup = host.backup.as_ref().expect("host backup");
    assert_eq!(backup.sha256, sha256_hex(HOST.as_bytes()));
    assert_ne!(host.live_sha256, backup.sha256);
    assert_eq!(patched.files[1].shape, Some(BundleShape::Generic));
    assert_eq!(patched.files[2].role, ArtifactRole::Locale);
}

#[test]
fn sha256_hex_is_lowercase_hex() {
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn strips_collapse_setting_and_blank_runs() {
    let text = "model = \"o3\"\n\ncodex.workflow.collapseByDefault = \"expand\"\n\n[profiles.fast]\nmodel = \"o4-mini\"\n";
    let cleaned = strip_collapse_setting(text)
        .expect("valid pattern")
        .expect("setting present");
    assert_eq!(cleaned, "model = \"o3\"\n\n[profiles.fast]\nmodel = \"o4-mini\"\n");
    assert_eq!(
        strip_collapse_setting("model = \"o3\"\n").expect("valid pattern"),
        None
    );
}

#[test]
fn remove_collapse_setting_rewrites_only_when_present() {
    let tmp = tempfile::tempdir().expect("must create tempdir");
    let config = tmp.path().join("config.toml");
    assert!(!remove_collapse_setting(&config).expect("missing file is fine"));

    fs::write(&config, "codex.workflow.collapseByDefault = \"disable\"\nmodel = \"o3\"\n")
        .expect("write");
    assert!(remove_collapse_setting(&config).expect("rewrite"));
    assert_eq!(fs::read_to_string(&config).expect("read"), "model = \"o3\"\n");
    assert!(!remove_collapse_setting(&config).expect("already clean"));
}
