mod apply;
mod backup;
mod config_cleanup;
mod fs_utils;
mod inspect;
mod layout;
mod locate;
mod restore;
mod types;
mod verify;

pub use apply::install;
pub use backup::ensure_backup;
pub use config_cleanup::{codex_config_path, remove_collapse_setting, strip_collapse_setting};
pub use inspect::{inspect, sha256_hex};
pub use layout::ExtensionLayout;
pub use locate::{choose_locale, locale_refs, locate_assets, parse_bundle_refs};
pub use restore::{restore_file, uninstall};
pub use types::{
    AssetSet, BackupInspection, FileInspection, FileOutcome, InspectReport, InstallOptions,
    InstallReport, RestoreOutcome, RestoreStatus, UninstallOptions, UninstallReport,
};
pub use verify::{verify_marker_present, verify_markers_absent};

#[cfg(test)]
mod tests;
