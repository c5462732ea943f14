mod artifact;
mod error;
mod policy;
mod version;

pub use artifact::{backup_path_for, ArtifactFile, ArtifactRole};
pub use error::FoldError;
pub use policy::Strictness;
pub use version::{parse_release_version, version_from_dir_name, EXTENSION_DIR_PREFIX};
