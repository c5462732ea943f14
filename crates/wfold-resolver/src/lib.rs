mod candidate;
mod scan;
mod select;

pub use candidate::Candidate;
pub use scan::{
    default_extension_roots, read_package_version, resolve_target, scan_extension_roots,
    user_home_dir, validate_override,
};
pub use select::select_target;
