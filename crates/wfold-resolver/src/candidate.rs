use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use semver::Version;

/// One installed copy of the extension found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub dir: PathBuf,
    pub mtime: SystemTime,
    pub version: Option<Version>,
}

impl Candidate {
    pub fn new(dir: impl Into<PathBuf>, mtime: SystemTime, version: Option<Version>) -> Self {
        Self {
            dir: dir.into(),
            mtime,
            version,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} (version: {version})", self.dir.display()),
            None => write!(f, "{} (version: unparsable)", self.dir.display()),
        }
    }
}
