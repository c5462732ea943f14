use std::path::{Path, PathBuf};

/// Fixed directory layout of one installed extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionLayout {
    root: PathBuf,
}

impl ExtensionLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn host_path(&self) -> PathBuf {
        self.root.join("out").join("extension.js")
    }

    pub fn webview_dir(&self) -> PathBuf {
        self.root.join("webview")
    }

    pub fn entry_html_path(&self) -> PathBuf {
        self.webview_dir().join("index.html")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.webview_dir().join("assets")
    }

    pub fn asset_path(&self, file_name: &str) -> PathBuf {
        self.assets_dir().join(file_name)
    }
}
