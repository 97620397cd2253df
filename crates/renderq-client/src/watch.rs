//! Watch files: remote output patterns the agent downloads automatically.

use serde_json::Value;

/// Maps a remote output pattern to a local download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchFile {
    /// Regex-style pattern over remote result paths, e.g. `"/proj/render_results/x/.+"`.
    pub output_pattern: String,
    /// Local directory the matching files are downloaded into.
    pub download_path: String,
}

impl WatchFile {
    pub fn new(output_pattern: impl Into<String>, download_path: impl Into<String>) -> Self {
        WatchFile {
            output_pattern: output_pattern.into(),
            download_path: download_path.into(),
        }
    }

    /// One `pattern: path` entry of the submit payload's `watch_files` map.
    pub(crate) fn entry(&self) -> (String, Value) {
        (
            self.output_pattern.clone(),
            Value::String(self.download_path.clone()),
        )
    }
}
