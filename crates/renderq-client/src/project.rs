//! Projects: the unit of submission to the service.
//!
//! A project owns a local root folder, the jobs to run, and the staged file
//! list uploaded alongside them. Staged paths are stored relative to the
//! root with forward slashes, which is what the remote side expects
//! regardless of the submitting platform. Render results land in a
//! timestamped folder under `{remote_root}/render_results/` and are pulled
//! back down by watch-file rules.

use std::path::{Path, PathBuf};

use serde_json::{json, Map, Value};
use time::macros::format_description;
use time::OffsetDateTime;
use walkdir::WalkDir;

use crate::client::SubmitOptions;
use crate::error::ClientError;
use crate::job::Job;
use crate::watch::WatchFile;

/// Local folder name the default watch rule downloads results into.
const RESULTS_DIR: &str = "renderq_results";

/// A project being prepared for upload and submission.
#[derive(Debug, Clone)]
pub struct Project {
    local_root: PathBuf,
    name: String,
    /// Free-form project params forwarded with the submission.
    pub params: Map<String, Value>,
    remote_output_folder_name: String,
    display_stamp: String,
    jobs: Vec<Job>,
    files: Vec<String>,
    watch_files: Vec<WatchFile>,
}

impl Project {
    /// Creates a project rooted at `project_folder`, named after the folder.
    pub fn new(project_folder: impl AsRef<Path>) -> Result<Self, ClientError> {
        let local_root = std::path::absolute(project_folder.as_ref())?;
        let name = local_root
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let now = OffsetDateTime::now_utc();
        let remote_output_folder_name = now.format(format_description!(
            "[year]-[month]-[day]_[hour]-[minute]-[second]_[subsecond digits:6]"
        ))?;
        let display_stamp = now.format(format_description!(
            "[year]-[month repr:short]-[day] [hour]:[minute]:[second] [period]"
        ))?;

        Ok(Project {
            local_root,
            name,
            params: Map::new(),
            remote_output_folder_name,
            display_stamp,
            jobs: Vec::new(),
            files: Vec::new(),
            watch_files: Vec::new(),
        })
    }

    /// Overrides the project name (and with it the remote root).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// Remote mount point of the project's files.
    pub fn remote_root(&self) -> String {
        format!("/{}", self.name)
    }

    /// Timestamp-derived name of this submission's output folder.
    pub fn remote_output_folder_name(&self) -> &str {
        &self.remote_output_folder_name
    }

    /// Remote folder render results are written into.
    pub fn remote_output_folder(&self) -> String {
        format!(
            "{}/render_results/{}",
            self.remote_root(),
            self.remote_output_folder_name
        )
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: Value) {
        self.params.insert(key.into(), value);
    }

    pub fn add_job(&mut self, job: Job) {
        self.jobs.push(job);
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    /// Staged files, relative to the root with forward slashes.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Stages individual files. Relative paths are resolved against the
    /// project root; anything missing or outside the root is skipped.
    pub fn add_files<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for path in paths {
            let path = self.absolutize(path.as_ref());
            if path.is_file() {
                self.stage(&path);
            }
        }
    }

    /// Stages every file under the given folders, recursively. Same
    /// containment rule as [`Project::add_files`].
    pub fn add_folders<I, P>(&mut self, folders: I)
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        for folder in folders {
            let folder = self.absolutize(folder.as_ref());
            if !folder.is_dir() || !folder.starts_with(&self.local_root) {
                continue;
            }
            for entry in WalkDir::new(&folder).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    self.stage(entry.path());
                }
            }
        }
    }

    pub fn add_watch_file(&mut self, watch: WatchFile) {
        self.watch_files.push(watch);
    }

    fn absolutize(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.local_root.join(path)
        }
    }

    fn stage(&mut self, path: &Path) {
        if let Ok(rel) = path.strip_prefix(&self.local_root) {
            let rel = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            self.files.push(rel);
        }
    }

    /// Watch rule used when the caller configures none: pull everything the
    /// submission writes into its output folder down next to the project.
    fn default_watch_file(&self) -> WatchFile {
        WatchFile::new(
            format!("{}/.+", self.remote_output_folder()),
            self.local_root.join(RESULTS_DIR).to_string_lossy(),
        )
    }

    /// The `/project-submit` payload.
    pub fn submit_payload(&self, options: &SubmitOptions) -> Value {
        let jobs: Vec<Value> = self.jobs.iter().map(|job| job.payload(self)).collect();

        let mut payload = json!({
            "project_request": {
                "name": format!("{} {}", self.name, self.display_stamp),
                "params": self.params,
                "jobs": jobs,
            },
            "project_files": {
                "localRoot": self.local_root.to_string_lossy(),
                "remoteRoot": self.remote_root(),
                "files": self.files,
            },
            "watch_files": {},
        });

        if options.skip_upload {
            payload["skip_upload"] = json!(true);
        }

        if !options.skip_auto_download {
            let mut watch = Map::new();
            if self.watch_files.is_empty() {
                let (pattern, path) = self.default_watch_file().entry();
                watch.insert(pattern, path);
            } else {
                for item in &self.watch_files {
                    let (pattern, path) = item.entry();
                    watch.insert(pattern, path);
                }
            }
            payload["watch_files"] = Value::Object(watch);
        }

        payload
    }

    /// The `/upload` payload: just the file manifest.
    pub fn upload_payload(&self) -> Value {
        json!({
            "upload": [{
                "localRoot": self.local_root.to_string_lossy(),
                "remoteRoot": self.remote_root(),
                "files": self.files,
            }]
        })
    }
}
