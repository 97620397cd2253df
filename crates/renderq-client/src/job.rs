//! Jobs: one render/compute task inside a submitted project.
//!
//! A job names the application (`app` + `app_version`, matching the
//! catalog's `type:version` identifiers split apart), the operation to run,
//! the scene path, and free-form params. Jobs form a dependency graph by id;
//! the wire payload references dependencies by their uuid.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::project::Project;

/// One job of a project's job graph.
#[derive(Debug, Clone)]
pub struct Job {
    id: String,
    pub name: String,
    pub app: String,
    pub app_version: String,
    pub operation: String,
    pub path: String,
    /// Plugin identifiers (`type:version`) this job bills against.
    pub plugins: Vec<String>,
    /// Free-form submission params forwarded to the service.
    pub params: Map<String, Value>,
    dependencies: Vec<String>,
}

impl Job {
    pub fn new(
        name: impl Into<String>,
        app: impl Into<String>,
        app_version: impl Into<String>,
        operation: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Job {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            app: app.into(),
            app_version: app_version.into(),
            operation: operation.into(),
            path: path.into(),
            plugins: Vec::new(),
            params: Map::new(),
            dependencies: Vec::new(),
        }
    }

    /// The generated job id, referenced by dependent jobs.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn add_plugin(&mut self, plugin: impl Into<String>) {
        self.plugins.push(plugin.into());
    }

    pub fn set_param(&mut self, key: impl Into<String>, value: Value) {
        self.params.insert(key.into(), value);
    }

    /// Makes this job wait for `job` to finish.
    pub fn add_dependency(&mut self, job: &Job) {
        self.dependencies.push(job.id.clone());
    }

    /// Wire payload for this job, relative to its owning project: output
    /// routing defaults are derived from the project's remote output folder
    /// and are only injected when the caller has not set them explicitly.
    pub(crate) fn payload(&self, project: &Project) -> Value {
        let mut params = self.params.clone();
        params.insert(
            "output_dir_name".to_string(),
            json!(project.remote_output_folder_name()),
        );

        if !params.contains_key("output_upload") {
            let pattern = format!("{}/.+", project.remote_output_folder());
            // Windows-side agents match against backslash paths.
            params.insert(
                "output_upload".to_string(),
                json!([pattern.clone(), pattern.replace('/', "\\\\")]),
            );
        }

        if !params.contains_key("billing_meta") {
            let mut billing = vec![self.app.clone()];
            billing.extend(self.plugins.iter().cloned());
            params.insert("billing_meta".to_string(), json!(billing));
        }

        json!({
            "id": self.id,
            "name": self.name,
            "app": self.app,
            "app_version": self.app_version,
            "operation": self.operation,
            "path": self.path,
            "params": params,
            "dependencies": self.dependencies,
        })
    }
}
