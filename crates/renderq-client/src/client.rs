//! EnvoyClient: HTTP access to the locally running service agent.
//!
//! The agent ("envoy") proxies the remote render farm: it validates
//! credentials, reports the credit balance, serves the products catalog, and
//! accepts project uploads and submissions. All calls are plain
//! request/response JSON; there is no retry policy here because the agent is
//! local and failures surface to the caller directly.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use renderq_core::{Product, Resolver};

use crate::error::ClientError;
use crate::project::Project;

/// Default address of the local service agent.
pub const DEFAULT_API_BASE: &str = "http://localhost:8090";

/// Per-request timeout. Uploads are manifest-only, so nothing long-running
/// goes through this client.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(80);

/// Flags controlling a project submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmitOptions {
    /// Submit without uploading project files (they are already remote).
    pub skip_upload: bool,
    /// Do not register watch-file download rules for the results.
    pub skip_auto_download: bool,
}

/// Client for the service agent API.
#[derive(Debug, Clone)]
pub struct EnvoyClient {
    base_url: String,
    email: String,
    access_key: String,
    http: reqwest::Client,
}

impl EnvoyClient {
    /// Creates a client for the default local agent address.
    pub fn new(
        email: impl Into<String>,
        access_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(EnvoyClient {
            base_url: DEFAULT_API_BASE.to_string(),
            email: email.into(),
            access_key: access_key.into(),
            http,
        })
    }

    /// Points the client at a non-default agent address.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Checks the configured credentials against the agent.
    pub async fn validate_auth(&self) -> Result<(), ClientError> {
        let url = format!("{}/auth", self.base_url);
        debug!(%url, "validating credentials");

        let resp = self
            .http
            .post(&url)
            .json(&json!({
                "Username": self.email,
                "AccessKey": self.access_key,
            }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ClientError::Authentication {
                status: 401,
                message: resp.text().await.unwrap_or_default(),
            }),
            StatusCode::NOT_FOUND => Err(not_found(&url)),
            status => Err(unexpected(status, resp).await),
        }
    }

    /// Checks that the account has credits available to run jobs.
    pub async fn validate_credits(&self) -> Result<(), ClientError> {
        let url = format!("{}/credits-info", self.base_url);
        debug!(%url, "checking credit balance");

        let resp = self.http.get(&url).send().await?;
        match resp.status() {
            StatusCode::OK => {
                let info: CreditsInfo = resp.json().await?;
                if info.credits_available <= 0.0 {
                    return Err(ClientError::InsufficientCredits);
                }
                Ok(())
            }
            StatusCode::NOT_FOUND => Err(not_found(&url)),
            status => Err(unexpected(status, resp).await),
        }
    }

    /// Fetches the raw products catalog.
    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        let url = format!("{}/products", self.base_url);
        debug!(%url, "fetching products catalog");

        let resp = self.http.get(&url).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await?),
            StatusCode::NOT_FOUND => Err(not_found(&url)),
            status => Err(unexpected(status, resp).await),
        }
    }

    /// Validates credentials, fetches the catalog, and builds a resolver
    /// over it for offline compatibility queries.
    pub async fn product_resolver(&self) -> Result<Resolver, ClientError> {
        self.validate_auth().await?;
        let products = self.products().await?;
        Ok(Resolver::new(&products)?)
    }

    /// Uploads the project's file manifest ahead of submission. Returns the
    /// project name the agent acknowledged.
    pub async fn upload_project_files(&self, project: &Project) -> Result<String, ClientError> {
        self.validate_auth().await?;
        self.validate_credits().await?;

        let url = format!("{}/upload", self.base_url);
        debug!(%url, project = project.name(), "uploading project files");

        let resp = self
            .http
            .post(&url)
            .json(&project.upload_payload())
            .send()
            .await?;

        let status = resp.status();
        if status == StatusCode::OK {
            let body: Value = resp.json().await?;
            if body.get("ID").and_then(Value::as_str) == Some(project.name()) {
                return Ok(project.name().to_string());
            }
            return Err(ClientError::Api {
                message: format!("upload acknowledged the wrong project: {}", body),
            });
        }

        Err(unexpected(status, resp).await)
    }

    /// Submits the project's job graph. Returns the project name on success.
    pub async fn submit_project(
        &self,
        project: &Project,
        options: SubmitOptions,
    ) -> Result<String, ClientError> {
        if project.jobs().is_empty() {
            return Err(ClientError::InvalidProject {
                reason: "project has no jobs".to_string(),
            });
        }

        self.validate_auth().await?;
        self.validate_credits().await?;

        let url = format!("{}/project-submit", self.base_url);
        debug!(%url, project = project.name(), "submitting project");

        let resp = self
            .http
            .post(&url)
            .json(&project.submit_payload(&options))
            .send()
            .await?;

        match resp.status() {
            StatusCode::CREATED => Ok(project.name().to_string()),
            StatusCode::BAD_REQUEST => Err(ClientError::InvalidRequest {
                message: "invalid request".to_string(),
                errors: resp.json().await.ok(),
            }),
            StatusCode::NOT_FOUND => Err(not_found(&url)),
            status => Err(unexpected(status, resp).await),
        }
    }

    /// Polls the status of a submitted project.
    pub async fn project_status(&self, name: &str) -> Result<Value, ClientError> {
        self.validate_auth().await?;

        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .push("project-status")
            .push(name);
        debug!(%url, "fetching project status");

        let resp = self.http.get(url.clone()).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await?),
            StatusCode::NOT_FOUND => Err(not_found(url.as_str())),
            status => Err(unexpected(status, resp).await),
        }
    }
}

/// Credit balance payload of `/credits-info`.
#[derive(Debug, Deserialize)]
struct CreditsInfo {
    #[serde(default)]
    credits_available: f64,
}

fn not_found(url: &str) -> ClientError {
    ClientError::InvalidRequest {
        message: format!("404: {} not found", url),
        errors: None,
    }
}

async fn unexpected(status: StatusCode, resp: reqwest::Response) -> ClientError {
    ClientError::Api {
        message: format!("{} {}", status, resp.text().await.unwrap_or_default()),
    }
}
