use log::{debug, warn};
use reqwest::{Client, Response};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};

use super::http_client::create_custom_client;
use super::json::to_sorted_json;
use super::{Artifact, Endpoints};
use crate::config::Credentials;
use crate::error::{AnyRunError, Result};
use crate::progress::ProgressManager;

/// Write buffer size for binary downloads
pub const PCAP_CHUNK_SIZE: usize = 1024;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Verify TLS certificates
    pub verify_ssl: bool,
    /// Connect timeout in seconds
    pub connect_timeout: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            verify_ssl: true,
            connect_timeout: 30,
            user_agent: format!("anyrun-cli/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// A file produced by a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Result of a JSON artifact fetch: the text itself, or the file it went to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactOutput {
    Json(String),
    Written(Written),
}

/// ANY.RUN sandbox API client
pub struct AnyRunClient {
    credentials: Credentials,
    endpoints: Endpoints,
    http_client: Client,
    progress: Option<Arc<ProgressManager>>,
}

impl AnyRunClient {
    /// Create a client for the credentials' host
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let endpoints = Endpoints::for_host(credentials.host());
        Self::with_endpoints(credentials, endpoints, config)
    }

    /// Create a client against explicit URL bases
    pub fn with_endpoints(credentials: Credentials, endpoints: Endpoints, config: ClientConfig) -> Result<Self> {
        let http_client = create_custom_client(&config, &credentials)?;

        Ok(Self {
            credentials,
            endpoints,
            http_client,
            progress: None,
        })
    }

    /// Report binary download progress through the given manager
    pub fn with_progress(mut self, progress: Arc<ProgressManager>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn request(&self, url: &str) -> Result<Response> {
        debug!("making {} request.", url);
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!("{} returned {}", url, status);
            return Err(AnyRunError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    async fn api_request(&self, resource: &str) -> Result<Response> {
        let url = format!("{}{}", self.endpoints.api_base, resource);
        self.request(&url).await
    }

    async fn report_request(&self, resource: &str) -> Result<Response> {
        let url = format!("{}{}", self.endpoints.report_base, resource);
        self.request(&url).await
    }

    async fn content_request(&self, resource: &str) -> Result<Response> {
        let url = format!("{}{}", self.endpoints.content_base, resource);
        self.request(&url).await
    }

    /// Authenticated GET of an absolute URL, for links embedded in reports
    pub async fn fetch_url(&self, url: &str) -> Result<Response> {
        self.request(url).await
    }

    async fn sorted_json(response: Response) -> Result<String> {
        let body = response.bytes().await?;
        let value: Value = serde_json::from_slice(&body)?;
        to_sorted_json(&value)
    }

    pub async fn get_environment(&self) -> Result<String> {
        debug!("getting environment details.");
        Self::sorted_json(self.api_request("environment").await?).await
    }

    pub async fn get_user(&self) -> Result<String> {
        debug!("getting user details.");
        Self::sorted_json(self.api_request("user").await?).await
    }

    /// Analysis history for this account
    pub async fn get_history(&self) -> Result<String> {
        debug!("getting analysis history.");
        Self::sorted_json(self.api_request("analysis").await?).await
    }

    /// Full analysis report for a task; written to `write_path` when given
    pub async fn get_report(&self, task: &str, write_path: Option<&Path>) -> Result<ArtifactOutput> {
        debug!("getting analysis report for {}", task);
        let text = Self::sorted_json(self.api_request(&format!("analysis/{}", task)).await?).await?;
        Self::emit_json(text, write_path).await
    }

    pub async fn get_report_iocs(&self, task: &str, write_path: Option<&Path>) -> Result<ArtifactOutput> {
        debug!("downloading IOCs for {}", task);
        let text = Self::sorted_json(self.report_request(&format!("report/{}/ioc/json", task)).await?).await?;
        Self::emit_json(text, write_path).await
    }

    pub async fn get_report_summary(&self, task: &str, write_path: Option<&Path>) -> Result<ArtifactOutput> {
        debug!("downloading report summary for {}", task);
        let text =
            Self::sorted_json(self.report_request(&format!("report/{}/summary/json", task)).await?).await?;
        Self::emit_json(text, write_path).await
    }

    /// Fetch any artifact kind. JSON kinds honor `write_path`; pcap always goes to a file.
    pub async fn get_artifact(
        &self,
        artifact: Artifact,
        task: &str,
        write_path: Option<&Path>,
    ) -> Result<ArtifactOutput> {
        match artifact {
            Artifact::Report => self.get_report(task, write_path).await,
            Artifact::Iocs => self.get_report_iocs(task, write_path).await,
            Artifact::Summary => self.get_report_summary(task, write_path).await,
            Artifact::Pcap => self
                .download_report_pcap(task, write_path)
                .await
                .map(ArtifactOutput::Written),
        }
    }

    /// Stream the task's pcap to `write_path` (default `{task}.anyrun.pcap`)
    pub async fn download_report_pcap(&self, task: &str, write_path: Option<&Path>) -> Result<Written> {
        debug!("downloading pcap for {}", task);
        let mut response = self
            .content_request(&format!("tasks/{}/download/pcap", task))
            .await?;

        let path = write_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Artifact::Pcap.default_file_name(task));

        let bar = self
            .progress
            .as_ref()
            .and_then(|progress| progress.create_download_progress(response.content_length()));

        let file = File::create(&path)
            .await
            .map_err(|e| AnyRunError::write(&path, e))?;
        let mut writer = BufWriter::with_capacity(PCAP_CHUNK_SIZE, file);

        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| AnyRunError::write(&path, e))?;
            bytes += chunk.len() as u64;
            if let Some(ref pb) = bar {
                pb.inc(chunk.len() as u64);
            }
        }
        writer
            .flush()
            .await
            .map_err(|e| AnyRunError::write(&path, e))?;

        if let Some(pb) = bar {
            pb.finish_and_clear();
        }

        let written = Self::verify_written(path, bytes).await?;
        debug!("wrote {} bytes to {}", written.bytes, written.path.display());
        Ok(written)
    }

    async fn emit_json(text: String, write_path: Option<&Path>) -> Result<ArtifactOutput> {
        let Some(path) = write_path else {
            return Ok(ArtifactOutput::Json(text));
        };

        fs::write(path, text.as_bytes())
            .await
            .map_err(|e| AnyRunError::write(path, e))?;

        let written = Self::verify_written(path.to_path_buf(), text.len() as u64).await?;
        debug!("wrote {} bytes to {}", written.bytes, written.path.display());
        Ok(ArtifactOutput::Written(written))
    }

    async fn verify_written(path: PathBuf, bytes: u64) -> Result<Written> {
        let exists = fs::try_exists(&path)
            .await
            .map_err(|e| AnyRunError::write(&path, e))?;
        if !exists {
            return Err(AnyRunError::NotWritten(path));
        }
        Ok(Written { path, bytes })
    }
}
