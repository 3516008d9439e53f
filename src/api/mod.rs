pub mod client;
pub mod http_client;
pub mod json;

pub use client::{AnyRunClient, ArtifactOutput, ClientConfig, Written};

use std::path::PathBuf;

const CONTENT_BASE_URL: &str = "https://content.any.run/";

/// The three URL bases the sandbox API is spread across
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// `https://{host}/v1/` - account, environment and analysis resources
    pub api_base: String,
    /// `https://{host}/` - report sub-resources
    pub report_base: String,
    /// `https://content.any.run/` - binary downloads
    pub content_base: String,
}

impl Endpoints {
    pub fn for_host(host: &str) -> Self {
        Self {
            api_base: format!("https://{}/v1/", host),
            report_base: format!("https://{}/", host),
            content_base: CONTENT_BASE_URL.to_string(),
        }
    }

    /// Serve every resource from one origin (mock servers, proxies)
    pub fn from_origin(origin: &str) -> Self {
        let origin = origin.trim_end_matches('/');
        Self {
            api_base: format!("{}/v1/", origin),
            report_base: format!("{}/", origin),
            content_base: format!("{}/", origin),
        }
    }
}

/// Per-task report artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Full analysis report (JSON)
    Report,
    /// Indicators of compromise (JSON)
    Iocs,
    /// Report summary (JSON)
    Summary,
    /// Packet capture (binary)
    Pcap,
}

impl Artifact {
    /// File name used when no output path is given
    pub fn default_file_name(&self, task: &str) -> PathBuf {
        let suffix = match self {
            Self::Report => "anyrun.json",
            Self::Iocs => "anyrun.ioc.json",
            Self::Summary => "anyrun.summary.json",
            Self::Pcap => "anyrun.pcap",
        };
        PathBuf::from(format!("{}.{}", task, suffix))
    }

    pub fn is_json(&self) -> bool {
        !matches!(self, Self::Pcap)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Report => "analysis report",
            Self::Iocs => "IOCs",
            Self::Summary => "report summary",
            Self::Pcap => "pcap",
        }
    }
}
