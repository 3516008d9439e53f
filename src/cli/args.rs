use clap::Args;
use std::path::PathBuf;

use crate::api::Artifact;

/// Get command arguments
#[derive(Args, Debug)]
pub struct GetArgs {
    /// An analysis task id
    pub task: String,

    /// Download any pcap available for the given report
    #[arg(short, long)]
    pub pcap: bool,

    /// Download IOCs for the report
    #[arg(short, long)]
    pub ioc: bool,

    /// Get the report summary
    #[arg(short, long)]
    pub summary: bool,

    /// Print JSON results to stdout instead of writing a file
    #[arg(long)]
    pub json: bool,

    /// Write to this path instead of the task-derived file name
    #[arg(short, long, value_name = "PATH", conflicts_with = "json")]
    pub output: Option<PathBuf>,
}

impl GetArgs {
    /// The one artifact honored: pcap, then IOCs, then summary, else the full report
    pub fn artifact(&self) -> Artifact {
        if self.pcap {
            Artifact::Pcap
        } else if self.ioc {
            Artifact::Iocs
        } else if self.summary {
            Artifact::Summary
        } else {
            Artifact::Report
        }
    }
}

/// Submit command arguments
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Path to file to submit
    pub file: PathBuf,
}
