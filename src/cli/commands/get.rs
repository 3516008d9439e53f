use log::{info, warn};
use std::io::Write;

use crate::api::{AnyRunClient, Artifact, ArtifactOutput};
use crate::cli::args::GetArgs;
use crate::error::Result;
use crate::output::Output;

/// Execute get command
pub async fn execute<W: Write>(client: &AnyRunClient, args: &GetArgs, output: &mut Output<W>) -> Result<()> {
    let artifact = args.artifact();
    info!("Downloading {} for {}", artifact.description(), args.task);

    if artifact == Artifact::Pcap && args.json {
        warn!("--json does not apply to pcap downloads; writing a file");
    }

    // --json prints instead of writing; pcap is binary and always written
    let write_path = if args.json && artifact.is_json() {
        None
    } else {
        Some(
            args.output
                .clone()
                .unwrap_or_else(|| artifact.default_file_name(&args.task)),
        )
    };

    match client
        .get_artifact(artifact, &args.task, write_path.as_deref())
        .await?
    {
        ArtifactOutput::Json(text) => output.json(&text),
        ArtifactOutput::Written(written) => output.written(&written),
    }
}
