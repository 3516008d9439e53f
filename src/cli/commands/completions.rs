use clap::CommandFactory;
use clap_complete::{generate, Shell};
use std::io::Write;

use crate::cli::Cli;
use crate::error::Result;
use crate::output::Output;

/// Generate shell completion scripts
pub fn execute<W: Write>(shell: Shell, output: &mut Output<W>) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, output.writer());
    Ok(())
}
