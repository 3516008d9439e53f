use log::debug;

use crate::cli::args::SubmitArgs;
use crate::error::{AnyRunError, Result};

pub const NOT_IMPLEMENTED: &str = "Submit is not yet implemented. Use the ANY.RUN GUI.";

/// Execute submit command. Always fails until the submission API is wired up.
pub fn execute(args: &SubmitArgs) -> Result<()> {
    debug!("refusing to submit {}", args.file.display());
    Err(AnyRunError::NotImplemented(NOT_IMPLEMENTED))
}
