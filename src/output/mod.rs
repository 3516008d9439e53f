use colored::*;
use std::io::{self, Write};

use crate::api::Written;
use crate::error::Result;

/// Where command results go. Logging stays on stderr; this is stdout by default.
pub struct Output<W: Write = io::Stdout> {
    out: W,
}

impl Output<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> Output<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Print JSON text as-is
    pub fn json(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    /// Confirm a file write
    pub fn written(&mut self, written: &Written) -> Result<()> {
        let message = format!("Wrote {} ({} bytes)", written.path.display(), written.bytes);
        writeln!(self.out, "✅ {}", message.green())?;
        Ok(())
    }

    pub fn line(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text)?;
        Ok(())
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
