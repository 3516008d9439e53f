use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, IsTerminal};
use std::time::Duration;

/// Progress indicator manager
pub struct ProgressManager {
    enabled: bool,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(quiet: bool) -> Self {
        // Bars draw on stderr; stay silent when it is piped or in quiet mode
        let enabled = !quiet && io::stderr().is_terminal();

        Self { enabled }
    }

    /// Create a download progress bar, or a byte-counting spinner when the size is unknown
    pub fn create_download_progress(&self, total_size: Option<u64>) -> Option<ProgressBar> {
        if !self.enabled {
            return None;
        }

        let pb = match total_size {
            Some(total) => {
                let pb = ProgressBar::new(total);
                pb.set_style(
                    ProgressStyle::default_bar()
                        .template("{msg}\n{bar:40.green/white} {bytes}/{total_bytes} ({eta})")
                        .ok()?
                        .progress_chars("=>-"),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::default_spinner()
                        .template("{spinner:.green} {msg} {bytes}")
                        .ok()?,
                );
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        pb.set_message(messages::DOWNLOADING);

        Some(pb)
    }

    /// Check if progress is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Progress messages for different operations
pub mod messages {
    pub const DOWNLOADING: &str = "Downloading pcap...";
}
