// Terminal output: per-probe lines and stage progress bars

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use subspider_scanner::ProbeOutcome;

/// Controls what a run writes to the terminal
#[derive(Debug, Clone, Copy)]
pub struct Console {
    pub show_progress_bars: bool,
    /// Only live results and the final summary are printed
    pub quiet: bool,
    /// Nothing is printed at all
    pub muted: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self {
            show_progress_bars: true,
            quiet: false,
            muted: false,
        }
    }
}

impl Console {
    /// No output at all, used by tests and library callers
    pub fn silent() -> Self {
        Self {
            show_progress_bars: false,
            quiet: true,
            muted: true,
        }
    }

    pub fn stage_bar(&self, len: usize, label: &str) -> Option<ProgressBar> {
        if !self.show_progress_bars || self.quiet || self.muted {
            return None;
        }

        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );
        pb.set_message(label.to_string());
        Some(pb)
    }

    pub fn info(&self, msg: &str) {
        if !self.quiet && !self.muted {
            println!("{} {}", "[i]".cyan().bold(), msg.cyan());
        }
    }

    pub fn success(&self, msg: &str) {
        if self.muted {
            return;
        }
        println!("{} {}", "[✓]".cyan().bold(), msg.cyan());
    }

    pub fn warn(&self, msg: &str) {
        if self.muted {
            return;
        }
        println!("{} {}", "[!]".red().bold(), msg.red());
    }

    /// Print one probe outcome, above the progress bar when there is one
    pub fn probe(&self, bar: Option<&ProgressBar>, url: &str, outcome: &ProbeOutcome) {
        if self.muted || (self.quiet && !outcome.is_live()) {
            return;
        }

        let line = format_probe_line(url, outcome);
        match bar {
            Some(pb) => pb.println(line),
            None => println!("{}", line),
        }
    }
}

/// Green for live, yellow for reachable, red for failed
pub fn format_probe_line(url: &str, outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Live { status, title } => {
            format!("[{}] {} - {}", status, url, title).green().to_string()
        }
        ProbeOutcome::Reachable { status, title } => {
            format!("[{}] {} - {}", status, url, title).yellow().to_string()
        }
        ProbeOutcome::Failed { message, .. } => {
            format!("[-] Failed: {} - {}", url, message).red().to_string()
        }
    }
}
