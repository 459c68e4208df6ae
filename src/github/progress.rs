//! Progress reporting for API operations, kept out of the fetch logic so
//! the client and analyzer can run without a terminal.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub trait ProgressObserver: Send + Sync {
    fn started(&self, operation: &str);
    fn finished(&self, operation: &str);
    fn failed(&self, operation: &str, reason: &str);
    fn warning(&self, message: &str);
}

/// Reports through `tracing` only.
#[derive(Debug, Default)]
pub struct TracingProgress;

impl ProgressObserver for TracingProgress {
    fn started(&self, operation: &str) {
        tracing::debug!("{}...", operation);
    }

    fn finished(&self, operation: &str) {
        tracing::debug!("{}: done", operation);
    }

    fn failed(&self, operation: &str, reason: &str) {
        tracing::debug!("{}: failed: {}", operation, reason);
    }

    fn warning(&self, message: &str) {
        tracing::warn!("{}", message);
    }
}

/// One spinner per in-flight operation, rendered on stderr.
pub struct SpinnerProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<String, ProgressBar>>,
}

impl SpinnerProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    #[cfg(test)]
    fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(indicatif::ProgressDrawTarget::hidden()),
            bars: Mutex::new(HashMap::new()),
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.bars.lock().map(|bars| bars.len()).unwrap_or_default()
    }

    fn take_bar(&self, operation: &str) -> Option<ProgressBar> {
        self.bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(operation))
    }
}

impl Default for SpinnerProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for SpinnerProgress {
    fn started(&self, operation: &str) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::style());
        pb.set_message(operation.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut bars) = self.bars.lock() {
            bars.insert(operation.to_string(), pb);
        }
    }

    fn finished(&self, operation: &str) {
        if let Some(pb) = self.take_bar(operation) {
            pb.finish_with_message(format!("✔ {}", operation));
        }
    }

    fn failed(&self, operation: &str, reason: &str) {
        if let Some(pb) = self.take_bar(operation) {
            pb.abandon_with_message(format!("✖ {} ({})", operation, reason));
        }
    }

    fn warning(&self, message: &str) {
        let line = format!("⚠ {}", message);
        // A hidden target swallows println, e.g. when stderr is not a terminal
        if self.multi.is_hidden() {
            eprintln!("{}", line);
        } else if let Err(e) = self.multi.println(&line) {
            tracing::debug!("Could not print above spinners: {}", e);
            eprintln!("{}", line);
        }
    }
}
