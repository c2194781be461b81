//! CLI-specific progress handling for gitlab-archive-dl
//!
//! One bar counts finished projects. Each retry round restarts it.

use indicatif::{ProgressBar, ProgressStyle};

use gitlab_archive_dl::ProgressCallback;

/// Creates a progress bar counting archived projects
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} projects ({percent}%) ETA: {eta}")
            .expect("Failed to create progress style")
            .progress_chars("#>-"),
    );
    pb
}

/// Progress manager for a mirror run
pub struct ProgressManager {
    pub pb: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(message: &str) -> Self {
        let pb = create_progress_bar(0);

        // Print initial message to stderr
        eprintln!("{message}");

        Self { pb }
    }

    /// Callback handed to the library; `completed == 1` marks a new round
    pub fn callback(&self) -> ProgressCallback {
        let pb = self.pb.clone();
        std::sync::Arc::new(move |completed, total| {
            if completed <= 1 {
                pb.reset();
            }
            if pb.length().unwrap_or(0) != total {
                pb.set_length(total);
            }
            pb.set_position(completed);
        })
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_progress_bar_template() {
        let pb = create_progress_bar(10);
        assert_eq!(pb.length().unwrap(), 10);
        pb.set_position(3);
        pb.finish();
    }

    #[test]
    fn test_callback_restarts_per_round() {
        let manager = ProgressManager::new("Test mirror");
        let callback = manager.callback();

        callback(1, 5);
        callback(5, 5);
        assert_eq!(manager.pb.length().unwrap(), 5);
        assert_eq!(manager.pb.position(), 5);

        // retry round over the two leftovers
        callback(1, 2);
        assert_eq!(manager.pb.length().unwrap(), 2);
        assert_eq!(manager.pb.position(), 1);
    }
}
