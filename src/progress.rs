//! Progress reporting for frame analysis.
//!
//! The analyzer notifies a [`ProgressObserver`] after each frame has been
//! appended to the results, strictly in frame order. Observers only watch;
//! they cannot influence or stop the run.
//!
//! [`indicatif::ProgressBar`] implements the trait directly, which is what the
//! command-line tool uses.

use indicatif::{ProgressBar, ProgressStyle};

pub trait ProgressObserver {
    /// Called once per frame, after its result is stored.
    ///
    /// `total` is the number of frames the run expects to process, when the
    /// source knows it.
    fn on_frame(&self, frame_index: usize, total: Option<usize>);
}

impl ProgressObserver for ProgressBar {
    fn on_frame(&self, frame_index: usize, total: Option<usize>) {
        if let Some(total) = total {
            if self.length() != Some(total as u64) {
                self.set_length(total as u64);
            }
        }
        self.set_position(frame_index as u64 + 1);
    }
}

/// Progress bar drawn on stderr, sized when the frame count is known.
pub fn frame_progress_bar(total: Option<usize>) -> ProgressBar {
    match total {
        Some(total) => {
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} frames {msg}")
            {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {pos} frames {msg}") {
                pb.set_style(style);
            }
            pb
        }
    }
}
