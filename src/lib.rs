//! video-fft - Measure the spectral resolution of video frames
//!
//! video-fft estimates how much fine detail a video actually carries by
//! looking at the 2D frequency content of its frames, independent of the
//! nominal pixel dimensions.
//!
//! # Overview
//!
//! Upscaled or heavily filtered footage has a characteristic spectrum: the
//! energy near the centre (low frequencies) is intact, but the outer rings of
//! the spectrum are nearly empty. Content shot and delivered at its native
//! resolution keeps energy all the way out.
//!
//! # Method
//!
//! 1. **Spectrum**: each frame's luminance goes through a 2D FFT, is shifted
//!    so DC sits at the centre, and is compressed with `ln(1 + |F|)`.
//!
//! 2. **Radial profile**: the spectrum is averaged over integer-radius rings
//!    around the centre, giving energy as a function of spatial frequency.
//!
//! 3. **Score**: the profile values of the upper half of the rings are summed
//!    into a single high-frequency score. Scores are comparable between videos
//!    of the same resolution.
//!
//! # Quick Start
//!
//! ```no_run
//! use video_fft::{source, Analyzer};
//!
//! # fn main() -> video_fft::Result<()> {
//! let frames = source::open("frames/")?;
//! let result = Analyzer::new().with_limit(Some(100)).run(frames)?;
//!
//! println!("Frames: {}", result.frame_count);
//! println!("Mean HF score: {:.3}", result.mean_high_frequency_score);
//! println!("95th percentile: {:.3}", result.statistics.pct_95);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`analyzer`]: Spectrum, radial profile, scoring and sequence aggregation
//! - [`source`]: Lazy frame sources (image files, video with `ffmpeg`)
//! - [`render`]: PNG output of spectra and profiles
//! - [`report`]: Output formatters (JSON, CSV)
//! - [`progress`]: Per-frame progress notifications

pub mod analyzer;
pub mod error;
pub mod progress;
pub mod render;
pub mod report;
pub mod source;

pub use analyzer::radial::RingPolicy;
pub use analyzer::spectrum::{LuminanceFrame, MagnitudeSpectrum};
pub use analyzer::{
    AnalysisConfig, Analyzer, FrameResult, FrameSelection, SequenceResult, VisualizationPolicy,
};
pub use error::{Result, VideoFftError};
pub use report::{OutputFormat, Report};

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // PUBLIC API TESTS
    // ==========================================================================
    //
    // These tests verify the public API surface is correct and documented.
    // ==========================================================================

    #[test]
    fn test_public_exports() {
        let _ = RingPolicy::Inscribed;
        let _ = OutputFormat::Json;
        let _analyzer = Analyzer::new();
        let frame = LuminanceFrame::from_fn(2, 2, |_, _| 0.0);
        assert_eq!(frame.samples().len(), 4);
    }

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();
        assert_eq!(config.num_frames_limit, None);
        assert_eq!(config.visualization, VisualizationPolicy::NONE);
        assert!(config.progress_enabled);
        assert_eq!(config.ring_policy, RingPolicy::Inscribed);
        assert_eq!(config.jobs, 1);
    }

    #[test]
    fn test_end_to_end_report() {
        // Two 16x16 frames: flat grey and a checkerboard
        let flat = LuminanceFrame::from_fn(16, 16, |_, _| 128.0);
        let checker = LuminanceFrame::from_fn(16, 16, |r, c| if (r + c) % 2 == 0 { 255.0 } else { 0.0 });

        let result = Analyzer::new()
            .with_progress_enabled(false)
            .run(vec![Ok(flat), Ok(checker)])
            .unwrap();

        assert_eq!(result.frame_count, 2);
        // A flat frame has nothing but DC
        assert!(result.frame_results[0].high_frequency_score.abs() < 1e-9);
        assert!(result.frame_results[1].high_frequency_score >= 0.0);

        let report = Report::from_result(&result, None);
        assert_eq!(report.per_frame.len(), 2);
        assert_eq!(report.mean_high_frequency_score, result.mean_high_frequency_score);
    }
}
