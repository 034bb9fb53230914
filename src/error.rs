//! Error types for video-fft
//!
//! All fallible operations return [`VideoFftError`]. The three core failures
//! (invalid frame, degenerate spectrum, empty sequence) are never retried:
//! a single bad frame would bias the mean profile, so the whole run aborts.

use std::io::Error as IoError;

use image::ImageError;
use thiserror::Error;

/// Shorthand result type used across the crate.
pub type Result<T> = std::result::Result<T, VideoFftError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VideoFftError {
    /// Frame data is empty, malformed, or contains NaN/Inf samples.
    #[error("Invalid frame{}: {reason}", describe_index(.frame_index))]
    InvalidFrame {
        /// Index of the offending frame, once known to the aggregator.
        frame_index: Option<usize>,
        reason: String,
    },

    /// Frame is too small to produce a radial profile with at least two bins.
    #[error(
        "Degenerate spectrum{}: {height}x{width} is too small for a radial profile",
        describe_index(.frame_index)
    )]
    DegenerateSpectrum {
        frame_index: Option<usize>,
        height: usize,
        width: usize,
    },

    /// No frames were consumed (empty input or a limit of zero).
    #[error("No frames to analyze")]
    EmptySequence,

    /// The frame source failed to produce the next frame.
    #[error("Frame source error{}: {reason}", describe_index(.frame_index))]
    Source {
        frame_index: Option<usize>,
        reason: String,
    },

    /// Bad option value (image scale, unsupported input, ...).
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "ffmpeg")]
    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),
}

impl VideoFftError {
    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        VideoFftError::InvalidFrame {
            frame_index: None,
            reason: reason.into(),
        }
    }

    pub fn source(reason: impl Into<String>) -> Self {
        VideoFftError::Source {
            frame_index: None,
            reason: reason.into(),
        }
    }

    /// Tag a per-frame error with the index of the frame that caused it.
    ///
    /// Errors that are not tied to a frame are returned unchanged, and an
    /// index that is already set is kept.
    pub fn at_frame(self, index: usize) -> Self {
        match self {
            VideoFftError::InvalidFrame { frame_index, reason } => VideoFftError::InvalidFrame {
                frame_index: frame_index.or(Some(index)),
                reason,
            },
            VideoFftError::DegenerateSpectrum {
                frame_index,
                height,
                width,
            } => VideoFftError::DegenerateSpectrum {
                frame_index: frame_index.or(Some(index)),
                height,
                width,
            },
            VideoFftError::Source { frame_index, reason } => VideoFftError::Source {
                frame_index: frame_index.or(Some(index)),
                reason,
            },
            other => other,
        }
    }

    /// Index of the frame this error is tagged with, if any.
    pub fn frame_index(&self) -> Option<usize> {
        match self {
            VideoFftError::InvalidFrame { frame_index, .. }
            | VideoFftError::DegenerateSpectrum { frame_index, .. }
            | VideoFftError::Source { frame_index, .. } => *frame_index,
            _ => None,
        }
    }
}

#[cfg(feature = "ffmpeg")]
impl From<ffmpeg_next::Error> for VideoFftError {
    fn from(error: ffmpeg_next::Error) -> Self {
        VideoFftError::Ffmpeg(error.to_string())
    }
}

fn describe_index(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" at frame {}", i),
        None => String::new(),
    }
}
