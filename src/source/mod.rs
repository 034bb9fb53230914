//! Frame sources
//!
//! A frame source is a lazy, forward-only iterator of luminance frames. The
//! analyzer only ever sees `Result<LuminanceFrame>` items, so decoding stays
//! out of the spectral code entirely.
//!
//! - [`ImageSequence`]: a single image or a directory of images, decoded one
//!   at a time and converted to 8-bit luma
//! - `VideoFrames` (feature `ffmpeg`): every frame of the best video stream,
//!   scaled to GRAY8 by FFmpeg

pub mod images;
#[cfg(feature = "ffmpeg")]
pub mod video;

use std::path::Path;

use crate::analyzer::spectrum::LuminanceFrame;
use crate::error::{Result, VideoFftError};

pub use images::ImageSequence;
#[cfg(feature = "ffmpeg")]
pub use video::VideoFrames;

pub trait FrameSource: Iterator<Item = Result<LuminanceFrame>> {
    /// Number of frames the source expects to yield, if known up front.
    fn total_frames(&self) -> Option<usize>;
}

/// Open the right source for `path`: directory or image file, otherwise a
/// video file when built with the `ffmpeg` feature.
pub fn open<P: AsRef<Path>>(path: P) -> Result<Box<dyn FrameSource>> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(Box::new(ImageSequence::from_dir(path)?));
    }
    if !path.exists() {
        return Err(VideoFftError::Config(format!(
            "input {} does not exist",
            path.display()
        )));
    }
    if images::is_image_path(path) {
        return Ok(Box::new(ImageSequence::from_file(path)));
    }
    open_video(path)
}

#[cfg(feature = "ffmpeg")]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Ok(Box::new(VideoFrames::open(path)?))
}

#[cfg(not(feature = "ffmpeg"))]
fn open_video(path: &Path) -> Result<Box<dyn FrameSource>> {
    Err(VideoFftError::Config(format!(
        "{} is not an image; video input needs a build with the `ffmpeg` feature",
        path.display()
    )))
}
