//! Image files as a frame sequence.

use std::path::{Path, PathBuf};

use image::ImageFormat;
use walkdir::WalkDir;

use super::FrameSource;
use crate::analyzer::spectrum::LuminanceFrame;
use crate::error::{Result, VideoFftError};

/// True when the extension maps to a format the `image` crate knows.
pub fn is_image_path(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok()
}

/// Decodes one image per `next()`; nothing is loaded ahead of time.
#[derive(Debug, Clone)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    position: usize,
}

impl ImageSequence {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Self {
        Self::from_paths(vec![path.as_ref().to_path_buf()])
    }

    pub fn from_paths(paths: Vec<PathBuf>) -> Self {
        Self { paths, position: 0 }
    }

    /// Every image directly inside `dir`, ordered by file name.
    ///
    /// Fails on the first entry that cannot be read instead of skipping it.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let at = e.path().unwrap_or(dir).display().to_string();
                VideoFftError::source(format!("{}: {}", at, e))
            })?;
            if entry.file_type().is_file() && is_image_path(entry.path()) {
                paths.push(entry.into_path());
            }
        }

        if paths.is_empty() {
            return Err(VideoFftError::Config(format!(
                "no image files found in {}",
                dir.display()
            )));
        }
        log::debug!("Found {} image(s) in {}", paths.len(), dir.display());
        Ok(Self::from_paths(paths))
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    fn load(path: &Path) -> Result<LuminanceFrame> {
        let image = image::open(path)
            .map_err(|e| VideoFftError::source(format!("{}: {}", path.display(), e)))?;
        Ok(LuminanceFrame::from_gray(&image.to_luma8()))
    }
}

impl Iterator for ImageSequence {
    type Item = Result<LuminanceFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.paths.get(self.position)?;
        self.position += 1;
        Some(Self::load(path))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.paths.len() - self.position;
        (left, Some(left))
    }
}

impl ExactSizeIterator for ImageSequence {}

impl FrameSource for ImageSequence {
    fn total_frames(&self) -> Option<usize> {
        Some(self.paths.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, RgbImage, Rgb};

    #[test]
    fn test_is_image_path() {
        assert!(is_image_path(Path::new("frame.png")));
        assert!(is_image_path(Path::new("frame.jpg")));
        assert!(!is_image_path(Path::new("clip.mp4")));
        assert!(!is_image_path(Path::new("README")));
    }

    #[test]
    fn test_dir_is_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for (name, value) in [("b.png", 20u8), ("a.png", 10), ("c.png", 30)] {
            GrayImage::from_pixel(4, 4, Luma([value])).save(dir.path().join(name)).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "skip me").unwrap();

        let seq = ImageSequence::from_dir(dir.path()).unwrap();
        assert_eq!(seq.total_frames(), Some(3));
        let firsts: Vec<f64> = seq.map(|f| f.unwrap().get(0, 0)).collect();
        assert_eq!(firsts, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn test_missing_dir_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSequence::from_dir(dir.path().join("gone")).unwrap_err();
        assert!(matches!(err, VideoFftError::Source { frame_index: None, .. }));
        assert!(err.to_string().contains("gone"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_entry_fails_listing() {
        // A dangling link in the middle must not be skipped: b.png would
        // otherwise become frame 1
        let dir = tempfile::tempdir().unwrap();
        GrayImage::from_pixel(4, 4, Luma([10])).save(dir.path().join("a.png")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("missing.png"), dir.path().join("a1.png")).unwrap();
        GrayImage::from_pixel(4, 4, Luma([20])).save(dir.path().join("b.png")).unwrap();

        let err = ImageSequence::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, VideoFftError::Source { .. }));
        assert!(err.to_string().contains("a1.png"));
    }

    #[test]
    fn test_empty_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ImageSequence::from_dir(dir.path()).is_err());
    }

    #[test]
    fn test_color_image_becomes_luma() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("white.png");
        RgbImage::from_pixel(3, 2, Rgb([255, 255, 255])).save(&path).unwrap();

        let frame = ImageSequence::from_file(&path).next().unwrap().unwrap();
        assert_eq!((frame.height(), frame.width()), (2, 3));
        assert!(frame.samples().iter().all(|&v| v == 255.0));
    }

    #[test]
    fn test_unreadable_image_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"garbage").unwrap();

        let err = ImageSequence::from_file(&path).next().unwrap().unwrap_err();
        assert!(matches!(err, VideoFftError::Source { frame_index: None, .. }));
    }

    #[test]
    fn test_size_hint_shrinks() {
        let mut seq = ImageSequence::from_paths(vec!["a.png".into(), "b.png".into()]);
        assert_eq!(seq.len(), 2);
        let _ = seq.next();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.total_frames(), Some(2));
    }
}
