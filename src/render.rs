//! Spectrum and radial profile images
//!
//! The analyzer hands fully computed spectra and profiles to a [`Renderer`]
//! for the frames the visualization policy selects. [`PngRenderer`] writes
//! two grayscale PNGs per target:
//!
//! - `<prefix>_frame-<i>.png` / `<prefix>-mean.png`: the magnitude spectrum,
//!   min-max normalized, DC in the middle
//! - `<prefix>_frame-<i>_profile.png` / `<prefix>-mean_profile.png`: the radial
//!   profile as a line chart, radius on the x axis

use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};

use crate::analyzer::spectrum::MagnitudeSpectrum;
use crate::error::{Result, VideoFftError};

const PROFILE_WIDTH: u32 = 512;
const PROFILE_HEIGHT: u32 = 256;
const PROFILE_MARGIN: u32 = 8;

/// What a rendering call is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderTarget {
    Frame(usize),
    /// Mean over the whole sequence.
    Mean,
}

pub trait Renderer {
    fn render(
        &mut self,
        target: RenderTarget,
        spectrum: &MagnitudeSpectrum,
        profile: &[f64],
    ) -> Result<()>;
}

pub struct PngRenderer {
    output_dir: PathBuf,
    prefix: String,
    scale: f64,
    written: Vec<PathBuf>,
}

impl PngRenderer {
    /// `scale` resizes the spectrum image relative to the frame size.
    pub fn new<P: AsRef<Path>>(output_dir: P, prefix: impl Into<String>, scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(VideoFftError::Config(format!(
                "image scale must be a positive number, got {}",
                scale
            )));
        }
        let output_dir = output_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&output_dir)?;
        Ok(Self {
            output_dir,
            prefix: prefix.into(),
            scale,
            written: Vec::new(),
        })
    }

    /// Every file written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn file_stem(&self, target: RenderTarget) -> String {
        match target {
            RenderTarget::Frame(i) => format!("{}_frame-{}", self.prefix, i),
            RenderTarget::Mean => format!("{}-mean", self.prefix),
        }
    }

    fn save(&mut self, image: &GrayImage, name: String) -> Result<()> {
        let path = self.output_dir.join(name);
        image.save(&path)?;
        log::info!("File written to {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

impl Renderer for PngRenderer {
    fn render(
        &mut self,
        target: RenderTarget,
        spectrum: &MagnitudeSpectrum,
        profile: &[f64],
    ) -> Result<()> {
        let stem = self.file_stem(target);

        let mut image = spectrum_image(spectrum);
        if self.scale != 1.0 {
            let w = ((image.width() as f64 * self.scale).round() as u32).max(1);
            let h = ((image.height() as f64 * self.scale).round() as u32).max(1);
            image = imageops::resize(&image, w, h, FilterType::Triangle);
        }
        self.save(&image, format!("{}.png", stem))?;

        let chart = profile_image(profile);
        self.save(&chart, format!("{}_profile.png", stem))
    }
}

/// Spectrum as an 8-bit image, min mapped to black and max to white.
pub fn spectrum_image(spectrum: &MagnitudeSpectrum) -> GrayImage {
    let (lo, hi) = spectrum.value_range();
    let span = if hi > lo { hi - lo } else { 1.0 };
    GrayImage::from_fn(spectrum.width() as u32, spectrum.height() as u32, |x, y| {
        let v = spectrum.get(y as usize, x as usize);
        Luma([(((v - lo) / span) * 255.0).round().clamp(0.0, 255.0) as u8])
    })
}

/// Line chart of the profile: white background, black line.
pub fn profile_image(profile: &[f64]) -> GrayImage {
    let mut image = GrayImage::from_pixel(PROFILE_WIDTH, PROFILE_HEIGHT, Luma([255]));
    if profile.is_empty() {
        return image;
    }

    let lo = profile.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = profile.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let span = if hi > lo { hi - lo } else { 1.0 };

    let plot_w = (PROFILE_WIDTH - 2 * PROFILE_MARGIN - 1) as f64;
    let plot_h = (PROFILE_HEIGHT - 2 * PROFILE_MARGIN - 1) as f64;
    let last = (profile.len() - 1).max(1) as f64;

    let points: Vec<(i64, i64)> = profile
        .iter()
        .enumerate()
        .map(|(r, &v)| {
            let x = PROFILE_MARGIN as f64 + r as f64 / last * plot_w;
            let y = PROFILE_MARGIN as f64 + (1.0 - (v - lo) / span) * plot_h;
            (x.round() as i64, y.round() as i64)
        })
        .collect();

    if points.len() == 1 {
        draw_line(&mut image, points[0], points[0]);
    }
    for pair in points.windows(2) {
        draw_line(&mut image, pair[0], pair[1]);
    }
    image
}

fn draw_line(image: &mut GrayImage, from: (i64, i64), to: (i64, i64)) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs()).max(1);
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (from.0 as f64 + t * (to.0 - from.0) as f64).round() as i64;
        let y = (from.1 as f64 + t * (to.1 - from.1) as f64).round() as i64;
        if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
            image.put_pixel(x as u32, y as u32, Luma([0]));
        }
    }
}
