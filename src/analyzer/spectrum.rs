//! 2D magnitude spectrum of a luminance frame
//!
//! Uses FFT (Fast Fourier Transform) to move a frame into the frequency domain.
//!
//! # How the Spectrum Is Built
//!
//! ```text
//! luminance grid ──► row FFTs ──► column FFTs ──► shift DC to center ──► |F| ──► ln(1 + |F|)
//! ```
//!
//! After the shift, position `(height / 2, width / 2)` holds the zero-frequency
//! (DC) term, and distance from that position grows with spatial frequency.
//! Fine detail (edges, texture, grain) lives far from the center; a frame that
//! was upscaled from a lower resolution has almost nothing out there.
//!
//! No window is applied. The log step compresses the huge dynamic range
//! between DC and everything else, and the `+ 1` keeps exact-zero bins at 0.

use std::sync::Arc;

use image::GrayImage;
use rustfft::{num_complex::Complex, Fft, FftPlanner};

use crate::error::{Result, VideoFftError};

/// One frame's luminance samples, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceFrame {
    height: usize,
    width: usize,
    samples: Vec<f64>,
}

impl LuminanceFrame {
    /// Wrap `height * width` row-major samples.
    pub fn new(height: usize, width: usize, samples: Vec<f64>) -> Result<Self> {
        if samples.len() != height * width {
            return Err(VideoFftError::invalid_frame(format!(
                "expected {}x{} = {} samples, got {}",
                height,
                width,
                height * width,
                samples.len()
            )));
        }
        Ok(Self {
            height,
            width,
            samples,
        })
    }

    /// Build a frame by evaluating `f(row, col)` at every position.
    pub fn from_fn(height: usize, width: usize, f: impl Fn(usize, usize) -> f64) -> Self {
        let samples = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .map(|(row, col)| f(row, col))
            .collect();
        Self {
            height,
            width,
            samples,
        }
    }

    /// 8-bit gray image, one sample per pixel (0-255).
    pub fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            height: height as usize,
            width: width as usize,
            samples: image.as_raw().iter().map(|&v| v as f64).collect(),
        }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.samples[row * self.width + col]
    }

    /// Reject empty grids and non-finite samples left over from a bad decode.
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(VideoFftError::invalid_frame(format!(
                "empty frame ({}x{})",
                self.height, self.width
            )));
        }
        if let Some(pos) = self.samples.iter().position(|v| !v.is_finite()) {
            return Err(VideoFftError::invalid_frame(format!(
                "non-finite sample at row {}, col {}",
                pos / self.width,
                pos % self.width
            )));
        }
        Ok(())
    }
}

/// Centered 2D magnitude spectrum, same shape as its source frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MagnitudeSpectrum {
    height: usize,
    width: usize,
    values: Vec<f64>,
}

impl MagnitudeSpectrum {
    pub fn from_parts(height: usize, width: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != height * width {
            return Err(VideoFftError::invalid_frame(format!(
                "spectrum {}x{} needs {} values, got {}",
                height,
                width,
                height * width,
                values.len()
            )));
        }
        Ok(Self {
            height,
            width,
            values,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col]
    }

    /// Position of the DC term: `(height / 2, width / 2)`.
    pub fn center(&self) -> (usize, usize) {
        (self.height / 2, self.width / 2)
    }

    /// Smallest and largest value, used to normalize renderings.
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// FFT plans for one frame shape.
///
/// Plans are immutable and shareable, so a single plan can serve every frame
/// of a video, including from rayon workers.
#[derive(Clone)]
pub struct SpectrumPlan {
    height: usize,
    width: usize,
    row_fft: Arc<dyn Fft<f64>>,
    col_fft: Arc<dyn Fft<f64>>,
}

impl SpectrumPlan {
    pub fn new(planner: &mut FftPlanner<f64>, height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            row_fft: planner.plan_fft_forward(width),
            col_fft: planner.plan_fft_forward(height),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Log-scaled spectrum: `ln(1 + |F|)`, DC at the center.
    pub fn compute(&self, frame: &LuminanceFrame) -> Result<MagnitudeSpectrum> {
        self.check(frame)?;
        Ok(self.log_spectrum(frame))
    }

    /// Raw (un-logged) magnitude, DC at the center.
    pub fn magnitude(&self, frame: &LuminanceFrame) -> Result<MagnitudeSpectrum> {
        self.check(frame)?;
        Ok(self.transform(frame))
    }

    fn check(&self, frame: &LuminanceFrame) -> Result<()> {
        frame.validate()?;
        if (frame.height, frame.width) != (self.height, self.width) {
            return Err(VideoFftError::invalid_frame(format!(
                "frame is {}x{} but the plan is for {}x{}",
                frame.height, frame.width, self.height, self.width
            )));
        }
        Ok(())
    }

    /// `compute` for a frame already validated against this plan's shape.
    pub(crate) fn log_spectrum(&self, frame: &LuminanceFrame) -> MagnitudeSpectrum {
        let mut spectrum = self.transform(frame);
        for v in &mut spectrum.values {
            *v = v.ln_1p();
        }
        spectrum
    }

    fn transform(&self, frame: &LuminanceFrame) -> MagnitudeSpectrum {
        let (h, w) = (self.height, self.width);
        let mut buffer: Vec<Complex<f64>> = frame
            .samples
            .iter()
            .map(|&s| Complex::new(s, 0.0))
            .collect();

        // Rows are contiguous, so one call transforms all of them
        self.row_fft.process(&mut buffer);

        let mut columns = transpose(&buffer, h, w);
        self.col_fft.process(&mut columns);

        // columns is w x h; element (col, row) lands at the shifted (row, col)
        let (cy, cx) = (h / 2, w / 2);
        let mut values = vec![0.0; h * w];
        for col in 0..w {
            let dst_col = (col + cx) % w;
            for row in 0..h {
                let dst_row = (row + cy) % h;
                values[dst_row * w + dst_col] = columns[col * h + row].norm();
            }
        }

        MagnitudeSpectrum {
            height: h,
            width: w,
            values,
        }
    }
}

fn transpose(data: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

/// Computes spectra frame by frame, reusing the plan while the shape holds.
pub struct FrameSpectrum {
    planner: FftPlanner<f64>,
    plan: Option<SpectrumPlan>,
}

impl Default for FrameSpectrum {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameSpectrum {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            plan: None,
        }
    }

    /// Plan for `height x width`, built on first use and cached.
    pub fn plan_for(&mut self, height: usize, width: usize) -> &SpectrumPlan {
        if self
            .plan
            .as_ref()
            .is_some_and(|p| p.shape() != (height, width))
        {
            self.plan = None;
        }
        let planner = &mut self.planner;
        self.plan.get_or_insert_with(|| {
            log::debug!("Planning {}x{} FFT", height, width);
            SpectrumPlan::new(planner, height, width)
        })
    }

    // The plan is built for the frame's own shape, so only the samples need
    // checking here.
    pub fn compute(&mut self, frame: &LuminanceFrame) -> Result<MagnitudeSpectrum> {
        frame.validate()?;
        Ok(self.plan_for(frame.height(), frame.width()).log_spectrum(frame))
    }

    pub fn magnitude(&mut self, frame: &LuminanceFrame) -> Result<MagnitudeSpectrum> {
        frame.validate()?;
        Ok(self.plan_for(frame.height(), frame.width()).transform(frame))
    }
}
