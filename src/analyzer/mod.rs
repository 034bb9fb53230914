//! Frame-sequence analysis
//!
//! [`Analyzer`] pulls frames from a lazy source, runs each one through
//! [`spectrum`] and [`radial`], and aggregates the per-frame results into a
//! [`SequenceResult`].
//!
//! ```text
//! frame source ──► FrameSpectrum ──► RadialProfiler ──► FrameResult ─┐
//!      ▲  (pull, in order)                                           │
//!      └──────────────────── next frame ◄────────────────────────────┘
//!                                         finish: mean profile, mean score,
//!                                                 summary statistics
//! ```
//!
//! Any failing frame aborts the whole run; no partial result is returned.

pub mod radial;
pub mod spectrum;
pub mod stats;

use rayon::prelude::*;
use serde::Serialize;

use crate::error::{Result, VideoFftError};
use crate::progress::ProgressObserver;
use crate::render::{RenderTarget, Renderer};
use radial::{RadialProfile, RadialProfiler, RingPolicy};
use spectrum::{FrameSpectrum, LuminanceFrame, MagnitudeSpectrum, SpectrumPlan};
use stats::ScoreStatistics;

/// Which frames get handed to the renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameSelection {
    #[default]
    None,
    First,
    All,
}

/// Visualization policy: per-frame selection plus the optional
/// mean-of-sequence rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisualizationPolicy {
    pub frames: FrameSelection,
    pub mean: bool,
}

impl VisualizationPolicy {
    pub const NONE: Self = Self {
        frames: FrameSelection::None,
        mean: false,
    };
    pub const FIRST: Self = Self {
        frames: FrameSelection::First,
        mean: false,
    };
    pub const ALL: Self = Self {
        frames: FrameSelection::All,
        mean: false,
    };
    pub const MEAN: Self = Self {
        frames: FrameSelection::None,
        mean: true,
    };

    pub fn is_enabled(&self) -> bool {
        self.frames != FrameSelection::None || self.mean
    }

    fn renders_frame(&self, index: usize) -> bool {
        match self.frames {
            FrameSelection::None => false,
            FrameSelection::First => index == 0,
            FrameSelection::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Stop after this many frames. `Some(0)` analyzes nothing.
    pub num_frames_limit: Option<usize>,
    pub visualization: VisualizationPolicy,
    pub progress_enabled: bool,
    pub ring_policy: RingPolicy,
    /// Frames computed concurrently. 1 keeps everything on the calling thread.
    pub jobs: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            num_frames_limit: None,
            visualization: VisualizationPolicy::NONE,
            progress_enabled: true,
            ring_policy: RingPolicy::Inscribed,
            jobs: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameResult {
    pub frame_index: usize,
    pub radial_profile: RadialProfile,
    pub high_frequency_score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequenceResult {
    pub frame_results: Vec<FrameResult>,
    pub mean_radial_profile: RadialProfile,
    pub mean_high_frequency_score: f64,
    pub frame_count: usize,
    pub statistics: ScoreStatistics,
    /// Mean log-magnitude spectrum, only kept when the mean is rendered.
    pub mean_spectrum: Option<MagnitudeSpectrum>,
}

impl SequenceResult {
    /// Aggregate ordered per-frame results.
    ///
    /// All profiles must have the same length, which holds for frames of
    /// a single video.
    pub fn from_frames(frame_results: Vec<FrameResult>) -> Result<Self> {
        let first = frame_results.first().ok_or(VideoFftError::EmptySequence)?;
        let bins = first.radial_profile.len();

        let mut mean_radial_profile = vec![0.0; bins];
        for fr in &frame_results {
            if fr.radial_profile.len() != bins {
                return Err(VideoFftError::invalid_frame(format!(
                    "radial profile has {} bins, expected {}",
                    fr.radial_profile.len(),
                    bins
                ))
                .at_frame(fr.frame_index));
            }
            for (acc, v) in mean_radial_profile.iter_mut().zip(&fr.radial_profile) {
                *acc += v;
            }
        }
        let n = frame_results.len() as f64;
        for v in &mut mean_radial_profile {
            *v /= n;
        }

        let scores: Vec<f64> = frame_results.iter().map(|f| f.high_frequency_score).collect();
        let statistics = ScoreStatistics::from_scores(&scores).ok_or(VideoFftError::EmptySequence)?;

        Ok(Self {
            frame_count: frame_results.len(),
            mean_high_frequency_score: statistics.mean,
            mean_radial_profile,
            statistics,
            frame_results,
            mean_spectrum: None,
        })
    }
}

/// Running sum of spectra for the mean-of-sequence rendering.
struct SpectrumAccumulator {
    height: usize,
    width: usize,
    sum: Vec<f64>,
    count: usize,
}

impl SpectrumAccumulator {
    fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            sum: vec![0.0; height * width],
            count: 0,
        }
    }

    fn add(&mut self, spectrum: &MagnitudeSpectrum) {
        for (acc, v) in self.sum.iter_mut().zip(spectrum.values()) {
            *acc += v;
        }
        self.count += 1;
    }

    fn mean(self) -> Result<MagnitudeSpectrum> {
        let n = self.count.max(1) as f64;
        let values = self.sum.into_iter().map(|v| v / n).collect();
        MagnitudeSpectrum::from_parts(self.height, self.width, values)
    }
}

/// Per-run bookkeeping while frames are flowing.
struct RunState {
    total: Option<usize>,
    shape: Option<(usize, usize)>,
    results: Vec<FrameResult>,
    mean: Option<SpectrumAccumulator>,
}

/// Drives the spectral pipeline over a frame sequence.
pub struct Analyzer<'a> {
    pub config: AnalysisConfig,
    spectrum: FrameSpectrum,
    observer: Option<&'a dyn ProgressObserver>,
    renderer: Option<&'a mut dyn Renderer>,
}

impl Default for Analyzer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Analyzer<'a> {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            spectrum: FrameSpectrum::new(),
            observer: None,
            renderer: None,
        }
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.config.num_frames_limit = limit;
        self
    }

    pub fn with_visualization(mut self, policy: VisualizationPolicy) -> Self {
        self.config.visualization = policy;
        self
    }

    pub fn with_progress_enabled(mut self, enabled: bool) -> Self {
        self.config.progress_enabled = enabled;
        self
    }

    pub fn with_ring_policy(mut self, policy: RingPolicy) -> Self {
        self.config.ring_policy = policy;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.config.jobs = jobs.max(1);
        self
    }

    pub fn with_observer(mut self, observer: &'a dyn ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_renderer(mut self, renderer: &'a mut dyn Renderer) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Analyze a frame sequence.
    ///
    /// The expected frame count for progress reports is taken from the
    /// iterator's size hint when it is exact.
    pub fn run<I>(&mut self, frames: I) -> Result<SequenceResult>
    where
        I: IntoIterator<Item = Result<LuminanceFrame>>,
    {
        let frames = frames.into_iter();
        let total = match frames.size_hint() {
            (lo, Some(hi)) if lo == hi => Some(hi),
            _ => None,
        };
        self.run_with_total(frames, total)
    }

    /// Analyze a frame sequence whose length, if known, is `total`.
    pub fn run_with_total<I>(&mut self, frames: I, total: Option<usize>) -> Result<SequenceResult>
    where
        I: IntoIterator<Item = Result<LuminanceFrame>>,
    {
        let limit = self.config.num_frames_limit;
        if limit == Some(0) {
            return Err(VideoFftError::EmptySequence);
        }

        let total = match (total, limit) {
            (Some(t), Some(l)) => Some(t.min(l)),
            (t, _) => t,
        };
        log::debug!(
            "Analyzing frames (limit={:?}, total={:?}, jobs={}, rings={})",
            limit,
            total,
            self.config.jobs,
            self.config.ring_policy
        );

        let mut state = RunState {
            total,
            shape: None,
            results: Vec::new(),
            mean: None,
        };

        // Never pull past the limit
        let frames = frames.into_iter().take(limit.unwrap_or(usize::MAX));
        if self.config.jobs > 1 {
            self.run_parallel(frames, &mut state)?;
        } else {
            self.run_sequential(frames, &mut state)?;
        }

        self.finish(state)
    }

    fn run_sequential<I>(&mut self, frames: I, state: &mut RunState) -> Result<()>
    where
        I: Iterator<Item = Result<LuminanceFrame>>,
    {
        for (index, frame) in frames.enumerate() {
            let frame = frame.map_err(|e| e.at_frame(index))?;
            let plan = self.plan_frame(index, &frame, state)?;
            let computed = compute_frame(&plan, self.profiler(), &frame).map_err(|e| e.at_frame(index))?;
            self.accept(index, computed, state)?;
        }
        Ok(())
    }

    /// Pulls batches from the forward-only source, computes each batch on the
    /// rayon pool, then accepts results strictly in frame order.
    fn run_parallel<I>(&mut self, mut frames: I, state: &mut RunState) -> Result<()>
    where
        I: Iterator<Item = Result<LuminanceFrame>>,
    {
        let batch_size = self.config.jobs * 2;
        let mut next_index = 0;

        loop {
            let mut batch: Vec<(usize, LuminanceFrame, SpectrumPlan)> = Vec::with_capacity(batch_size);
            let mut pending: Option<VideoFftError> = None;

            while batch.len() < batch_size {
                let Some(item) = frames.next() else { break };
                let index = next_index;
                next_index += 1;
                match item.and_then(|frame| {
                    let plan = self.plan_frame(index, &frame, state)?;
                    Ok((frame, plan))
                }) {
                    Ok((frame, plan)) => batch.push((index, frame, plan)),
                    Err(e) => {
                        pending = Some(e.at_frame(index));
                        break;
                    }
                }
            }

            if batch.is_empty() && pending.is_none() {
                return Ok(());
            }

            let profiler = self.profiler();
            let computed: Vec<(usize, Result<ComputedFrame>)> = batch
                .into_par_iter()
                .map(|(index, frame, plan)| (index, compute_frame(&plan, profiler, &frame)))
                .collect();

            // Earlier frames fail first, exactly as in a sequential run
            for (index, result) in computed {
                let computed = result.map_err(|e| e.at_frame(index))?;
                self.accept(index, computed, state)?;
            }

            if let Some(e) = pending {
                return Err(e);
            }
        }
    }

    fn profiler(&self) -> RadialProfiler {
        RadialProfiler::new(self.config.ring_policy)
    }

    /// Check the frame against the run's shape and hand back the FFT plan.
    fn plan_frame(&mut self, index: usize, frame: &LuminanceFrame, state: &mut RunState) -> Result<SpectrumPlan> {
        frame.validate().map_err(|e| e.at_frame(index))?;
        let shape = (frame.height(), frame.width());
        match state.shape {
            None => {
                log::debug!("Frame shape {}x{}", shape.0, shape.1);
                state.shape = Some(shape);
            }
            Some(expected) if expected != shape => {
                return Err(VideoFftError::invalid_frame(format!(
                    "frame is {}x{} but the sequence started at {}x{}",
                    shape.0, shape.1, expected.0, expected.1
                ))
                .at_frame(index));
            }
            Some(_) => {}
        }
        Ok(self.spectrum.plan_for(shape.0, shape.1).clone())
    }

    /// Store one computed frame, render it if selected, report progress.
    fn accept(&mut self, index: usize, computed: ComputedFrame, state: &mut RunState) -> Result<()> {
        let ComputedFrame {
            spectrum,
            profile,
            score,
        } = computed;
        let policy = self.config.visualization;

        if policy.renders_frame(index) {
            if let Some(renderer) = self.renderer.as_deref_mut() {
                renderer.render(RenderTarget::Frame(index), &spectrum, &profile)?;
            }
        }
        if policy.mean {
            state
                .mean
                .get_or_insert_with(|| SpectrumAccumulator::new(spectrum.height(), spectrum.width()))
                .add(&spectrum);
        }

        log::debug!("Frame {}: high-frequency score {:.3}", index, score);
        state.results.push(FrameResult {
            frame_index: index,
            radial_profile: profile,
            high_frequency_score: score,
        });

        if self.config.progress_enabled {
            if let Some(observer) = self.observer {
                observer.on_frame(index, state.total);
            }
        }
        Ok(())
    }

    fn finish(&mut self, state: RunState) -> Result<SequenceResult> {
        let mut result = SequenceResult::from_frames(state.results)?;

        if let Some(acc) = state.mean {
            let mean = acc.mean()?;
            if let Some(renderer) = self.renderer.as_deref_mut() {
                renderer.render(RenderTarget::Mean, &mean, &result.mean_radial_profile)?;
            }
            result.mean_spectrum = Some(mean);
        }

        log::info!(
            "Analyzed {} frame(s), mean high-frequency score {:.3}",
            result.frame_count,
            result.mean_high_frequency_score
        );
        Ok(result)
    }
}

/// Everything one frame produces before it is stored.
struct ComputedFrame {
    spectrum: MagnitudeSpectrum,
    profile: RadialProfile,
    score: f64,
}

/// `frame` must already have passed `plan_frame`.
fn compute_frame(plan: &SpectrumPlan, profiler: RadialProfiler, frame: &LuminanceFrame) -> Result<ComputedFrame> {
    let spectrum = plan.log_spectrum(frame);
    let (profile, score) = profiler.profile(&spectrum)?;
    Ok(ComputedFrame {
        spectrum,
        profile,
        score,
    })
}
