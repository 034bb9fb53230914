//! Azimuthal averaging of a magnitude spectrum
//!
//! Collapses the 2D spectrum into a 1D profile indexed by integer radius:
//! bin `r` is the mean of every sample whose distance from the DC position
//! falls in `[r, r + 1)`.
//!
//! ```text
//!          ┌───────────────┐
//!          │   ·  ring 3   │       profile[0]  DC (overall brightness)
//!          │  ┌─────────┐  │       profile[1]  coarse structure
//!          │  │ ring 1  │  │         ...
//!          │  │   DC    │  │       profile[R]  finest detail the frame holds
//!          │  └─────────┘  │
//!          └───────────────┘
//! ```
//!
//! The upper half of the profile is summed into the high-frequency score.
//! Content upscaled from a lower resolution has next to no energy there;
//! native content keeps a noticeable amount.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::spectrum::MagnitudeSpectrum;
use crate::error::{Result, VideoFftError};

/// Radius-indexed mean spectrum values.
pub type RadialProfile = Vec<f64>;

/// Which rings make it into the profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingPolicy {
    /// Rings that lie completely inside the inscribed circle:
    /// `R_max = min(height, width) / 2 - 1`.
    #[default]
    Inscribed,
    /// Every ring out to the corners, including partial ones.
    Full,
}

impl RingPolicy {
    /// Largest radius bin reported for a `height x width` spectrum.
    pub fn max_radius(self, height: usize, width: usize) -> usize {
        match self {
            RingPolicy::Inscribed => (height.min(width) / 2).saturating_sub(1),
            RingPolicy::Full => {
                let (cy, cx) = ((height / 2) as f64, (width / 2) as f64);
                (cy * cy + cx * cx).sqrt().floor() as usize
            }
        }
    }
}

impl fmt::Display for RingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RingPolicy::Inscribed => write!(f, "inscribed"),
            RingPolicy::Full => write!(f, "full"),
        }
    }
}

impl FromStr for RingPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inscribed" => Ok(RingPolicy::Inscribed),
            "full" => Ok(RingPolicy::Full),
            other => Err(format!(
                "unknown ring policy '{}' (expected 'inscribed' or 'full')",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RadialProfiler {
    policy: RingPolicy,
}

impl RadialProfiler {
    pub fn new(policy: RingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> RingPolicy {
        self.policy
    }

    /// Radial profile and high-frequency score of `spectrum`.
    pub fn profile(&self, spectrum: &MagnitudeSpectrum) -> Result<(RadialProfile, f64)> {
        let (height, width) = (spectrum.height(), spectrum.width());
        let max_radius = self.policy.max_radius(height, width);
        if max_radius < 1 {
            return Err(VideoFftError::DegenerateSpectrum {
                frame_index: None,
                height,
                width,
            });
        }

        let (cy, cx) = spectrum.center();
        let mut sums = vec![0.0; max_radius + 1];
        let mut counts = vec![0usize; max_radius + 1];

        for row in 0..height {
            let dy = row as f64 - cy as f64;
            for col in 0..width {
                let dx = col as f64 - cx as f64;
                let bin = (dy * dy + dx * dx).sqrt().floor() as usize;
                if bin <= max_radius {
                    sums[bin] += spectrum.get(row, col);
                    counts[bin] += 1;
                }
            }
        }

        // Unit pixel steps change the radius by at most 1, so no ring up to
        // max_radius can be empty
        let profile: RadialProfile = sums
            .iter()
            .zip(&counts)
            .map(|(&sum, &n)| if n == 0 { 0.0 } else { sum / n as f64 })
            .collect();

        let score = high_frequency_score(&profile);
        Ok((profile, score))
    }
}

/// First bin of the high-frequency band: `ceil(R_max / 2)`.
pub fn high_frequency_start(profile_len: usize) -> usize {
    profile_len / 2
}

/// Sum (not mean) of the profile over the upper half of the radius range.
pub fn high_frequency_score(profile: &[f64]) -> f64 {
    profile[high_frequency_start(profile.len())..].iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::spectrum::{FrameSpectrum, LuminanceFrame};
    use approx::assert_abs_diff_eq;

    fn flat_spectrum(height: usize, width: usize, value: f64) -> MagnitudeSpectrum {
        MagnitudeSpectrum::from_parts(height, width, vec![value; height * width]).unwrap()
    }

    /// Spectrum whose value at each position is its distance from the center.
    fn distance_spectrum(height: usize, width: usize) -> MagnitudeSpectrum {
        let (cy, cx) = ((height / 2) as f64, (width / 2) as f64);
        let values = (0..height)
            .flat_map(|r| (0..width).map(move |c| (r as f64, c as f64)))
            .map(|(r, c)| ((r - cy).powi(2) + (c - cx).powi(2)).sqrt())
            .collect();
        MagnitudeSpectrum::from_parts(height, width, values).unwrap()
    }

    // ==========================================================================
    // RING POLICY TESTS
    // ==========================================================================
    //
    // Inscribed: only rings completely inside the inscribed circle, so every
    // bin has the same angular coverage. Full: out to the corners.
    // ==========================================================================

    #[test]
    fn test_inscribed_max_radius() {
        assert_eq!(RingPolicy::Inscribed.max_radius(8, 8), 3);
        assert_eq!(RingPolicy::Inscribed.max_radius(9, 16), 3);
        assert_eq!(RingPolicy::Inscribed.max_radius(1080, 1920), 539);
        assert_eq!(RingPolicy::Inscribed.max_radius(2, 2), 0);
        assert_eq!(RingPolicy::Inscribed.max_radius(1, 1), 0);
    }

    #[test]
    fn test_full_max_radius_reaches_corner() {
        // center (4, 4): farthest sample (0, 0) is sqrt(32) = 5.66 away
        assert_eq!(RingPolicy::Full.max_radius(8, 8), 5);
        assert_eq!(RingPolicy::Full.max_radius(1, 1), 0);
    }

    #[test]
    fn test_ring_policy_parse() {
        assert_eq!("inscribed".parse::<RingPolicy>(), Ok(RingPolicy::Inscribed));
        assert_eq!("FULL".parse::<RingPolicy>(), Ok(RingPolicy::Full));
        assert!("corner".parse::<RingPolicy>().is_err());
        assert_eq!(RingPolicy::Full.to_string(), "full");
    }

    // ==========================================================================
    // PROFILE SHAPE TESTS
    // ==========================================================================

    #[test]
    fn test_profile_length_inscribed() {
        for &(h, w) in &[(4, 4), (8, 8), (9, 16), (17, 11), (64, 36)] {
            let (profile, _) = RadialProfiler::default()
                .profile(&flat_spectrum(h, w, 1.0))
                .unwrap();
            assert_eq!(profile.len(), h.min(w) / 2, "shape {}x{}", h, w);
        }
    }

    #[test]
    fn test_no_empty_bins() {
        for policy in [RingPolicy::Inscribed, RingPolicy::Full] {
            let (profile, _) = RadialProfiler::new(policy)
                .profile(&flat_spectrum(13, 20, 2.5))
                .unwrap();
            for (r, v) in profile.iter().enumerate() {
                assert!(v.is_finite(), "bin {} is not finite", r);
                assert_abs_diff_eq!(*v, 2.5, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_full_profile_is_longer() {
        let spec = flat_spectrum(8, 8, 1.0);
        let (inscribed, _) = RadialProfiler::new(RingPolicy::Inscribed).profile(&spec).unwrap();
        let (full, _) = RadialProfiler::new(RingPolicy::Full).profile(&spec).unwrap();
        assert_eq!(inscribed.len(), 4);
        assert_eq!(full.len(), 6);
    }

    #[test]
    fn test_bins_average_their_ring() {
        // Every sample in ring r has distance in [r, r + 1), so the mean does too
        let (profile, _) = RadialProfiler::default()
            .profile(&distance_spectrum(16, 16))
            .unwrap();
        assert_eq!(profile[0], 0.0);
        for (r, v) in profile.iter().enumerate() {
            assert!(*v >= r as f64 && *v < r as f64 + 1.0, "bin {} = {}", r, v);
        }
    }

    #[test]
    fn test_ring_one_of_small_grid() {
        // 4x4, center (2, 2): ring 1 holds the 4 direct neighbours and the
        // 4 diagonals (distance 1.41)
        let (profile, _) = RadialProfiler::default()
            .profile(&distance_spectrum(4, 4))
            .unwrap();
        assert_eq!(profile.len(), 2);
        let expected = (4.0 * 1.0 + 4.0 * 2f64.sqrt()) / 8.0;
        assert_abs_diff_eq!(profile[1], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_spectrum() {
        for &(h, w) in &[(1, 1), (2, 2), (3, 3), (2, 100)] {
            let err = RadialProfiler::default()
                .profile(&flat_spectrum(h, w, 1.0))
                .unwrap_err();
            assert!(
                matches!(err, VideoFftError::DegenerateSpectrum { height, width, .. } if height == h && width == w),
                "shape {}x{}",
                h,
                w
            );
        }
    }

    // ==========================================================================
    // HIGH-FREQUENCY SCORE TESTS
    // ==========================================================================
    //
    // The score sums profile bins from ceil(R_max / 2) up to R_max.
    // ==========================================================================

    #[test]
    fn test_high_frequency_start() {
        // R_max = 4 -> bins 2..=4; R_max = 5 -> bins 3..=5
        assert_eq!(high_frequency_start(5), 2);
        assert_eq!(high_frequency_start(6), 3);
    }

    #[test]
    fn test_score_is_sum_of_upper_half() {
        let profile = vec![100.0, 10.0, 3.0, 2.0, 1.0];
        assert_eq!(high_frequency_score(&profile), 6.0);
    }

    #[test]
    fn test_score_matches_profile() {
        let (profile, score) = RadialProfiler::default()
            .profile(&distance_spectrum(20, 20))
            .unwrap();
        let start = high_frequency_start(profile.len());
        let expected: f64 = profile[start..].iter().sum();
        assert_eq!(score, expected);
    }

    #[test]
    fn test_flat_frame_scores_zero() {
        // A constant frame has energy only at DC
        let frame = LuminanceFrame::from_fn(16, 16, |_, _| 200.0);
        let spectrum = FrameSpectrum::new().compute(&frame).unwrap();
        let (profile, score) = RadialProfiler::default().profile(&spectrum).unwrap();
        assert!(profile[0] > 0.0);
        assert_abs_diff_eq!(score, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_fine_texture_beats_smooth_gradient() {
        let smooth = LuminanceFrame::from_fn(32, 32, |r, c| (r + c) as f64 * 2.0);
        let fine = LuminanceFrame::from_fn(32, 32, |r, c| {
            ((r * r * 7 + c * 13 + r * c * 5) % 11) as f64 * 20.0
        });

        let mut fs = FrameSpectrum::new();
        let profiler = RadialProfiler::default();
        let (_, smooth_score) = profiler.profile(&fs.compute(&smooth).unwrap()).unwrap();
        let (_, fine_score) = profiler.profile(&fs.compute(&fine).unwrap()).unwrap();

        assert!(
            fine_score > smooth_score,
            "fine {} should exceed smooth {}",
            fine_score,
            smooth_score
        );
    }

    #[test]
    fn test_score_is_not_linear_in_scale() {
        // Scaling the frame by k scales |F| by k, but ln(1 + k|F|) is not
        // k * ln(1 + |F|). A missing log step would make the ratio exactly k.
        let base = LuminanceFrame::from_fn(24, 24, |r, c| ((r * r * 3 + c * 7 + r * c) % 9) as f64 + 1.0);
        let k = 10.0;
        let scaled = LuminanceFrame::from_fn(24, 24, |r, c| base.get(r, c) * k);

        let mut fs = FrameSpectrum::new();
        let profiler = RadialProfiler::default();
        let (_, s1) = profiler.profile(&fs.compute(&base).unwrap()).unwrap();
        let (_, s2) = profiler.profile(&fs.compute(&scaled).unwrap()).unwrap();

        assert!(s1 > 0.0);
        assert!(s2 > s1);
        assert!((s2 / s1 - k).abs() > 1.0, "ratio {} looks linear", s2 / s1);
    }
}
