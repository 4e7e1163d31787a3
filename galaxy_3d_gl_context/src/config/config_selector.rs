/// Config selection - picks the driver config closest to the desired format
///
/// Each candidate gets a score built by packing clamped absolute differences
/// into disjoint bit ranges, most important difference in the highest bits:
///
/// | bits   | field                         | clamp |
/// |--------|-------------------------------|-------|
/// | 29..32 | sample buffer count           | 15    |
/// | 24..28 | sample count                  | 31    |
/// | 17..23 | sum of R, G, B differences    | 127   |
/// | 11..16 | depth bits                    | 63    |
/// | 10     | non-linear depth mismatch     | 1     |
/// | 6..9   | stencil bits                  | 15    |
/// | 0..5   | alpha bits                    | 31    |
///
/// Stencil is clamped to 15 so it stays inside bits 6..9, below the depth
/// encoding bit.
///
/// The lowest score wins; on ties the first candidate seen wins.

use crate::error::{Error, Result};
use crate::config::{ConfigCandidate, DesiredSurfaceFormat};

const SOURCE: &str = "galaxy3d::gl::ConfigSelector";

/// Deterministic config chooser
pub struct ConfigSelector;

impl ConfigSelector {
    /// Score a single candidate (0 is an exact match)
    pub fn score(candidate: &ConfigCandidate, desired: &DesiredSurfaceFormat) -> u64 {
        let diff = |offered: u32, wanted: u32| u64::from(offered.abs_diff(wanted));

        let sample_buffers = diff(candidate.sample_buffers, desired.sample_buffers).min(15);
        let samples = diff(candidate.samples, desired.samples).min(31);
        let color = (diff(candidate.red_bits, desired.red_bits)
            + diff(candidate.green_bits, desired.green_bits)
            + diff(candidate.blue_bits, desired.blue_bits))
            .min(127);
        let depth = diff(candidate.depth_bits, desired.depth_bits).min(63);
        let non_linear = u64::from(candidate.non_linear_depth != desired.non_linear_depth);
        let stencil = diff(candidate.stencil_bits, desired.stencil_bits).min(15);
        let alpha = diff(candidate.alpha_bits, desired.alpha_bits).min(31);

        (sample_buffers << 29)
            | (samples << 24)
            | (color << 17)
            | (depth << 11)
            | (non_linear << 10)
            | (stencil << 6)
            | alpha
    }

    /// Select the best candidate
    ///
    /// # Errors
    ///
    /// `Error::ConfigurationError` if the driver offered no candidate at all.
    pub fn select(candidates: &[ConfigCandidate], desired: &DesiredSurfaceFormat) -> Result<ConfigCandidate> {
        let mut best: Option<(u64, &ConfigCandidate)> = None;

        for candidate in candidates {
            let score = Self::score(candidate, desired);
            crate::engine_trace!(SOURCE, "Config {:?} scored {:#x}", candidate.id, score);

            // Strictly lower only: the first candidate keeps ties
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, candidate));
            }
        }

        match best {
            Some((score, candidate)) => {
                crate::engine_debug!(SOURCE,
                    "Selected config {:?} (R{}G{}B{}A{} D{}S{} samples={}) for {} with score {:#x}",
                    candidate.id,
                    candidate.red_bits, candidate.green_bits, candidate.blue_bits, candidate.alpha_bits,
                    candidate.depth_bits, candidate.stencil_bits, candidate.samples,
                    desired, score);
                Ok(*candidate)
            }
            None => {
                let message = format!("driver offers no config for requested format {}", desired);
                crate::engine_error!(SOURCE, "{}", message);
                Err(Error::ConfigurationError(message))
            }
        }
    }
}

#[cfg(test)]
#[path = "config_selector_tests.rs"]
mod tests;
