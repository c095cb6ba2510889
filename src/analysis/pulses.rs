//! Glottal-cycle point process and the jitter/shimmer measures built on it.
//!
//! Pulses are located by walking voiced spans one fundamental period at a
//! time and snapping to the local waveform peak. Irregular voices can defeat
//! the walker; callers treat an empty or too-short train as a recoverable
//! per-metric failure.

use crate::analysis::pitch::PitchTrack;
use crate::audio::AudioData;

/// Search window around the expected next pulse, as fractions of the period.
const SEARCH_LOW: f64 = 0.75;
const SEARCH_HIGH: f64 = 1.3;
/// Jitter/shimmer need at least this many pulses.
const MIN_PULSES: usize = 3;

/// Ordered glottal pulse markers with their peak amplitudes.
#[derive(Debug, Clone, Default)]
pub struct PulseTrain {
    pub times: Vec<f64>,
    pub amplitudes: Vec<f64>,
}

impl PulseTrain {
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Cycle lengths between consecutive pulses, keeping only plausible
    /// periods so span boundaries do not register as giant cycles.
    fn periods(&self) -> Vec<f64> {
        self.times
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|&d| (1.0 / 1500.0..=1.0 / 55.0).contains(&d))
            .collect()
    }
}

/// Extract the pulse train for all voiced spans of the track.
pub fn extract_pulses(audio: &AudioData, track: &PitchTrack) -> PulseTrain {
    let sr = audio.sample_rate as f64;
    let mut train = PulseTrain::default();

    for (span_start, span_end) in voiced_spans(track) {
        let mut cursor = span_start;
        let mut expected = None;
        while cursor < span_end {
            let Some(f0) = track.value_at(cursor) else {
                break;
            };
            let period = 1.0 / f0;
            let (lo, hi) = match expected {
                Some(t) => (t - (1.0 - SEARCH_LOW) * period, t + (SEARCH_HIGH - 1.0) * period),
                None => (cursor, cursor + period),
            };
            match peak_in_window(&audio.samples, sr, lo, hi.min(span_end)) {
                Some((t, a)) => {
                    train.times.push(t);
                    train.amplitudes.push(a);
                    cursor = t + SEARCH_LOW * period;
                    expected = Some(t + period);
                }
                None => break,
            }
        }
    }

    train
}

/// Jitter (local) as a percentage: mean absolute difference between
/// consecutive cycle lengths over the mean cycle length.
pub fn jitter_local_percent(train: &PulseTrain) -> Option<f64> {
    if train.len() < MIN_PULSES {
        return None;
    }
    let periods = train.periods();
    relative_consecutive_variation(&periods).map(|v| v * 100.0)
}

/// Shimmer (local) as a percentage: mean absolute difference between
/// consecutive pulse amplitudes over the mean amplitude.
pub fn shimmer_local_percent(train: &PulseTrain) -> Option<f64> {
    if train.len() < MIN_PULSES {
        return None;
    }
    relative_consecutive_variation(&train.amplitudes).map(|v| v * 100.0)
}

fn relative_consecutive_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean <= f64::EPSILON {
        return None;
    }
    let diff_sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    Some(diff_sum / (values.len() - 1) as f64 / mean)
}

/// Contiguous voiced regions of the track as (start, end) times.
fn voiced_spans(track: &PitchTrack) -> Vec<(f64, f64)> {
    let mut spans = Vec::new();
    let mut open: Option<f64> = None;
    for (i, value) in track.values.iter().enumerate() {
        match (value.is_some(), open) {
            (true, None) => open = Some(track.times[i]),
            (false, Some(start)) => {
                spans.push((start, track.times[i]));
                open = None;
            }
            _ => {}
        }
    }
    if let (Some(start), Some(&last)) = (open, track.times.last()) {
        spans.push((start, last + track.hop_seconds));
    }
    spans
}

/// Strongest positive peak between `lo` and `hi` seconds, refined to
/// sub-sample precision so cycle lengths are not quantised to the sample
/// grid (raw grid positions alone would read as spurious jitter).
fn peak_in_window(samples: &[f32], sr: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    let start = (lo.max(0.0) * sr).round() as usize;
    let end = ((hi * sr).round() as usize).min(samples.len());
    if start >= end {
        return None;
    }
    let (best_index, _) = samples[start..end]
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))?;
    let index = start + best_index;
    let (offset, amplitude) = parabolic_refine(samples, index);
    Some(((index as f64 + offset) / sr, amplitude.abs()))
}

/// Fit a parabola through a sample and its neighbours; returns the fractional
/// offset of the vertex in [-0.5, 0.5] and the interpolated amplitude.
fn parabolic_refine(samples: &[f32], index: usize) -> (f64, f64) {
    let y1 = samples[index] as f64;
    if index == 0 || index + 1 >= samples.len() {
        return (0.0, y1);
    }
    let y0 = samples[index - 1] as f64;
    let y2 = samples[index + 1] as f64;
    let denom = y0 - 2.0 * y1 + y2;
    if denom.abs() <= f64::EPSILON {
        return (0.0, y1);
    }
    let offset = (0.5 * (y0 - y2) / denom).clamp(-0.5, 0.5);
    let amplitude = y1 - 0.25 * (y0 - y2) * offset;
    (offset, amplitude)
}
