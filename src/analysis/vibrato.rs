//! Vibrato detection from the voiced pitch contour.
//!
//! The contour is converted to semitones around its mean, detrended with a
//! moving average so slow pitch drift does not register, and the residual
//! oscillation is characterised by its mean-crossing rate and mean peak
//! deviation.

use crate::analysis::pitch::PitchTrack;
use crate::metrics::VibratoMetrics;

/// Vibrato band accepted as "present".
const RATE_MIN_HZ: f64 = 4.0;
const RATE_MAX_HZ: f64 = 8.0;
/// Minimum oscillation depth to call vibrato intentional.
const EXTENT_MIN_SEMITONES: f64 = 0.2;
/// Detrending window half-width in seconds.
const TREND_RADIUS_SECONDS: f64 = 0.25;
/// Minimum amount of voiced signal for a meaningful measurement.
const MIN_VOICED_SECONDS: f64 = 1.0;

/// Measure vibrato over the longest voiced span of the track.
///
/// Returns `None` when there is not enough voiced material; otherwise always
/// returns the measured rate and extent, with `is_present` deciding whether
/// they fall in the vibrato band.
pub fn detect_vibrato(track: &PitchTrack) -> Option<VibratoMetrics> {
    let hop = track.hop_seconds;
    if hop <= 0.0 {
        return None;
    }
    let span = longest_voiced_span(track);
    let span_seconds = span.len() as f64 * hop;
    if span_seconds < MIN_VOICED_SECONDS {
        return None;
    }

    let mean = span.iter().sum::<f64>() / span.len() as f64;
    let semitones: Vec<f64> = span.iter().map(|f| 12.0 * (f / mean).log2()).collect();
    let radius = ((TREND_RADIUS_SECONDS / hop).round() as usize).max(1);
    let residual = detrend(&semitones, radius);

    let crossings = mean_crossings(&residual);
    let rate_hz = crossings as f64 / (2.0 * span_seconds);
    let extent_semitones = mean_peak_deviation(&residual);

    Some(VibratoMetrics {
        is_present: (RATE_MIN_HZ..=RATE_MAX_HZ).contains(&rate_hz)
            && extent_semitones >= EXTENT_MIN_SEMITONES,
        rate_hz,
        extent_semitones,
    })
}

fn longest_voiced_span(track: &PitchTrack) -> Vec<f64> {
    let mut best: Vec<f64> = Vec::new();
    let mut current: Vec<f64> = Vec::new();
    for value in &track.values {
        match value {
            Some(f) => current.push(*f),
            None => {
                if current.len() > best.len() {
                    best = std::mem::take(&mut current);
                } else {
                    current.clear();
                }
            }
        }
    }
    if current.len() > best.len() {
        best = current;
    }
    best
}

/// Subtract a centred moving average of the given half-width.
fn detrend(values: &[f64], radius: usize) -> Vec<f64> {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius + 1).min(values.len());
            let trend = values[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;
            v - trend
        })
        .collect()
}

fn mean_crossings(values: &[f64]) -> usize {
    values
        .windows(2)
        .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
        .count()
}

/// Mean absolute value of the local extrema of the residual.
fn mean_peak_deviation(values: &[f64]) -> f64 {
    let mut peaks = Vec::new();
    for i in 1..values.len().saturating_sub(1) {
        let is_max = values[i] > values[i - 1] && values[i] >= values[i + 1];
        let is_min = values[i] < values[i - 1] && values[i] <= values[i + 1];
        if is_max || is_min {
            peaks.push(values[i].abs());
        }
    }
    if peaks.is_empty() {
        0.0
    } else {
        peaks.iter().sum::<f64>() / peaks.len() as f64
    }
}
