//! Mean loudness estimation from framed RMS energy.

use crate::audio::AudioData;

/// Reference pressure for the dB scale (2x10^-5 Pa), the convention used by
/// acoustic analysis tools for SPL-style readings.
const REFERENCE_PRESSURE: f64 = 2e-5;
const WINDOW_MS: usize = 40;
const HOP_MS: usize = 10;
/// Frames more than this far below the loudest frame count as silence.
const SILENCE_RANGE_DB: f64 = 25.0;

/// Energy-averaged intensity in dB over the non-silent frames of the clip.
///
/// Returns `None` for clips shorter than one analysis window or with no
/// signal energy at all.
pub fn mean_intensity_db(audio: &AudioData) -> Option<f64> {
    let window = (audio.sample_rate as usize * WINDOW_MS) / 1000;
    let hop = ((audio.sample_rate as usize * HOP_MS) / 1000).max(1);
    if window == 0 || audio.samples.len() < window {
        return None;
    }

    let mut energies = Vec::new();
    let mut start = 0usize;
    while start + window <= audio.samples.len() {
        let frame = &audio.samples[start..start + window];
        let energy = frame.iter().map(|&s| (s as f64).powi(2)).sum::<f64>() / window as f64;
        if energy > 0.0 {
            energies.push(energy);
        }
        start += hop;
    }
    if energies.is_empty() {
        return None;
    }

    let max_db = to_db(energies.iter().cloned().fold(f64::MIN, f64::max));
    let loud: Vec<f64> = energies
        .into_iter()
        .filter(|&e| to_db(e) > max_db - SILENCE_RANGE_DB)
        .collect();
    let mean_energy = loud.iter().sum::<f64>() / loud.len() as f64;
    Some(to_db(mean_energy))
}

fn to_db(energy: f64) -> f64 {
    10.0 * (energy / (REFERENCE_PRESSURE * REFERENCE_PRESSURE)).log10()
}
