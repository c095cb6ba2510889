//! Harmonics-to-noise ratio from autocorrelation at the pitch period.
//!
//! For each voiced pitch frame the normalised autocorrelation at the detected
//! period lag measures how much of the windowed signal is periodic; the HNR
//! follows as 10*log10(r / (1 - r)).

use crate::analysis::pitch::PitchTrack;
use crate::audio::AudioData;

/// Periods of the detected fundamental per analysis window.
const PERIODS_PER_WINDOW: f64 = 3.0;
/// Minimum voiced frames needed for a trustworthy mean.
const MIN_FRAMES: usize = 5;
/// Autocorrelation is clamped below 1 so the dB conversion stays finite.
const MAX_CORRELATION: f64 = 0.999_999;

/// Mean HNR in dB across the voiced frames of the clip.
pub fn mean_hnr_db(audio: &AudioData, track: &PitchTrack) -> Option<f64> {
    let sr = audio.sample_rate as f64;
    let mut values = Vec::new();

    for (time, f0) in track.voiced() {
        let Some(r) = correlation_at_period(&audio.samples, sr, time, f0) else {
            continue;
        };
        if r <= 0.0 {
            continue;
        }
        let r = r.min(MAX_CORRELATION);
        values.push(10.0 * (r / (1.0 - r)).log10());
    }

    if values.len() < MIN_FRAMES {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Normalised autocorrelation of the window centred at `time` at the lag of
/// one fundamental period. `None` when the window falls outside the clip or
/// carries no energy.
fn correlation_at_period(samples: &[f32], sr: f64, time: f64, f0: f64) -> Option<f64> {
    if f0 <= 0.0 {
        return None;
    }
    let lag = (sr / f0).round() as usize;
    let window = ((PERIODS_PER_WINDOW * sr / f0).round() as usize).max(lag * 2);
    let center = (time * sr).round() as usize;
    let start = center.checked_sub(window / 2)?;
    let end = start + window;
    if lag == 0 || end > samples.len() || window <= lag {
        return None;
    }

    let frame = &samples[start..end];
    let mean = frame.iter().map(|&s| s as f64).sum::<f64>() / frame.len() as f64;
    let x: Vec<f64> = frame.iter().map(|&s| s as f64 - mean).collect();

    let n = x.len() - lag;
    let mut cross = 0.0;
    let mut energy_head = 0.0;
    let mut energy_tail = 0.0;
    for i in 0..n {
        cross += x[i] * x[i + lag];
        energy_head += x[i] * x[i];
        energy_tail += x[i + lag] * x[i + lag];
    }
    let denom = (energy_head * energy_tail).sqrt();
    if denom <= f64::EPSILON {
        return None;
    }
    Some(cross / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pitch::PitchTrack;

    fn sine_clip(freq: f64, seconds: f64, noise: f64) -> AudioData {
        let sample_rate = 16_000u32;
        let n = (sample_rate as f64 * seconds) as usize;
        let mut rng_state = 0x2545F491u32;
        let samples = (0..n)
            .map(|i| {
                let t = i as f64 / sample_rate as f64;
                // xorshift gives a deterministic noise floor without a rand dep
                rng_state ^= rng_state << 13;
                rng_state ^= rng_state >> 17;
                rng_state ^= rng_state << 5;
                let jitter = (rng_state as f64 / u32::MAX as f64 - 0.5) * 2.0 * noise;
                (0.4 * (2.0 * std::f64::consts::PI * freq * t).sin() + jitter) as f32
            })
            .collect();
        AudioData {
            samples,
            sample_rate,
        }
    }

    fn voiced_track(freq: f64, seconds: f64) -> PitchTrack {
        let hop = 0.01;
        let frames = (seconds / hop) as usize;
        let times: Vec<f64> = (0..frames).map(|i| i as f64 * hop).collect();
        let values = vec![Some(freq); frames];
        PitchTrack {
            times,
            values,
            hop_seconds: hop,
        }
    }

    #[test]
    fn clean_tone_scores_high_hnr() {
        let audio = sine_clip(220.0, 1.0, 0.0);
        let track = voiced_track(220.0, 1.0);
        let hnr = mean_hnr_db(&audio, &track).unwrap();
        assert!(hnr > 20.0, "clean tone HNR too low: {hnr}");
    }

    #[test]
    fn noisy_tone_scores_lower_than_clean() {
        let track = voiced_track(220.0, 1.0);
        let clean = mean_hnr_db(&sine_clip(220.0, 1.0, 0.0), &track).unwrap();
        let noisy = mean_hnr_db(&sine_clip(220.0, 1.0, 0.3), &track).unwrap();
        assert!(clean > noisy + 5.0, "clean={clean} noisy={noisy}");
    }

    #[test]
    fn unvoiced_track_yields_none() {
        let audio = sine_clip(220.0, 0.5, 0.0);
        let track = PitchTrack {
            times: vec![0.1, 0.2],
            values: vec![None, None],
            hop_seconds: 0.1,
        };
        assert!(mean_hnr_db(&audio, &track).is_none());
    }
}
