//! Fundamental-frequency tracking via pYIN.

use anyhow::Result;
use aus::analysis;

use crate::audio::{resample, AudioData};
use crate::metrics::PitchSample;

/// All pitch analysis runs at this rate; input is resampled when needed.
pub(crate) const ANALYSIS_SAMPLE_RATE: u32 = 16_000;
const WINDOW_MS: usize = 40;
const FREQ_MIN: f64 = 55.0;
const FREQ_MAX: f64 = 1500.0;

/// Time-aligned pitch estimates. `None` marks an unvoiced frame.
#[derive(Debug, Clone)]
pub struct PitchTrack {
    pub times: Vec<f64>,
    pub values: Vec<Option<f64>>,
    /// Time between consecutive frames in seconds.
    pub hop_seconds: f64,
}

/// Summary statistics over the voiced frames of a track.
#[derive(Debug, Clone, Copy)]
pub struct PitchStats {
    pub mean_hz: f64,
    pub min_hz: f64,
    pub max_hz: f64,
}

impl PitchTrack {
    pub fn voiced(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .zip(self.values.iter())
            .filter_map(|(&t, v)| v.map(|f| (t, f)))
    }

    pub fn voiced_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Mean/min/max over voiced frames; `None` when nothing was voiced.
    pub fn stats(&self) -> Option<PitchStats> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (_, f) in self.voiced() {
            count += 1;
            sum += f;
            min = min.min(f);
            max = max.max(f);
        }
        (count > 0).then(|| PitchStats {
            mean_hz: sum / count as f64,
            min_hz: min,
            max_hz: max,
        })
    }

    /// Pitch estimate at an arbitrary time, from the nearest frame.
    pub fn value_at(&self, time_seconds: f64) -> Option<f64> {
        if self.times.is_empty() || self.hop_seconds <= 0.0 {
            return None;
        }
        let offset = (time_seconds - self.times[0]) / self.hop_seconds;
        let index = offset.round().clamp(0.0, (self.times.len() - 1) as f64) as usize;
        self.values[index]
    }

    /// The track as serializable samples for the metrics record.
    pub fn to_samples(&self) -> Vec<PitchSample> {
        self.times
            .iter()
            .zip(self.values.iter())
            .map(|(&t, &f)| PitchSample {
                time_seconds: t,
                frequency_hz: f,
            })
            .collect()
    }
}

/// Run the pYIN estimator over the whole clip.
pub fn track_pitch(audio: &AudioData) -> Result<PitchTrack> {
    let samples = ensure_sample_rate(audio)?;
    let audio_f64: Vec<f64> = samples.into_iter().map(|s| s as f64).collect();
    let frame_len = ((ANALYSIS_SAMPLE_RATE as usize * WINDOW_MS) / 1000).max(1);

    let (timestamps, pitches, voiced_flags, _confidence) = analysis::pyin_pitch_estimator(
        &audio_f64,
        ANALYSIS_SAMPLE_RATE,
        FREQ_MIN,
        FREQ_MAX,
        frame_len,
    );

    let values: Vec<Option<f64>> = pitches
        .iter()
        .zip(voiced_flags.iter())
        .map(|(&pitch, &flag)| (flag && pitch.is_finite() && pitch > 0.0).then_some(pitch))
        .collect();

    let hop_seconds = match timestamps.as_slice() {
        [first, second, ..] => second - first,
        _ => frame_len as f64 / ANALYSIS_SAMPLE_RATE as f64,
    };

    Ok(PitchTrack {
        times: timestamps,
        values,
        hop_seconds,
    })
}

fn ensure_sample_rate(audio: &AudioData) -> Result<Vec<f32>> {
    if audio.sample_rate == ANALYSIS_SAMPLE_RATE {
        Ok(audio.samples.clone())
    } else {
        resample::linear_resample(&audio.samples, audio.sample_rate, ANALYSIS_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(values: Vec<Option<f64>>) -> PitchTrack {
        let times = (0..values.len()).map(|i| i as f64 * 0.01).collect();
        PitchTrack {
            times,
            values,
            hop_seconds: 0.01,
        }
    }

    #[test]
    fn stats_ignore_unvoiced_frames() {
        let t = track(vec![None, Some(200.0), Some(220.0), None, Some(240.0)]);
        let stats = t.stats().unwrap();
        assert!((stats.mean_hz - 220.0).abs() < 1e-9);
        assert_eq!(stats.min_hz, 200.0);
        assert_eq!(stats.max_hz, 240.0);
        assert_eq!(t.voiced_count(), 3);
    }

    #[test]
    fn stats_empty_for_fully_unvoiced_track() {
        assert!(track(vec![None, None]).stats().is_none());
    }

    #[test]
    fn value_lookup_clamps_to_track_bounds() {
        let t = track(vec![Some(100.0), Some(110.0), Some(120.0)]);
        assert_eq!(t.value_at(-1.0), Some(100.0));
        assert_eq!(t.value_at(0.011), Some(110.0));
        assert_eq!(t.value_at(10.0), Some(120.0));
    }
}
