//! The metrics record exchanged between `analyze` and `report`.
//!
//! A record is written once per analysis run and is immutable afterwards.
//! Metrics that could not be computed serialize as JSON `null`; consumers
//! must not assume presence of any optional field.

use serde::{Deserialize, Serialize};

/// One point of the pitch time series. `frequency_hz` is `None` for
/// unvoiced frames.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitchSample {
    pub time_seconds: f64,
    pub frequency_hz: Option<f64>,
}

/// Vibrato characteristics of the voiced portion of the clip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VibratoMetrics {
    pub is_present: bool,
    pub rate_hz: f64,
    pub extent_semitones: f64,
}

/// Flat record of everything a single analysis run produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsRecord {
    /// Exercise the metric set was selected for (canonical name).
    pub exercise: String,
    pub duration_seconds: f64,

    pub pitch_hz_mean: Option<f64>,
    pub pitch_hz_min: Option<f64>,
    pub pitch_hz_max: Option<f64>,
    /// Nearest note of the mean pitch, e.g. "A3"; "N/A" when no pitch.
    pub pitch_note: Option<String>,
    /// Named vocal range containing the mean pitch, when any does.
    pub vocal_range: Option<String>,
    /// Sung interval between lowest and highest voiced pitch, in semitones.
    pub range_semitones: Option<f64>,

    pub jitter_percent: Option<f64>,
    pub shimmer_percent: Option<f64>,
    pub hnr_db: Option<f64>,
    /// Verdict from the stability classifier, when stability was requested.
    pub health: Option<String>,

    pub formant1_hz: Option<f64>,
    pub formant2_hz: Option<f64>,
    pub intensity_db: Option<f64>,
    pub vibrato: Option<VibratoMetrics>,

    /// Time-aligned pitch estimates for the report chart.
    pub pitch_track: Option<Vec<PitchSample>>,

    /// Human-readable notes about metrics that could not be computed.
    pub warnings: Vec<String>,
    /// Set when the whole analysis failed (e.g. no voiced frames); all
    /// metric fields are null in that case.
    pub error: Option<String>,
}

impl MetricsRecord {
    /// Record representing a whole-analysis failure. Still a valid record so
    /// downstream consumers always receive parseable JSON.
    pub fn failed(exercise: &str, duration_seconds: f64, reason: impl Into<String>) -> Self {
        Self {
            exercise: exercise.to_string(),
            duration_seconds,
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}
