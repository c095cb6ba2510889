//! Audio analysis pipeline: one configurable module instead of per-exercise
//! script variants. The exercise kind selects which metric groups are
//! computed; every sub-analysis fails individually into a `None` field plus a
//! warning, and only the complete absence of voiced frames fails the whole
//! run (still reported as a parseable record, not a process error).

pub mod formant;
pub mod harmonicity;
pub mod intensity;
pub mod pitch;
pub mod pulses;
pub mod vibrato;

use std::path::Path;

use anyhow::Result;
use tracing::{debug, warn};

use crate::audio::{decoder, AudioData};
use crate::health::classify_vocal_health;
use crate::metrics::MetricsRecord;
use crate::notes::{classify_vocal_range, frequency_to_note, semitone_interval};

/// Exercise the recording was made for; selects the metric set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    /// Sustained vowel phonation: full stability metrics plus vibrato.
    SustainedVowel,
    /// Maximum phonation time / endurance: duration and loudness.
    MaxPhonationTime,
    /// Vowel articulation test: formants.
    VowelArticulation,
    /// Full range exploration: pitch extremes and the contour.
    RangeAnalysis,
    /// Five-note scale: pitch extremes and the contour.
    FiveNoteScale,
    /// Read or spontaneous speech: loudness and voice quality.
    Speech,
}

/// Which metric groups an exercise asks for. Pitch statistics are always
/// computed; they anchor every report.
#[derive(Debug, Clone, Copy, Default)]
struct MetricSelection {
    jitter_shimmer: bool,
    hnr: bool,
    formants: bool,
    vibrato: bool,
    pitch_track: bool,
    intensity: bool,
    range: bool,
}

impl ExerciseKind {
    /// Parse the free-form CLI string. Unrecognised values fall back to the
    /// default sustained-vowel metric set.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "sustained-vowel" | "vowel" | "sustained" => Self::SustainedVowel,
            "max-phonation-time" | "mpt" | "endurance" => Self::MaxPhonationTime,
            "vowel-articulation-test" | "vowel-articulation" | "articulation" => {
                Self::VowelArticulation
            }
            "range-analysis" | "range" => Self::RangeAnalysis,
            "five-note-scale" | "scale" => Self::FiveNoteScale,
            "speech" | "reading" => Self::Speech,
            other => {
                if !other.is_empty() {
                    warn!(exercise = other, "unrecognised exercise, using default");
                }
                Self::SustainedVowel
            }
        }
    }

    pub fn canonical_name(&self) -> &'static str {
        match self {
            Self::SustainedVowel => "sustained-vowel",
            Self::MaxPhonationTime => "max-phonation-time",
            Self::VowelArticulation => "vowel-articulation-test",
            Self::RangeAnalysis => "range-analysis",
            Self::FiveNoteScale => "five-note-scale",
            Self::Speech => "speech",
        }
    }

    fn selection(&self) -> MetricSelection {
        match self {
            Self::SustainedVowel => MetricSelection {
                jitter_shimmer: true,
                hnr: true,
                vibrato: true,
                ..Default::default()
            },
            Self::MaxPhonationTime => MetricSelection {
                intensity: true,
                ..Default::default()
            },
            Self::VowelArticulation => MetricSelection {
                formants: true,
                ..Default::default()
            },
            Self::RangeAnalysis | Self::FiveNoteScale => MetricSelection {
                range: true,
                pitch_track: true,
                ..Default::default()
            },
            Self::Speech => MetricSelection {
                hnr: true,
                intensity: true,
                ..Default::default()
            },
        }
    }
}

/// Decode an audio file and run the analysis for the given exercise string.
///
/// Only input problems (unreadable or undecodable file) are returned as
/// errors; everything downstream degrades into the record itself.
pub fn analyze_file(path: &Path, exercise_raw: &str) -> Result<MetricsRecord> {
    let audio = decoder::decode_audio(path)?;
    debug!(
        samples = audio.samples.len(),
        sample_rate = audio.sample_rate,
        "decoded input audio"
    );
    Ok(analyze(&audio, ExerciseKind::parse(exercise_raw)))
}

/// Run the full analysis over decoded audio.
pub fn analyze(audio: &AudioData, exercise: ExerciseKind) -> MetricsRecord {
    let name = exercise.canonical_name();
    let duration = audio.duration_seconds();

    let track = match pitch::track_pitch(audio) {
        Ok(track) => track,
        Err(err) => {
            warn!(error = %err, "pitch analysis failed");
            return MetricsRecord::failed(name, duration, format!("pitch analysis failed: {err}"));
        }
    };
    let Some(stats) = track.stats() else {
        return MetricsRecord::failed(name, duration, "no voiced frames detected");
    };
    debug!(
        voiced_frames = track.voiced_count(),
        mean_hz = stats.mean_hz,
        "pitch track computed"
    );

    let mut record = MetricsRecord {
        exercise: name.to_string(),
        duration_seconds: duration,
        pitch_hz_mean: Some(stats.mean_hz),
        pitch_hz_min: Some(stats.min_hz),
        pitch_hz_max: Some(stats.max_hz),
        pitch_note: Some(frequency_to_note(stats.mean_hz)),
        vocal_range: classify_vocal_range(stats.mean_hz).map(str::to_string),
        ..Default::default()
    };

    let selection = exercise.selection();
    if selection.range {
        record.range_semitones = semitone_interval(stats.min_hz, stats.max_hz);
    }
    if selection.pitch_track {
        record.pitch_track = Some(track.to_samples());
    }
    if selection.intensity {
        record.intensity_db = intensity::mean_intensity_db(audio);
        if record.intensity_db.is_none() {
            push_warning(&mut record, "intensity");
        }
    }
    if selection.hnr {
        record.hnr_db = harmonicity::mean_hnr_db(audio, &track);
        if record.hnr_db.is_none() {
            push_warning(&mut record, "HNR");
        }
    }
    if selection.jitter_shimmer {
        let train = pulses::extract_pulses(audio, &track);
        record.jitter_percent = pulses::jitter_local_percent(&train);
        record.shimmer_percent = pulses::shimmer_local_percent(&train);
        if record.jitter_percent.is_none() {
            push_warning(&mut record, "jitter");
        }
        if record.shimmer_percent.is_none() {
            push_warning(&mut record, "shimmer");
        }
    }
    if selection.formants {
        match formant::estimate_formants(audio) {
            Some((f1, f2)) => {
                record.formant1_hz = Some(f1);
                record.formant2_hz = Some(f2);
            }
            None => push_warning(&mut record, "formants"),
        }
    }
    if selection.vibrato {
        record.vibrato = vibrato::detect_vibrato(&track);
        if record.vibrato.is_none() {
            push_warning(&mut record, "vibrato");
        }
    }
    if selection.jitter_shimmer || selection.hnr {
        record.health = Some(classify_vocal_health(
            record.jitter_percent,
            record.shimmer_percent,
            record.hnr_db,
        ));
    }

    record
}

fn push_warning(record: &mut MetricsRecord, metric: &str) {
    warn!(metric, "metric could not be computed");
    record
        .warnings
        .push(format!("{metric} could not be computed"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_parsing_accepts_aliases_and_separators() {
        assert_eq!(ExerciseKind::parse("sustained_vowel"), ExerciseKind::SustainedVowel);
        assert_eq!(ExerciseKind::parse("Endurance"), ExerciseKind::MaxPhonationTime);
        assert_eq!(
            ExerciseKind::parse("vowel articulation test"),
            ExerciseKind::VowelArticulation
        );
        assert_eq!(ExerciseKind::parse("RANGE"), ExerciseKind::RangeAnalysis);
        assert_eq!(ExerciseKind::parse("scale"), ExerciseKind::FiveNoteScale);
        assert_eq!(ExerciseKind::parse("reading"), ExerciseKind::Speech);
    }

    #[test]
    fn unknown_exercise_falls_back_to_default() {
        assert_eq!(ExerciseKind::parse("juggling"), ExerciseKind::SustainedVowel);
        assert_eq!(ExerciseKind::parse(""), ExerciseKind::SustainedVowel);
    }

    #[test]
    fn silent_clip_reports_whole_analysis_failure() {
        let audio = AudioData {
            samples: vec![0.0; 16_000],
            sample_rate: 16_000,
        };
        let record = analyze(&audio, ExerciseKind::SustainedVowel);
        assert!(record.error.is_some());
        assert!(record.pitch_hz_mean.is_none());
        assert_eq!(record.exercise, "sustained-vowel");
    }
}
