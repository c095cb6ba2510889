use voxmetrics::analysis::{analyze, ExerciseKind};
use voxmetrics::audio::AudioData;

const SAMPLE_RATE: u32 = 16_000;

/// Steady sine tone with a touch of amplitude shaping at the edges so the
/// clip resembles a recorded sustained vowel.
fn tone_clip(freq: f64, seconds: f64) -> AudioData {
    let total = (SAMPLE_RATE as f64 * seconds) as usize;
    let fade = (SAMPLE_RATE / 100) as usize;
    let samples = (0..total)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE as f64;
            let edge = i.min(total - 1 - i);
            let envelope = (edge as f64 / fade as f64).min(1.0);
            (0.4 * envelope * (2.0 * std::f64::consts::PI * freq * t).sin()) as f32
        })
        .collect();
    AudioData {
        samples,
        sample_rate: SAMPLE_RATE,
    }
}

#[test]
fn sustained_vowel_pipeline_recovers_pitch_and_note() {
    let audio = tone_clip(220.0, 2.0);
    let record = analyze(&audio, ExerciseKind::SustainedVowel);

    assert!(record.error.is_none(), "error: {:?}", record.error);
    let mean = record.pitch_hz_mean.expect("mean pitch");
    assert!(
        (mean - 220.0).abs() < 5.0,
        "mean pitch {mean} too far from 220 Hz"
    );
    assert_eq!(record.pitch_note.as_deref(), Some("A3"));
    assert!(record.health.is_some());
    assert!((record.duration_seconds - 2.0).abs() < 0.01);
}

#[test]
fn clean_tone_classifies_as_normal() {
    let audio = tone_clip(220.0, 2.0);
    let record = analyze(&audio, ExerciseKind::SustainedVowel);

    if let Some(jitter) = record.jitter_percent {
        assert!(jitter < 1.04, "clean tone jitter {jitter}");
    }
    if let Some(hnr) = record.hnr_db {
        assert!(hnr > 12.0, "clean tone HNR {hnr}");
    }
    assert_eq!(record.health.as_deref(), Some("Normal"));
}

#[test]
fn exercise_kind_selects_metric_groups() {
    let audio = tone_clip(261.63, 1.5);

    let endurance = analyze(&audio, ExerciseKind::MaxPhonationTime);
    assert!(endurance.intensity_db.is_some());
    assert!(endurance.jitter_percent.is_none());
    assert!(endurance.pitch_track.is_none());
    assert!(endurance.health.is_none());

    let range = analyze(&audio, ExerciseKind::RangeAnalysis);
    assert!(range.pitch_track.is_some());
    assert!(range.range_semitones.is_some());
    assert!(range.vibrato.is_none());
}

#[test]
fn range_analysis_measures_an_octave_glide() {
    let total = (SAMPLE_RATE as f64 * 2.0) as usize;
    let mut phase = 0.0;
    let samples = (0..total)
        .map(|i| {
            let progress = i as f64 / (total - 1) as f64;
            let freq = 220.0 * 2f64.powf(progress);
            phase += 2.0 * std::f64::consts::PI * freq / SAMPLE_RATE as f64;
            (0.4 * phase.sin()) as f32
        })
        .collect();
    let audio = AudioData {
        samples,
        sample_rate: SAMPLE_RATE,
    };

    let record = analyze(&audio, ExerciseKind::RangeAnalysis);
    let span = record.range_semitones.expect("range");
    assert!(
        (9.0..=14.0).contains(&span),
        "octave glide measured {span} semitones"
    );
    let track = record.pitch_track.expect("track");
    assert!(track.len() > 20);
}

#[test]
fn near_silence_fails_the_whole_analysis_gracefully() {
    let samples = vec![0.0f32; SAMPLE_RATE as usize];
    let audio = AudioData {
        samples,
        sample_rate: SAMPLE_RATE,
    };
    let record = analyze(&audio, ExerciseKind::Speech);

    assert!(record.error.is_some());
    assert!(record.pitch_hz_mean.is_none());
    // Downstream consumers must always receive a serializable record.
    let json = serde_json::to_string(&record).expect("serializable");
    assert!(json.contains("error"));
}
