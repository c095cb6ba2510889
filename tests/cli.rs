use assert_cmd::Command;
use predicates::prelude::*;
use voxmetrics::metrics::MetricsRecord;

fn write_tone_wav(path: &std::path::Path, freq: f64, seconds: f64) {
    let sample_rate = 16_000u32;
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    let total = (sample_rate as f64 * seconds) as usize;
    for i in 0..total {
        let t = i as f64 / sample_rate as f64;
        let value = 0.4 * (2.0 * std::f64::consts::PI * freq * t).sin();
        writer
            .write_sample((value * 32767.0) as i16)
            .expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

#[test]
fn analyze_requires_an_input_argument() {
    Command::cargo_bin("voxmetrics")
        .unwrap()
        .arg("analyze")
        .assert()
        .failure();
}

#[test]
fn analyze_rejects_a_missing_audio_file() {
    Command::cargo_bin("voxmetrics")
        .unwrap()
        .args(["analyze", "no-such-file.wav"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn report_rejects_a_missing_metrics_file() {
    Command::cargo_bin("voxmetrics")
        .unwrap()
        .args(["report", "no-such-metrics.json"])
        .assert()
        .failure();
}

#[test]
fn analyze_then_report_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("take.wav");
    let metrics = dir.path().join("metrics.json");
    let pdf = dir.path().join("report.pdf");
    write_tone_wav(&wav, 440.0, 1.5);

    let assert = Command::cargo_bin("voxmetrics")
        .unwrap()
        .arg("analyze")
        .arg(&wav)
        .args(["--exercise", "sustained-vowel"])
        .arg("--output")
        .arg(&metrics)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let record: MetricsRecord = serde_json::from_str(&stdout).expect("stdout is a metrics record");
    assert!(record.error.is_none(), "error: {:?}", record.error);
    let mean = record.pitch_hz_mean.expect("mean pitch");
    assert!((mean - 440.0).abs() < 10.0, "mean pitch {mean}");
    assert_eq!(record.pitch_note.as_deref(), Some("A4"));
    assert!(metrics.is_file());

    Command::cargo_bin("voxmetrics")
        .unwrap()
        .arg("report")
        .arg(&metrics)
        .arg("--output")
        .arg(&pdf)
        .assert()
        .success()
        .stdout(predicate::str::contains("report.pdf"));
    let bytes = std::fs::read(&pdf).unwrap();
    assert!(bytes.starts_with(b"%PDF"), "output is not a PDF");
}

#[test]
fn unknown_exercise_falls_back_to_default_set() {
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("take.wav");
    write_tone_wav(&wav, 220.0, 1.0);

    let assert = Command::cargo_bin("voxmetrics")
        .unwrap()
        .arg("analyze")
        .arg(&wav)
        .args(["--exercise", "interpretive-dance"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let record: MetricsRecord = serde_json::from_str(&stdout).expect("metrics record");
    assert_eq!(record.exercise, "sustained-vowel");
}
