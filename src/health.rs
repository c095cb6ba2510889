//! Vocal stability classification against fixed clinical thresholds.

/// Jitter (local, %) above this value suggests unstable phonation.
pub const JITTER_LIMIT_PERCENT: f64 = 1.04;
/// Shimmer (local, %) above this value suggests unstable amplitude.
pub const SHIMMER_LIMIT_PERCENT: f64 = 3.81;
/// HNR (dB) below this value suggests a rough or breathy voice quality.
pub const HNR_FLOOR_DB: f64 = 12.0;

const SEPARATOR: &str = "; ";

/// Compare jitter, shimmer, and HNR against their clinical cutoffs and return
/// either the literal `"Normal"` or all firing alerts joined with `"; "`.
///
/// Rules are evaluated independently, always in jitter / shimmer / HNR order,
/// with strict comparisons (a jitter of exactly 1.04 does not fire). A `None`
/// input means the metric could not be computed; it contributes no alert and
/// never causes a panic. Pure and deterministic.
pub fn classify_vocal_health(
    jitter_percent: Option<f64>,
    shimmer_percent: Option<f64>,
    hnr_db: Option<f64>,
) -> String {
    let mut alerts: Vec<&str> = Vec::new();
    if jitter_percent.is_some_and(|j| j > JITTER_LIMIT_PERCENT) {
        alerts.push("jitter above recommended limit");
    }
    if shimmer_percent.is_some_and(|s| s > SHIMMER_LIMIT_PERCENT) {
        alerts.push("shimmer above recommended limit");
    }
    if hnr_db.is_some_and(|h| h < HNR_FLOOR_DB) {
        alerts.push("HNR low, rough/breathy voice quality");
    }
    if alerts.is_empty() {
        "Normal".to_string()
    } else {
        alerts.join(SEPARATOR)
    }
}
