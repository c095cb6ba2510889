//! Musical note mapping and vocal range classification.
//!
//! All constants live here as immutable tables so the functions stay pure and
//! testable in isolation.

/// Chromatic scale starting at C, equal temperament.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A4 reference frequency in Hz.
const A4_HZ: f64 = 440.0;

/// Sentinel returned for inputs that have no note (zero, negative, NaN).
pub const NOTE_UNAVAILABLE: &str = "N/A";

/// Approximate fundamental-frequency bounds for the common vocal ranges,
/// ordered low to high. The first range containing the mean pitch wins.
const VOCAL_RANGES: [(&str, f64, f64); 6] = [
    ("Bass", 82.0, 330.0),
    ("Baritone", 98.0, 392.0),
    ("Tenor", 130.0, 494.0),
    ("Contralto", 165.0, 660.0),
    ("Mezzo-soprano", 196.0, 784.0),
    ("Soprano", 261.0, 1047.0),
];

/// Map a frequency in Hz to the nearest equal-tempered note name with octave,
/// e.g. `frequency_to_note(440.0) == "A4"`.
///
/// C0 is derived from the A4 = 440 Hz reference as `440 * 2^(-4.75)`.
/// Exact half-semitone boundaries resolve with round-half-to-even
/// (`f64::round_ties_even`), so a frequency precisely between two notes maps
/// to the one with the even semitone index.
///
/// Non-positive or non-finite input returns [`NOTE_UNAVAILABLE`]; this
/// function never panics.
pub fn frequency_to_note(frequency_hz: f64) -> String {
    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        return NOTE_UNAVAILABLE.to_string();
    }
    let c0 = A4_HZ * 2.0_f64.powf(-4.75);
    let semitones = (12.0 * (frequency_hz / c0).log2()).round_ties_even() as i64;
    let octave = semitones.div_euclid(12);
    let index = semitones.rem_euclid(12) as usize;
    format!("{}{}", NOTE_NAMES[index], octave)
}

/// Classify a mean fundamental frequency into a named vocal range.
///
/// Returns `None` when the pitch falls outside every tabled range (reported
/// as "Unclassified" downstream).
pub fn classify_vocal_range(mean_pitch_hz: f64) -> Option<&'static str> {
    if !mean_pitch_hz.is_finite() || mean_pitch_hz <= 0.0 {
        return None;
    }
    VOCAL_RANGES
        .iter()
        .find(|(_, low, high)| (*low..=*high).contains(&mean_pitch_hz))
        .map(|(name, _, _)| *name)
}

/// Interval between two frequencies in semitones, positive when `high > low`.
pub fn semitone_interval(low_hz: f64, high_hz: f64) -> Option<f64> {
    if low_hz > 0.0 && high_hz > 0.0 && low_hz.is_finite() && high_hz.is_finite() {
        Some(12.0 * (high_hz / low_hz).log2())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn reference_pitch_maps_to_a4() {
        assert_eq!(frequency_to_note(440.0), "A4");
    }

    #[test]
    fn octave_below_reference_maps_to_a3() {
        assert_eq!(frequency_to_note(220.0), "A3");
    }

    #[test]
    fn middle_c_maps_to_c4() {
        assert_eq!(frequency_to_note(261.63), "C4");
    }

    #[test]
    fn invalid_input_returns_sentinel() {
        assert_eq!(frequency_to_note(0.0), "N/A");
        assert_eq!(frequency_to_note(-5.0), "N/A");
        assert_eq!(frequency_to_note(f64::NAN), "N/A");
        assert_eq!(frequency_to_note(f64::INFINITY), "N/A");
    }

    #[test]
    fn octave_doubling_increments_octave_and_keeps_letter() {
        for base in [55.0, 98.0, 261.63, 440.0, 493.88] {
            let low = frequency_to_note(base);
            let high = frequency_to_note(base * 2.0);
            let (low_letter, low_octave) = split_note(&low);
            let (high_letter, high_octave) = split_note(&high);
            assert_eq!(low_letter, high_letter, "letter changed for {base} Hz");
            assert_eq!(low_octave + 1, high_octave, "octave step for {base} Hz");
        }
    }

    #[test]
    fn range_classification_picks_first_containing_range() {
        assert_eq!(classify_vocal_range(100.0), Some("Bass"));
        assert_eq!(classify_vocal_range(220.0), Some("Bass"));
        assert_eq!(classify_vocal_range(400.0), Some("Tenor"));
        assert_eq!(classify_vocal_range(900.0), Some("Soprano"));
        assert_eq!(classify_vocal_range(50.0), None);
        assert_eq!(classify_vocal_range(f64::NAN), None);
    }

    #[test]
    fn semitone_interval_spans_an_octave() {
        assert_relative_eq!(semitone_interval(220.0, 440.0).unwrap(), 12.0, epsilon = 1e-9);
        assert!(semitone_interval(0.0, 440.0).is_none());
    }

    fn split_note(note: &str) -> (String, i64) {
        let digits_at = note
            .find(|c: char| c.is_ascii_digit() || c == '-')
            .expect("octave digits");
        let (letter, octave) = note.split_at(digits_at);
        (letter.to_string(), octave.parse().expect("octave number"))
    }
}
