//! Formant estimation by linear prediction at the clip midpoint.
//!
//! The signal is decimated to roughly 11 kHz, pre-emphasised, Hamming
//! windowed, and fitted with an LPC model via autocorrelation and
//! Levinson-Durbin recursion. F1 and F2 are the first two peaks of the LPC
//! spectral envelope in the speech band.

use crate::audio::AudioData;

const WINDOW_MS: usize = 30;
const LPC_ORDER: usize = 12;
const TARGET_RATE_HZ: f64 = 11_025.0;
const PRE_EMPHASIS: f64 = 0.97;
/// Speech band searched for formant peaks.
const FORMANT_MIN_HZ: f64 = 90.0;
const FORMANT_MAX_HZ: f64 = 4_000.0;
/// Resolution of the envelope scan.
const ENVELOPE_POINTS: usize = 512;

/// First two formant frequencies (F1, F2) in Hz, measured at the midpoint of
/// the clip. `None` when the clip is too short or the LPC fit degenerates.
pub fn estimate_formants(audio: &AudioData) -> Option<(f64, f64)> {
    let decimation = (audio.sample_rate as f64 / TARGET_RATE_HZ).round().max(1.0) as usize;
    let rate = audio.sample_rate as f64 / decimation as f64;
    let decimated = decimate(&audio.samples, decimation);

    let window_len = (rate * WINDOW_MS as f64 / 1000.0) as usize;
    if window_len <= LPC_ORDER * 2 || decimated.len() < window_len {
        return None;
    }
    let mid = decimated.len() / 2;
    let start = mid.saturating_sub(window_len / 2);
    let mut frame: Vec<f64> = decimated[start..start + window_len].to_vec();

    pre_emphasise(&mut frame);
    apply_hamming(&mut frame);

    let autocorr = autocorrelation(&frame, LPC_ORDER);
    if autocorr[0] <= f64::EPSILON {
        return None;
    }
    let lpc = levinson_durbin(&autocorr, LPC_ORDER)?;

    let peaks = envelope_peaks(&lpc, rate);
    match peaks.as_slice() {
        [f1, f2, ..] => Some((*f1, *f2)),
        _ => None,
    }
}

/// Block-average decimator; crude low-pass plus downsample in one step.
fn decimate(samples: &[f32], factor: usize) -> Vec<f64> {
    if factor <= 1 {
        return samples.iter().map(|&s| s as f64).collect();
    }
    samples
        .chunks_exact(factor)
        .map(|chunk| chunk.iter().map(|&s| s as f64).sum::<f64>() / factor as f64)
        .collect()
}

fn pre_emphasise(frame: &mut [f64]) {
    for i in (1..frame.len()).rev() {
        frame[i] -= PRE_EMPHASIS * frame[i - 1];
    }
}

fn apply_hamming(frame: &mut [f64]) {
    let n = frame.len();
    for (i, sample) in frame.iter_mut().enumerate() {
        let phase = 2.0 * std::f64::consts::PI * i as f64 / (n - 1) as f64;
        *sample *= 0.54 - 0.46 * phase.cos();
    }
}

fn autocorrelation(frame: &[f64], max_lag: usize) -> Vec<f64> {
    (0..=max_lag)
        .map(|lag| {
            frame[..frame.len() - lag]
                .iter()
                .zip(&frame[lag..])
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Levinson-Durbin recursion; returns LPC coefficients a[1..=order] for the
/// prediction polynomial A(z) = 1 + a1 z^-1 + ... `None` when the recursion
/// becomes unstable (non-positive prediction error).
fn levinson_durbin(autocorr: &[f64], order: usize) -> Option<Vec<f64>> {
    let mut a = vec![0.0_f64; order + 1];
    let mut error = autocorr[0];

    for i in 1..=order {
        let mut acc = autocorr[i];
        for j in 1..i {
            acc += a[j] * autocorr[i - j];
        }
        if error <= 0.0 {
            return None;
        }
        let k = -acc / error;
        a[i] = k;
        for j in 1..=i / 2 {
            let tmp = a[j] + k * a[i - j];
            a[i - j] += k * a[j];
            a[j] = tmp;
        }
        error *= 1.0 - k * k;
    }
    Some(a)
}

/// Local maxima of the LPC envelope 1/|A(e^{jw})| inside the formant band,
/// in ascending frequency order.
fn envelope_peaks(lpc: &[f64], rate: f64) -> Vec<f64> {
    let nyquist = rate / 2.0;
    let step = nyquist / ENVELOPE_POINTS as f64;
    let magnitudes: Vec<f64> = (0..ENVELOPE_POINTS)
        .map(|i| {
            let omega = std::f64::consts::PI * i as f64 / ENVELOPE_POINTS as f64;
            let (mut re, mut im) = (1.0, 0.0);
            for (k, &coeff) in lpc.iter().enumerate().skip(1) {
                re += coeff * (omega * k as f64).cos();
                im -= coeff * (omega * k as f64).sin();
            }
            1.0 / (re * re + im * im).sqrt().max(f64::EPSILON)
        })
        .collect();

    let mut peaks = Vec::new();
    for i in 1..magnitudes.len() - 1 {
        let freq = i as f64 * step;
        if !(FORMANT_MIN_HZ..=FORMANT_MAX_HZ).contains(&freq) {
            continue;
        }
        if magnitudes[i] > magnitudes[i - 1] && magnitudes[i] >= magnitudes[i + 1] {
            peaks.push(freq);
        }
    }
    peaks
}
