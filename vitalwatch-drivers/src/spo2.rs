//! Reference heart-rate/SpO2 window computation
//!
//! Heart rate comes from peak spacing in the smoothed, DC-removed infrared
//! channel. SpO2 comes from the ratio of ratios
//! `R = (AC_red / DC_red) / (AC_ir / DC_ir)` mapped through the usual
//! quadratic calibration curve `-45.060·R² + 30.354·R + 94.845`.
//!
//! This is not a certified algorithm. Boards with a vendor implementation
//! should implement [`SpO2Algorithm`] over that instead.

use vitalwatch_core::traits::{SpO2Algorithm, WindowEstimate};
use vitalwatch_core::vitals::MAX_WINDOW_LEN;

/// Default pulse-oximeter sample rate (Hz)
pub const DEFAULT_SAMPLE_RATE_HZ: u32 = 25;

/// Highest heart rate the peak spacing may represent (bpm)
const MAX_HEART_RATE_BPM: u32 = 220;

/// Half-width of the centered moving average
const SMOOTHING_RADIUS: usize = 2;

/// Peaks must exceed this share of the largest excursion
const PEAK_THRESHOLD_RATIO: f32 = 0.3;

const SPO2_A: f32 = -45.060;
const SPO2_B: f32 = 30.354;
const SPO2_C: f32 = 94.845;

/// Peak-detection heart rate and ratio-of-ratios SpO2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakDetectSpO2 {
    sample_rate_hz: u32,
}

impl Default for PeakDetectSpO2 {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE_HZ)
    }
}

impl PeakDetectSpO2 {
    pub fn new(sample_rate_hz: u32) -> Self {
        Self {
            sample_rate_hz: sample_rate_hz.max(1),
        }
    }

    fn heart_rate(&self, ir: &[u32]) -> Option<i32> {
        let n = ir.len();
        if n <= 2 * SMOOTHING_RADIUS + 2 {
            return None;
        }

        let mean = mean(ir)?;
        let mut smoothed = [0.0f32; MAX_WINDOW_LEN];
        for i in SMOOTHING_RADIUS..n - SMOOTHING_RADIUS {
            let span = &ir[i - SMOOTHING_RADIUS..=i + SMOOTHING_RADIUS];
            let sum: f32 = span.iter().map(|&s| s as f32 - mean).sum();
            smoothed[i] = sum / span.len() as f32;
        }
        let interior = &smoothed[SMOOTHING_RADIUS..n - SMOOTHING_RADIUS];

        let peak = interior.iter().copied().fold(0.0f32, f32::max);
        if peak <= 0.0 {
            return None;
        }
        let threshold = peak * PEAK_THRESHOLD_RATIO;
        let refractory = (self.sample_rate_hz * 60 / MAX_HEART_RATE_BPM).max(1) as usize;

        let mut first: Option<usize> = None;
        let mut last = 0usize;
        let mut count = 0u32;
        for i in 1..interior.len() - 1 {
            let value = interior[i];
            let is_peak = value > threshold && value > interior[i - 1] && value >= interior[i + 1];
            if !is_peak {
                continue;
            }
            if first.is_some() && i - last < refractory {
                continue;
            }
            if first.is_none() {
                first = Some(i);
            }
            last = i;
            count += 1;
        }

        let first = first?;
        if count < 2 || last == first {
            return None;
        }
        let span = (last - first) as f32;
        let bpm = 60.0 * self.sample_rate_hz as f32 * (count - 1) as f32 / span;
        Some(round(bpm))
    }
}

impl SpO2Algorithm for PeakDetectSpO2 {
    fn compute(&mut self, ir: &[u32], red: &[u32]) -> WindowEstimate {
        let n = ir.len().min(red.len()).min(MAX_WINDOW_LEN);
        let (ir, red) = (&ir[..n], &red[..n]);

        let heart_rate = self.heart_rate(ir);
        let spo2 = spo2(ir, red);

        WindowEstimate {
            heart_rate: heart_rate.unwrap_or(-1),
            heart_rate_valid: heart_rate.is_some(),
            spo2: spo2.unwrap_or(-1),
            spo2_valid: spo2.is_some(),
        }
    }
}

fn spo2(ir: &[u32], red: &[u32]) -> Option<i32> {
    let ratio_ir = perfusion(ir)?;
    let ratio_red = perfusion(red)?;
    let r = ratio_red / ratio_ir;

    let spo2 = SPO2_A * r * r + SPO2_B * r + SPO2_C;
    if !(0.0..=100.0).contains(&spo2) {
        return None;
    }
    Some(round(spo2))
}

/// AC/DC ratio of one channel; `None` for a flat or dark channel
fn perfusion(samples: &[u32]) -> Option<f32> {
    let dc = mean(samples)?;
    let max = *samples.iter().max()?;
    let min = *samples.iter().min()?;
    let ac = (max - min) as f32;
    if dc <= 0.0 || ac <= 0.0 {
        return None;
    }
    Some(ac / dc)
}

fn mean(samples: &[u32]) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }
    let sum: u64 = samples.iter().map(|&s| s as u64).sum();
    Some(sum as f32 / samples.len() as f32)
}

fn round(value: f32) -> i32 {
    if value >= 0.0 {
        (value + 0.5) as i32
    } else {
        (value - 0.5) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use std::vec::Vec;

    /// DC + AC·sin sampled at 25 Hz, peaking at sample 5
    fn pulse_wave(dc: f32, ac: f32, bpm: f32) -> Vec<u32> {
        let period = 25.0 * 60.0 / bpm;
        (0..MAX_WINDOW_LEN)
            .map(|i| {
                let phase = 2.0 * PI * (i as f32 - 5.0) / period + PI / 2.0;
                (dc + ac * phase.sin()) as u32
            })
            .collect()
    }

    #[test]
    fn test_heart_rate_from_peaks() {
        let ir = pulse_wave(100_000.0, 2000.0, 75.0);
        let red = pulse_wave(50_000.0, 500.0, 75.0);

        let estimate = PeakDetectSpO2::default().compute(&ir, &red);

        assert!(estimate.heart_rate_valid);
        assert!((74..=76).contains(&estimate.heart_rate), "hr={}", estimate.heart_rate);
    }

    #[test]
    fn test_spo2_from_ratio() {
        // R = (500/50000) / (2000/100000) = 0.5 -> 98.76 %
        let ir = pulse_wave(100_000.0, 2000.0, 75.0);
        let red = pulse_wave(50_000.0, 500.0, 75.0);

        let estimate = PeakDetectSpO2::default().compute(&ir, &red);

        assert!(estimate.spo2_valid);
        assert!((98..=99).contains(&estimate.spo2), "spo2={}", estimate.spo2);
    }

    #[test]
    fn test_flat_signal_is_invalid() {
        let flat = [80_000u32; MAX_WINDOW_LEN];

        let estimate = PeakDetectSpO2::default().compute(&flat, &flat);

        assert!(!estimate.heart_rate_valid);
        assert!(!estimate.spo2_valid);
    }

    #[test]
    fn test_short_window_is_invalid() {
        let estimate = PeakDetectSpO2::default().compute(&[1, 2, 3], &[1, 2, 3]);
        assert!(!estimate.heart_rate_valid);
    }

    #[test]
    fn test_low_ratio_out_of_curve() {
        // Red perfusion far above IR pushes the curve below zero
        let ir = pulse_wave(100_000.0, 200.0, 75.0);
        let red = pulse_wave(50_000.0, 5000.0, 75.0);

        let estimate = PeakDetectSpO2::default().compute(&ir, &red);
        assert!(!estimate.spo2_valid);
    }
}
