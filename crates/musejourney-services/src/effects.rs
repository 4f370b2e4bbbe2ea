//! Master tone filter using fundsp

use std::fmt;

use fundsp::hacker::*;

pub const DEFAULT_TONE_HZ: f32 = 8000.0;
const MIN_TONE_HZ: f32 = 200.0;
const MAX_TONE_HZ: f32 = 20000.0;
/// Highest usable cutoff as a fraction of the sample rate
const NYQUIST_MARGIN: f32 = 0.45;

/// Low-pass filter applied to the mono output mix
pub struct LowPassEffect {
    cutoff_hz: f32,
    sample_rate: f32,
    filter: An<FixedSvf<f64, LowpassMode<f64>>>,
    bypassed: bool,
}

impl LowPassEffect {
    pub fn new(cutoff_hz: f32, sample_rate: f32) -> Self {
        let cutoff_hz = cutoff_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ);
        let mut filter = lowpass_hz(effective_cutoff(cutoff_hz, sample_rate), 0.707);
        filter.set_sample_rate(sample_rate as f64);
        Self { cutoff_hz, sample_rate, filter, bypassed: false }
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        if self.bypassed {
            return;
        }
        for sample in samples.iter_mut() {
            let input = Frame::from([*sample]);
            let output = self.filter.tick(&input);
            *sample = output[0];
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff_hz
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.cutoff_hz = cutoff_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ);
        self.filter
            .set(Setting::center(effective_cutoff(self.cutoff_hz, self.sample_rate)));
    }

    pub fn set_bypass(&mut self, bypass: bool) {
        self.bypassed = bypass;
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypassed
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.filter.set_sample_rate(sample_rate as f64);
        self.filter
            .set(Setting::center(effective_cutoff(self.cutoff_hz, sample_rate)));
    }
}

fn effective_cutoff(cutoff_hz: f32, sample_rate: f32) -> f32 {
    cutoff_hz.min(sample_rate * NYQUIST_MARGIN)
}

impl fmt::Debug for LowPassEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LowPassEffect")
            .field("cutoff_hz", &self.cutoff_hz)
            .field("bypassed", &self.bypassed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_clamped() {
        let mut filter = LowPassEffect::new(50.0, 48000.0);
        assert_eq!(filter.cutoff(), 200.0);
        filter.set_cutoff(30000.0);
        assert_eq!(filter.cutoff(), 20000.0);
    }

    #[test]
    fn test_bypass_leaves_signal() {
        let mut filter = LowPassEffect::new(1000.0, 48000.0);
        filter.set_bypass(true);
        let mut samples = vec![1.0, -1.0, 1.0, -1.0];
        filter.process(&mut samples);
        assert_eq!(samples, vec![1.0, -1.0, 1.0, -1.0]);
    }

    #[test]
    fn test_low_sample_rate_stays_stable() {
        let mut filter = LowPassEffect::new(DEFAULT_TONE_HZ, 1000.0);
        let mut samples: Vec<f32> = (0..1000).map(|i| (i as f32 * 0.3).sin()).collect();
        filter.process(&mut samples);
        assert!(samples.iter().all(|s| s.is_finite()));
        assert!(samples[500..].iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn test_attenuates_nyquist() {
        let mut filter = LowPassEffect::new(500.0, 48000.0);
        let mut samples: Vec<f32> = (0..4800).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        filter.process(&mut samples);
        let tail_peak = samples[4000..].iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail_peak < 0.05);
    }
}
