//! Pressure samples collected during one cuff actuation

use heapless::Vec;

/// Buffer size of a pressure trace (samples)
pub const MAX_TRACE_LEN: usize = 100;

/// Ephemeral sample sequence of one cuff cycle
///
/// Only finite samples are stored. The trace stops accepting samples once
/// it reaches its configured capacity.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureTrace {
    samples: Vec<f32, MAX_TRACE_LEN>,
    capacity: usize,
}

impl Default for PressureTrace {
    fn default() -> Self {
        Self::with_capacity(MAX_TRACE_LEN)
    }
}

impl PressureTrace {
    /// Create an empty trace; `capacity` is clamped to [`MAX_TRACE_LEN`]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::new(),
            capacity: capacity.min(MAX_TRACE_LEN),
        }
    }

    /// Record a sample
    ///
    /// Returns `false` if the sample is not finite or the trace is full.
    pub fn push(&mut self, sample: f32) -> bool {
        if !sample.is_finite() || self.is_full() {
            return false;
        }
        self.samples.push(sample).is_ok()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Largest sample, `None` when empty
    pub fn max(&self) -> Option<f32> {
        self.samples.iter().copied().reduce(f32::max)
    }

    /// Smallest sample, `None` when empty
    pub fn min(&self) -> Option<f32> {
        self.samples.iter().copied().reduce(f32::min)
    }
}

impl FromIterator<f32> for PressureTrace {
    fn from_iter<I: IntoIterator<Item = f32>>(iter: I) -> Self {
        let mut trace = PressureTrace::default();
        for sample in iter {
            trace.push(sample);
        }
        trace
    }
}
