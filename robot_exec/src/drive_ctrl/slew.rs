//! Rate of change limiter

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Limits how fast a demand may change between cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlewLimiter {
    prev: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SlewLimiter {
    /// Move towards `target` by at most `max_rate * dt_s`, returning the limited value.
    pub fn calculate(&mut self, target: f64, max_rate: f64, dt_s: f64) -> f64 {
        let max_step = (max_rate * dt_s).abs();
        let step = target - self.prev;

        if step.abs() <= max_step {
            self.prev = target;
        } else {
            self.prev += max_step.copysign(step);
        }

        self.prev
    }

    /// Jump straight to `value`, for example when stopping.
    pub fn reset(&mut self, value: f64) {
        self.prev = value;
    }

    pub fn value(&self) -> f64 {
        self.prev
    }
}
