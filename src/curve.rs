//! Scalar curves sampled over normalized time.
//!
//! Every animated quantity in a show (size over life, alpha over life,
//! formation easing, steering strength) is a [`Curve`]: a pure function from
//! `[0, 1]` to `f32`, stored as a table of keyframes and sampled with linear
//! interpolation.
//!
//! # Example
//!
//! ```ignore
//! let fade = Curve::linear(1.0, 0.0);
//! assert_eq!(fade.sample(0.25), 0.75);
//!
//! let pop = Curve::new()
//!     .key(0.0, 0.0)
//!     .key(0.1, 1.0)
//!     .key(1.0, 0.0);
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A piecewise-linear curve over `[0, 1]`.
///
/// Inputs outside `[0, 1]` are clamped. Sampling before the first key or
/// after the last returns that key's value. An empty curve samples to `1.0`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Curve {
    /// Keyframes as `(time, value)`, sorted by time.
    keys: Vec<(f32, f32)>,
}

impl Curve {
    /// Create an empty curve. Add keys with [`Curve::key`].
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// A curve that always returns `value`.
    pub fn constant(value: f32) -> Self {
        Self {
            keys: vec![(0.0, value), (1.0, value)],
        }
    }

    /// A straight line from `start` at t=0 to `end` at t=1.
    pub fn linear(start: f32, end: f32) -> Self {
        Self {
            keys: vec![(0.0, start), (1.0, end)],
        }
    }

    /// Quadratic ease-out from 0 to 1, tabulated.
    ///
    /// Fast start, gentle arrival. Used for formation convergence.
    pub fn ease_out() -> Self {
        let keys = (0..=8)
            .map(|i| {
                let t = i as f32 / 8.0;
                (t, 1.0 - (1.0 - t) * (1.0 - t))
            })
            .collect();
        Self { keys }
    }

    /// Quadratic ease-in from 0 to 1, tabulated.
    pub fn ease_in() -> Self {
        let keys = (0..=8)
            .map(|i| {
                let t = i as f32 / 8.0;
                (t, t * t)
            })
            .collect();
        Self { keys }
    }

    /// Holds at 1.0 then drops to 0.0 over the last `tail` fraction of the range.
    pub fn hold_then_fade(tail: f32) -> Self {
        let tail = tail.clamp(0.0, 1.0);
        Self {
            keys: vec![(0.0, 1.0), (1.0 - tail, 1.0), (1.0, 0.0)],
        }
    }

    /// Add a keyframe, keeping keys sorted by time.
    pub fn key(mut self, time: f32, value: f32) -> Self {
        let time = time.clamp(0.0, 1.0);
        let at = self.keys.partition_point(|(t, _)| *t <= time);
        self.keys.insert(at, (time, value));
        self
    }

    /// The keyframes of this curve.
    pub fn keys(&self) -> &[(f32, f32)] {
        &self.keys
    }

    /// Sample the curve at `t`.
    pub fn sample(&self, t: f32) -> f32 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 1.0,
        };

        // NaN progress counts as fully decayed
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };

        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        for pair in self.keys.windows(2) {
            let (t0, v0) = pair[0];
            let (t1, v1) = pair[1];
            if t <= t1 {
                let span = t1 - t0;
                if span <= f32::EPSILON {
                    return v1;
                }
                return v0 + (v1 - v0) * ((t - t0) / span);
            }
        }

        last.1
    }

    /// Value at t=0.
    pub fn start_value(&self) -> f32 {
        self.sample(0.0)
    }

    /// Value at t=1.
    pub fn end_value(&self) -> f32 {
        self.sample(1.0)
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::constant(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_samples() {
        let c = Curve::linear(1.0, 0.0);
        assert_eq!(c.sample(0.0), 1.0);
        assert_eq!(c.sample(1.0), 0.0);
        assert!((c.sample(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_outside_range() {
        let c = Curve::linear(2.0, 4.0);
        assert_eq!(c.sample(-3.0), 2.0);
        assert_eq!(c.sample(7.0), 4.0);
        assert_eq!(c.sample(f32::NAN), 4.0);
    }

    #[test]
    fn test_keys_stay_sorted() {
        let c = Curve::new().key(1.0, 0.0).key(0.0, 0.0).key(0.5, 1.0);
        let times: Vec<f32> = c.keys().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(c.sample(0.5), 1.0);
        assert!((c.sample(0.75) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_empty_curve_is_one() {
        assert_eq!(Curve::new().sample(0.3), 1.0);
    }

    #[test]
    fn test_ease_out_endpoints() {
        let c = Curve::ease_out();
        assert_eq!(c.start_value(), 0.0);
        assert_eq!(c.end_value(), 1.0);
        // Ahead of linear at the midpoint
        assert!(c.sample(0.5) > 0.5);
    }

    #[test]
    fn test_hold_then_fade() {
        let c = Curve::hold_then_fade(0.25);
        assert_eq!(c.sample(0.5), 1.0);
        assert_eq!(c.sample(0.75), 1.0);
        assert_eq!(c.sample(1.0), 0.0);
    }
}
