//! Easing curves shared by the icon choreography and the preloader intro.

use std::f32::consts::PI;

/// Cubic ease-in-out: slow at both ends, fastest through the middle.
pub fn ease_in_out_cubic(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

pub fn ease_in_out_quad(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

pub fn ease_in_out_sine(t: f32) -> f32 {
    -((PI * t).cos() - 1.0) / 2.0
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Linear progress of `value` through `[start, end]`, clamped to `[0, 1]`.
///
/// A degenerate range collapses to a step at `start`.
pub fn progress_between(value: f32, start: f32, end: f32) -> f32 {
    let range = end - start;
    if range <= 0.0 {
        return if value >= start { 1.0 } else { 0.0 };
    }
    ((value - start) / range).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cubic_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.5) - 0.5).abs() < 1e-6);
        // symmetric around the midpoint
        let a = ease_in_out_cubic(0.2);
        let b = ease_in_out_cubic(0.8);
        assert!((a + b - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cubic_is_monotonic() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = ease_in_out_cubic(i as f32 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_quad_and_sine_endpoints() {
        assert_eq!(ease_in_out_quad(0.0), 0.0);
        assert!((ease_in_out_quad(1.0) - 1.0).abs() < 1e-6);
        assert!(ease_in_out_sine(0.0).abs() < 1e-6);
        assert!((ease_in_out_sine(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_progress_between() {
        assert_eq!(progress_between(0.1, 0.2, 0.4), 0.0);
        assert!((progress_between(0.3, 0.2, 0.4) - 0.5).abs() < 1e-6);
        assert_eq!(progress_between(0.9, 0.2, 0.4), 1.0);
        assert_eq!(progress_between(0.2, 0.2, 0.2), 1.0);
        assert_eq!(progress_between(0.1, 0.2, 0.2), 0.0);
    }
}
