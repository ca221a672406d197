//! Keyframe timing for the preloader logo.
//!
//! Times are milliseconds since the preloader mounted. The component samples
//! these every frame and writes the results into SVG and CSS attributes.

use crate::easing::{ease_in_out_quad, ease_in_out_sine, lerp, progress_between};

pub const LETTERS: [char; 5] = ['M', 'V', 'I', 'B', 'E'];

const LETTER_STAGGER_MS: f32 = 800.0;
const OUTLINE_MS: f32 = 600.0;
const FILL_DELAY_MS: f32 = 500.0;
const FILL_MS: f32 = 300.0;
const FILL_OPACITY: f32 = 0.7;
const PULSE_MS: f32 = 500.0;
const PULSE_FLOOR: f32 = 0.4;
const LOGO_DELAY_MS: f32 = 2000.0;

/// When the last letter's fill finishes and the outlines start pulsing.
pub fn timeline_duration() -> f32 {
    (LETTERS.len() - 1) as f32 * LETTER_STAGGER_MS + FILL_DELAY_MS + FILL_MS
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterFrame {
    pub outline_opacity: f32,
    /// Undrawn share of the outline stroke, `1` hidden and `0` complete.
    pub dash_offset: f32,
    pub fill_opacity: f32,
}

pub fn letter_frame(index: usize, t: f32) -> LetterFrame {
    let start = index as f32 * LETTER_STAGGER_MS;
    let drawn = ease_in_out_quad(progress_between(t, start, start + OUTLINE_MS));
    let fill_start = start + FILL_DELAY_MS;
    let fill = ease_in_out_quad(progress_between(t, fill_start, fill_start + FILL_MS));

    let done = timeline_duration();
    let outline_opacity = if t >= done {
        outline_pulse(t - done)
    } else {
        drawn
    };
    LetterFrame {
        outline_opacity,
        dash_offset: 1.0 - drawn,
        fill_opacity: fill * FILL_OPACITY,
    }
}

/// Outline opacity alternating between 1 and 0.4, one leg per 500ms.
pub fn outline_pulse(since_ms: f32) -> f32 {
    let legs = since_ms.max(0.0) / PULSE_MS;
    let leg = legs.floor();
    let eased = ease_in_out_sine(legs - leg);
    if (leg as u64) % 2 == 0 {
        lerp(1.0, PULSE_FLOOR, eased)
    } else {
        lerp(PULSE_FLOOR, 1.0, eased)
    }
}

struct Track {
    from: f32,
    delay: f32,
    /// Target value and duration of each leg.
    legs: &'static [(f32, f32)],
    easing: fn(f32) -> f32,
}

impl Track {
    fn sample(&self, t: f32) -> f32 {
        let mut t = t - self.delay;
        if t <= 0.0 {
            return self.from;
        }
        let mut current = self.from;
        for &(target, duration) in self.legs {
            if t < duration {
                return lerp(current, target, (self.easing)(t / duration));
            }
            t -= duration;
            current = target;
        }
        current
    }
}

fn linear(t: f32) -> f32 {
    t
}

const TRANSLATE_X: Track = Track {
    from: -100.0,
    delay: LOGO_DELAY_MS,
    legs: &[
        (50.0, 1000.0),
        (0.0, 800.0),
        (30.0, 600.0),
        (0.0, 500.0),
        (15.0, 400.0),
        (0.0, 300.0),
    ],
    easing: ease_in_out_quad,
};

const SCALE: Track = Track {
    from: 0.5,
    delay: LOGO_DELAY_MS,
    legs: &[
        (1.2, 1000.0),
        (0.8, 800.0),
        (1.1, 600.0),
        (0.9, 500.0),
        (1.05, 400.0),
        (1.0, 300.0),
    ],
    easing: ease_in_out_quad,
};

const OPACITY: Track = Track {
    from: 0.0,
    delay: LOGO_DELAY_MS,
    legs: &[(1.0, 500.0)],
    easing: linear,
};

const ROTATE: Track = Track {
    from: 0.0,
    delay: LOGO_DELAY_MS,
    legs: &[(360.0, 1000.0)],
    easing: ease_in_out_quad,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogoFrame {
    pub translate_x: f32,
    pub scale: f32,
    pub opacity: f32,
    pub rotate: f32,
}

impl LogoFrame {
    pub fn css_transform(&self) -> String {
        format!(
            "translateX({:.2}%) scale({:.3}) rotate({:.1}deg)",
            self.translate_x, self.scale, self.rotate
        )
    }
}

pub fn logo_frame(t: f32) -> LogoFrame {
    LogoFrame {
        translate_x: TRANSLATE_X.sample(t),
        scale: SCALE.sample(t),
        opacity: OPACITY.sample(t),
        rotate: ROTATE.sample(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_timeline_duration() {
        assert_eq!(timeline_duration(), 4000.0);
    }

    #[test]
    fn test_first_letter() {
        let start = letter_frame(0, 0.0);
        assert_eq!(start.outline_opacity, 0.0);
        assert_eq!(start.dash_offset, 1.0);
        assert_eq!(start.fill_opacity, 0.0);

        let mid = letter_frame(0, 300.0);
        assert!(close(mid.outline_opacity, 0.5));
        assert_eq!(mid.fill_opacity, 0.0);

        let drawn = letter_frame(0, 800.0);
        assert_eq!(drawn.dash_offset, 0.0);
        assert!(close(drawn.fill_opacity, 0.7));
    }

    #[test]
    fn test_letters_are_staggered() {
        let early = letter_frame(4, 3199.0);
        assert_eq!(early.outline_opacity, 0.0);
        assert_eq!(early.fill_opacity, 0.0);

        let late = letter_frame(4, 3900.0);
        assert_eq!(late.dash_offset, 0.0);
        assert!(late.fill_opacity > 0.0 && late.fill_opacity < 0.7);
    }

    #[test]
    fn test_outlines_pulse_after_timeline() {
        let done = timeline_duration();
        for index in 0..LETTERS.len() {
            assert!(close(letter_frame(index, done).outline_opacity, 1.0));
            assert!(close(letter_frame(index, done + 250.0).outline_opacity, 0.7));
            assert!(close(letter_frame(index, done + 500.0).outline_opacity, 0.4));
            assert!(close(letter_frame(index, done + 1000.0).outline_opacity, 1.0));
        }
    }

    #[test]
    fn test_logo_keyframes() {
        let hidden = logo_frame(0.0);
        assert_eq!(hidden, LogoFrame { translate_x: -100.0, scale: 0.5, opacity: 0.0, rotate: 0.0 });

        assert!(close(logo_frame(2500.0).opacity, 1.0));

        let spun = logo_frame(3000.0);
        assert!(close(spun.translate_x, 50.0));
        assert!(close(spun.scale, 1.2));
        assert!(close(spun.rotate, 360.0));

        let settled = logo_frame(10_000.0);
        assert!(close(settled.translate_x, 0.0));
        assert!(close(settled.scale, 1.0));
        assert_eq!(settled.css_transform(), "translateX(0.00%) scale(1.000) rotate(360.0deg)");
    }
}
