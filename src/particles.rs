//! Star field drawn behind the preloader.

use glam::{EulerRot, Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub const PARTICLE_COUNT: usize = 2000;
const EXTENT: f32 = 2000.0;
const SPIN_X: f32 = 0.0005;
const SPIN_Y: f32 = 0.001;
const PULSE_AMOUNT: f32 = 0.1;

/// Converts HSL with all components in `[0, 1]` to RGB.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [f32; 3] {
    let hue = hue.rem_euclid(1.0);
    let saturation = saturation.clamp(0.0, 1.0);
    let lightness = lightness.clamp(0.0, 1.0);
    if saturation == 0.0 {
        return [lightness; 3];
    }

    let q = if lightness <= 0.5 {
        lightness * (1.0 + saturation)
    } else {
        lightness + saturation - lightness * saturation
    };
    let p = 2.0 * lightness - q;
    let channel = |t: f32| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * 6.0 * (2.0 / 3.0 - t)
        } else {
            p
        }
    };
    [channel(hue + 1.0 / 3.0), channel(hue), channel(hue - 1.0 / 3.0)]
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    /// Flat xyz triples.
    pub positions: Vec<f32>,
    /// Flat rgb triples.
    pub colors: Vec<f32>,
    pub sizes: Vec<f32>,
    rotation: Vec3,
    scale: Vec3,
}

impl ParticleField {
    pub fn generate(count: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut positions = Vec::with_capacity(count * 3);
        let mut colors = Vec::with_capacity(count * 3);
        let mut sizes = Vec::with_capacity(count);

        for _ in 0..count {
            for _ in 0..3 {
                positions.push((rng.gen::<f32>() - 0.5) * EXTENT);
            }
            let hue = 0.45 + rng.gen::<f32>() * 0.1;
            let lightness = 0.5 + rng.gen::<f32>() * 0.3;
            colors.extend_from_slice(&hsl_to_rgb(hue, 0.8, lightness));
            sizes.push(2.0 + rng.gen::<f32>() * 3.0);
        }

        Self {
            positions,
            colors,
            sizes,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Called once per rendered frame with the wall clock in milliseconds.
    pub fn tick(&mut self, now_ms: f64) {
        self.rotation.x += SPIN_X;
        self.rotation.y += SPIN_Y;

        let time = (now_ms * 0.0005) as f32;
        self.scale = Vec3::new(
            1.0 + (time * 2.0).sin() * PULSE_AMOUNT,
            1.0 + (time * 3.0).cos() * PULSE_AMOUNT,
            1.0,
        );
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
            * Mat4::from_scale(self.scale)
    }
}
