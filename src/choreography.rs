//! Scroll-driven placement of the decorative background icons.
//!
//! Every icon moves between two points while the page scroll progress passes
//! through its trigger window. Position and opacity are pure functions of the
//! icon spec, the scroll progress and the icon's elapsed time; the only state
//! kept per icon is that clock, the accumulated rotation and the loaded model.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::assets::ModelInstance;
use crate::easing::{ease_in_out_cubic, lerp, progress_between};
use crate::scene::DrawItem;

const BOB_FREQUENCY: f32 = 0.5;
const BOB_DAMPING: f32 = 0.5;
const FADE_SPAN: f32 = 0.1;
/// Embedded clips run at a fifth of real time.
const CLIP_SPEED: f32 = 0.2;
const YAW_SPEED: f32 = 0.04;
const TILT_AMOUNT: f32 = 0.15;
const TILT_RANGE: f32 = 20.0;
const DEFAULT_SCALE: f32 = 2.5;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IconSpecError {
    #[error("asset reference is empty")]
    MissingAsset,
    #[error("trigger window [{start}, {end}] is empty or reversed")]
    EmptyWindow { start: f32, end: f32 },
    #[error("trigger window [{start}, {end}] is outside [0, 1]")]
    WindowOutOfRange { start: f32, end: f32 },
    #[error("scale must be a positive number, got {0}")]
    InvalidScale(f32),
}

/// Unvalidated icon description as it appears in `config/scene.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawIconSpec {
    pub url: String,
    pub start_position: [f32; 3],
    pub end_position: [f32; 3],
    pub trigger_start: f32,
    pub trigger_end: f32,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub float_amount: f32,
}

fn default_scale() -> f32 {
    DEFAULT_SCALE
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawIconSpec")]
pub struct IconSpec {
    asset_ref: String,
    start_position: Vec3,
    end_position: Vec3,
    trigger_start: f32,
    trigger_end: f32,
    is_static: bool,
    scale: f32,
    float_amount: f32,
}

impl TryFrom<RawIconSpec> for IconSpec {
    type Error = IconSpecError;

    fn try_from(raw: RawIconSpec) -> Result<Self, Self::Error> {
        if raw.url.trim().is_empty() {
            return Err(IconSpecError::MissingAsset);
        }
        let (start, end) = (raw.trigger_start, raw.trigger_end);
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(IconSpecError::EmptyWindow { start, end });
        }
        if start < 0.0 || end > 1.0 {
            return Err(IconSpecError::WindowOutOfRange { start, end });
        }
        if !raw.scale.is_finite() || raw.scale <= 0.0 {
            return Err(IconSpecError::InvalidScale(raw.scale));
        }
        let float_amount = if raw.float_amount.is_finite() {
            raw.float_amount.max(0.0)
        } else {
            0.0
        };
        Ok(Self {
            asset_ref: raw.url,
            start_position: Vec3::from_array(raw.start_position),
            end_position: Vec3::from_array(raw.end_position),
            trigger_start: start,
            trigger_end: end,
            is_static: raw.is_static,
            scale: raw.scale,
            float_amount,
        })
    }
}

/// Placement of one icon for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconPose {
    pub position: Vec3,
    pub opacity: f32,
}

impl IconSpec {
    pub fn asset_ref(&self) -> &str {
        &self.asset_ref
    }

    pub fn start_position(&self) -> Vec3 {
        self.start_position
    }

    pub fn end_position(&self) -> Vec3 {
        self.end_position
    }

    pub fn trigger_window(&self) -> (f32, f32) {
        (self.trigger_start, self.trigger_end)
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn float_amount(&self) -> f32 {
        self.float_amount
    }

    /// Doubly eased travel through the trigger window, in `[0, 1]`.
    pub fn travel(&self, scroll: f32) -> f32 {
        let scroll = sanitize_progress(scroll);
        let linear = progress_between(scroll, self.trigger_start, self.trigger_end);
        ease_in_out_cubic(ease_in_out_cubic(linear))
    }

    pub fn position(&self, scroll: f32, elapsed: f32) -> Vec3 {
        let scroll = sanitize_progress(scroll);
        let bob = (elapsed * BOB_FREQUENCY).sin() * self.float_amount;

        if self.is_static && scroll < self.trigger_start {
            return self.start_position + Vec3::Y * bob;
        }

        let travel = self.travel(scroll);
        let mut position = self.start_position.lerp(self.end_position, travel);
        position.y += bob * (1.0 - travel * BOB_DAMPING);
        position
    }

    pub fn opacity(&self, scroll: f32) -> f32 {
        if self.is_static {
            return 1.0;
        }
        let scroll = sanitize_progress(scroll);
        if scroll < self.trigger_start || scroll > self.trigger_end {
            return 0.0;
        }
        let fade_in = progress_between(scroll, self.trigger_start, self.trigger_start + FADE_SPAN);
        let fade_out = 1.0 - progress_between(scroll, self.trigger_end - FADE_SPAN, self.trigger_end);
        fade_in.min(fade_out)
    }

    pub fn pose(&self, scroll: f32, elapsed: f32) -> IconPose {
        IconPose {
            position: self.position(scroll, elapsed),
            opacity: self.opacity(scroll),
        }
    }
}

fn sanitize_progress(scroll: f32) -> f32 {
    if scroll.is_finite() {
        scroll.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Normalised page scroll progress.
///
/// The document height is the largest of the supplied measurements. Pages
/// that cannot scroll report `0.0`.
pub fn scroll_progress(scroll_y: f64, viewport_height: f64, document_heights: &[f64]) -> f32 {
    let document_height = document_heights
        .iter()
        .copied()
        .filter(|h| h.is_finite())
        .fold(0.0_f64, f64::max);
    let max_scroll = document_height - viewport_height;
    if !max_scroll.is_finite() || max_scroll <= 0.0 || !scroll_y.is_finite() {
        return 0.0;
    }
    (scroll_y / max_scroll).clamp(0.0, 1.0) as f32
}

/// Everything needed to draw one icon for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconFrame {
    pub position: Vec3,
    pub opacity: f32,
    pub yaw: f32,
    pub roll: f32,
    pub scale: f32,
}

impl IconFrame {
    pub fn transform(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, 0.0, self.yaw, self.roll),
            self.position,
        )
    }
}

pub struct IconRuntime {
    spec: IconSpec,
    elapsed: f32,
    yaw: f32,
    roll: f32,
    model: Option<ModelInstance>,
}

impl IconRuntime {
    pub fn new(spec: IconSpec) -> Self {
        Self {
            spec,
            elapsed: 0.0,
            yaw: 0.0,
            roll: 0.0,
            model: None,
        }
    }

    pub fn spec(&self) -> &IconSpec {
        &self.spec
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn model(&self) -> Option<&ModelInstance> {
        self.model.as_ref()
    }

    /// Binds a freshly cloned model; any previous instance is released first.
    pub fn attach(&mut self, instance: ModelInstance) {
        self.release();
        self.model = Some(instance);
    }

    /// Stops clip playback and drops the cloned model.
    pub fn release(&mut self) {
        if let Some(mut model) = self.model.take() {
            model.stop();
        }
    }

    pub fn advance(&mut self, scroll: f32, delta: f32) -> IconFrame {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };
        self.elapsed += delta;
        if let Some(model) = &mut self.model {
            model.advance(delta * CLIP_SPEED);
        }

        let pose = self.spec.pose(scroll, self.elapsed);
        if !self.spec.is_static {
            self.yaw += delta * YAW_SPEED;
            let target = (pose.position.x / TILT_RANGE) * TILT_AMOUNT;
            self.roll = lerp(self.roll, target, delta.min(1.0));
        }
        if let Some(model) = &mut self.model {
            model.set_opacity(pose.opacity);
        }

        IconFrame {
            position: pose.position,
            opacity: pose.opacity,
            yaw: self.yaw,
            roll: self.roll,
            scale: self.spec.scale,
        }
    }
}

impl Drop for IconRuntime {
    fn drop(&mut self) {
        self.release();
    }
}

/// The set of background icons animated together from one scroll value.
pub struct Choreographer {
    icons: Vec<IconRuntime>,
}

impl Choreographer {
    pub fn new(specs: &[IconSpec]) -> Self {
        Self {
            icons: specs.iter().cloned().map(IconRuntime::new).collect(),
        }
    }

    pub fn icons(&self) -> &[IconRuntime] {
        &self.icons
    }

    pub fn attach(&mut self, index: usize, instance: ModelInstance) -> bool {
        match self.icons.get_mut(index) {
            Some(icon) => {
                icon.attach(instance);
                true
            }
            None => false,
        }
    }

    /// Advances every icon by `delta` seconds at the given scroll progress.
    ///
    /// Icons whose model has not loaded still advance their clocks so they
    /// join in phase once the model arrives.
    pub fn frame(&mut self, scroll: f32, delta: f32) -> Vec<IconFrame> {
        self.icons
            .iter_mut()
            .map(|icon| icon.advance(scroll, delta))
            .collect()
    }

    /// Primitives of every loaded icon, placed by the matching frame.
    pub fn draw_list(&self, frames: &[IconFrame]) -> Vec<DrawItem> {
        self.icons
            .iter()
            .zip(frames)
            .filter_map(|(icon, frame)| {
                icon.model()
                    .map(|model| model.draw_list(frame.transform()))
            })
            .flatten()
            .collect()
    }

    pub fn release_all(&mut self) {
        for icon in &mut self.icons {
            icon.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn raw(is_static: bool, start: f32, end: f32) -> RawIconSpec {
        RawIconSpec {
            url: "/icons/cube.glb".to_string(),
            start_position: [-8.0, 5.0, 2.0],
            end_position: [-35.0, -15.0, 2.0],
            trigger_start: start,
            trigger_end: end,
            is_static,
            scale: 2.0,
            float_amount: 0.3,
        }
    }

    fn spec(is_static: bool, start: f32, end: f32) -> IconSpec {
        IconSpec::try_from(raw(is_static, start, end)).expect("valid spec")
    }

    fn close(a: Vec3, b: Vec3, tol: f32) -> bool {
        (a - b).abs().max_element() <= tol
    }

    #[test]
    fn test_rejects_bad_windows() {
        assert_eq!(
            IconSpec::try_from(raw(false, 0.5, 0.5)),
            Err(IconSpecError::EmptyWindow { start: 0.5, end: 0.5 })
        );
        assert!(IconSpec::try_from(raw(false, 0.7, 0.2)).is_err());
        assert_eq!(
            IconSpec::try_from(raw(false, -0.1, 0.5)),
            Err(IconSpecError::WindowOutOfRange { start: -0.1, end: 0.5 })
        );
        let mut bad_scale = raw(false, 0.1, 0.5);
        bad_scale.scale = 0.0;
        assert_eq!(IconSpec::try_from(bad_scale), Err(IconSpecError::InvalidScale(0.0)));
        let mut no_url = raw(false, 0.1, 0.5);
        no_url.url = "  ".to_string();
        assert_eq!(IconSpec::try_from(no_url), Err(IconSpecError::MissingAsset));
    }

    #[test]
    fn test_negative_float_amount_is_clamped() {
        let mut r = raw(true, 0.1, 0.5);
        r.float_amount = -2.0;
        let s = IconSpec::try_from(r).unwrap();
        assert_eq!(s.float_amount(), 0.0);
        assert_eq!(s.position(0.0, 3.0), s.start_position());
    }

    #[test]
    fn test_static_scenario_positions() {
        let icon = spec(true, 0.15, 0.7);
        for elapsed in [0.0, 1.3, 7.9] {
            let at_top = icon.position(0.0, elapsed);
            assert!(close(at_top, Vec3::new(-8.0, 5.0, 2.0), 0.3 + EPS));
            assert_eq!(at_top.x, -8.0);
            assert_eq!(at_top.z, 2.0);

            let at_start = icon.position(0.15, elapsed);
            assert!(close(at_start, Vec3::new(-8.0, 5.0, 2.0), 0.3 + EPS));

            let at_end = icon.position(0.7, elapsed);
            assert!(close(at_end, Vec3::new(-35.0, -15.0, 2.0), 0.15 + EPS));

            assert_eq!(icon.position(1.0, elapsed), at_end);
        }
    }

    #[test]
    fn test_static_holds_start_before_window() {
        let icon = spec(true, 0.4, 0.9);
        let elapsed = 2.0_f32;
        let expected = icon.start_position() + Vec3::Y * (elapsed * 0.5).sin() * 0.3;
        for s in [0.0, 0.1, 0.25, 0.39] {
            assert_eq!(icon.position(s, elapsed), expected);
        }
    }

    #[test]
    fn test_endpoints_for_moving_icon() {
        let icon = spec(false, 0.2, 0.9);
        assert!(close(icon.position(0.2, 0.0), icon.start_position(), EPS));
        assert!(close(icon.position(0.9, 0.0), icon.end_position(), EPS));
    }

    #[test]
    fn test_no_overshoot() {
        let icon = spec(false, 0.2, 0.9);
        let (lo, hi) = (
            icon.start_position().min(icon.end_position()),
            icon.start_position().max(icon.end_position()),
        );
        for i in 0..=200 {
            let s = i as f32 / 200.0;
            // elapsed 0 removes the bob
            let p = icon.position(s, 0.0);
            assert!(p.cmpge(lo - Vec3::splat(EPS)).all(), "s={s} p={p}");
            assert!(p.cmple(hi + Vec3::splat(EPS)).all(), "s={s} p={p}");
        }
    }

    #[test]
    fn test_travel_is_flat_at_extremes() {
        let icon = spec(false, 0.0, 1.0);
        let single = ease_in_out_cubic(0.1);
        assert!(icon.travel(0.1) < single);
        assert!((icon.travel(0.5) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_opacity_boundaries() {
        let icon = spec(false, 0.2, 0.9);
        assert_eq!(icon.opacity(0.1), 0.0);
        assert!(icon.opacity(0.2).abs() < EPS);
        assert!((icon.opacity(0.3) - 1.0).abs() < EPS);
        assert!((icon.opacity(0.8) - 1.0).abs() < EPS);
        assert!(icon.opacity(0.9).abs() < EPS);
        assert_eq!(icon.opacity(0.95), 0.0);
        assert!((icon.opacity(0.25) - 0.5).abs() < EPS);
    }

    #[test]
    fn test_opacity_is_continuous() {
        let icon = spec(false, 0.2, 0.9);
        let step = 0.0005;
        let mut prev = icon.opacity(0.0);
        let mut s = step;
        while s <= 1.0 {
            let o = icon.opacity(s);
            assert!((o - prev).abs() <= step / FADE_SPAN + EPS, "jump at s={s}");
            prev = o;
            s += step;
        }
    }

    #[test]
    fn test_narrow_window_opacity_stays_continuous() {
        let icon = spec(false, 0.4, 0.5);
        assert!(icon.opacity(0.45) <= 0.5 + EPS);
        assert!(icon.opacity(0.4).abs() < EPS);
        assert!(icon.opacity(0.5).abs() < EPS);
    }

    #[test]
    fn test_static_is_always_opaque() {
        let icon = spec(true, 0.15, 0.7);
        for i in 0..=20 {
            assert_eq!(icon.opacity(i as f32 / 20.0), 1.0);
        }
    }

    #[test]
    fn test_pose_is_idempotent() {
        let icon = spec(false, 0.2, 0.9);
        for s in [0.0, 0.33, 0.5, 0.87, 1.0] {
            assert_eq!(icon.pose(s, 4.2), icon.pose(s, 4.2));
        }
    }

    #[test]
    fn test_out_of_range_scroll_is_clamped() {
        let icon = spec(false, 0.2, 0.9);
        assert_eq!(icon.position(-3.0, 1.0), icon.position(0.0, 1.0));
        assert_eq!(icon.position(7.0, 1.0), icon.position(1.0, 1.0));
        assert_eq!(icon.position(f32::NAN, 1.0), icon.position(0.0, 1.0));
    }

    #[test]
    fn test_scroll_progress() {
        assert_eq!(scroll_progress(0.0, 800.0, &[2800.0, 1000.0]), 0.0);
        assert!((scroll_progress(1000.0, 800.0, &[2800.0, 1000.0]) - 0.5).abs() < EPS);
        assert_eq!(scroll_progress(5000.0, 800.0, &[2800.0]), 1.0);
        // page shorter than the viewport
        assert_eq!(scroll_progress(10.0, 800.0, &[600.0, 800.0]), 0.0);
        assert_eq!(scroll_progress(10.0, 800.0, &[]), 0.0);
        assert_eq!(scroll_progress(f64::NAN, 800.0, &[2000.0]), 0.0);
    }

    #[test]
    fn test_runtime_rotation_only_for_moving_icons() {
        let mut moving = IconRuntime::new(spec(false, 0.2, 0.9));
        let mut fixed = IconRuntime::new(spec(true, 0.2, 0.9));
        let mut frame_moving = moving.advance(0.5, 0.016);
        let mut frame_fixed = fixed.advance(0.5, 0.016);
        for _ in 0..100 {
            frame_moving = moving.advance(0.5, 0.016);
            frame_fixed = fixed.advance(0.5, 0.016);
        }
        assert!((moving.elapsed() - 101.0 * 0.016).abs() < 1e-3);
        assert!((frame_moving.yaw - 101.0 * 0.016 * YAW_SPEED).abs() < 1e-4);
        assert!(frame_moving.roll < 0.0, "tilts toward negative x");
        assert_eq!(frame_fixed.yaw, 0.0);
        assert_eq!(frame_fixed.roll, 0.0);
        assert_eq!(frame_fixed.scale, 2.0);
    }

    #[test]
    fn test_runtime_matches_pure_pose() {
        let mut runtime = IconRuntime::new(spec(true, 0.15, 0.7));
        let frame = runtime.advance(0.4, 0.5);
        let pose = runtime.spec().pose(0.4, 0.5);
        assert_eq!(frame.position, pose.position);
        assert_eq!(frame.opacity, pose.opacity);
    }

    #[test]
    fn test_choreographer_frames_every_icon() {
        let specs = vec![spec(true, 0.15, 0.7), spec(false, 0.2, 0.9)];
        let mut choreographer = Choreographer::new(&specs);
        let frames = choreographer.frame(0.0, 0.016);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].opacity, 1.0);
        assert_eq!(frames[1].opacity, 0.0);
        assert!(choreographer.icons().iter().all(|icon| icon.model().is_none()));
    }

    #[test]
    fn test_loaded_icons_are_drawn_faded() {
        let asset = crate::assets::ModelAsset::from_slice(
            "/icons/triangle.gltf",
            include_bytes!("fixtures/triangle.gltf"),
        )
        .expect("fixture imports");
        let specs = vec![spec(true, 0.15, 0.7), spec(false, 0.2, 0.9)];
        let mut choreographer = Choreographer::new(&specs);
        assert!(choreographer.attach(1, asset.instantiate()));
        assert!(!choreographer.attach(5, asset.instantiate()));

        let frames = choreographer.frame(0.25, 0.016);
        let items = choreographer.draw_list(&frames);
        assert_eq!(items.len(), 1);
        assert!((items[0].material.opacity - frames[1].opacity).abs() < EPS);
        assert!(items[0].material.transparent);

        let origin = items[0].world.transform_point3(Vec3::ZERO);
        let expected = frames[1].transform().transform_point3(Vec3::new(0.0, 0.0, 1.0));
        assert!(close(origin, expected, 5e-2));

        choreographer.release_all();
        assert!(choreographer.draw_list(&frames).is_empty());
    }
}
