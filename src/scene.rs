//! In-memory scene graphs and the keyframe clips that animate them.

use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub transform: Transform,
    pub mesh: Option<usize>,
}

/// Vertex data of one triangle list. Never mutated after import, so every
/// instance of a model shares it.
#[derive(Debug, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub geometry: Arc<Geometry>,
    pub material: usize,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: Option<String>,
    pub base_color: [f32; 4],
    pub opacity: f32,
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            opacity: 1.0,
            transparent: false,
        }
    }
}

/// A node hierarchy with its meshes and materials.
///
/// `Clone` copies nodes and materials so an instance can be posed and faded
/// on its own; geometry stays shared.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub nodes: Vec<Node>,
    pub roots: Vec<usize>,
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
}

/// One primitive ready to be drawn.
#[derive(Debug, Clone)]
pub struct DrawItem {
    pub world: Mat4,
    pub geometry: Arc<Geometry>,
    pub material: Material,
}

impl DrawItem {
    /// Opacity the item is drawn with.
    pub fn opacity(&self) -> f32 {
        if self.material.transparent {
            self.material.opacity
        } else {
            1.0
        }
    }

    pub fn is_blended(&self) -> bool {
        self.opacity() < 1.0
    }
}

/// Opaque items first, then blended ones from the farthest to the nearest to `eye`.
pub fn sort_for_blending(items: &mut [DrawItem], eye: Vec3) {
    let distance = |item: &DrawItem| item.world.w_axis.truncate().distance_squared(eye);
    items.sort_by(|a, b| {
        a.is_blended()
            .cmp(&b.is_blended())
            .then_with(|| distance(b).total_cmp(&distance(a)))
    });
}

impl SceneGraph {
    pub fn node_by_name(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|n| n.name.as_deref() == Some(name))
    }

    /// World matrix of every node, indexed like `nodes`.
    pub fn world_transforms(&self) -> Vec<Mat4> {
        let mut world = vec![Mat4::IDENTITY; self.nodes.len()];
        let mut stack: Vec<(usize, Mat4)> = self
            .roots
            .iter()
            .rev()
            .map(|&root| (root, Mat4::IDENTITY))
            .collect();
        let mut visited = vec![false; self.nodes.len()];
        while let Some((index, parent)) = stack.pop() {
            let Some(node) = self.nodes.get(index) else {
                continue;
            };
            // malformed files may link a node under itself
            if std::mem::replace(&mut visited[index], true) {
                continue;
            }
            let matrix = parent * node.transform.matrix();
            world[index] = matrix;
            stack.extend(node.children.iter().rev().map(|&child| (child, matrix)));
        }
        world
    }

    /// Writes `opacity` onto every material and marks them alpha blended.
    pub fn set_opacity(&mut self, opacity: f32) {
        let opacity = opacity.clamp(0.0, 1.0);
        for material in &mut self.materials {
            material.opacity = opacity;
            material.transparent = true;
        }
    }

    pub fn draw_list(&self, root: Mat4) -> Vec<DrawItem> {
        let world = self.world_transforms();
        let fallback = Material::default();
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, node)| node.mesh.and_then(|m| self.meshes.get(m)).map(|m| (i, m)))
            .flat_map(|(i, mesh)| {
                let world = root * world[i];
                mesh.primitives.iter().map(move |p| (world, p))
            })
            .map(|(world, primitive)| DrawItem {
                world,
                geometry: Arc::clone(&primitive.geometry),
                material: self
                    .materials
                    .get(primitive.material)
                    .unwrap_or(&fallback)
                    .clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Values are stored as (in-tangent, value, out-tangent) triples.
    CubicSpline,
}

#[derive(Debug, Clone)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

#[derive(Debug, Clone)]
pub struct Channel {
    pub node: usize,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

/// Keyframe data that can be blended between two keys.
trait Keyed: Copy {
    fn mix(a: Self, b: Self, t: f32) -> Self;
    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, s: f32, dt: f32) -> Self;
}

impl Keyed for Vec3 {
    fn mix(a: Self, b: Self, t: f32) -> Self {
        a.lerp(b, t)
    }

    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, s: f32, dt: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(s);
        v0 * h00 + out0 * (h10 * dt) + v1 * h01 + in1 * (h11 * dt)
    }
}

impl Keyed for Quat {
    fn mix(a: Self, b: Self, t: f32) -> Self {
        a.slerp(b, t)
    }

    fn hermite(v0: Self, out0: Self, v1: Self, in1: Self, s: f32, dt: f32) -> Self {
        let (h00, h10, h01, h11) = hermite_basis(s);
        let q = v0 * h00 + out0 * (h10 * dt) + v1 * h01 + in1 * (h11 * dt);
        q.normalize()
    }
}

fn hermite_basis(s: f32) -> (f32, f32, f32, f32) {
    let s2 = s * s;
    let s3 = s2 * s;
    (
        2.0 * s3 - 3.0 * s2 + 1.0,
        s3 - 2.0 * s2 + s,
        -2.0 * s3 + 3.0 * s2,
        s3 - s2,
    )
}

fn sample<T: Keyed>(times: &[f32], values: &[T], interpolation: Interpolation, time: f32) -> Option<T> {
    let stride = if interpolation == Interpolation::CubicSpline { 3 } else { 1 };
    let value_at = |key: usize| values.get(key * stride + stride / 2).copied();
    let last = times.len().checked_sub(1)?;

    if time <= times[0] {
        return value_at(0);
    }
    if time >= times[last] {
        return value_at(last);
    }

    let next = times.partition_point(|&t| t <= time);
    let prev = next - 1;
    let dt = times[next] - times[prev];
    let s = if dt > 0.0 { (time - times[prev]) / dt } else { 0.0 };

    match interpolation {
        Interpolation::Step => value_at(prev),
        Interpolation::Linear => Some(T::mix(value_at(prev)?, value_at(next)?, s)),
        Interpolation::CubicSpline => {
            let out0 = values.get(prev * 3 + 2).copied()?;
            let in1 = values.get(next * 3).copied()?;
            Some(T::hermite(value_at(prev)?, out0, value_at(next)?, in1, s, dt))
        }
    }
}

impl Channel {
    fn apply(&self, graph: &mut SceneGraph, time: f32) {
        let Some(node) = graph.nodes.get_mut(self.node) else {
            return;
        };
        let times = &self.times;
        match &self.values {
            ChannelValues::Translation(v) => {
                if let Some(t) = sample(times, v, self.interpolation, time) {
                    node.transform.translation = t;
                }
            }
            ChannelValues::Rotation(v) => {
                if let Some(r) = sample(times, v, self.interpolation, time) {
                    node.transform.rotation = r.normalize();
                }
            }
            ChannelValues::Scale(v) => {
                if let Some(s) = sample(times, v, self.interpolation, time) {
                    node.transform.scale = s;
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels
            .iter()
            .filter_map(|c| c.times.last().copied())
            .fold(0.0_f32, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }
}

#[derive(Debug, Clone)]
struct ClipAction {
    clip: Arc<AnimationClip>,
    time: f32,
}

/// Drives every clip of a model, looping, on one scene graph instance.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    actions: Vec<ClipAction>,
    playing: bool,
}

impl ClipPlayer {
    pub fn new(clips: &[Arc<AnimationClip>]) -> Self {
        Self {
            actions: clips
                .iter()
                .map(|clip| ClipAction {
                    clip: Arc::clone(clip),
                    time: 0.0,
                })
                .collect(),
            playing: !clips.is_empty(),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn clip_count(&self) -> usize {
        self.actions.len()
    }

    /// Current local time of each clip, in clip order.
    pub fn times(&self) -> Vec<f32> {
        self.actions.iter().map(|a| a.time).collect()
    }

    pub fn update(&mut self, graph: &mut SceneGraph, delta: f32) {
        if !self.playing {
            return;
        }
        for action in &mut self.actions {
            let duration = action.clip.duration;
            action.time = if duration > 0.0 {
                (action.time + delta).rem_euclid(duration)
            } else {
                0.0
            };
            for channel in &action.clip.channels {
                channel.apply(graph, action.time);
            }
        }
    }

    pub fn stop_all(&mut self) {
        self.playing = false;
        for action in &mut self.actions {
            action.time = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn two_node_graph() -> SceneGraph {
        let geometry = Arc::new(Geometry {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 3],
            indices: vec![0, 1, 2],
        });
        SceneGraph {
            nodes: vec![
                Node {
                    name: Some("root".to_string()),
                    parent: None,
                    children: vec![1],
                    transform: Transform {
                        translation: Vec3::new(1.0, 0.0, 0.0),
                        ..Default::default()
                    },
                    mesh: None,
                },
                Node {
                    name: Some("child".to_string()),
                    parent: Some(0),
                    children: vec![],
                    transform: Transform {
                        translation: Vec3::new(0.0, 2.0, 0.0),
                        ..Default::default()
                    },
                    mesh: Some(0),
                },
            ],
            roots: vec![0],
            meshes: vec![Mesh {
                name: None,
                primitives: vec![Primitive { geometry, material: 0 }],
            }],
            materials: vec![Material::default()],
        }
    }

    fn translation_clip(node: usize, interpolation: Interpolation) -> Arc<AnimationClip> {
        Arc::new(AnimationClip::new(
            "move",
            vec![Channel {
                node,
                interpolation,
                times: vec![0.0, 1.0, 2.0],
                values: ChannelValues::Translation(vec![
                    Vec3::ZERO,
                    Vec3::new(10.0, 0.0, 0.0),
                    Vec3::new(10.0, 10.0, 0.0),
                ]),
            }],
        ))
    }

    #[test]
    fn test_world_transforms_compose_parents() {
        let graph = two_node_graph();
        let world = graph.world_transforms();
        let child_origin = world[1].transform_point3(Vec3::ZERO);
        assert_eq!(child_origin, Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_world_transforms_stop_at_child_cycles() {
        let mut graph = two_node_graph();
        graph.nodes[1].children = vec![0];
        let world = graph.world_transforms();
        assert_eq!(world.len(), 2);
        let child_origin = world[1].transform_point3(Vec3::ZERO);
        assert_eq!(child_origin, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(graph.draw_list(Mat4::IDENTITY).len(), 1);
    }

    #[test]
    fn test_blended_items_sort_far_to_near_after_opaque() {
        let graph = two_node_graph();
        let item_at = |z: f32, opacity: f32| {
            let root = Mat4::from_translation(Vec3::new(0.0, 0.0, z));
            let mut item = graph.draw_list(root)[0].clone();
            item.material.transparent = true;
            item.material.opacity = opacity;
            item
        };
        let mut items = vec![item_at(5.0, 0.5), item_at(-10.0, 1.0), item_at(-20.0, 0.3)];

        sort_for_blending(&mut items, Vec3::new(0.0, 0.0, 25.0));

        let order: Vec<(f32, bool)> = items
            .iter()
            .map(|item| (item.world.w_axis.z, item.is_blended()))
            .collect();
        assert_eq!(order, [(-10.0, false), (-20.0, true), (5.0, true)]);
    }

    #[test]
    fn test_draw_list_applies_root() {
        let graph = two_node_graph();
        let items = graph.draw_list(Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0)));
        assert_eq!(items.len(), 1);
        let origin = items[0].world.transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_set_opacity_marks_transparent() {
        let mut graph = two_node_graph();
        graph.set_opacity(0.25);
        assert!(graph.materials.iter().all(|m| m.opacity == 0.25 && m.transparent));
        graph.set_opacity(4.0);
        assert_eq!(graph.materials[0].opacity, 1.0);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = two_node_graph();
        let mut copy = original.clone();
        copy.set_opacity(0.0);
        copy.nodes[1].transform.translation = Vec3::splat(9.0);
        assert_eq!(original.materials[0].opacity, 1.0);
        assert_eq!(original.nodes[1].transform.translation, Vec3::new(0.0, 2.0, 0.0));
        assert!(Arc::ptr_eq(
            &original.meshes[0].primitives[0].geometry,
            &copy.meshes[0].primitives[0].geometry
        ));
    }

    #[test]
    fn test_clip_duration_from_channels() {
        let clip = translation_clip(1, Interpolation::Linear);
        assert_eq!(clip.duration, 2.0);
    }

    #[test]
    fn test_linear_sampling() {
        let mut graph = two_node_graph();
        let mut player = ClipPlayer::new(&[translation_clip(1, Interpolation::Linear)]);
        player.update(&mut graph, 0.5);
        assert_eq!(graph.nodes[1].transform.translation, Vec3::new(5.0, 0.0, 0.0));
        player.update(&mut graph, 1.0);
        assert_eq!(graph.nodes[1].transform.translation, Vec3::new(10.0, 5.0, 0.0));
    }

    #[test]
    fn test_step_sampling() {
        let mut graph = two_node_graph();
        let mut player = ClipPlayer::new(&[translation_clip(1, Interpolation::Step)]);
        player.update(&mut graph, 0.9);
        assert_eq!(graph.nodes[1].transform.translation, Vec3::ZERO);
        player.update(&mut graph, 0.2);
        assert_eq!(graph.nodes[1].transform.translation, Vec3::new(10.0, 0.0, 0.0));
    }

    #[test]
    fn test_player_loops() {
        let mut graph = two_node_graph();
        let mut player = ClipPlayer::new(&[translation_clip(1, Interpolation::Linear)]);
        player.update(&mut graph, 2.5);
        assert!((player.times()[0] - 0.5).abs() < 1e-5);
        let t = graph.nodes[1].transform.translation;
        assert!((t - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_cubic_spline_passes_through_keys() {
        let times = vec![0.0, 1.0];
        // (in, value, out) per key with zero tangents
        let values = vec![
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::ZERO,
            Vec3::splat(4.0),
            Vec3::ZERO,
        ];
        assert_eq!(sample(&times, &values, Interpolation::CubicSpline, 0.0), Some(Vec3::ZERO));
        assert_eq!(sample(&times, &values, Interpolation::CubicSpline, 1.0), Some(Vec3::splat(4.0)));
        let mid = sample(&times, &values, Interpolation::CubicSpline, 0.5).unwrap();
        assert!((mid - Vec3::splat(2.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_slerp() {
        let mut graph = two_node_graph();
        let clip = Arc::new(AnimationClip::new(
            "spin",
            vec![Channel {
                node: 0,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 1.0],
                values: ChannelValues::Rotation(vec![
                    Quat::IDENTITY,
                    Quat::from_rotation_y(FRAC_PI_2),
                ]),
            }],
        ));
        let mut player = ClipPlayer::new(&[clip]);
        player.update(&mut graph, 0.5);
        let rotation = graph.nodes[0].transform.rotation;
        assert!(rotation.is_normalized());
        assert!((rotation.angle_between(Quat::IDENTITY) - FRAC_PI_2 / 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_stop_freezes_pose() {
        let mut graph = two_node_graph();
        let mut player = ClipPlayer::new(&[translation_clip(1, Interpolation::Linear)]);
        player.update(&mut graph, 0.5);
        player.stop_all();
        let frozen = graph.nodes[1].transform.translation;
        player.update(&mut graph, 0.7);
        assert!(!player.is_playing());
        assert_eq!(graph.nodes[1].transform.translation, frozen);
    }

    #[test]
    fn test_out_of_range_channel_is_ignored() {
        let mut graph = two_node_graph();
        let mut player = ClipPlayer::new(&[translation_clip(42, Interpolation::Linear)]);
        player.update(&mut graph, 0.5);
        assert_eq!(graph.nodes[1].transform.translation, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_player_without_clips_is_idle() {
        let player = ClipPlayer::new(&[]);
        assert!(!player.is_playing());
        assert_eq!(player.clip_count(), 0);
    }
}
