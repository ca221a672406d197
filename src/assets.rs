//! Loading and sharing of the animated GLB icon models.
//!
//! Each URL is fetched and imported once into [`GLOBAL_MODEL_CACHE`]. Icons
//! never animate the cached asset directly: they take a [`ModelInstance`],
//! which owns its own copy of the node graph and a clip player bound to it.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use glam::{Mat4, Quat, Vec3};
use gltf::animation::util::ReadOutputs;
use gltf::mesh::Mode;
use thiserror::Error;

use crate::scene::{
    AnimationClip, Channel, ChannelValues, ClipPlayer, DrawItem, Geometry, Interpolation,
    Material, Mesh, Node, Primitive, SceneGraph, Transform,
};

pub static GLOBAL_MODEL_CACHE: LazyLock<ModelCache> = LazyLock::new(ModelCache::new);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("couldn't fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("couldn't import {url}: {reason}")]
    Import { url: String, reason: String },
    #[error("{0} contains no scene")]
    EmptyScene(String),
}

/// Where model bytes come from. The browser implementation uses `fetch`.
#[allow(async_fn_in_trait)]
pub trait AssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError>;
}

#[derive(Debug)]
pub struct ModelAsset {
    pub url: String,
    pub scene: SceneGraph,
    pub clips: Vec<Arc<AnimationClip>>,
}

impl ModelAsset {
    /// Imports a binary (`.glb`) or JSON glTF document with embedded buffers.
    pub fn from_slice(url: &str, bytes: &[u8]) -> Result<Self, AssetError> {
        let (document, buffers, _) = gltf::import_slice(bytes).map_err(|e| AssetError::Import {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::EmptyScene(url.to_string()))?;

        let mut materials: Vec<Material> = document
            .materials()
            .map(|material| Material {
                name: material.name().map(str::to_string),
                base_color: material.pbr_metallic_roughness().base_color_factor(),
                opacity: 1.0,
                transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
            })
            .collect();
        let default_material = materials.len();
        materials.push(Material::default());

        let meshes = document
            .meshes()
            .map(|mesh| Mesh {
                name: mesh.name().map(str::to_string),
                primitives: mesh
                    .primitives()
                    .filter(|p| p.mode() == Mode::Triangles)
                    .filter_map(|primitive| {
                        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
                        let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
                        if positions.is_empty() {
                            return None;
                        }
                        let indices: Vec<u32> = reader
                            .read_indices()
                            .map(|i| i.into_u32().collect())
                            .unwrap_or_else(|| (0..positions.len() as u32).collect());
                        let normals: Vec<[f32; 3]> = reader
                            .read_normals()
                            .map(|n| n.collect())
                            .unwrap_or_else(|| vertex_normals(&positions, &indices));
                        Some(Primitive {
                            geometry: Arc::new(Geometry {
                                positions,
                                normals,
                                indices,
                            }),
                            material: primitive.material().index().unwrap_or(default_material),
                        })
                    })
                    .collect(),
            })
            .collect();

        let mut nodes: Vec<Node> = document
            .nodes()
            .map(|node| {
                let (t, r, s) = node.transform().decomposed();
                Node {
                    name: node.name().map(str::to_string),
                    parent: None,
                    children: node.children().map(|c| c.index()).collect(),
                    transform: Transform {
                        translation: Vec3::from_array(t),
                        rotation: Quat::from_array(r).normalize(),
                        scale: Vec3::from_array(s),
                    },
                    mesh: node.mesh().map(|m| m.index()),
                }
            })
            .collect();
        for parent in 0..nodes.len() {
            for child in nodes[parent].children.clone() {
                if let Some(node) = nodes.get_mut(child) {
                    node.parent = Some(parent);
                }
            }
        }

        let clips = document
            .animations()
            .enumerate()
            .map(|(index, animation)| {
                let channels = animation
                    .channels()
                    .filter_map(|channel| {
                        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
                        let times: Vec<f32> = reader.read_inputs()?.collect();
                        let values = match reader.read_outputs()? {
                            ReadOutputs::Translations(v) => {
                                ChannelValues::Translation(v.map(Vec3::from_array).collect())
                            }
                            ReadOutputs::Rotations(v) => {
                                ChannelValues::Rotation(v.into_f32().map(Quat::from_array).collect())
                            }
                            ReadOutputs::Scales(v) => {
                                ChannelValues::Scale(v.map(Vec3::from_array).collect())
                            }
                            ReadOutputs::MorphTargetWeights(_) => return None,
                        };
                        let interpolation = match channel.sampler().interpolation() {
                            gltf::animation::Interpolation::Step => Interpolation::Step,
                            gltf::animation::Interpolation::Linear => Interpolation::Linear,
                            gltf::animation::Interpolation::CubicSpline => {
                                Interpolation::CubicSpline
                            }
                        };
                        Some(Channel {
                            node: channel.target().node().index(),
                            interpolation,
                            times,
                            values,
                        })
                    })
                    .collect();
                let name = animation
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("animation_{index}"));
                Arc::new(AnimationClip::new(name, channels))
            })
            .collect();

        Ok(Self {
            url: url.to_string(),
            scene: SceneGraph {
                nodes,
                roots: scene.nodes().map(|n| n.index()).collect(),
                meshes,
                materials,
            },
            clips,
        })
    }

    /// Deep-copies the scene graph and binds a fresh clip player to it.
    pub fn instantiate(&self) -> ModelInstance {
        ModelInstance {
            url: self.url.clone(),
            graph: self.scene.clone(),
            player: ClipPlayer::new(&self.clips),
        }
    }
}

/// Smooth normals accumulated from the faces around each vertex.
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Z).to_array())
        .collect()
}

/// One icon's private copy of a model.
#[derive(Debug)]
pub struct ModelInstance {
    url: String,
    graph: SceneGraph,
    player: ClipPlayer,
}

impl ModelInstance {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    pub fn player(&self) -> &ClipPlayer {
        &self.player
    }

    pub fn advance(&mut self, delta: f32) {
        self.player.update(&mut self.graph, delta);
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.graph.set_opacity(opacity);
    }

    pub fn stop(&mut self) {
        self.player.stop_all();
    }

    pub fn draw_list(&self, root: Mat4) -> Vec<DrawItem> {
        self.graph.draw_list(root)
    }
}

#[derive(Debug, Clone)]
enum CacheEntry {
    Ready(Arc<ModelAsset>),
    Failed(AssetError),
}

/// Models keyed by URL. A failed URL stays failed until invalidated.
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: DashMap<String, CacheEntry>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<Arc<ModelAsset>> {
        match self.entries.get(url).as_deref() {
            Some(CacheEntry::Ready(asset)) => Some(Arc::clone(asset)),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn invalidate(&self, url: &str) {
        self.entries.remove(url);
    }

    pub async fn load<S: AssetSource>(
        &self,
        url: &str,
        source: &S,
    ) -> Result<Arc<ModelAsset>, AssetError> {
        let cached = self.entries.get(url).map(|entry| entry.clone());
        match cached {
            Some(CacheEntry::Ready(asset)) => return Ok(asset),
            Some(CacheEntry::Failed(err)) => return Err(err),
            None => {}
        }

        let imported = source
            .fetch(url)
            .await
            .and_then(|bytes| ModelAsset::from_slice(url, &bytes));
        let entry = match imported {
            Ok(asset) => CacheEntry::Ready(Arc::new(asset)),
            Err(err) => {
                log::warn!("model {url} unavailable: {err}");
                CacheEntry::Failed(err)
            }
        };
        // another load of the same URL may have finished while this one was
        // fetching; the first stored entry wins
        let stored = self
            .entries
            .entry(url.to_string())
            .or_insert(entry)
            .clone();
        match stored {
            CacheEntry::Ready(asset) => Ok(asset),
            CacheEntry::Failed(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const TRIANGLE: &[u8] = include_bytes!("fixtures/triangle.gltf");
    const TRIANGLE_URL: &str = "/icons/triangle.gltf";

    struct FakeSource {
        fetches: Cell<usize>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self { fetches: Cell::new(0) }
        }
    }

    impl AssetSource for FakeSource {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, AssetError> {
            self.fetches.set(self.fetches.get() + 1);
            match url {
                TRIANGLE_URL => Ok(TRIANGLE.to_vec()),
                "/icons/garbage.glb" => Ok(b"not a model".to_vec()),
                _ => Err(AssetError::Fetch {
                    url: url.to_string(),
                    reason: "404".to_string(),
                }),
            }
        }
    }

    #[test]
    fn test_import_triangle() {
        let asset = ModelAsset::from_slice(TRIANGLE_URL, TRIANGLE).expect("fixture imports");
        assert_eq!(asset.scene.nodes.len(), 2);
        assert_eq!(asset.scene.roots, vec![0]);
        assert_eq!(asset.scene.nodes[1].parent, Some(0));
        assert_eq!(asset.scene.node_by_name("body"), Some(1));

        let geometry = &asset.scene.meshes[0].primitives[0].geometry;
        assert_eq!(geometry.positions.len(), 3);
        assert_eq!(geometry.indices, vec![0, 1, 2]);
        // no normals in the file, so they are derived from the face
        assert_eq!(geometry.normals, vec![[0.0, 0.0, 1.0]; 3]);

        assert_eq!(asset.scene.materials[0].name.as_deref(), Some("glow"));
        assert_eq!(asset.scene.materials[0].base_color, [0.2, 0.9, 0.8, 1.0]);

        assert_eq!(asset.clips.len(), 1);
        assert_eq!(asset.clips[0].name, "bounce");
        assert_eq!(asset.clips[0].duration, 2.0);
    }

    #[test]
    fn test_instances_animate_independently() {
        let asset = ModelAsset::from_slice(TRIANGLE_URL, TRIANGLE).unwrap();
        let mut first = asset.instantiate();
        let second = asset.instantiate();

        first.advance(1.0);
        first.set_opacity(0.3);

        let moved = first.graph().nodes[1].transform.translation;
        assert!((moved - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-5);
        assert_eq!(second.graph().nodes[1].transform.translation, Vec3::ZERO);
        assert_eq!(second.graph().materials[0].opacity, 1.0);
        assert_eq!(asset.scene.nodes[1].transform.translation, Vec3::ZERO);
        assert!(first.player().is_playing());
    }

    #[test]
    fn test_stop_releases_playback() {
        let asset = ModelAsset::from_slice(TRIANGLE_URL, TRIANGLE).unwrap();
        let mut instance = asset.instantiate();
        instance.stop();
        instance.advance(1.0);
        assert!(!instance.player().is_playing());
        assert_eq!(instance.graph().nodes[1].transform.translation, Vec3::ZERO);
    }

    #[test]
    fn test_draw_list_includes_node_offset() {
        let asset = ModelAsset::from_slice(TRIANGLE_URL, TRIANGLE).unwrap();
        let items = asset.instantiate().draw_list(Mat4::IDENTITY);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].world.transform_point3(Vec3::ZERO), Vec3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = ModelAsset::from_slice("/icons/garbage.glb", b"not a model").unwrap_err();
        assert!(matches!(err, AssetError::Import { .. }));
    }

    #[tokio::test]
    async fn test_cache_loads_once() {
        let cache = ModelCache::new();
        let source = FakeSource::new();
        let a = cache.load(TRIANGLE_URL, &source).await.unwrap();
        let b = cache.load(TRIANGLE_URL, &source).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(source.fetches.get(), 1);
        assert!(cache.get(TRIANGLE_URL).is_some());
    }

    #[tokio::test]
    async fn test_cache_isolates_failures() {
        let cache = ModelCache::new();
        let source = FakeSource::new();
        let missing = cache.load("/icons/missing.glb", &source).await;
        assert!(matches!(missing, Err(AssetError::Fetch { .. })));
        let garbage = cache.load("/icons/garbage.glb", &source).await;
        assert!(matches!(garbage, Err(AssetError::Import { .. })));
        assert!(cache.load(TRIANGLE_URL, &source).await.is_ok());

        // failures are remembered
        let fetches = source.fetches.get();
        assert!(cache.load("/icons/missing.glb", &source).await.is_err());
        assert_eq!(source.fetches.get(), fetches);

        cache.invalidate("/icons/missing.glb");
        assert!(cache.load("/icons/missing.glb", &source).await.is_err());
        assert_eq!(source.fetches.get(), fetches + 1);
        assert_eq!(cache.len(), 3);
    }
}
