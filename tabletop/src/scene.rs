//! Boundary to the rendering collaborator.
//!
//! The engine talks to whatever draws the table only through [`Scene`].
//! [`SceneGraph`] keeps visuals in memory and answers ray queries, which is
//! all the engine needs to run headless.

use std::collections::{BTreeMap, HashMap};

use crate::camera::PerspectiveCamera;
use crate::error::{EngineError, Result};
use crate::math::{Ray, Transform3D};
use crate::object::Geometry;

/// Opaque handle used to reference textures owned by the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) u32);

/// Opaque handle to a visual representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualId(pub(crate) u32);

/// One ray intersection, as reported by [`Scene::intersect`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneHit {
    pub visual: VisualId,
    pub distance: f32,
}

pub trait Scene {
    fn load_texture(&mut self, key: &str) -> Result<TextureHandle>;

    fn create_visual(&mut self, geometry: &Geometry, textures: &[TextureHandle]) -> VisualId;

    fn remove_visual(&mut self, visual: VisualId) -> bool;

    fn set_transform(&mut self, visual: VisualId, transform: Transform3D);

    fn transform(&self, visual: VisualId) -> Option<Transform3D>;

    /// Every visual the ray passes through, nearest first.
    fn intersect(&self, ray: &Ray) -> Vec<SceneHit>;

    fn render(&mut self, camera: &PerspectiveCamera);
}

#[derive(Clone, Debug)]
struct Visual {
    geometry: Geometry,
    textures: Vec<TextureHandle>,
    transform: Transform3D,
}

/// In-memory scene with real picking and no pixels.
#[derive(Debug, Default)]
pub struct SceneGraph {
    next_texture: u32,
    textures: HashMap<TextureHandle, String>,
    next_visual: u32,
    visuals: BTreeMap<VisualId, Visual>,
    frames_rendered: u64,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual_count(&self) -> usize {
        self.visuals.len()
    }

    /// Number of distinct textures loaded so far.
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn texture_key(&self, handle: TextureHandle) -> Option<&str> {
        self.textures.get(&handle).map(String::as_str)
    }

    pub fn visual_textures(&self, visual: VisualId) -> Option<&[TextureHandle]> {
        self.visuals.get(&visual).map(|v| v.textures.as_slice())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Scene for SceneGraph {
    fn load_texture(&mut self, key: &str) -> Result<TextureHandle> {
        if key.trim().is_empty() {
            return Err(EngineError::TextureLoad {
                key: key.to_string(),
                reason: "empty texture key".into(),
            });
        }
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.textures.insert(handle, key.to_string());
        Ok(handle)
    }

    fn create_visual(&mut self, geometry: &Geometry, textures: &[TextureHandle]) -> VisualId {
        let id = VisualId(self.next_visual);
        self.next_visual += 1;
        self.visuals.insert(
            id,
            Visual {
                geometry: *geometry,
                textures: textures.to_vec(),
                transform: Transform3D::identity(),
            },
        );
        id
    }

    fn remove_visual(&mut self, visual: VisualId) -> bool {
        self.visuals.remove(&visual).is_some()
    }

    fn set_transform(&mut self, visual: VisualId, transform: Transform3D) {
        if let Some(v) = self.visuals.get_mut(&visual) {
            v.transform = transform;
        }
    }

    fn transform(&self, visual: VisualId) -> Option<Transform3D> {
        self.visuals.get(&visual).map(|v| v.transform)
    }

    fn intersect(&self, ray: &Ray) -> Vec<SceneHit> {
        let mut hits: Vec<SceneHit> = self
            .visuals
            .iter()
            .filter_map(|(&id, visual)| {
                let model = visual.transform.to_matrix();
                ray.intersect_box(&model, visual.geometry.half_extents())
                    .map(|distance| SceneHit {
                        visual: id,
                        distance,
                    })
            })
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn render(&mut self, _camera: &PerspectiveCamera) {
        self.frames_rendered += 1;
        log::trace!(
            "frame {} with {} visuals",
            self.frames_rendered,
            self.visuals.len()
        );
    }
}
