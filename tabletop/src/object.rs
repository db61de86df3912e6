//! The capability shared by everything that lives on the table.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::events::{EventEmitter, EventKind, GameEvent, Subscription};
use crate::math::Transform3D;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a game object, assigned at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u64);

impl ObjectId {
    pub(crate) fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the underlying integer ID (useful for debugging or serialization).
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape of a visual representation, in local units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Box { width: f32, height: f32, depth: f32 },
    Plane { width: f32, height: f32 },
}

impl Geometry {
    /// Half extents of the local bounding box; planes have zero depth.
    pub fn half_extents(&self) -> glam::Vec3 {
        match *self {
            Geometry::Box {
                width,
                height,
                depth,
            } => glam::Vec3::new(width, height, depth) * 0.5,
            Geometry::Plane { width, height } => glam::Vec3::new(width * 0.5, height * 0.5, 0.0),
        }
    }
}

/// What the scene needs to build a visual: geometry plus texture keys.
///
/// Boxes take six textures (+x, -x, +y, -y, +z, -z); planes take one.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualDesc {
    pub geometry: Geometry,
    pub textures: Vec<String>,
}

/// Anything that can be registered with the engine.
///
/// Objects are shared handles: every method takes `&self` and mutation happens
/// through interior state owned by the implementer.
pub trait GameObject {
    fn id(&self) -> ObjectId;

    /// Description used to build the object's visual representation.
    fn visual(&self) -> VisualDesc;

    /// Current animated transform, pushed to the scene after every `update`.
    fn transform(&self) -> Transform3D;

    fn events(&self) -> &EventEmitter;

    /// Advance animation by one frame.
    fn update(&self);

    fn on(&self, kind: EventKind, handler: Box<dyn FnMut(&GameEvent)>) -> Subscription {
        self.events().on(kind, handler)
    }

    fn dispatch(&self, event: &GameEvent) {
        self.events().dispatch(event);
    }
}
