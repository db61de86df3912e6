//! Tabletop - cards and placement areas on a 3D table.
//!
//! Cards animate toward the targets their area's layout assigns them; the
//! engine updates every registered object once per frame and turns pointer
//! releases into `Click` events on the nearest object.

pub mod area;
pub mod assets;
pub mod camera;
pub mod card;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod events;
pub mod input;
pub mod layout;
pub mod math;
pub mod object;
pub mod scene;

pub use crate::area::{Area, AreaProps};
pub use crate::assets::TextureCache;
pub use crate::camera::{CameraControls, PerspectiveCamera};
pub use crate::card::{Card, CardProps, Visibility, WeakCard};
pub use crate::config::{CameraConfig, ControlsConfig, EngineConfig};
pub use crate::deck::Deck;
pub use crate::engine::{App, CardEngine, Engine, Hit};
pub use crate::error::{EngineError, Result};
pub use crate::events::{EventEmitter, EventKind, GameEvent, Subscription};
pub use crate::layout::PlacementStrategy;
pub use crate::math::{Transform3D, Vec2, Vec3};
pub use crate::object::{GameObject, Geometry, ObjectId, VisualDesc};
pub use crate::scene::{Scene, SceneGraph, SceneHit, TextureHandle, VisualId};

/// `createArea` from the application's point of view.
pub fn create_area(props: AreaProps) -> Area {
    Area::new(props)
}

/// `createCard` from the application's point of view.
pub fn create_card(props: CardProps) -> Card {
    Card::new(props)
}
