use std::collections::HashMap;

use anyhow::Result;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::EventLoop,
    keyboard::{Key, NamedKey},
    window::Window,
};

use crate::assets::TextureCache;
use crate::camera::{CameraControls, PerspectiveCamera};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::events::GameEvent;
use crate::input::PointerState;
use crate::object::{GameObject, ObjectId};
use crate::scene::{Scene, SceneGraph, VisualId};

/// An object under the pointer, as of the last frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub object: ObjectId,
    pub distance: f32,
}

struct Registered {
    object: Box<dyn GameObject>,
    visual: VisualId,
}

/// Object registry, frame loop and pointer picking.
///
/// Everything runs on one thread: pointer notifications write the pointer
/// state, the frame loop writes the hit list, and `pointer_up` reads it.
pub struct CardEngine<S: Scene = SceneGraph> {
    scene: S,
    camera: PerspectiveCamera,
    controls: CameraControls,
    pointer: PointerState,
    textures: TextureCache,
    objects: HashMap<ObjectId, Registered>,
    visual_owners: HashMap<VisualId, ObjectId>,
    hits: Vec<Hit>,
    frame_count: u64,
}

impl CardEngine<SceneGraph> {
    /// Engine backed by the in-memory scene.
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_scene(config, SceneGraph::new())
    }
}

impl<S: Scene> CardEngine<S> {
    pub fn with_scene(config: &EngineConfig, scene: S) -> Self {
        let aspect = config.width.max(1) as f32 / config.height.max(1) as f32;
        Self {
            scene,
            camera: PerspectiveCamera::new(&config.camera, aspect),
            controls: CameraControls::new(config.controls.clone()),
            pointer: PointerState::new(config.width, config.height),
            textures: TextureCache::new(),
            objects: HashMap::new(),
            visual_owners: HashMap::new(),
            hits: Vec::new(),
            frame_count: 0,
        }
    }

    /// Register an object: build its visual and start updating it every frame.
    pub fn add<O: GameObject + 'static>(&mut self, object: O) -> crate::Result<ObjectId> {
        let id = object.id();
        if self.objects.contains_key(&id) {
            return Err(EngineError::AlreadyRegistered(id));
        }

        let desc = object.visual();
        let textures = desc
            .textures
            .iter()
            .map(|key| self.textures.get_or_load(&mut self.scene, key))
            .collect::<crate::Result<Vec<_>>>()?;

        let visual = self.scene.create_visual(&desc.geometry, &textures);
        self.scene.set_transform(visual, object.transform());
        self.visual_owners.insert(visual, id);
        self.objects.insert(
            id,
            Registered {
                object: Box::new(object),
                visual,
            },
        );

        log::debug!("registered object {id} as visual {visual:?}");
        Ok(id)
    }

    /// Deregister an object and drop its visual. Returns false if it was unknown.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(registered) = self.objects.remove(&id) else {
            return false;
        };
        self.visual_owners.remove(&registered.visual);
        self.scene.remove_visual(registered.visual);
        self.hits.retain(|hit| hit.object != id);
        log::debug!("deregistered object {id}");
        true
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn GameObject> {
        self.objects.get(&id).map(|r| r.object.as_ref())
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Run one animation tick: controls, object updates, picking, render.
    pub fn frame(&mut self) {
        self.controls.update(&mut self.camera);

        for registered in self.objects.values() {
            registered.object.update();
            self.scene
                .set_transform(registered.visual, registered.object.transform());
        }

        self.refresh_hits();
        self.scene.render(&self.camera);
        self.frame_count += 1;
    }

    fn refresh_hits(&mut self) {
        let ray = self.camera.ray_from_ndc(self.pointer.ndc());
        let visual_owners = &self.visual_owners;
        self.hits = self
            .scene
            .intersect(&ray)
            .into_iter()
            .filter_map(|hit| {
                visual_owners.get(&hit.visual).map(|&object| Hit {
                    object,
                    distance: hit.distance,
                })
            })
            .collect();
    }

    /// Pointer moved to window pixel `(x, y)`.
    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        if let Some(delta) = self.pointer.handle_moved(x, y) {
            let offset = self.camera.ndc_delta_to_world(delta);
            self.controls.pan(-offset);
        }
    }

    /// Pointer released: send `Click` to the nearest object from the last frame.
    pub fn pointer_up(&mut self) -> Option<ObjectId> {
        let nearest = self.hits.first()?.object;
        let registered = self.objects.get(&nearest)?;
        log::debug!("click on object {nearest}");
        registered.object.dispatch(&GameEvent::Click);
        Some(nearest)
    }

    /// Send `KeyDown` to every registered object.
    pub fn key_down(&mut self, key: &str) {
        let event = GameEvent::key_down(key);
        for registered in self.objects.values() {
            registered.object.dispatch(&event);
        }
    }

    pub fn begin_pan(&mut self) {
        self.pointer.begin_pan();
    }

    pub fn end_pan(&mut self) {
        self.pointer.end_pan();
    }

    /// Mouse wheel; positive values zoom in.
    pub fn zoom(&mut self, amount: f32) {
        self.controls.zoom(amount);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.pointer.resize(width, height);
    }

    /// Objects under the pointer as of the last frame, nearest first.
    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Visual handle backing a registered object.
    pub fn visual_of(&self, id: ObjectId) -> Option<VisualId> {
        self.objects.get(&id).map(|r| r.visual)
    }
}

/// Trait implemented by application code to hook into the window loop.
pub trait App {
    /// Called once after the window is created but before the first frame.
    fn init(&mut self, engine: &mut CardEngine) -> Result<()>;

    /// Called after every engine frame.
    fn update(&mut self, _engine: &mut CardEngine) -> Result<()> {
        Ok(())
    }
}

/// Main entrypoint for running a card table in a window.
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine instance with default configuration.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Override the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Override the initial window size in logical pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    #[must_use]
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    /// Run `app` until the window is closed or Escape is pressed.
    #[allow(deprecated)]
    pub fn run<A: App + 'static>(self, mut app: A) -> Result<()> {
        let config = self.config;
        config.validate()?;

        let event_loop = EventLoop::new()?;
        let mut window_attributes = Window::default_attributes();
        window_attributes.title = config.title.clone();
        window_attributes.inner_size = Some(LogicalSize::new(config.width, config.height).into());
        let window = event_loop.create_window(window_attributes)?;
        log::info!(
            "opened `{}` at {}x{} (vsync: {})",
            config.title,
            config.width,
            config.height,
            config.vsync
        );

        let mut engine = CardEngine::new(&config);
        let size = window.inner_size();
        engine.resize(size.width, size.height);
        app.init(&mut engine)?;
        log::info!("{} objects on the table", engine.len());

        event_loop.run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(size) => engine.resize(size.width, size.height),
                WindowEvent::CursorMoved { position, .. } => {
                    engine.pointer_moved(position.x as f32, position.y as f32)
                }
                WindowEvent::MouseInput { state, button, .. } => match (button, state) {
                    (MouseButton::Left, ElementState::Released) => {
                        engine.pointer_up();
                    }
                    (MouseButton::Right, ElementState::Pressed) => engine.begin_pan(),
                    (MouseButton::Right, ElementState::Released) => engine.end_pan(),
                    _ => {}
                },
                WindowEvent::MouseWheel { delta, .. } => {
                    let amount = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(p) => p.y as f32 / 100.0,
                    };
                    engine.zoom(amount);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if is_escape_pressed(&event) {
                        elwt.exit();
                    } else if let Some(key) = key_name(&event) {
                        engine.key_down(&key);
                    }
                }
                WindowEvent::RedrawRequested => {
                    engine.frame();
                    if let Err(err) = app.update(&mut engine) {
                        log::error!("Encountered error during update: {err:?}");
                        elwt.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => window.request_redraw(),
            _ => {}
        })?;

        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

fn is_escape_pressed(event: &KeyEvent) -> bool {
    event.state == ElementState::Pressed && event.logical_key == Key::Named(NamedKey::Escape)
}

/// Name reported in `KeyDown` events: the typed character, or the key's name.
fn key_name(event: &KeyEvent) -> Option<String> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    match &event.logical_key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}
