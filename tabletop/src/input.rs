use glam::Vec2;

/// Convert window pixels to normalized device coordinates (+Y up).
pub fn pixels_to_ndc(x: f32, y: f32, width: f32, height: f32) -> Vec2 {
    Vec2::new((x / width) * 2.0 - 1.0, -(y / height) * 2.0 + 1.0)
}

/// Last known pointer position plus drag tracking for panning.
///
/// Written by pointer notifications and read by the frame loop; last writer wins.
#[derive(Clone, Debug)]
pub struct PointerState {
    viewport: Vec2,
    ndc: Vec2,
    panning: bool,
}

impl PointerState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Vec2::new(width.max(1) as f32, height.max(1) as f32),
            ndc: Vec2::ZERO,
            panning: false,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    /// Record a pointer move in window pixels.
    ///
    /// Returns the NDC delta while a pan drag is active.
    pub fn handle_moved(&mut self, x: f32, y: f32) -> Option<Vec2> {
        let ndc = pixels_to_ndc(x, y, self.viewport.x, self.viewport.y);
        let delta = ndc - self.ndc;
        self.ndc = ndc;
        self.panning.then_some(delta)
    }

    pub fn begin_pan(&mut self) {
        self.panning = true;
    }

    pub fn end_pan(&mut self) {
        self.panning = false;
    }

    pub fn is_panning(&self) -> bool {
        self.panning
    }

    /// Current pointer position in normalized device coordinates.
    pub fn ndc(&self) -> Vec2 {
        self.ndc
    }
}
