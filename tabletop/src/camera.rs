//! Perspective camera and the damped pan/zoom controls that drive it.

use glam::{Mat4, Vec2, Vec3};

use crate::config::{CameraConfig, ControlsConfig};
use crate::math::Ray;

/// Pending motion below this is dropped instead of decaying forever.
const SETTLE_EPSILON: f32 = 1e-5;

/// Camera looking from `position` at `target` with +Y up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        Self {
            fov_y: config.fov_degrees.to_radians(),
            aspect,
            near: config.near,
            far: config.far,
            position: config.position,
            target: config.target,
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Picking ray through a point in normalized device coordinates.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(Vec3::new(ndc.x, ndc.y, -1.0));
        let far = inverse.project_point3(Vec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(near, far - near)
    }

    /// Distance from the camera to the point it looks at.
    pub fn distance(&self) -> f32 {
        self.position.distance(self.target)
    }

    /// Camera-space right and up axes in world coordinates.
    fn basis(&self) -> (Vec3, Vec3) {
        let forward = (self.target - self.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        (right, up)
    }

    /// World-space offset of the target plane for a pointer move of `ndc_delta`.
    pub fn ndc_delta_to_world(&self, ndc_delta: Vec2) -> Vec3 {
        let half_height = self.distance() * (self.fov_y / 2.0).tan();
        let half_width = half_height * self.aspect;
        let (right, up) = self.basis();
        right * (ndc_delta.x * half_width) + up * (ndc_delta.y * half_height)
    }
}

/// Orbit-style controls with rotation disabled: pan and dolly only.
///
/// Input accumulates pending motion; every `update` applies the damping
/// fraction of it, so the camera glides to rest over a few frames.
#[derive(Clone, Debug)]
pub struct CameraControls {
    config: ControlsConfig,
    pending_pan: Vec3,
    pending_zoom: f32,
}

impl CameraControls {
    pub fn new(config: ControlsConfig) -> Self {
        Self {
            config,
            pending_pan: Vec3::ZERO,
            pending_zoom: 0.0,
        }
    }

    /// Queue a pan by a world-space offset.
    pub fn pan(&mut self, offset: Vec3) {
        if self.config.enabled {
            self.pending_pan += offset;
        }
    }

    /// Queue a dolly; positive `amount` moves toward the target.
    pub fn zoom(&mut self, amount: f32) {
        if self.config.enabled {
            self.pending_zoom += amount * self.config.zoom_speed;
        }
    }

    pub fn is_settled(&self) -> bool {
        self.pending_pan == Vec3::ZERO && self.pending_zoom == 0.0
    }

    /// Apply one frame of damped motion to `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let damping = self.config.damping;

        let pan = self.pending_pan * damping;
        camera.position += pan;
        camera.target += pan;
        self.pending_pan -= pan;
        if self.pending_pan.length() < SETTLE_EPSILON {
            self.pending_pan = Vec3::ZERO;
        }

        let zoom = self.pending_zoom * damping;
        if zoom != 0.0 {
            let offset = camera.position - camera.target;
            let distance = (offset.length() * (1.0 - zoom))
                .clamp(self.config.min_distance, self.config.max_distance);
            camera.position = camera.target + offset.normalize_or_zero() * distance;
        }
        self.pending_zoom -= zoom;
        if self.pending_zoom.abs() < SETTLE_EPSILON {
            self.pending_zoom = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        PerspectiveCamera::new(&CameraConfig::default(), 16.0 / 9.0)
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let camera = camera();
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        let expected = (camera.target - camera.position).normalize();
        assert!(ray.direction.dot(expected) > 0.9999);
    }

    #[test]
    fn test_ray_reaches_table_plane_in_view() {
        let camera = camera();
        let ray = camera.ray_from_ndc(Vec2::new(0.5, -0.5));
        // Lands right of and below the look-at point on z = 0.
        let t = -ray.origin.z / ray.direction.z;
        let hit = ray.at(t);
        assert!(hit.x > 0.0);
        assert!(hit.y < 0.0);
    }

    #[test]
    fn test_pan_glides_to_rest() {
        let mut camera = camera();
        let mut controls = CameraControls::new(ControlsConfig::default());
        let start = camera.position;

        controls.pan(Vec3::new(1.0, 0.0, 0.0));
        controls.update(&mut camera);
        assert!((camera.position.x - start.x - 0.05).abs() < 1e-5);

        for _ in 0..1000 {
            controls.update(&mut camera);
        }
        assert!(controls.is_settled());
        assert!((camera.position.x - start.x - 1.0).abs() < 1e-3);
        assert!((camera.target.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_zoom_respects_min_distance() {
        let mut camera = camera();
        let mut controls = CameraControls::new(ControlsConfig::default());

        controls.zoom(1000.0);
        for _ in 0..200 {
            controls.update(&mut camera);
        }
        assert!(camera.distance() >= 1.0 - 1e-4);
    }

    #[test]
    fn test_disabled_controls_ignore_input() {
        let mut camera = camera();
        let mut controls = CameraControls::new(ControlsConfig {
            enabled: false,
            ..ControlsConfig::default()
        });
        let before = camera;

        controls.pan(Vec3::ONE);
        controls.zoom(1.0);
        controls.update(&mut camera);
        assert_eq!(camera, before);
    }
}
