use serde::{Deserialize, Serialize};

pub use glam::{Mat4, Vec2, Vec3};

/// Position and Euler rotation (radians, X then Y then Z) of a scene participant.
///
/// Cards use `rotation.y` for the flip and `rotation.z` for the in-plane spin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub position: Vec3,
    pub rotation: Vec3,
}

impl Transform3D {
    pub fn new(position: Vec3, rotation: Vec3) -> Self {
        Self { position, rotation }
    }

    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
        }
    }

    /// Model matrix: translation * Rx * Ry * Rz.
    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(self.position);
        let rotation = Mat4::from_rotation_x(self.rotation.x)
            * Mat4::from_rotation_y(self.rotation.y)
            * Mat4::from_rotation_z(self.rotation.z);

        translation * rotation
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

/// Half-line used for pointer picking.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance along the ray to the nearest point of an oriented box.
    ///
    /// The box is centred on the origin of `model`'s local frame with the given half
    /// extents. Zero extents are allowed and describe a flat plane. Returns `None` when
    /// the ray misses or the box lies entirely behind the origin.
    pub fn intersect_box(&self, model: &Mat4, half_extents: Vec3) -> Option<f32> {
        let inverse = model.inverse();
        let local_origin = inverse.transform_point3(self.origin);
        let local_dir = inverse.transform_vector3(self.direction);

        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = local_origin[axis];
            let d = local_dir[axis];
            let h = half_extents[axis];

            if d.abs() < f32::EPSILON {
                if o < -h || o > h {
                    return None;
                }
                continue;
            }

            let mut t1 = (-h - o) / d;
            let mut t2 = (h - o) / d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }

        if t_max < 0.0 {
            return None;
        }
        let t = if t_min >= 0.0 { t_min } else { t_max };

        // Local t is measured in local units; map back to world distance.
        let world_hit = model.transform_point3(local_origin + local_dir * t);
        Some(world_hit.distance(self.origin))
    }
}

/// Move `current` by `factor` of the remaining distance to `target`.
pub fn approach(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_hits_box_front_face() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let model = Transform3D::from_position(Vec3::ZERO).to_matrix();

        let distance = ray.intersect_box(&model, Vec3::new(0.5, 0.5, 0.5)).unwrap();
        assert!((distance - 4.5).abs() < 1e-5);
    }

    #[test]
    fn test_ray_hits_flat_plane() {
        let ray = Ray::new(Vec3::new(0.2, 0.1, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let model = Transform3D::from_position(Vec3::new(0.0, 0.0, 1.0)).to_matrix();

        let distance = ray.intersect_box(&model, Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert!((distance - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_ray_misses_outside_bounds() {
        let ray = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let model = Mat4::IDENTITY;

        assert!(ray.intersect_box(&model, Vec3::new(1.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_ray_ignores_box_behind_origin() {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(ray
            .intersect_box(&Mat4::IDENTITY, Vec3::new(1.0, 1.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_rotated_box_uses_local_frame() {
        // A 2x0.2 bar spun a quarter turn becomes a 0.2x2 bar.
        let model = Transform3D::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
        )
        .to_matrix();
        let half = Vec3::new(1.0, 0.1, 0.0);

        let above = Ray::new(Vec3::new(0.0, 0.8, 5.0), Vec3::new(0.0, 0.0, -1.0));
        let beside = Ray::new(Vec3::new(0.8, 0.0, 5.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(above.intersect_box(&model, half).is_some());
        assert!(beside.intersect_box(&model, half).is_none());
    }

    #[test]
    fn test_approach_moves_ten_percent() {
        assert!((approach(0.0, 10.0, 0.1) - 1.0).abs() < 1e-6);
        assert!((approach(5.0, 5.0, 0.1) - 5.0).abs() < 1e-6);
    }
}
