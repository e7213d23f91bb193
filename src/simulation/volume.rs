use glam::{Quat, Vec3};

use crate::config::VOLUME_SCALE;

/// Placement of the normalized field cube in world space.
///
/// Field space [0,1]^3 maps to a cube centered on `position`, spanning
/// `scale` world units per half extent, rotated about Y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeTransform {
    pub position: Vec3,
    pub rotation_y: f32,
    pub scale: f32,
}

impl Default for VolumeTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_y: 0.0,
            scale: VOLUME_SCALE,
        }
    }
}

impl VolumeTransform {
    pub fn field_to_world(&self, field: Vec3) -> Vec3 {
        let local = (field * 2.0 - Vec3::ONE) * self.scale;
        self.position + Quat::from_rotation_y(self.rotation_y) * local
    }

    pub fn world_to_field(&self, world: Vec3) -> Vec3 {
        let local = Quat::from_rotation_y(-self.rotation_y) * (world - self.position) / self.scale;
        (local + Vec3::ONE) * 0.5
    }

    /// First-order smoothing toward a target, then clamp position into `limits`
    pub fn ease_toward(&mut self, target_position: Vec3, target_rotation_y: f32, damping: f32, limits: Vec3) {
        self.position += (target_position - self.position) * damping;
        self.position = self.position.clamp(-limits, limits);
        self.rotation_y += (target_rotation_y - self.rotation_y) * damping;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_field_center_at_position() {
        let transform = VolumeTransform {
            position: Vec3::new(0.2, -0.1, 0.3),
            rotation_y: 0.7,
            scale: VOLUME_SCALE,
        };
        let world = transform.field_to_world(Vec3::splat(0.5));
        assert_abs_diff_eq!(world.distance(transform.position), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_world_field_inverse() {
        let transform = VolumeTransform {
            position: Vec3::new(0.3, 0.1, -0.2),
            rotation_y: 0.4,
            scale: VOLUME_SCALE,
        };
        let field = Vec3::new(0.3, 0.6, 0.45);
        let back = transform.world_to_field(transform.field_to_world(field));
        assert_abs_diff_eq!(back.distance(field), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ease_clamps_runaway_target() {
        let mut transform = VolumeTransform::default();
        let limits = Vec3::new(0.4, 0.3, 0.3);
        for _ in 0..200 {
            transform.ease_toward(Vec3::splat(1000.0), 0.0, 0.1, limits);
            assert!(transform.position.x <= limits.x);
            assert!(transform.position.y <= limits.y);
            assert!(transform.position.z <= limits.z);
        }
        assert_abs_diff_eq!(transform.position.x, limits.x, epsilon = 1e-6);
    }

    #[test]
    fn test_ease_converges() {
        let mut transform = VolumeTransform::default();
        for _ in 0..300 {
            transform.ease_toward(Vec3::new(0.1, 0.05, -0.1), 0.15, 0.1, Vec3::splat(1.0));
        }
        assert_abs_diff_eq!(transform.position.x, 0.1, epsilon = 1e-4);
        assert_abs_diff_eq!(transform.rotation_y, 0.15, epsilon = 1e-4);
    }
}
