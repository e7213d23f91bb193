use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::config::{
    CAMERA_DISTANCE, CAMERA_FOV_DEGREES, MAX_PAN_OFFSET, ORBIT_DAMPING, ORBIT_PAN_SPEED,
    ORBIT_ROTATE_SPEED,
};

/// World-space ray with a normalized direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Intersection with the plane `z = plane_z`, if the ray reaches it
    pub fn intersect_z_plane(&self, plane_z: f32) -> Option<Vec3> {
        if self.direction.z.abs() < 1.0e-6 {
            return None;
        }
        let t = (plane_z - self.origin.z) / self.direction.z;
        if !t.is_finite() || t < 0.0 {
            return None;
        }
        Some(self.origin + self.direction * t)
    }
}

/// Perspective camera looking at the origin. Right-handed; wgpu depth range.
#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, CAMERA_DISTANCE),
            target: Vec3::ZERO,
            fov_y: CAMERA_FOV_DEGREES.to_radians(),
            aspect,
            near: 0.1,
            far: 100.0,
        }
    }

    #[inline]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    #[inline]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect.max(1e-6), self.near, self.far)
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Ray through a cursor position given in physical pixels
    pub fn screen_ray(&self, cursor: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            cursor.x / viewport.x.max(1.0) * 2.0 - 1.0,
            1.0 - cursor.y / viewport.y.max(1.0) * 2.0,
        );
        let inverse = self.view_projection().inverse();
        let near = inverse.project_point3(ndc.extend(0.0));
        let far = inverse.project_point3(ndc.extend(1.0));
        Ray {
            origin: near,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

/// Damped orbit and pan around a target at a fixed distance (no zoom)
#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub azimuth: f32,
    pub polar: f32,
    /// Current look-at point, eased toward `target_pan`
    pub pan: Vec3,
    target_azimuth: f32,
    target_polar: f32,
    target_pan: Vec3,
    min_polar: f32,
    max_polar: f32,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            azimuth: 0.0,
            polar: FRAC_PI_2,
            pan: Vec3::ZERO,
            target_azimuth: 0.0,
            target_polar: FRAC_PI_2,
            target_pan: Vec3::ZERO,
            min_polar: PI * 0.2,
            max_polar: PI * 0.8,
        }
    }
}

impl OrbitControls {
    /// Apply a pointer drag in pixels
    pub fn rotate(&mut self, drag: Vec2) {
        self.target_azimuth -= drag.x * ORBIT_ROTATE_SPEED;
        self.target_polar =
            (self.target_polar - drag.y * ORBIT_ROTATE_SPEED).clamp(self.min_polar, self.max_polar);
    }

    /// Slide the look-at point in the view plane so the scene follows the pointer
    pub fn pan(&mut self, drag: Vec2, camera: &Camera) {
        let forward = (camera.target - camera.position).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let offset = (up * drag.y - right * drag.x) * ORBIT_PAN_SPEED;
        self.target_pan = (self.target_pan + offset).clamp_length_max(MAX_PAN_OFFSET);
    }

    /// Ease toward the target angles and pan, then place the camera
    pub fn update(&mut self, camera: &mut Camera) {
        self.azimuth += (self.target_azimuth - self.azimuth) * ORBIT_DAMPING;
        self.polar += (self.target_polar - self.polar) * ORBIT_DAMPING;
        self.pan += (self.target_pan - self.pan) * ORBIT_DAMPING;
        camera.target = self.pan;

        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_azimuth, cos_azimuth) = self.azimuth.sin_cos();
        camera.position = camera.target
            + Vec3::new(
                sin_polar * sin_azimuth,
                cos_polar,
                sin_polar * cos_azimuth,
            ) * CAMERA_DISTANCE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_center_ray_hits_origin_plane() {
        let camera = Camera::new(1.0);
        let ray = camera.screen_ray(Vec2::new(400.0, 400.0), Vec2::new(800.0, 800.0));
        let hit = ray.intersect_z_plane(0.0).unwrap();
        assert_abs_diff_eq!(hit.x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.y, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(hit.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_screen_right_maps_to_positive_x() {
        let camera = Camera::new(1.0);
        let ray = camera.screen_ray(Vec2::new(700.0, 100.0), Vec2::new(800.0, 800.0));
        let hit = ray.intersect_z_plane(0.0).unwrap();
        assert!(hit.x > 0.0);
        assert!(hit.y > 0.0);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::X,
        };
        assert_eq!(ray.intersect_z_plane(0.0), None);
    }

    #[test]
    fn test_ray_pointing_away_misses() {
        let ray = Ray {
            origin: Vec3::new(0.0, 0.0, 5.0),
            direction: Vec3::Z,
        };
        assert_eq!(ray.intersect_z_plane(0.0), None);
    }

    #[test]
    fn test_orbit_keeps_distance_and_polar_limits() {
        let mut camera = Camera::new(1.0);
        let mut orbit = OrbitControls::default();
        orbit.rotate(Vec2::new(120.0, -10_000.0));
        for _ in 0..500 {
            orbit.update(&mut camera);
        }
        assert_abs_diff_eq!(camera.position.length(), CAMERA_DISTANCE, epsilon = 1e-3);
        assert!(orbit.polar >= PI * 0.2 - 1e-4 && orbit.polar <= PI * 0.8 + 1e-4);
    }

    #[test]
    fn test_pan_follows_pointer_and_keeps_distance() {
        let mut camera = Camera::new(1.0);
        let mut orbit = OrbitControls::default();
        orbit.update(&mut camera);
        // Dragging right and down moves the look-at point left and up
        orbit.pan(Vec2::new(100.0, 50.0), &camera);
        for _ in 0..500 {
            orbit.update(&mut camera);
        }
        assert!(camera.target.x < -1.0);
        assert!(camera.target.y > 0.5);
        assert_abs_diff_eq!(camera.target.z, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.position.distance(camera.target), CAMERA_DISTANCE, epsilon = 1e-3);
    }

    #[test]
    fn test_pan_offset_is_bounded() {
        let mut camera = Camera::new(1.0);
        let mut orbit = OrbitControls::default();
        orbit.update(&mut camera);
        for _ in 0..100 {
            orbit.pan(Vec2::new(-500.0, 0.0), &camera);
        }
        for _ in 0..500 {
            orbit.update(&mut camera);
        }
        assert!(camera.target.length() <= MAX_PAN_OFFSET + 1e-3);
    }
}
