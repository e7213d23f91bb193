use glam::{Vec2, Vec3};
use std::collections::VecDeque;

use crate::camera::Camera;
use crate::config::TrailConfig;

/// Minimum time between pointer samples used for speed estimation
const MIN_SAMPLE_INTERVAL: f64 = 1.0 / 240.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    /// World-space point on the reference plane
    pub point: Vec3,
    pub strength: f32,
    pub decaying: bool,
}

/// Pointer drag gestures turned into transient field depressions.
///
/// Points live in a FIFO queue capped at `max_length`. Once the drag ends
/// every point decays geometrically and is dropped below `min_strength`.
#[derive(Clone, Debug)]
pub struct PointerTrail {
    config: TrailConfig,
    points: VecDeque<TrailPoint>,
    last_sample: Option<(Vec3, f64)>,
    dragging: bool,
}

impl PointerTrail {
    pub fn new(config: TrailConfig) -> Self {
        Self {
            points: VecDeque::with_capacity(config.max_length),
            config,
            last_sample: None,
            dragging: false,
        }
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.last_sample = None;
        self.dragging = false;
    }

    /// Begin a drag; a missing sample still clears the previous trail
    pub fn drag_start(&mut self, point: Option<Vec3>, now: f64) {
        self.clear();
        self.dragging = true;
        if let Some(point) = point {
            self.push(TrailPoint {
                point,
                strength: self.config.base_strength,
                decaying: false,
            });
            self.last_sample = Some((point, now));
        }
    }

    /// Feed a pointer sample; returns true if a point was appended
    pub fn drag_move(&mut self, point: Option<Vec3>, now: f64) -> bool {
        if !self.dragging {
            return false;
        }
        let Some(point) = point else {
            log::trace!("Pointer sample missed the trail plane, dropped");
            return false;
        };

        let speed = match self.last_sample {
            Some((previous, time)) => {
                let dt = (now - time).max(MIN_SAMPLE_INTERVAL);
                previous.distance(point) / dt as f32
            }
            None => 0.0,
        };
        self.last_sample = Some((point, now));

        if let Some(last) = self.points.back() {
            if last.point.distance(point) <= self.config.min_spacing {
                return false;
            }
        }

        self.push(TrailPoint {
            point,
            strength: self.strength_for_speed(speed),
            decaying: false,
        });
        true
    }

    pub fn drag_end(&mut self) {
        self.dragging = false;
        self.last_sample = None;
        for point in &mut self.points {
            point.decaying = true;
        }
    }

    /// One frame of decay for points released by `drag_end`
    pub fn decay(&mut self) {
        let factor = self.config.decay_factor;
        let min_strength = self.config.min_strength;
        for point in self.points.iter_mut().filter(|p| p.decaying) {
            point.strength *= factor;
        }
        self.points.retain(|p| p.strength >= min_strength);
    }

    /// Base strength scaled by pointer speed, capped at (1 + max bonus) * base
    pub fn strength_for_speed(&self, speed: f32) -> f32 {
        let bonus = (speed.max(0.0) * self.config.speed_gain).min(self.config.max_speed_bonus);
        self.config.base_strength * (1.0 + bonus)
    }

    fn push(&mut self, point: TrailPoint) {
        self.points.push_back(point);
        while self.points.len() > self.config.max_length {
            self.points.pop_front();
        }
    }
}

/// Project a cursor position onto the plane `z = plane_z`
pub fn unproject_pointer(camera: &Camera, cursor: Vec2, viewport: Vec2, plane_z: f32) -> Option<Vec3> {
    camera.screen_ray(cursor, viewport).intersect_z_plane(plane_z)
}
