//! Procedural metaball field.
//!
//! Every frame the field is rebuilt from scratch: a center blob, support
//! balls orbiting it with internal-warp lobes, lifecycle-driven satellites
//! that eject and reabsorb droplets, free particles, and one negative
//! contributor per pointer-trail point.

use glam::Vec3;

use crate::config::{FieldConfig, FIELD_CENTER};
use crate::simulation::contributor::{clamp_to_band, Contributor, IsoSurface};
use crate::simulation::state::SimulationState;
use crate::simulation::trail::PointerTrail;
use crate::simulation::volume::VolumeTransform;

/// Shared oscillators that keep the whole mass moving coherently
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Oscillators {
    /// Per-axis stretch around 1.0
    pub elongation: Vec3,
    /// Slow product-of-sines drift
    pub undulation: Vec3,
    /// High-frequency, low-amplitude shake
    pub jiggle: Vec3,
}

impl Oscillators {
    pub fn at(t: f32, phase_offsets: Vec3, jiggle_intensity: f32) -> Self {
        // Different frequencies per axis avoid visible symmetry
        let elongation = Vec3::new(
            1.0 + 0.8 * (t * 0.13 + phase_offsets.x).sin(),
            1.0 + 0.5 * (t * 0.12 + phase_offsets.y).sin(),
            1.0 + 0.8 * (t * 0.15 + phase_offsets.z).sin(),
        );

        let undulation = Vec3::new(
            0.25 * (t * 0.27).sin() * (t * 0.1).sin(),
            0.25 * (t * 0.31 + 0.5).sin() * (t * 0.07).sin(),
            0.25 * (t * 0.23 + 0.9).sin() * (t * 0.13).sin(),
        );

        let (f1, f2, f3) = (t * 2.7, t * 3.2, t * 2.3);
        let amplitude = 0.03 * jiggle_intensity;
        let jiggle = Vec3::new(
            amplitude * f1.sin() * (f2 * 0.7).sin(),
            amplitude * f2.sin() * (f3 * 0.7).sin(),
            amplitude * f3.sin() * (f1 * 0.7).sin(),
        );

        Self {
            elongation,
            undulation,
            jiggle,
        }
    }
}

/// Satellite direction bias, chosen by `index % 3`
struct OrientationClass {
    /// Axis that receives the elongation oscillator and full undulation
    axis: usize,
    /// Extra multipliers on the spherical direction
    stretch: Vec3,
    jiggle_gain: Vec3,
    jiggle_freq: Vec3,
}

const ORIENTATION_CLASSES: [OrientationClass; 3] = [
    OrientationClass {
        axis: 0,
        stretch: Vec3::new(1.6, 0.9, 1.0),
        jiggle_gain: Vec3::new(1.5, 1.2, 1.2),
        jiggle_freq: Vec3::new(2.7, 1.9, 2.3),
    },
    OrientationClass {
        axis: 1,
        stretch: Vec3::new(1.0, 1.1, 1.0),
        jiggle_gain: Vec3::new(1.2, 1.5, 1.2),
        jiggle_freq: Vec3::new(2.1, 2.5, 1.7),
    },
    OrientationClass {
        axis: 2,
        stretch: Vec3::new(1.0, 1.0, 1.6),
        jiggle_gain: Vec3::new(1.2, 1.2, 1.5),
        jiggle_freq: Vec3::new(1.5, 2.3, 2.9),
    },
];

impl OrientationClass {
    fn direction(&self, sphere: Vec3, radius: f32, index: f32, t: f32, osc: &Oscillators) -> Vec3 {
        let mut elongation = Vec3::ONE;
        let mut undulation_weight = Vec3::splat(0.3);
        elongation[self.axis] = osc.elongation[self.axis];
        undulation_weight[self.axis] = 1.0;

        let wave = Vec3::new(
            (index * self.jiggle_freq.x + t).sin(),
            (index * self.jiggle_freq.y + t).cos(),
            (index * self.jiggle_freq.z + t).sin(),
        );
        let jiggle = osc.jiggle * self.jiggle_gain * (Vec3::ONE + 0.5 * wave);

        sphere * radius * self.stretch * elongation + osc.undulation * undulation_weight + jiggle
    }
}

/// Clamps and counts contributors on their way into the surface
struct Emitter<'s, S: IsoSurface> {
    surface: &'s mut S,
    buffer_zone: f32,
    count: usize,
}

impl<S: IsoSurface> Emitter<'_, S> {
    fn emit(&mut self, position: Vec3, strength: f32) {
        let position = clamp_to_band(position, self.buffer_zone);
        self.surface.add_contributor(Contributor::new(position, strength));
        self.count += 1;
    }
}

/// Parameterized generator for one frame of the lava lamp field
#[derive(Clone, Debug, Default)]
pub struct FieldGenerator {
    config: FieldConfig,
}

impl FieldGenerator {
    pub fn new(config: FieldConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Rebuild the field for `state.time` and trigger extraction.
    ///
    /// Updates the satellite velocity history. Returns the number of
    /// contributors submitted.
    pub fn generate<S: IsoSurface>(
        &self,
        state: &mut SimulationState,
        trail: &PointerTrail,
        transform: &VolumeTransform,
        surface: &mut S,
    ) -> usize {
        let t = state.time;
        let strength = state.strength;
        let osc = Oscillators::at(t, state.phase_offsets, self.config.jiggle_intensity);
        let center = Vec3::splat(FIELD_CENTER);

        surface.reset(state.subtract);
        let mut emitter = Emitter {
            surface,
            buffer_zone: self.config.buffer_zone,
            count: 0,
        };

        // Center blob anchors the topology
        let core = center + osc.undulation * 0.3 + osc.jiggle * 0.5;
        emitter.emit(core, strength * self.config.center_strength);

        self.emit_support(&mut emitter, t, strength, &osc, center);
        self.emit_satellites(&mut emitter, state, strength, &osc, center);
        self.emit_free(&mut emitter, t, strength, &osc, center);

        for point in trail.points() {
            let position = transform.world_to_field(point.point);
            emitter.emit(position, -strength * self.config.trail_cut_factor * point.strength);
        }

        let count = emitter.count;
        emitter.surface.update();
        count
    }

    fn emit_support<S: IsoSurface>(
        &self,
        emitter: &mut Emitter<'_, S>,
        t: f32,
        strength: f32,
        osc: &Oscillators,
        center: Vec3,
    ) {
        let orbit = self.config.support_orbit_radius;
        for i in 0..self.config.support_balls {
            let fi = i as f32;
            let angle = fi * 2.1 + t * 0.1;

            let jiggle = osc.jiggle
                * Vec3::new(
                    1.0 + 0.5 * (fi * 2.1).sin(),
                    1.0 + 0.5 * (fi * 1.7).cos(),
                    1.0 + 0.5 * (fi * 1.3).sin(),
                );

            let phase = t * 1.2 + fi * 1.7;
            let warp = self.config.internal_warp_strength
                * Vec3::new(
                    (phase * 1.1).sin() * (phase * 0.7).cos(),
                    (phase * 0.9).sin() * (phase * 1.3).cos(),
                    (phase * 1.3).sin() * (phase * 0.5).cos(),
                );

            let p = center
                + Vec3::new(angle.cos(), angle.sin(), (angle * 0.7).sin()) * orbit * osc.elongation
                + jiggle;

            emitter.emit(p, strength * self.config.support_strength);
            // Offset lobes make the support ball non-spherical
            emitter.emit(p + warp * Vec3::new(0.07, 0.05, 0.06), strength * 0.5);
            emitter.emit(p - warp * Vec3::new(0.08, 0.06, 0.05), strength * 0.45);
        }
    }

    fn emit_satellites<S: IsoSurface>(
        &self,
        emitter: &mut Emitter<'_, S>,
        state: &mut SimulationState,
        strength: f32,
        osc: &Oscillators,
        center: Vec3,
    ) {
        let t = state.time;
        let complexity = self.config.shape_complexity;

        for i in 0..self.config.satellites {
            let fi = i as f32;
            let life = self.config.lifecycle.sample(t, i);
            let ball_strength = strength * life.strength_factor;

            let theta = fi * 1.05 + t * 0.2;
            let phi = fi * 0.8 + t * 0.15;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let (sin_phi, cos_phi) = phi.sin_cos();
            let sphere = Vec3::new(sin_theta * cos_phi, sin_phi, cos_theta * cos_phi);

            let class = &ORIENTATION_CLASSES[i % ORIENTATION_CLASSES.len()];
            let dir = class.direction(sphere, life.radius, fi, t, osc);

            let anchor = clamp_to_band(center + dir, self.config.buffer_zone);
            emitter.emit(anchor, ball_strength);

            let motion = state.history.advance(i, dir);
            let stretch = motion
                * 0.18
                * self.config.elongation_factor
                * (t * 1.7 + fi * 2.3).sin();

            for s in 1..=complexity {
                let fs = s as f32;
                let offset = (fs / complexity as f32).powf(1.2);
                let along = anchor + stretch * offset;

                let wobble = self.config.distortion_amount
                    * Vec3::new(
                        (t * 2.7 + fi + fs * 1.3).sin(),
                        (t * 3.1 + fi + fs * 1.7).sin(),
                        (t * 2.3 + fi + fs * 1.1).sin(),
                    );
                emitter.emit(along + wobble, ball_strength * (0.7 - 0.4 * offset));

                if s + 1 < complexity {
                    let bulge = Vec3::new(
                        stretch.z * 0.4 * (t + fi + fs).sin(),
                        stretch.x * 0.4 * (t * 1.2 + fi + fs).sin(),
                        stretch.y * 0.4 * (t * 0.8 + fi + fs).sin(),
                    );
                    emitter.emit(along + bulge, ball_strength * 0.4);
                }
            }
        }
    }

    fn emit_free<S: IsoSurface>(
        &self,
        emitter: &mut Emitter<'_, S>,
        t: f32,
        strength: f32,
        osc: &Oscillators,
        center: Vec3,
    ) {
        let radius = self.config.free_radius;
        for i in 0..self.config.free_particles {
            let fi = i as f32;
            let theta = t * 0.3 + fi * 2.1;
            let phi = t * 0.2 + fi * 1.57;
            let (sin_theta, cos_theta) = theta.sin_cos();
            let (sin_phi, cos_phi) = phi.sin_cos();
            let sphere = Vec3::new(sin_theta * cos_phi, sin_phi, cos_theta * cos_phi);

            let jiggle = osc.jiggle
                * 2.5
                * Vec3::new(
                    1.0 + (t * 4.1 + fi * 3.7).sin(),
                    1.0 + (t * 3.9 + fi * 2.8).cos(),
                    1.0 + (t * 4.5 + fi * 3.2).sin(),
                );

            // First particle leans along X, the rest along Y and Z
            let bias = if i == 0 {
                Vec3::new(osc.elongation.x * 2.0, 0.9, 1.0)
            } else {
                Vec3::new(1.0, osc.elongation.y * 1.4, osc.elongation.z * 1.8)
            };

            let p = center + sphere * radius * bias + osc.undulation + jiggle;
            emitter.emit(p, strength * self.config.free_strength);
        }
    }
}
