use glam::Vec3;
use rand::Rng;
use std::f32::consts::TAU;

use crate::config::{SimulationConfig, INITIAL_TIME_SPAN, MAX_SPEED};

/// Previous-frame satellite directions, indexed by satellite index.
///
/// Only used to derive a frame-over-frame motion vector for stretching.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityHistory {
    previous: Vec<Vec3>,
}

impl VelocityHistory {
    pub fn zeroed(satellites: usize) -> Self {
        Self {
            previous: vec![Vec3::ZERO; satellites],
        }
    }

    /// Seed each direction uniformly in [-0.2, 0.2]^3
    pub fn random<R: Rng>(satellites: usize, rng: &mut R) -> Self {
        let previous = (0..satellites)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-0.2..0.2),
                    rng.gen_range(-0.2..0.2),
                    rng.gen_range(-0.2..0.2),
                )
            })
            .collect();
        Self { previous }
    }

    pub fn len(&self) -> usize {
        self.previous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Return `current - previous` for `index` and store `current`
    pub fn advance(&mut self, index: usize, current: Vec3) -> Vec3 {
        if index >= self.previous.len() {
            self.previous.resize(index + 1, current);
        }
        let delta = current - self.previous[index];
        self.previous[index] = current;
        delta
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.previous.get(index).copied()
    }
}

/// Mutable per-session simulation state owned by the animation driver
#[derive(Clone, Debug)]
pub struct SimulationState {
    /// Simulation clock, advanced by clamped wall delta times speed
    pub time: f32,
    pub speed: f32,
    pub strength: f32,
    pub subtract: f32,
    /// Slow "temperature" oscillator driving the isolation threshold
    pub base_temp: f32,
    pub cycle_speed: f32,
    /// Per-axis phase offsets, fixed at creation
    pub phase_offsets: Vec3,
    pub history: VelocityHistory,
    pub paused: bool,
}

impl SimulationState {
    /// Start at a random point in time with random phase offsets
    pub fn new<R: Rng>(config: &SimulationConfig, satellites: usize, rng: &mut R) -> Self {
        Self {
            time: rng.gen_range(0.0..INITIAL_TIME_SPAN),
            speed: config.speed,
            strength: config.strength,
            subtract: config.subtract,
            base_temp: 0.1,
            cycle_speed: config.cycle_speed,
            phase_offsets: Vec3::new(
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
                rng.gen_range(0.0..TAU),
            ),
            history: VelocityHistory::random(satellites, rng),
            paused: false,
        }
    }

    /// Deterministic state at t = 0 with zero offsets
    pub fn at_origin(config: &SimulationConfig, satellites: usize) -> Self {
        Self {
            time: 0.0,
            speed: config.speed,
            strength: config.strength,
            subtract: config.subtract,
            base_temp: 0.1,
            cycle_speed: config.cycle_speed,
            phase_offsets: Vec3::ZERO,
            history: VelocityHistory::zeroed(satellites),
            paused: false,
        }
    }

    /// Advance the clock by an already-clamped wall delta
    pub fn advance(&mut self, delta: f64) {
        if !self.paused {
            self.time += delta as f32 * self.speed;
        }
    }

    pub fn adjust_speed(&mut self, step: f32) {
        self.speed = (self.speed + step).clamp(0.0, MAX_SPEED);
    }

    /// Temperature derived from wall time, in [0.2, 0.8]
    pub fn update_temperature(&mut self, wall_time: f64) {
        self.base_temp = 0.5 + 0.3 * (wall_time as f32 * self.cycle_speed).sin();
    }
}
