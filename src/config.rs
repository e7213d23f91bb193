use glam::Vec3;

// ============================================
// Volume & Field Space
// ============================================

/// Half-width of the world-space container the field cube is scaled into
pub const CONTAINER_RADIUS: f32 = 3.0;

/// World units per half extent of the field cube
pub const VOLUME_SCALE: f32 = CONTAINER_RADIUS * 2.0;

/// Contributors are clamped into [BUFFER_ZONE, 1 - BUFFER_ZONE] on every axis
pub const BUFFER_ZONE: f32 = 0.2;

/// Normalized field-space center
pub const FIELD_CENTER: f32 = 0.5;

/// Base iso-surface threshold
pub const ISOLATION: f32 = 80.0;

/// Upper bound on contributors uploaded to the GPU per frame
pub const MAX_CONTRIBUTORS: usize = 64;

// ============================================
// Contributor Counts & Shape
// ============================================

pub const NUM_SUPPORT_BALLS: usize = 2;
pub const NUM_METABALLS: usize = 4;
pub const NUM_FREE_PARTICLES: usize = 1;

/// Number of stretch sub-steps per satellite
pub const SHAPE_COMPLEXITY: usize = 1;

/// Lobe offset scale for the support balls
pub const INTERNAL_WARP_STRENGTH: f32 = 3.0;

/// How far satellites stretch along their motion vector
pub const ELONGATION_FACTOR: f32 = 3.0;

/// Wobble applied to stretch sub-steps
pub const DISTORTION_AMOUNT: f32 = 0.15;

/// Overall high-frequency jiggle multiplier
pub const JIGGLE_INTENSITY: f32 = 1.0;

// ============================================
// Simulation Defaults
// ============================================

pub const DEFAULT_SPEED: f32 = 0.1;
pub const DEFAULT_STRENGTH: f32 = 2.0;
pub const DEFAULT_SUBTRACT: f32 = 40.0;
/// Angular rate of the temperature oscillator, per wall-clock second
pub const DEFAULT_CYCLE_SPEED: f32 = 0.1;

/// Simulation time starts at a random point in [0, INITIAL_TIME_SPAN)
pub const INITIAL_TIME_SPAN: f32 = 100.0;

/// Speed change per key press
pub const SPEED_STEP: f32 = 0.02;
pub const MAX_SPEED: f32 = 1.0;

// ============================================
// Animation Driver
// ============================================

/// Largest frame delta fed into the simulation (seconds)
pub const MAX_FRAME_DELTA: f64 = 0.1;

/// FPS estimate window (seconds)
pub const FPS_WINDOW: f64 = 0.5;

/// Below this estimate every other frame skips field regeneration
pub const LOW_FPS_THRESHOLD: f64 = 20.0;

/// First-order smoothing factor for the volume transform
pub const TRANSFORM_DAMPING: f32 = 0.1;

/// Hard clamp on the eased volume position
pub const POSITION_LIMITS: Vec3 = Vec3::new(0.4, 0.3, 0.3);

// ============================================
// Pointer Trail
// ============================================

pub const MOUSE_REPULSION_STRENGTH: f32 = 1.0;
pub const MAX_TRAIL_LENGTH: usize = 24;

/// Minimum world distance between appended trail points
pub const TRAIL_MIN_SPACING: f32 = 0.15;

/// Per-frame strength multiplier once dragging stops
pub const TRAIL_DECAY_FACTOR: f32 = 0.92;

/// Points weaker than this are removed
pub const TRAIL_MIN_STRENGTH: f32 = 0.05;

/// Extra strength per world unit/second of pointer speed
pub const TRAIL_SPEED_GAIN: f32 = 0.05;

/// Speed bonus cap; total strength never exceeds (1 + cap) * base
pub const TRAIL_MAX_SPEED_BONUS: f32 = 0.5;

/// Trail contributor strength relative to the field strength
pub const TRAIL_CUT_FACTOR: f32 = 0.6;

/// Z of the world plane pointer rays are intersected with
pub const TRAIL_PLANE_Z: f32 = 0.0;

// ============================================
// Camera
// ============================================

pub const CAMERA_DISTANCE: f32 = 20.0;
pub const CAMERA_FOV_DEGREES: f32 = 40.0;
pub const ORBIT_DAMPING: f32 = 0.05;
pub const ORBIT_ROTATE_SPEED: f32 = 0.005;
/// World units per pixel of middle drag
pub const ORBIT_PAN_SPEED: f32 = 0.02;
pub const MAX_PAN_OFFSET: f32 = 6.0;

// ============================================
// Rendering
// ============================================

pub const RAYMARCH_STEPS: u32 = 96;
pub const BACKGROUND_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const LAVA_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Satellite lifecycle: phase boundaries within one period and the radius /
/// strength-factor keyframes at those boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct LifecycleSchedule {
    /// Lifecycle position advance per unit of simulation time
    pub rate: f32,
    /// Lifecycle offset between consecutive satellites
    pub index_offset: f32,
    pub period: f32,
    /// End of Connected, end of Ejection, end of Detached
    pub boundaries: [f32; 3],
    pub base_radius: f32,
    /// Radius reached at the end of the Connected phase
    pub connected_radius: f32,
    pub max_radius: f32,
    pub max_strength: f32,
    /// Strength factor reached at the end of the Connected phase
    pub connected_strength: f32,
    pub min_strength: f32,
}

impl Default for LifecycleSchedule {
    fn default() -> Self {
        Self {
            rate: 0.05,
            index_offset: 0.9,
            period: 4.0,
            boundaries: [1.5, 2.1, 3.0],
            base_radius: 0.12,
            connected_radius: 0.2,
            max_radius: 0.3,
            max_strength: 0.9,
            connected_strength: 0.75,
            min_strength: 0.45,
        }
    }
}

impl LifecycleSchedule {
    /// Boundaries must be strictly increasing inside (0, period)
    pub fn is_valid(&self) -> bool {
        let [a, b, c] = self.boundaries;
        self.period > 0.0 && 0.0 < a && a < b && b < c && c < self.period
    }

    pub fn with_boundaries(mut self, boundaries: [f32; 3]) -> Self {
        self.boundaries = boundaries;
        self
    }

    pub fn with_radii(mut self, base: f32, connected: f32, max: f32) -> Self {
        self.base_radius = base;
        self.connected_radius = connected;
        self.max_radius = max;
        self
    }

    pub fn with_strengths(mut self, max: f32, connected: f32, min: f32) -> Self {
        self.max_strength = max;
        self.connected_strength = connected;
        self.min_strength = min;
        self
    }
}

/// Tuning for the procedural field generator
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    pub support_balls: usize,
    pub satellites: usize,
    pub free_particles: usize,
    pub shape_complexity: usize,
    pub center_strength: f32,
    pub support_strength: f32,
    pub free_strength: f32,
    pub support_orbit_radius: f32,
    pub free_radius: f32,
    pub internal_warp_strength: f32,
    pub elongation_factor: f32,
    pub distortion_amount: f32,
    pub jiggle_intensity: f32,
    pub buffer_zone: f32,
    pub trail_cut_factor: f32,
    pub lifecycle: LifecycleSchedule,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            support_balls: NUM_SUPPORT_BALLS,
            satellites: NUM_METABALLS,
            free_particles: NUM_FREE_PARTICLES,
            shape_complexity: SHAPE_COMPLEXITY,
            center_strength: 1.7,
            support_strength: 0.8,
            free_strength: 0.4,
            support_orbit_radius: 0.12,
            free_radius: 0.18,
            internal_warp_strength: INTERNAL_WARP_STRENGTH,
            elongation_factor: ELONGATION_FACTOR,
            distortion_amount: DISTORTION_AMOUNT,
            jiggle_intensity: JIGGLE_INTENSITY,
            buffer_zone: BUFFER_ZONE,
            trail_cut_factor: TRAIL_CUT_FACTOR,
            lifecycle: LifecycleSchedule::default(),
        }
    }
}

impl FieldConfig {
    pub fn with_counts(mut self, support_balls: usize, satellites: usize, free_particles: usize) -> Self {
        self.support_balls = support_balls;
        self.satellites = satellites;
        self.free_particles = free_particles;
        self
    }

    pub fn with_shape_complexity(mut self, shape_complexity: usize) -> Self {
        self.shape_complexity = shape_complexity;
        self
    }

    pub fn with_buffer_zone(mut self, buffer_zone: f32) -> Self {
        self.buffer_zone = buffer_zone;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: LifecycleSchedule) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Contributors emitted per frame, excluding the pointer trail
    pub fn max_contributors(&self) -> usize {
        let per_satellite = 1 + 2 * self.shape_complexity;
        1 + 3 * self.support_balls + per_satellite * self.satellites + self.free_particles
    }
}

/// Initial scalar state of a simulation
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub speed: f32,
    pub strength: f32,
    pub subtract: f32,
    pub cycle_speed: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            strength: DEFAULT_STRENGTH,
            subtract: DEFAULT_SUBTRACT,
            cycle_speed: DEFAULT_CYCLE_SPEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrailConfig {
    pub base_strength: f32,
    pub max_length: usize,
    pub min_spacing: f32,
    pub decay_factor: f32,
    pub min_strength: f32,
    pub speed_gain: f32,
    pub max_speed_bonus: f32,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            base_strength: MOUSE_REPULSION_STRENGTH,
            max_length: MAX_TRAIL_LENGTH,
            min_spacing: TRAIL_MIN_SPACING,
            decay_factor: TRAIL_DECAY_FACTOR,
            min_strength: TRAIL_MIN_STRENGTH,
            speed_gain: TRAIL_SPEED_GAIN,
            max_speed_bonus: TRAIL_MAX_SPEED_BONUS,
        }
    }
}

impl TrailConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_decay(mut self, decay_factor: f32, min_strength: f32) -> Self {
        self.decay_factor = decay_factor;
        self.min_strength = min_strength;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub max_frame_delta: f64,
    pub fps_window: f64,
    pub low_fps_threshold: f64,
    pub damping: f32,
    pub position_limits: Vec3,
    pub isolation: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            max_frame_delta: MAX_FRAME_DELTA,
            fps_window: FPS_WINDOW,
            low_fps_threshold: LOW_FPS_THRESHOLD,
            damping: TRANSFORM_DAMPING,
            position_limits: POSITION_LIMITS,
            isolation: ISOLATION,
        }
    }
}

impl DriverConfig {
    pub fn with_low_fps_threshold(mut self, low_fps_threshold: f64) -> Self {
        self.low_fps_threshold = low_fps_threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_contributor_budget() {
        // 1 center + 2 support * 3 + 4 satellites * 3 + 1 free
        assert_eq!(FieldConfig::default().max_contributors(), 20);
    }

    #[test]
    fn test_budget_fits_gpu_capacity() {
        let budget = FieldConfig::default().max_contributors() + MAX_TRAIL_LENGTH;
        assert!(budget <= MAX_CONTRIBUTORS);
    }

    #[test]
    fn test_default_schedule_valid() {
        assert!(LifecycleSchedule::default().is_valid());
        let bad = LifecycleSchedule::default().with_boundaries([2.0, 1.0, 3.0]);
        assert!(!bad.is_valid());
    }

    #[test]
    fn test_builders_override_defaults() {
        let config = FieldConfig::default()
            .with_counts(3, 6, 2)
            .with_shape_complexity(2);
        assert_eq!(config.support_balls, 3);
        assert_eq!(config.satellites, 6);
        assert_eq!(config.free_particles, 2);
        assert_eq!(config.max_contributors(), 1 + 9 + 5 * 6 + 2);
    }
}
