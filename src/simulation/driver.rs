use glam::Vec3;

use crate::config::{DriverConfig, FieldConfig, TrailConfig, JIGGLE_INTENSITY};
use crate::simulation::contributor::IsoSurface;
use crate::simulation::field::FieldGenerator;
use crate::simulation::state::SimulationState;
use crate::simulation::trail::PointerTrail;
use crate::simulation::volume::VolumeTransform;

/// What happened to the field on one tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// Regeneration skipped to shed load
    Skipped,
    Generated { delta: f64, contributors: usize },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub frame: FrameOutcome,
    /// Set when the FPS window closed on this tick
    pub fps_sample: Option<f64>,
}

/// Rolling FPS estimate, recomputed once per window
#[derive(Clone, Debug)]
pub struct FpsMeter {
    window: f64,
    window_start: Option<f64>,
    frames: u32,
    estimate: Option<f64>,
}

impl FpsMeter {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            window_start: None,
            frames: 0,
            estimate: None,
        }
    }

    /// Count a frame at wall time `now`, returns Some(fps) when the window closes
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };

        self.frames += 1;
        let elapsed = now - start;
        if elapsed >= self.window {
            let fps = self.frames as f64 / elapsed;
            self.frames = 0;
            self.window_start = Some(now);
            self.estimate = Some(fps);
            Some(fps)
        } else {
            None
        }
    }

    pub fn estimate(&self) -> Option<f64> {
        self.estimate
    }
}

/// Clamp a raw wall-clock delta into [0, max]; NaN counts as zero
pub fn clamp_frame_delta(raw: f64, max: f64) -> f64 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, max)
    }
}

/// Slowly wandering target for the volume position, plus a small jitter
pub fn target_position(now: f64) -> Vec3 {
    let now = now as f32;
    let amplitude = 0.05 * JIGGLE_INTENSITY;
    let speed = 5.0;
    let jitter = amplitude
        * Vec3::new(
            (now * speed * 1.1).sin(),
            (now * speed * 0.9).sin(),
            (now * speed * 1.3).sin(),
        );
    Vec3::new(
        (now * 0.2).sin() * 0.5,
        (now * 0.1).sin() * 0.25,
        (now * 0.17).sin() * 0.45,
    ) + jitter
}

pub fn target_rotation_y(now: f64) -> f32 {
    (now as f32 * 0.15).sin() * 0.15
}

/// Per-frame orchestration: clock, throttling, transform easing, isolation
/// and field regeneration.
pub struct AnimationDriver {
    config: DriverConfig,
    generator: FieldGenerator,
    state: SimulationState,
    trail: PointerTrail,
    transform: VolumeTransform,
    isolation: f32,
    fps: FpsMeter,
    frame_count: u64,
    last_time: Option<f64>,
    throttled: bool,
}

impl AnimationDriver {
    pub fn new(
        config: DriverConfig,
        field: FieldConfig,
        trail: TrailConfig,
        state: SimulationState,
    ) -> Self {
        if !field.lifecycle.is_valid() {
            log::warn!("Lifecycle boundaries are not strictly increasing: {:?}", field.lifecycle.boundaries);
        }
        Self {
            isolation: config.isolation,
            fps: FpsMeter::new(config.fps_window),
            config,
            generator: FieldGenerator::new(field),
            state,
            trail: PointerTrail::new(trail),
            transform: VolumeTransform::default(),
            frame_count: 0,
            last_time: None,
            throttled: false,
        }
    }

    /// Advance one display frame at wall time `now` (seconds)
    pub fn tick<S: IsoSurface>(&mut self, now: f64, surface: &mut S) -> TickReport {
        self.frame_count = self.frame_count.wrapping_add(1);
        let fps_sample = self.fps.tick(now);
        if let Some(fps) = fps_sample {
            self.update_throttle(fps);
        }

        self.trail.decay();

        if self.throttled && self.frame_count % 2 != 0 {
            return TickReport {
                frame: FrameOutcome::Skipped,
                fps_sample,
            };
        }

        let raw = self.last_time.map_or(0.0, |last| now - last);
        let delta = clamp_frame_delta(raw, self.config.max_frame_delta);
        self.last_time = Some(now);

        self.state.advance(delta);
        self.state.update_temperature(now);

        self.transform.ease_toward(
            target_position(now),
            target_rotation_y(now),
            self.config.damping,
            self.config.position_limits,
        );

        // Warmer lava expands: lower threshold
        self.isolation = self.config.isolation - (self.state.base_temp - 0.5) * 20.0;

        let contributors = self
            .generator
            .generate(&mut self.state, &self.trail, &self.transform, surface);

        TickReport {
            frame: FrameOutcome::Generated {
                delta,
                contributors,
            },
            fps_sample,
        }
    }

    fn update_throttle(&mut self, fps: f64) {
        let throttled = fps < self.config.low_fps_threshold;
        if throttled != self.throttled {
            if throttled {
                log::debug!("FPS {:.1} below {:.0}, skipping alternate frames", fps, self.config.low_fps_threshold);
            } else {
                log::debug!("FPS recovered to {:.1}, regenerating every frame", fps);
            }
            self.throttled = throttled;
        }
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn trail(&self) -> &PointerTrail {
        &self.trail
    }

    pub fn trail_mut(&mut self) -> &mut PointerTrail {
        &mut self.trail
    }

    pub fn transform(&self) -> &VolumeTransform {
        &self.transform
    }

    pub fn isolation(&self) -> f32 {
        self.isolation
    }

    pub fn is_throttled(&self) -> bool {
        self.throttled
    }

    /// Clear the trail and recenter the volume
    pub fn reset_view(&mut self) {
        self.trail.clear();
        self.transform = VolumeTransform::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SimulationConfig, ISOLATION, POSITION_LIMITS};
    use crate::simulation::contributor::ContributorBatch;

    fn driver() -> AnimationDriver {
        let field = FieldConfig::default();
        let state = SimulationState::at_origin(&SimulationConfig::default(), field.satellites);
        AnimationDriver::new(DriverConfig::default(), field, TrailConfig::default(), state)
    }

    fn generated_delta(report: TickReport) -> f64 {
        match report.frame {
            FrameOutcome::Generated { delta, .. } => delta,
            FrameOutcome::Skipped => panic!("frame unexpectedly skipped"),
        }
    }

    #[test]
    fn test_clamp_frame_delta() {
        assert_eq!(clamp_frame_delta(5.0, 0.1), 0.1);
        assert_eq!(clamp_frame_delta(-0.3, 0.1), 0.0);
        assert_eq!(clamp_frame_delta(0.016, 0.1), 0.016);
        assert_eq!(clamp_frame_delta(f64::NAN, 0.1), 0.0);
    }

    #[test]
    fn test_stall_is_clamped() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        driver.tick(0.0, &mut batch);
        let before = driver.state().time;

        let delta = generated_delta(driver.tick(5.0, &mut batch));
        assert_eq!(delta, 0.1);
        let advanced = driver.state().time - before;
        assert!((advanced - 0.1 * driver.state().speed).abs() < 1e-6);
    }

    #[test]
    fn test_fps_meter_windows() {
        let mut meter = FpsMeter::new(0.5);
        assert_eq!(meter.tick(0.0), None);
        let mut sample = None;
        for i in 1..=30 {
            if let Some(fps) = meter.tick(i as f64 / 60.0) {
                sample = Some(fps);
                break;
            }
        }
        let fps = sample.expect("window should close within half a second");
        assert!((fps - 60.0).abs() < 1.0);
        assert_eq!(meter.estimate(), Some(fps));
    }

    #[test]
    fn test_no_throttle_before_first_estimate() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        for i in 0..4 {
            let report = driver.tick(i as f64 * 0.1, &mut batch);
            assert!(matches!(report.frame, FrameOutcome::Generated { .. }));
        }
    }

    #[test]
    fn test_low_fps_skips_alternate_frames() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        let mut skipped = 0;
        let mut generated = 0;
        // 10 FPS
        for i in 0..40 {
            match driver.tick(i as f64 * 0.1, &mut batch).frame {
                FrameOutcome::Skipped => skipped += 1,
                FrameOutcome::Generated { .. } => generated += 1,
            }
        }
        assert!(driver.is_throttled());
        assert!(skipped > 10);
        assert!(generated > skipped);
    }

    #[test]
    fn test_high_fps_never_skips() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        for i in 0..120 {
            let report = driver.tick(i as f64 / 60.0, &mut batch);
            assert!(matches!(report.frame, FrameOutcome::Generated { .. }));
        }
        assert!(!driver.is_throttled());
    }

    #[test]
    fn test_raised_threshold_throttles_at_30_fps() {
        let field = FieldConfig::default();
        let state = SimulationState::at_origin(&SimulationConfig::default(), field.satellites);
        let mut default_driver = driver();
        let mut strict_driver = AnimationDriver::new(
            DriverConfig::default().with_low_fps_threshold(40.0),
            field,
            TrailConfig::default(),
            state,
        );
        let mut batch = ContributorBatch::default();

        for i in 0..60 {
            let now = i as f64 / 30.0;
            default_driver.tick(now, &mut batch);
            strict_driver.tick(now, &mut batch);
        }
        assert!(!default_driver.is_throttled());
        assert!(strict_driver.is_throttled());
    }

    #[test]
    fn test_isolation_follows_temperature() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        for i in 0..200 {
            driver.tick(i as f64 * 0.5, &mut batch);
            let isolation = driver.isolation();
            assert!(isolation >= ISOLATION - 6.0 - 1e-3 && isolation <= ISOLATION + 6.0 + 1e-3);
        }
    }

    #[test]
    fn test_transform_stays_in_limits() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        for i in 0..2000 {
            driver.tick(i as f64 * 0.05, &mut batch);
            let p = driver.transform().position;
            assert!(p.abs().cmple(POSITION_LIMITS + Vec3::splat(1e-6)).all());
        }
    }

    #[test]
    fn test_released_trail_fades_out() {
        let mut driver = driver();
        let mut batch = ContributorBatch::default();
        driver.trail_mut().drag_start(Some(Vec3::ZERO), 0.0);
        driver.trail_mut().drag_end();

        let mut now = 0.0;
        while !driver.trail().is_empty() {
            driver.tick(now, &mut batch);
            now += 1.0 / 60.0;
            assert!(now < 60.0);
        }
        driver.tick(now, &mut batch);
        assert!(batch.contributors().iter().all(|c| c.strength > 0.0));
    }

    #[test]
    fn test_reset_view_clears_trail() {
        let mut driver = driver();
        driver.trail_mut().drag_start(Some(Vec3::ZERO), 0.0);
        driver.reset_view();
        assert!(driver.trail().is_empty());
        assert_eq!(*driver.transform(), VolumeTransform::default());
    }
}
