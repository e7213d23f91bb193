use crate::config::LifecycleSchedule;

/// The four stages a satellite cycles through while ejecting and
/// reabsorbing a droplet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Drifting outward, still fused with the core
    Connected,
    /// Pulling away quickly, the neck thins
    Ejection,
    /// Held at maximum distance with a weak residual connection
    Detached,
    /// Falling back toward the core
    Return,
}

/// Satellite state at one instant of its lifecycle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LifecycleSample {
    pub phase: Phase,
    /// Position within the period, in [0, period)
    pub position: f32,
    /// Distance from the field center
    pub radius: f32,
    /// Multiplier applied to the field strength
    pub strength_factor: f32,
}

impl LifecycleSchedule {
    /// Lifecycle position of satellite `index` at simulation time `t`
    pub fn position(&self, t: f32, index: usize) -> f32 {
        let position = (t * self.rate + index as f32 * self.index_offset).rem_euclid(self.period);
        // rem_euclid rounds tiny negative inputs up to exactly `period`
        if position >= self.period {
            0.0
        } else {
            position
        }
    }

    pub fn sample(&self, t: f32, index: usize) -> LifecycleSample {
        self.sample_at(self.position(t, index))
    }

    /// Evaluate the schedule at a lifecycle position in [0, period)
    pub fn sample_at(&self, position: f32) -> LifecycleSample {
        let [connected_end, ejection_end, detached_end] = self.boundaries;

        let (phase, radius, strength_factor) = if position < connected_end {
            let u = position / connected_end;
            (
                Phase::Connected,
                lerp(self.base_radius, self.connected_radius, u),
                lerp(self.max_strength, self.connected_strength, u),
            )
        } else if position < ejection_end {
            let u = (position - connected_end) / (ejection_end - connected_end);
            (
                Phase::Ejection,
                lerp(self.connected_radius, self.max_radius, u),
                lerp(self.connected_strength, self.min_strength, u),
            )
        } else if position < detached_end {
            (Phase::Detached, self.max_radius, self.min_strength)
        } else {
            let u = (position - detached_end) / (self.period - detached_end);
            (
                Phase::Return,
                lerp(self.max_radius, self.base_radius, u),
                lerp(self.min_strength, self.max_strength, u),
            )
        };

        LifecycleSample {
            phase,
            position,
            radius,
            strength_factor,
        }
    }
}

fn lerp(a: f32, b: f32, u: f32) -> f32 {
    a + (b - a) * u.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_phase_order_over_one_period() {
        let schedule = LifecycleSchedule::default();
        assert_eq!(schedule.sample_at(0.0).phase, Phase::Connected);
        assert_eq!(schedule.sample_at(1.8).phase, Phase::Ejection);
        assert_eq!(schedule.sample_at(2.5).phase, Phase::Detached);
        assert_eq!(schedule.sample_at(3.5).phase, Phase::Return);
    }

    #[test]
    fn test_periodic_in_time() {
        let schedule = LifecycleSchedule::default();
        let time_period = schedule.period / schedule.rate;
        for index in 0..4 {
            for step in 0..50 {
                let t = 0.31 + step as f32 * 1.73;
                let a = schedule.sample(t, index);
                let b = schedule.sample(t + time_period, index);
                assert_abs_diff_eq!(a.radius, b.radius, epsilon = 1e-3);
                assert_abs_diff_eq!(a.strength_factor, b.strength_factor, epsilon = 1e-3);
            }
        }
    }

    fn assert_continuous(schedule: &LifecycleSchedule) {
        let eps = 1e-4;
        let mut edges = schedule.boundaries.to_vec();
        edges.push(schedule.period);
        for edge in edges {
            let before = schedule.sample_at(edge - eps);
            let after = schedule.sample_at((edge + eps).rem_euclid(schedule.period));
            assert_abs_diff_eq!(before.radius, after.radius, epsilon = 1e-3);
            assert_abs_diff_eq!(before.strength_factor, after.strength_factor, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_continuous_across_boundaries() {
        assert_continuous(&LifecycleSchedule::default());
    }

    #[test]
    fn test_retuned_schedule_stays_continuous() {
        let schedule = LifecycleSchedule::default()
            .with_boundaries([1.0, 1.4, 3.2])
            .with_radii(0.08, 0.15, 0.35)
            .with_strengths(1.0, 0.6, 0.3);
        assert!(schedule.is_valid());
        assert_continuous(&schedule);

        assert_eq!(schedule.sample_at(1.2).phase, Phase::Ejection);
        assert_eq!(schedule.sample_at(2.0).radius, 0.35);
        assert_eq!(schedule.sample_at(2.0).strength_factor, 0.3);
        assert_eq!(schedule.sample_at(0.0).radius, 0.08);
    }

    #[test]
    fn test_ejection_outpaces_connected() {
        let s = LifecycleSchedule::default();
        let [a, b, _] = s.boundaries;
        let connected_rate = (s.connected_radius - s.base_radius) / a;
        let ejection_rate = (s.max_radius - s.connected_radius) / (b - a);
        assert!(ejection_rate > connected_rate);

        let connected_drop = (s.max_strength - s.connected_strength) / a;
        let ejection_drop = (s.connected_strength - s.min_strength) / (b - a);
        assert!(ejection_drop > connected_drop);
    }

    #[test]
    fn test_detached_holds_extremes() {
        let schedule = LifecycleSchedule::default();
        for position in [2.2, 2.5, 2.9] {
            let sample = schedule.sample_at(position);
            assert_eq!(sample.radius, schedule.max_radius);
            assert_eq!(sample.strength_factor, schedule.min_strength);
        }
    }

    #[test]
    fn test_negative_time_wraps() {
        let schedule = LifecycleSchedule::default();
        let position = schedule.position(-10.0, 0);
        assert!((0.0..schedule.period).contains(&position));
    }

    #[test]
    fn test_tiny_negative_time_stays_below_period() {
        let schedule = LifecycleSchedule::default();
        for t in [-1e-9, -1e-7, -f32::EPSILON] {
            let position = schedule.position(t, 0);
            assert!((0.0..schedule.period).contains(&position), "t={} gave {}", t, position);
        }
    }
}
