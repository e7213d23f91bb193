use glam::Vec3;

/// A single implicit-surface contributor ("ball") in normalized field space.
///
/// Layout: 16 bytes, uploaded as-is into the GPU storage buffer.
/// - position: [f32; 3] = 12 bytes - (x, y, z) in [0, 1]^3
/// - strength: f32 = 4 bytes - signed; negative values depress the field
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Contributor {
    pub position: [f32; 3],
    pub strength: f32,
}

impl Contributor {
    pub fn new(position: Vec3, strength: f32) -> Self {
        Self {
            position: position.to_array(),
            strength,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn is_finite(&self) -> bool {
        self.position().is_finite() && self.strength.is_finite()
    }

    /// Field value this contributor adds at `point`.
    ///
    /// Inside its radius of influence the magnitude is
    /// `|strength| / (1e-6 + d^2) - subtract`, signed by the strength.
    pub fn influence_at(&self, point: Vec3, subtract: f32) -> f32 {
        let d2 = self.position().distance_squared(point);
        let value = self.strength.abs() / (1.0e-6 + d2) - subtract;
        if value > 0.0 {
            value * self.strength.signum()
        } else {
            0.0
        }
    }
}

/// Clamp every axis of `position` into [buffer_zone, 1 - buffer_zone]
pub fn clamp_to_band(position: Vec3, buffer_zone: f32) -> Vec3 {
    position.clamp(Vec3::splat(buffer_zone), Vec3::splat(1.0 - buffer_zone))
}

/// Accumulator for one frame of contributors, consumed by an iso-surface extractor.
pub trait IsoSurface {
    /// Drop all contributors from the previous frame
    fn reset(&mut self, subtract: f32);

    fn add_contributor(&mut self, contributor: Contributor);

    /// Finalize the frame and trigger extraction
    fn update(&mut self);
}

/// CPU-side staging of the contributors for one frame.
///
/// The GPU volume buffers upload a batch whenever its generation advances.
#[derive(Clone, Debug, Default)]
pub struct ContributorBatch {
    contributors: Vec<Contributor>,
    subtract: f32,
    generation: u64,
}

impl ContributorBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            contributors: Vec::with_capacity(capacity),
            subtract: 0.0,
            generation: 0,
        }
    }

    pub fn contributors(&self) -> &[Contributor] {
        &self.contributors
    }

    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    pub fn subtract(&self) -> f32 {
        self.subtract
    }

    /// Incremented on every `update`
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sum of all contributions at a point in field space
    pub fn field_at(&self, point: Vec3) -> f32 {
        self.contributors
            .iter()
            .map(|c| c.influence_at(point, self.subtract))
            .sum()
    }
}

impl IsoSurface for ContributorBatch {
    fn reset(&mut self, subtract: f32) {
        self.contributors.clear();
        self.subtract = subtract;
    }

    fn add_contributor(&mut self, contributor: Contributor) {
        self.contributors.push(contributor);
    }

    fn update(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_contributor_size() {
        assert_eq!(std::mem::size_of::<Contributor>(), 16);
    }

    #[test]
    fn test_clamp_to_band() {
        let clamped = clamp_to_band(Vec3::new(-1.0, 0.5, 3.0), 0.2);
        assert_relative_eq!(clamped.x, 0.2);
        assert_relative_eq!(clamped.y, 0.5);
        assert_relative_eq!(clamped.z, 0.8);
    }

    #[test]
    fn test_influence_outside_radius_is_zero() {
        let ball = Contributor::new(Vec3::splat(0.5), 2.0);
        // radius of influence is sqrt(2 / 40) ~= 0.224
        assert_eq!(ball.influence_at(Vec3::new(0.5, 0.5, 0.8), 40.0), 0.0);
        assert!(ball.influence_at(Vec3::new(0.5, 0.5, 0.6), 40.0) > 0.0);
    }

    #[test]
    fn test_negative_strength_depresses_field() {
        let mut batch = ContributorBatch::default();
        batch.reset(40.0);
        batch.add_contributor(Contributor::new(Vec3::splat(0.5), 2.0));
        let point = Vec3::new(0.55, 0.5, 0.5);
        let before = batch.field_at(point);

        batch.add_contributor(Contributor::new(Vec3::new(0.56, 0.5, 0.5), -0.5));
        let after = batch.field_at(point);
        assert!(after < before, "cut should lower the field: {} -> {}", before, after);
    }

    #[test]
    fn test_batch_reset_and_generation() {
        let mut batch = ContributorBatch::with_capacity(4);
        batch.reset(10.0);
        batch.add_contributor(Contributor::new(Vec3::splat(0.5), 1.0));
        batch.update();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.generation(), 1);

        batch.reset(12.0);
        assert!(batch.is_empty());
        assert_eq!(batch.subtract(), 12.0);
        assert_eq!(batch.generation(), 1);
    }
}
