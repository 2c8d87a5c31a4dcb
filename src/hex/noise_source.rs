use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::math;

/// Deterministic four-channel noise used to perturb cell heights and mesh
/// vertices.
///
/// `uv` is a planar position already scaled by
/// [`NOISE_SCALE`](super::metrics::NOISE_SCALE). Every channel of the result
/// lies in `[0, 1]`, and equal inputs give equal outputs for the lifetime of
/// the sampler.
pub trait NoiseSampler: Send + Sync {
    fn sample(&self, uv: Vec2) -> Vec4;
}

/// Four independent fBm Perlin fields, one per channel.
pub struct PerlinNoiseSource {
    channels: [Fbm<Perlin>; 4],
    frequency: f64,
}

impl PerlinNoiseSource {
    /// `frequency` is the number of noise features per unit of `uv`.
    pub fn new(seed: u32, octaves: usize, frequency: f64) -> Self {
        let channels = std::array::from_fn(|i| {
            Fbm::<Perlin>::new(seed.wrapping_add(i as u32)).set_octaves(octaves)
        });
        Self {
            channels,
            frequency,
        }
    }
}

impl NoiseSampler for PerlinNoiseSource {
    fn sample(&self, uv: Vec2) -> Vec4 {
        let p = [uv.x as f64 * self.frequency, uv.y as f64 * self.frequency];
        let [x, y, z, w] = std::array::from_fn(|i| {
            math::map_noise_to_range(self.channels[i].get(p), 0.0, 1.0).clamp(0.0, 1.0)
        });
        Vec4::new(x, y, z, w)
    }
}

/// A sampler returning the same value everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise(pub Vec4);

impl ConstantNoise {
    /// Mid-range noise: perturbation helpers leave positions untouched.
    pub const NEUTRAL: Self = Self(Vec4::splat(0.5));
}

impl NoiseSampler for ConstantNoise {
    fn sample(&self, _uv: Vec2) -> Vec4 {
        self.0
    }
}
