//! Hex geometry primitives: coordinates, directions, metrics and noise.
//!
//! Everything here is pure and free of ECS state so the map core and its
//! tests can use it directly.

pub mod coordinates;
pub mod direction;
pub mod metrics;
pub mod noise_source;

pub use coordinates::HexCoordinates;
pub use direction::HexDirection;
pub use metrics::{EdgeVertices, HexEdgeType};
pub use noise_source::{ConstantNoise, NoiseSampler, PerlinNoiseSource};
