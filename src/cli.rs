//! Command-line overrides for the map configuration.

use clap::Parser;

use crate::map::{HexMapConfig, ReliefMode};

/// Hex map editor command-line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "hex-map", about = "Hex map editor")]
pub struct Cli {
    /// Number of chunks along x.
    #[arg(long)]
    pub chunks_x: Option<usize>,

    /// Number of chunks along z.
    #[arg(long)]
    pub chunks_z: Option<usize>,

    /// Seed for the height field and the perturbation noise.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Start from a flat map instead of banded relief.
    #[arg(long)]
    pub flat: bool,
}

impl Cli {
    /// Apply CLI overrides to a map config.
    pub fn apply(&self, config: &mut HexMapConfig) {
        let grid = &mut config.grid;
        if let Some(x) = self.chunks_x {
            grid.chunk_count_x = x;
        }
        if let Some(z) = self.chunks_z {
            grid.chunk_count_z = z;
        }
        if let Some(seed) = self.seed {
            grid.height_noise_seed = seed;
            grid.perturb_noise_seed = seed.wrapping_add(1);
        }
        if self.flat {
            grid.relief = ReliefMode::Flat;
        }
    }
}
