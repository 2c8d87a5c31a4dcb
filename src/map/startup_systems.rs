use bevy::log::{error, info};
use bevy::prelude::*;

use super::HexMapConfig;
use super::entities::{ChunkLayer, HexMap, HexMapRoot, MapMaterials, MeshLayer};
use super::grid::HexGrid;
use crate::hex::PerlinNoiseSource;
use crate::hex::metrics::{INNER_RADIUS, OUTER_RADIUS};

// ── Startup ─────────────────────────────────────────────────────────

/// Builds the [`HexMap`] resource, the layer materials, one entity per chunk
/// layer and the sun.
///
/// Chunk entities start hidden with no mesh; the first upload pass fills
/// them because every chunk starts dirty.
pub fn generate_map(
    mut commands: Commands,
    mut materials: ResMut<Assets<StandardMaterial>>,
    cfg: Res<HexMapConfig>,
) {
    let g = &cfg.grid;
    let noise = PerlinNoiseSource::new(
        g.perturb_noise_seed,
        g.perturb_noise_octaves,
        g.perturb_noise_frequency,
    );
    let mut grid = match HexGrid::initialize(g, Box::new(noise)) {
        Ok(grid) => grid,
        Err(err) => {
            error!("cannot build hex map: {err}");
            return;
        }
    };

    // Center the map on the origin.
    let width = (grid.cell_count_x() as f32 - 0.5) * INNER_RADIUS * 2.0;
    let depth = (grid.cell_count_z() as f32 - 1.0) * OUTER_RADIUS * 1.5;
    let transform = Transform::from_xyz(-width / 2.0, 0.0, -depth / 2.0);
    grid.set_transform(transform);

    let map_materials = MapMaterials {
        terrain: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            perceptual_roughness: 0.9,
            ..default()
        }),
        rivers: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.2,
            ..default()
        }),
        roads: materials.add(StandardMaterial {
            base_color: Color::WHITE,
            alpha_mode: AlphaMode::Blend,
            perceptual_roughness: 0.8,
            depth_bias: 1.0,
            ..default()
        }),
    };

    let root = commands
        .spawn((
            HexMapRoot,
            Name::new("HexMap"),
            transform,
            Visibility::default(),
        ))
        .id();

    for (chunk, _) in grid.chunks() {
        for layer in [MeshLayer::Terrain, MeshLayer::Rivers, MeshLayer::Roads] {
            let entity = commands
                .spawn((
                    ChunkLayer { chunk, layer },
                    Name::new(format!("HexGridChunk({}) {:?}", chunk.0, layer)),
                    Mesh3d::default(),
                    MeshMaterial3d(map_materials.for_layer(layer)),
                    Transform::default(),
                    Visibility::Hidden,
                ))
                .id();
            commands.entity(root).add_child(entity);
        }
    }

    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            illuminance: cfg.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(-1.0, 3.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    info!(
        "spawned {} chunk entities for a {}x{} cell map",
        grid.chunk_count() * 3,
        grid.cell_count_x(),
        grid.cell_count_z()
    );
    commands.insert_resource(map_materials);
    commands.insert_resource(HexMap { grid });
}
