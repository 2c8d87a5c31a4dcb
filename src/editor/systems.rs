use bevy::log::trace;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContext, egui};

use super::EditorConfig;
use super::entities::{Brush, DragState, EditorUi, OptionalToggle, PALETTE, drag_direction};
use crate::camera::MapCamera;
use crate::map::{ChunkLayer, HexMap, MeshLayer};

// ── Update: picking ────────────────────────────────────────────────

/// Applies the brush to the terrain cell under the cursor while the left
/// button is held, tracking the previous cell to detect drags.
#[allow(clippy::too_many_arguments)]
pub fn handle_input(
    buttons: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    layers: Query<&ChunkLayer>,
    mut ray_cast: MeshRayCast,
    map: Option<ResMut<HexMap>>,
    brush: Res<Brush>,
    ui: Res<EditorUi>,
    mut drag: ResMut<DragState>,
) {
    let Some(mut map) = map else { return };
    if !buttons.pressed(MouseButton::Left) || ui.pointer_over_ui {
        drag.previous = None;
        return;
    }
    let Ok(window) = windows.single() else { return };
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        drag.previous = None;
        return;
    };
    let Ok(ray) = camera.viewport_to_world(cam_gt, cursor) else {
        return;
    };

    let terrain_only = |entity: Entity| {
        layers
            .get(entity)
            .is_ok_and(|l| l.layer == MeshLayer::Terrain)
    };
    let settings = MeshRayCastSettings::default().with_filter(&terrain_only);
    let Some((_, hit)) = ray_cast.cast_ray(ray, &settings).first() else {
        drag.previous = None;
        return;
    };
    let Ok(current) = map.grid.cell_at(hit.point) else {
        drag.previous = None;
        return;
    };

    let direction = drag
        .previous
        .filter(|&previous| previous != current)
        .and_then(|previous| drag_direction(&map.grid, previous, current));
    if let Some(d) = direction {
        trace!("drag {:?} into {}", d, map.grid.cell(current).coordinates());
    }
    brush.apply(&mut map.grid, current, direction);
    drag.previous = Some(current);
}

/// Fans the brush's label toggle out to every chunk.
pub fn sync_label_visibility(brush: Res<Brush>, map: Option<ResMut<HexMap>>) {
    let Some(mut map) = map else { return };
    if !brush.is_changed() {
        return;
    }
    map.grid.show_labels(brush.show_labels);
}

// ── Egui pass ──────────────────────────────────────────────────────

/// Side panel editing the [`Brush`].
pub fn draw_brush_panel(
    mut egui_ctx: Query<&mut EguiContext>,
    mut brush: ResMut<Brush>,
    mut ui_state: ResMut<EditorUi>,
    cfg: Res<EditorConfig>,
) {
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let ctx = ctx.get_mut();

    egui::SidePanel::left("brush")
        .resizable(false)
        .default_width(cfg.panel_width)
        .show(ctx, |ui| {
            ui.heading("Brush");

            ui.separator();
            ui.label("Color");
            ui.radio_value(&mut brush.color, None, "Keep");
            for (name, color) in PALETTE {
                ui.radio_value(&mut brush.color, Some(color), name);
            }

            ui.separator();
            ui.checkbox(&mut brush.apply_elevation, "Elevation");
            ui.add_enabled(
                brush.apply_elevation,
                egui::Slider::new(&mut brush.elevation, -1..=6),
            );

            ui.separator();
            ui.label("Brush size");
            ui.add(egui::Slider::new(&mut brush.size, 0..=4));

            ui.separator();
            toggle_row(ui, "River", &mut brush.river);
            toggle_row(ui, "Road", &mut brush.road);

            ui.separator();
            ui.checkbox(&mut brush.show_labels, "Labels");
        });

    ui_state.pointer_over_ui = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
}

fn toggle_row(ui: &mut egui::Ui, label: &str, value: &mut OptionalToggle) {
    ui.label(label);
    ui.horizontal(|ui| {
        ui.radio_value(value, OptionalToggle::Ignore, "Ignore");
        ui.radio_value(value, OptionalToggle::Yes, "Yes");
        ui.radio_value(value, OptionalToggle::No, "No");
    });
}

/// Draws each cell's coordinates as a screen-projected egui label, for chunks
/// with labels switched on.
pub fn draw_cell_labels(
    mut egui_ctx: Query<&mut EguiContext>,
    camera_q: Query<(&Camera, &GlobalTransform), With<MapCamera>>,
    map: Option<Res<HexMap>>,
    cfg: Res<EditorConfig>,
) {
    let Some(map) = map else { return };
    let Ok((camera, cam_gt)) = camera_q.single() else {
        return;
    };
    let Ok(mut ctx) = egui_ctx.single_mut() else {
        return;
    };
    let cam_pos = cam_gt.translation();

    let painter = ctx.get_mut().layer_painter(egui::LayerId::background());

    for (_, chunk) in map.grid.chunks() {
        if !chunk.labels_visible() {
            continue;
        }
        for id in chunk.cells() {
            let world_pos = map.grid.world_position(id);
            if cam_pos.distance(world_pos) > cfg.label_distance {
                continue;
            }
            if let Ok(viewport) = camera.world_to_viewport(cam_gt, world_pos) {
                painter.text(
                    egui::pos2(viewport.x, viewport.y),
                    egui::Align2::CENTER_CENTER,
                    map.grid.cell(id).label(),
                    egui::FontId::proportional(cfg.label_font_size),
                    egui::Color32::WHITE,
                );
            }
        }
    }
}
