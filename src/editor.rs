//! Map editor: brush panel, cell picking and coordinate labels.
//!
//! Left mouse paints the brush onto the cell under the cursor. Dragging from
//! one cell into its neighbor draws rivers or roads across the shared edge
//! when the brush asks for them.

mod entities;
mod systems;

pub use entities::{Brush, DragState, EditorUi, OptionalToggle, PALETTE, drag_direction};

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::GameState;

/// Per-plugin configuration for the editor.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct EditorConfig {
    /// Brush the editor starts with.
    pub brush: Brush,
    /// Labels further than this from the camera are not drawn.
    pub label_distance: f32,
    /// Label font size in points.
    pub label_font_size: f32,
    /// Width of the brush side panel.
    pub panel_width: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            brush: Brush::default(),
            label_distance: 120.0,
            label_font_size: 10.0,
            panel_width: 180.0,
        }
    }
}

/// Brush editing and label overlay, active while [`GameState::Editing`].
pub struct EditorPlugin(pub EditorConfig);

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<EditorConfig>()
            .register_type::<Brush>()
            .insert_resource(self.0.clone())
            .insert_resource(self.0.brush.clone())
            .init_resource::<DragState>()
            .init_resource::<EditorUi>()
            .add_systems(
                Update,
                (systems::handle_input, systems::sync_label_visibility)
                    .run_if(in_state(GameState::Editing)),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (systems::draw_brush_panel, systems::draw_cell_labels)
                    .run_if(in_state(GameState::Editing)),
            );
    }
}
