use bevy::prelude::*;
use hexx::shapes;

use crate::hex::HexDirection;
use crate::map::{CellId, HexGrid};

/// Colors offered by the brush panel.
pub const PALETTE: [(&str, LinearRgba); 4] = [
    ("Sand", LinearRgba::rgb(1.0, 0.92, 0.016)),
    ("Grass", LinearRgba::rgb(0.0, 1.0, 0.0)),
    ("Water", LinearRgba::rgb(0.0, 0.0, 1.0)),
    ("Snow", LinearRgba::rgb(1.0, 1.0, 1.0)),
];

/// Three-way brush switch for a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Reflect)]
pub enum OptionalToggle {
    /// Leave the feature alone.
    #[default]
    Ignore,
    /// Add the feature when dragging.
    Yes,
    /// Remove the feature from every brushed cell.
    No,
}

/// What a click applies to the cells under the brush.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct Brush {
    /// Color to paint, `None` keeps cell colors.
    pub color: Option<LinearRgba>,
    pub apply_elevation: bool,
    pub elevation: i32,
    /// Hex radius of the brush; 0 edits a single cell.
    pub size: u32,
    pub river: OptionalToggle,
    pub road: OptionalToggle,
    pub show_labels: bool,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            color: Some(PALETTE[1].1),
            apply_elevation: true,
            elevation: 1,
            size: 0,
            river: OptionalToggle::Ignore,
            road: OptionalToggle::Ignore,
            show_labels: false,
        }
    }
}

impl Brush {
    /// Cells within `size` steps of `center` that exist in the grid.
    pub fn cells(&self, grid: &HexGrid, center: CellId) -> Vec<CellId> {
        let center = grid.cell(center).coordinates().hex();
        shapes::hexagon(center, self.size)
            .filter_map(|hex| grid.cell_by_coordinates(hex.into()))
            .collect()
    }

    /// Edits every brushed cell. `drag` is the direction the pointer moved
    /// in to reach `center`, if it came from a neighbor.
    pub fn apply(&self, grid: &mut HexGrid, center: CellId, drag: Option<HexDirection>) {
        for cell in self.cells(grid, center) {
            self.edit_cell(grid, cell, drag);
        }
    }

    fn edit_cell(&self, grid: &mut HexGrid, cell: CellId, drag: Option<HexDirection>) {
        if let Some(color) = self.color {
            grid.set_color(cell, color);
        }
        if self.apply_elevation {
            grid.set_elevation(cell, self.elevation);
        }
        if self.river == OptionalToggle::No {
            grid.remove_river(cell);
        }
        if self.road == OptionalToggle::No {
            grid.remove_roads(cell);
        }

        let Some(direction) = drag else { return };
        let Some(from) = grid.neighbor(cell, direction.opposite()) else {
            return;
        };
        if self.river == OptionalToggle::Yes {
            grid.set_outgoing_river(from, direction);
        }
        if self.road == OptionalToggle::Yes {
            grid.add_road(from, direction);
        }
    }
}

/// Direction from `previous` to `current` when they are neighbors.
pub fn drag_direction(grid: &HexGrid, previous: CellId, current: CellId) -> Option<HexDirection> {
    HexDirection::ALL
        .into_iter()
        .find(|&d| grid.neighbor(previous, d) == Some(current))
}

/// Cell under the pointer on the previous frame while the button is held.
#[derive(Resource, Default)]
pub struct DragState {
    pub previous: Option<CellId>,
}

/// Set by the panel pass so picking ignores clicks on the UI.
#[derive(Resource, Default)]
pub struct EditorUi {
    pub pointer_over_ui: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::ConstantNoise;
    use crate::map::{GridSettings, ReliefMode};

    fn grid() -> HexGrid {
        let settings = GridSettings {
            chunk_count_x: 1,
            chunk_count_z: 1,
            relief: ReliefMode::Flat,
            ..GridSettings::default()
        };
        HexGrid::initialize(&settings, Box::new(ConstantNoise::NEUTRAL)).expect("valid settings")
    }

    fn idle_brush() -> Brush {
        Brush {
            color: None,
            apply_elevation: false,
            ..Brush::default()
        }
    }

    fn at(grid: &HexGrid, x: i32, z: i32) -> CellId {
        grid.cell_by_offset(x, z).expect("cell in grid")
    }

    // ── drag detection ─────────────────────────────────────────────

    #[test]
    fn drag_between_neighbors_has_a_direction() {
        let grid = grid();
        let a = at(&grid, 2, 2);
        for d in HexDirection::ALL {
            let b = grid.neighbor(a, d).unwrap();
            assert_eq!(drag_direction(&grid, a, b), Some(d));
        }
    }

    #[test]
    fn jump_between_distant_cells_is_not_a_drag() {
        let grid = grid();
        assert_eq!(drag_direction(&grid, at(&grid, 0, 0), at(&grid, 3, 3)), None);
        assert_eq!(drag_direction(&grid, at(&grid, 1, 1), at(&grid, 1, 1)), None);
    }

    // ── brush shape ────────────────────────────────────────────────

    #[test]
    fn brush_sizes_cover_hex_rings() {
        let grid = grid();
        let center = at(&grid, 2, 2);
        let mut brush = idle_brush();
        assert_eq!(brush.cells(&grid, center), vec![center]);
        brush.size = 1;
        assert_eq!(brush.cells(&grid, center).len(), 7);
        brush.size = 2;
        assert_eq!(brush.cells(&grid, center).len(), 19);
    }

    #[test]
    fn brush_is_clipped_at_the_grid_border() {
        let grid = grid();
        let brush = Brush {
            size: 1,
            ..idle_brush()
        };
        // Bottom-left corner: itself, E, NE only.
        assert_eq!(brush.cells(&grid, at(&grid, 0, 0)).len(), 3);
    }

    // ── brush application ──────────────────────────────────────────

    #[test]
    fn brush_paints_color_and_elevation() {
        let mut grid = grid();
        let center = at(&grid, 2, 2);
        let red = LinearRgba::rgb(1.0, 0.0, 0.0);
        let brush = Brush {
            color: Some(red),
            apply_elevation: true,
            elevation: 3,
            size: 1,
            ..Brush::default()
        };
        brush.apply(&mut grid, center, None);
        for id in brush.cells(&grid, center) {
            assert_eq!(grid.cell(id).color(), red);
            assert_eq!(grid.cell(id).elevation(), 3);
        }
        assert_eq!(grid.cell(at(&grid, 0, 0)).elevation(), 0);
    }

    #[test]
    fn dragging_draws_rivers_and_roads_from_the_previous_cell() {
        let mut grid = grid();
        let from = at(&grid, 1, 2);
        let to = grid.neighbor(from, HexDirection::E).unwrap();
        let brush = Brush {
            river: OptionalToggle::Yes,
            ..idle_brush()
        };
        let drag = drag_direction(&grid, from, to);
        brush.apply(&mut grid, to, drag);
        assert_eq!(grid.cell(from).outgoing_river(), Some(HexDirection::E));
        assert_eq!(grid.cell(to).incoming_river(), Some(HexDirection::W));

        let up = grid.neighbor(to, HexDirection::NE).unwrap();
        let brush = Brush {
            road: OptionalToggle::Yes,
            ..idle_brush()
        };
        let drag = drag_direction(&grid, to, up);
        brush.apply(&mut grid, up, drag);
        assert!(grid.cell(to).has_road_through_edge(HexDirection::NE));
        assert!(grid.cell(up).has_road_through_edge(HexDirection::SW));
    }

    #[test]
    fn no_toggles_strip_features() {
        let mut grid = grid();
        let a = at(&grid, 2, 2);
        let e = grid.neighbor(a, HexDirection::E).unwrap();
        grid.set_outgoing_river(a, HexDirection::E);
        grid.add_road(a, HexDirection::W);

        let brush = Brush {
            river: OptionalToggle::No,
            road: OptionalToggle::No,
            ..idle_brush()
        };
        brush.apply(&mut grid, a, None);
        assert!(!grid.cell(a).has_river());
        assert!(!grid.cell(e).has_river());
        assert!(!grid.cell(a).has_roads());
    }

    #[test]
    fn ignore_toggles_leave_features_alone() {
        let mut grid = grid();
        let a = at(&grid, 2, 2);
        grid.set_outgoing_river(a, HexDirection::E);
        grid.add_road(a, HexDirection::W);
        idle_brush().apply(&mut grid, a, None);
        assert!(grid.cell(a).has_river());
        assert!(grid.cell(a).has_roads());
    }
}
