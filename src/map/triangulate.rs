//! Cell state to triangles.
//!
//! Every cell emits its six inner wedges. Connections to neighbors are only
//! emitted for NE, E and SE, corners only for NE and E, so each shared edge
//! and corner appears exactly once across the grid.

use bevy::prelude::*;

use crate::hex::metrics::{self, ROAD_ELEVATION_OFFSET, TERRACE_STEPS};
use crate::hex::{EdgeVertices, HexDirection, HexEdgeType};

use super::cell::{CellId, HexCell};
use super::chunk::ChunkId;
use super::grid::HexGrid;
use super::mesh::ChunkMesh;

pub const RIVER_COLOR: LinearRgba = LinearRgba::new(0.05, 0.25, 0.6, 0.75);
pub const RIVER_FLOW_COLOR: LinearRgba = LinearRgba::new(0.3, 0.55, 0.85, 0.75);
pub const ROAD_CENTER_COLOR: LinearRgba = LinearRgba::new(0.35, 0.22, 0.12, 1.0);
pub const ROAD_EDGE_COLOR: LinearRgba = LinearRgba::new(0.35, 0.22, 0.12, 0.0);

/// Water tint along the flow coordinate `v`.
fn river_color(v: f32) -> LinearRgba {
    RIVER_COLOR.mix(&RIVER_FLOW_COLOR, v.clamp(0.0, 1.0))
}

/// Road tint across the road, `u = 1` on the center line, `0` at the rim.
fn road_color(u: f32) -> LinearRgba {
    ROAD_EDGE_COLOR.mix(&ROAD_CENTER_COLOR, u)
}

/// A corner position together with the cell it belongs to.
#[derive(Clone, Copy)]
struct CornerVertex<'a> {
    position: Vec3,
    cell: &'a HexCell,
}

/// Builds one chunk's geometry into a fresh [`ChunkMesh`].
pub struct Triangulator<'a> {
    grid: &'a HexGrid,
    mesh: ChunkMesh,
}

impl<'a> Triangulator<'a> {
    pub fn new(grid: &'a HexGrid) -> Self {
        Self {
            grid,
            mesh: ChunkMesh::default(),
        }
    }

    pub fn triangulate_chunk(mut self, chunk: ChunkId) -> ChunkMesh {
        let grid = self.grid;
        for cell in grid.chunk(chunk).cells() {
            self.triangulate_cell(cell);
        }
        self.mesh
    }

    pub fn triangulate_cell(&mut self, id: CellId) {
        let grid = self.grid;
        let cell = grid.cell(id);
        for direction in HexDirection::ALL {
            self.triangulate_wedge(direction, cell);
        }
    }

    fn triangulate_wedge(&mut self, direction: HexDirection, cell: &'a HexCell) {
        let center = cell.position();
        let mut e = EdgeVertices::new(
            center + metrics::first_solid_corner(direction),
            center + metrics::second_solid_corner(direction),
        );

        if cell.has_river() {
            if cell.has_river_through_edge(direction) {
                e.v3.y = cell.stream_bed_y();
                if cell.has_river_begin_or_end() {
                    self.triangulate_with_river_begin_or_end(cell, center, e);
                } else {
                    self.triangulate_with_river(direction, cell, center, e);
                }
            } else {
                self.triangulate_adjacent_to_river(direction, cell, center, e);
            }
        } else {
            self.triangulate_without_river(direction, cell, center, e);
        }

        if direction <= HexDirection::SE {
            self.triangulate_connection(direction, cell, e);
        }
    }

    // ── Cell interior ──────────────────────────────────────────────

    fn triangulate_without_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        center: Vec3,
        e: EdgeVertices,
    ) {
        self.triangulate_edge_fan(center, e, cell.color());

        if cell.has_roads() {
            let (left, right) = road_interpolators(direction, cell);
            self.triangulate_road(
                center,
                center.lerp(e.v1, left),
                center.lerp(e.v5, right),
                e,
                cell.has_road_through_edge(direction),
            );
        }
    }

    fn triangulate_with_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        center: Vec3,
        e: EdgeVertices,
    ) {
        let (center_l, center_r) = if cell.has_river_through_edge(direction.opposite()) {
            (
                center + metrics::first_solid_corner(direction.previous()) * 0.25,
                center + metrics::second_solid_corner(direction.next()) * 0.25,
            )
        } else if cell.has_river_through_edge(direction.next()) {
            (center, center.lerp(e.v5, 2.0 / 3.0))
        } else if cell.has_river_through_edge(direction.previous()) {
            (center.lerp(e.v1, 2.0 / 3.0), center)
        } else if cell.has_river_through_edge(direction.next2()) {
            (
                center,
                center
                    + metrics::solid_edge_middle(direction.next())
                        * (0.5 * metrics::INNER_TO_OUTER),
            )
        } else {
            (
                center
                    + metrics::solid_edge_middle(direction.previous())
                        * (0.5 * metrics::INNER_TO_OUTER),
                center,
            )
        };
        let mut center = center_l.lerp(center_r, 0.5);

        let mut m = EdgeVertices::with_outer_step(
            center_l.lerp(e.v1, 0.5),
            center_r.lerp(e.v5, 0.5),
            1.0 / 6.0,
        );
        m.v3.y = e.v3.y;
        center.y = e.v3.y;

        let color = cell.color();
        self.triangulate_edge_strip(m, color, e, color, false);
        self.terrain_triangle([center_l, m.v1, m.v2], [color; 3]);
        self.terrain_quad([center_l, center, m.v2, m.v3], [color; 4]);
        self.terrain_quad([center, center_r, m.v3, m.v4], [color; 4]);
        self.terrain_triangle([center_r, m.v4, m.v5], [color; 3]);

        let reversed = cell.incoming_river() == Some(direction);
        let y = cell.river_surface_y();
        self.triangulate_river_quad([center_l, center_r, m.v2, m.v4], y, y, 0.4, reversed);
        self.triangulate_river_quad([m.v2, m.v4, e.v2, e.v4], y, y, 0.6, reversed);
    }

    fn triangulate_with_river_begin_or_end(&mut self, cell: &HexCell, center: Vec3, e: EdgeVertices) {
        let mut m = EdgeVertices::new(center.lerp(e.v1, 0.5), center.lerp(e.v5, 0.5));
        m.v3.y = e.v3.y;

        let color = cell.color();
        self.triangulate_edge_strip(m, color, e, color, false);
        self.triangulate_edge_fan(center, m, color);

        let reversed = cell.has_incoming_river();
        let y = cell.river_surface_y();
        self.triangulate_river_quad([m.v2, m.v4, e.v2, e.v4], y, y, 0.6, reversed);

        let flow = if reversed { [0.4, 0.2, 0.2] } else { [0.4, 0.6, 0.6] };
        let tip = [center, m.v2, m.v4].map(|p| self.perturb(p.with_y(y)));
        self.mesh.rivers.add_triangle(tip, flow.map(river_color));
    }

    fn triangulate_adjacent_to_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        if cell.has_roads() {
            self.triangulate_road_adjacent_to_river(direction, cell, center, e);
        }

        if cell.has_river_through_edge(direction.next()) {
            if cell.has_river_through_edge(direction.previous()) {
                center += metrics::solid_edge_middle(direction) * (metrics::INNER_TO_OUTER * 0.5);
            } else if cell.has_river_through_edge(direction.previous2()) {
                center += metrics::first_solid_corner(direction) * 0.25;
            }
        } else if cell.has_river_through_edge(direction.previous())
            && cell.has_river_through_edge(direction.next2())
        {
            center += metrics::second_solid_corner(direction) * 0.25;
        }

        let m = EdgeVertices::new(center.lerp(e.v1, 0.5), center.lerp(e.v5, 0.5));
        self.triangulate_edge_strip(m, cell.color(), e, cell.color(), false);
        self.triangulate_edge_fan(center, m, cell.color());
    }

    // ── Connections and corners ────────────────────────────────────

    fn triangulate_connection(&mut self, direction: HexDirection, cell: &'a HexCell, e1: EdgeVertices) {
        let grid = self.grid;
        let Some(neighbor) = cell.neighbor(direction).map(|id| grid.cell(id)) else {
            return;
        };

        let mut bridge = metrics::bridge(direction);
        bridge.y = neighbor.position().y - cell.position().y;
        let mut e2 = EdgeVertices::new(e1.v1 + bridge, e1.v5 + bridge);

        if cell.has_river_through_edge(direction) {
            e2.v3.y = neighbor.stream_bed_y();
            self.triangulate_river_quad(
                [e1.v2, e1.v4, e2.v2, e2.v4],
                cell.river_surface_y(),
                neighbor.river_surface_y(),
                0.8,
                cell.incoming_river() == Some(direction),
            );
        }

        let has_road = cell.has_road_through_edge(direction);
        if cell.edge_type_with(neighbor) == HexEdgeType::Slope {
            self.triangulate_edge_terraces(e1, cell, e2, neighbor, has_road);
        } else {
            self.triangulate_edge_strip(e1, cell.color(), e2, neighbor.color(), has_road);
        }

        if direction > HexDirection::E {
            return;
        }
        let Some(next_neighbor) = cell.neighbor(direction.next()).map(|id| grid.cell(id)) else {
            return;
        };
        let mut v5 = e1.v5 + metrics::bridge(direction.next());
        v5.y = next_neighbor.position().y;

        let own = CornerVertex {
            position: e1.v5,
            cell,
        };
        let across = CornerVertex {
            position: e2.v5,
            cell: neighbor,
        };
        let next = CornerVertex {
            position: v5,
            cell: next_neighbor,
        };

        // Rotate so the lowest cell is the bottom, keeping the winding.
        if cell.elevation() <= neighbor.elevation() {
            if cell.elevation() <= next_neighbor.elevation() {
                self.triangulate_corner(own, across, next);
            } else {
                self.triangulate_corner(next, own, across);
            }
        } else if neighbor.elevation() <= next_neighbor.elevation() {
            self.triangulate_corner(across, next, own);
        } else {
            self.triangulate_corner(next, own, across);
        }
    }

    fn triangulate_edge_terraces(
        &mut self,
        begin: EdgeVertices,
        begin_cell: &HexCell,
        end: EdgeVertices,
        end_cell: &HexCell,
        has_road: bool,
    ) {
        let mut e2 = EdgeVertices::terrace_lerp(begin, end, 1);
        let mut c2 = metrics::terrace_lerp_color(begin_cell.color(), end_cell.color(), 1);
        self.triangulate_edge_strip(begin, begin_cell.color(), e2, c2, has_road);

        for step in 2..TERRACE_STEPS {
            let (e1, c1) = (e2, c2);
            e2 = EdgeVertices::terrace_lerp(begin, end, step);
            c2 = metrics::terrace_lerp_color(begin_cell.color(), end_cell.color(), step);
            self.triangulate_edge_strip(e1, c1, e2, c2, has_road);
        }

        self.triangulate_edge_strip(e2, c2, end, end_cell.color(), has_road);
    }

    fn triangulate_corner(
        &mut self,
        bottom: CornerVertex<'a>,
        left: CornerVertex<'a>,
        right: CornerVertex<'a>,
    ) {
        let left_edge = bottom.cell.edge_type_with(left.cell);
        let right_edge = bottom.cell.edge_type_with(right.cell);

        match (left_edge, right_edge) {
            (HexEdgeType::Slope, HexEdgeType::Slope) => {
                self.triangulate_corner_terraces(bottom, left, right);
            }
            (HexEdgeType::Slope, HexEdgeType::Flat) => {
                self.triangulate_corner_terraces(left, right, bottom);
            }
            (HexEdgeType::Slope, HexEdgeType::Cliff) => {
                self.triangulate_corner_terraces_cliff(bottom, left, right);
            }
            (HexEdgeType::Flat, HexEdgeType::Slope) => {
                self.triangulate_corner_terraces(right, bottom, left);
            }
            (_, HexEdgeType::Slope) => {
                self.triangulate_corner_cliff_terraces(bottom, left, right);
            }
            _ if left.cell.edge_type_with(right.cell) == HexEdgeType::Slope => {
                if left.cell.elevation() < right.cell.elevation() {
                    self.triangulate_corner_cliff_terraces(right, bottom, left);
                } else {
                    self.triangulate_corner_terraces_cliff(left, right, bottom);
                }
            }
            _ => self.terrain_triangle(
                [bottom.position, left.position, right.position],
                [bottom.cell.color(), left.cell.color(), right.cell.color()],
            ),
        }
    }

    fn triangulate_corner_terraces(
        &mut self,
        begin: CornerVertex,
        left: CornerVertex,
        right: CornerVertex,
    ) {
        let begin_color = begin.cell.color();
        let mut v3 = metrics::terrace_lerp(begin.position, left.position, 1);
        let mut v4 = metrics::terrace_lerp(begin.position, right.position, 1);
        let mut c3 = metrics::terrace_lerp_color(begin_color, left.cell.color(), 1);
        let mut c4 = metrics::terrace_lerp_color(begin_color, right.cell.color(), 1);
        self.terrain_triangle([begin.position, v3, v4], [begin_color, c3, c4]);

        for step in 2..TERRACE_STEPS {
            let (v1, v2, c1, c2) = (v3, v4, c3, c4);
            v3 = metrics::terrace_lerp(begin.position, left.position, step);
            v4 = metrics::terrace_lerp(begin.position, right.position, step);
            c3 = metrics::terrace_lerp_color(begin_color, left.cell.color(), step);
            c4 = metrics::terrace_lerp_color(begin_color, right.cell.color(), step);
            self.terrain_quad([v1, v2, v3, v4], [c1, c2, c3, c4]);
        }

        self.terrain_quad(
            [v3, v4, left.position, right.position],
            [c3, c4, left.cell.color(), right.cell.color()],
        );
    }

    fn triangulate_corner_terraces_cliff(
        &mut self,
        begin: CornerVertex,
        left: CornerVertex,
        right: CornerVertex,
    ) {
        let b = 1.0 / begin.cell.elevation().abs_diff(right.cell.elevation()) as f32;
        let boundary = self
            .perturb(begin.position)
            .lerp(self.perturb(right.position), b);
        let boundary_color = begin.cell.color().mix(&right.cell.color(), b);

        self.triangulate_boundary_triangle(begin, left, boundary, boundary_color);
        self.close_cliff_corner(left, right, boundary, boundary_color);
    }

    fn triangulate_corner_cliff_terraces(
        &mut self,
        begin: CornerVertex,
        left: CornerVertex,
        right: CornerVertex,
    ) {
        let b = 1.0 / begin.cell.elevation().abs_diff(left.cell.elevation()) as f32;
        let boundary = self
            .perturb(begin.position)
            .lerp(self.perturb(left.position), b);
        let boundary_color = begin.cell.color().mix(&left.cell.color(), b);

        self.triangulate_boundary_triangle(right, begin, boundary, boundary_color);
        self.close_cliff_corner(left, right, boundary, boundary_color);
    }

    /// Upper part of a corner split by a cliff: terraced when left and right
    /// form a slope, a single triangle otherwise.
    fn close_cliff_corner(
        &mut self,
        left: CornerVertex,
        right: CornerVertex,
        boundary: Vec3,
        boundary_color: LinearRgba,
    ) {
        if left.cell.edge_type_with(right.cell) == HexEdgeType::Slope {
            self.triangulate_boundary_triangle(left, right, boundary, boundary_color);
        } else {
            let v = [
                self.perturb(left.position),
                self.perturb(right.position),
                boundary,
            ];
            self.mesh.terrain.add_triangle(
                v,
                [left.cell.color(), right.cell.color(), boundary_color],
            );
        }
    }

    /// Terraced fan from `begin` towards `left`, collapsing on `boundary`.
    /// Inputs are perturbed here; `boundary` already is.
    fn triangulate_boundary_triangle(
        &mut self,
        begin: CornerVertex,
        left: CornerVertex,
        boundary: Vec3,
        boundary_color: LinearRgba,
    ) {
        let begin_color = begin.cell.color();
        let mut v2 = self.perturb(metrics::terrace_lerp(begin.position, left.position, 1));
        let mut c2 = metrics::terrace_lerp_color(begin_color, left.cell.color(), 1);
        let first = [self.perturb(begin.position), v2, boundary];
        self.mesh
            .terrain
            .add_triangle(first, [begin_color, c2, boundary_color]);

        for step in 2..TERRACE_STEPS {
            let (v1, c1) = (v2, c2);
            v2 = self.perturb(metrics::terrace_lerp(begin.position, left.position, step));
            c2 = metrics::terrace_lerp_color(begin_color, left.cell.color(), step);
            self.mesh
                .terrain
                .add_triangle([v1, v2, boundary], [c1, c2, boundary_color]);
        }

        let last = [v2, self.perturb(left.position), boundary];
        self.mesh
            .terrain
            .add_triangle(last, [c2, left.cell.color(), boundary_color]);
    }

    // ── Strips and fans ────────────────────────────────────────────

    fn triangulate_edge_fan(&mut self, center: Vec3, edge: EdgeVertices, color: LinearRgba) {
        self.terrain_triangle([center, edge.v1, edge.v2], [color; 3]);
        self.terrain_triangle([center, edge.v2, edge.v3], [color; 3]);
        self.terrain_triangle([center, edge.v3, edge.v4], [color; 3]);
        self.terrain_triangle([center, edge.v4, edge.v5], [color; 3]);
    }

    fn triangulate_edge_strip(
        &mut self,
        e1: EdgeVertices,
        c1: LinearRgba,
        e2: EdgeVertices,
        c2: LinearRgba,
        has_road: bool,
    ) {
        let colors = [c1, c1, c2, c2];
        self.terrain_quad([e1.v1, e1.v2, e2.v1, e2.v2], colors);
        self.terrain_quad([e1.v2, e1.v3, e2.v2, e2.v3], colors);
        self.terrain_quad([e1.v3, e1.v4, e2.v3, e2.v4], colors);
        self.terrain_quad([e1.v4, e1.v5, e2.v4, e2.v5], colors);

        if has_road {
            self.triangulate_road_segment([e1.v2, e1.v3, e1.v4], [e2.v2, e2.v3, e2.v4]);
        }
    }

    // ── Rivers ─────────────────────────────────────────────────────

    /// River surface quad; `v1 v2` sit at `y1`, `v3 v4` at `y2`. `flow`
    /// positions the quad along the river for shading.
    fn triangulate_river_quad(
        &mut self,
        v: [Vec3; 4],
        y1: f32,
        y2: f32,
        flow: f32,
        reversed: bool,
    ) {
        let [v1, v2, v3, v4] = v;
        let positions = [v1.with_y(y1), v2.with_y(y1), v3.with_y(y2), v4.with_y(y2)]
            .map(|p| self.perturb(p));
        let (near, far) = if reversed {
            (0.8 - flow, 0.6 - flow)
        } else {
            (flow, flow + 0.2)
        };
        self.mesh.rivers.add_quad(
            positions,
            [river_color(near), river_color(near), river_color(far), river_color(far)],
        );
    }

    // ── Roads ──────────────────────────────────────────────────────

    fn triangulate_road(
        &mut self,
        center: Vec3,
        m_l: Vec3,
        m_r: Vec3,
        e: EdgeVertices,
        has_road_through_edge: bool,
    ) {
        if has_road_through_edge {
            let m_c = m_l.lerp(m_r, 0.5);
            self.triangulate_road_segment([m_l, m_c, m_r], [e.v2, e.v3, e.v4]);
            self.road_triangle([center, m_l, m_c], [1.0, 0.0, 1.0]);
            self.road_triangle([center, m_c, m_r], [1.0, 1.0, 0.0]);
        } else {
            self.triangulate_road_edge(center, m_l, m_r);
        }
    }

    fn triangulate_road_edge(&mut self, center: Vec3, m_l: Vec3, m_r: Vec3) {
        self.road_triangle([center, m_l, m_r], [1.0, 0.0, 0.0]);
    }

    /// Two quads from the near triple to the far triple; the middle vertex of
    /// each triple is the road's center line.
    fn triangulate_road_segment(&mut self, near: [Vec3; 3], far: [Vec3; 3]) {
        self.road_quad([near[0], near[1], far[0], far[1]], [0.0, 1.0]);
        self.road_quad([near[1], near[2], far[1], far[2]], [1.0, 0.0]);
    }

    fn triangulate_road_adjacent_to_river(
        &mut self,
        direction: HexDirection,
        cell: &HexCell,
        mut center: Vec3,
        e: EdgeVertices,
    ) {
        let has_road_through_edge = cell.has_road_through_edge(direction);
        let previous_has_river = cell.has_river_through_edge(direction.previous());
        let next_has_river = cell.has_river_through_edge(direction.next());
        let (left, right) = road_interpolators(direction, cell);
        let mut road_center = center;

        if cell.has_river_begin_or_end() {
            if let Some(river) = cell.river_begin_or_end_direction() {
                road_center += metrics::solid_edge_middle(river.opposite()) * (1.0 / 3.0);
            }
        } else if let (Some(incoming), Some(outgoing)) =
            (cell.incoming_river(), cell.outgoing_river())
        {
            if incoming == outgoing.opposite() {
                // Straight river: the road stays on one bank.
                let corner = if previous_has_river {
                    if !has_road_through_edge && !cell.has_road_through_edge(direction.next()) {
                        return;
                    }
                    metrics::second_solid_corner(direction)
                } else {
                    if !has_road_through_edge && !cell.has_road_through_edge(direction.previous())
                    {
                        return;
                    }
                    metrics::first_solid_corner(direction)
                };
                road_center += corner * 0.5;
                center += corner * 0.25;
            } else if incoming == outgoing.previous() {
                road_center -= metrics::second_corner(incoming) * 0.2;
            } else if incoming == outgoing.next() {
                road_center -= metrics::first_corner(incoming) * 0.2;
            } else if previous_has_river && next_has_river {
                if !has_road_through_edge {
                    return;
                }
                let offset = metrics::solid_edge_middle(direction) * metrics::INNER_TO_OUTER;
                road_center += offset * 0.7;
                center += offset * 0.5;
            } else {
                let middle = if previous_has_river {
                    direction.next()
                } else if next_has_river {
                    direction.previous()
                } else {
                    direction
                };
                if !cell.has_road_through_edge(middle)
                    && !cell.has_road_through_edge(middle.previous())
                    && !cell.has_road_through_edge(middle.next())
                {
                    return;
                }
                road_center += metrics::solid_edge_middle(middle) * 0.25;
            }
        }

        let m_l = road_center.lerp(e.v1, left);
        let m_r = road_center.lerp(e.v5, right);
        self.triangulate_road(road_center, m_l, m_r, e, has_road_through_edge);
        if previous_has_river {
            self.triangulate_road_edge(road_center, center, m_l);
        }
        if next_has_river {
            self.triangulate_road_edge(road_center, m_r, center);
        }
    }

    // ── Emitters ───────────────────────────────────────────────────

    fn perturb(&self, position: Vec3) -> Vec3 {
        metrics::perturb(self.grid.noise(), position)
    }

    fn terrain_triangle(&mut self, v: [Vec3; 3], colors: [LinearRgba; 3]) {
        let v = v.map(|p| self.perturb(p));
        self.mesh.terrain.add_triangle(v, colors);
    }

    fn terrain_quad(&mut self, v: [Vec3; 4], colors: [LinearRgba; 4]) {
        let v = v.map(|p| self.perturb(p));
        self.mesh.terrain.add_quad(v, colors);
    }

    /// Roads are not perturbed, only lifted slightly above the surface.
    fn road_vertex(position: Vec3) -> Vec3 {
        position + Vec3::Y * ROAD_ELEVATION_OFFSET
    }

    fn road_triangle(&mut self, v: [Vec3; 3], u: [f32; 3]) {
        let v = v.map(Self::road_vertex);
        self.mesh.roads.add_triangle(v, u.map(road_color));
    }

    /// `u` is the cross-road coordinate of the first and second column.
    fn road_quad(&mut self, v: [Vec3; 4], u: [f32; 2]) {
        let v = v.map(Self::road_vertex);
        let colors = [u[0], u[1], u[0], u[1]].map(road_color);
        self.mesh.roads.add_quad(v, colors);
    }
}

/// How far along the wedge's sides the road reaches: halfway where a road
/// leaves through the edge or a side neighbor edge, a quarter otherwise.
fn road_interpolators(direction: HexDirection, cell: &HexCell) -> (f32, f32) {
    if cell.has_road_through_edge(direction) {
        return (0.5, 0.5);
    }
    let reach = |d: HexDirection| if cell.has_road_through_edge(d) { 0.5 } else { 0.25 };
    (reach(direction.previous()), reach(direction.next()))
}
