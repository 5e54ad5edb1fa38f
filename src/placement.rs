use crate::cell::CellCoord;
use crate::grid::CoordinateSpace;
use crate::hyper::HyperRotation;
use glam::Vec3;
use std::collections::HashMap;

/// Coordinate-keyed index of every materialised cell and where it is currently drawn. Rebuilt
/// whenever the grid bounds change; distorted in place while 4D mode runs.
#[derive(Debug, Clone, Default)]
pub struct CellPlacements {
    positions: HashMap<CellCoord, Vec3>,
}

impl CellPlacements {
    pub fn new(space: &CoordinateSpace) -> Self {
        let mut placements = Self::default();
        placements.rebuild(space);
        placements
    }

    pub fn rebuild(&mut self, space: &CoordinateSpace) {
        self.positions.clear();
        self.positions.extend(space.coords().map(|coord| (coord, space.cell_center(coord))));
    }

    pub fn position(&self, coord: CellCoord) -> Option<Vec3> {
        self.positions.get(&coord).copied()
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.positions.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Vec3)> + '_ {
        self.positions.iter().map(|(coord, pos)| (*coord, *pos))
    }

    pub fn apply_hyper(&mut self, space: &CoordinateSpace, hyper: &HyperRotation) {
        let center = space.grid_center();
        // Unit-radius local coordinates keep the rotated `w` inside the projection distance.
        let scale = space.bounding_radius();
        for (coord, position) in self.positions.iter_mut() {
            *position = hyper.project(space.cell_center(*coord), center, scale);
        }
    }

    pub fn restore_canonical(&mut self, space: &CoordinateSpace) {
        for (coord, position) in self.positions.iter_mut() {
            *position = space.cell_center(*coord);
        }
    }
}
