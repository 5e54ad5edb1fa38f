use crate::cell::CellCoord;
use crate::config::GridConfig;
use glam::Vec3;

/// Fixed per-cell dimensions and label margins, in world units (one unit is one pixel at zoom 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub cell_width: u32,
    pub cell_height: u32,
    pub cell_depth: u32,
    pub depth_layers: u32,
    pub label_offset_x: u32,
    pub label_offset_y: u32,
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::from(&GridConfig::default())
    }
}

impl From<&GridConfig> for GridGeometry {
    fn from(config: &GridConfig) -> Self {
        Self {
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            cell_depth: config.cell_depth,
            depth_layers: config.depth_layers,
            label_offset_x: config.label_offset_x,
            label_offset_y: config.label_offset_y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridSize {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl GridSize {
    pub fn cell_count(self) -> u64 {
        self.x as u64 * self.y as u64 * self.z as u64
    }

    pub fn is_degenerate(self) -> bool {
        self.x == 0 || self.y == 0 || self.z == 0
    }

    pub fn axis(self, index: usize) -> u32 {
        match index {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// Grid bounds plus the cell <-> world mapping. Column index grows along +X, row index along -Y
/// (rows read downwards) and depth index along -Z (away from the viewer).
#[derive(Debug, Clone)]
pub struct CoordinateSpace {
    geometry: GridGeometry,
    size: GridSize,
}

impl CoordinateSpace {
    pub fn new(geometry: GridGeometry, viewport_width: u32, viewport_height: u32) -> Self {
        let mut space = Self { geometry, size: GridSize { x: 0, y: 0, z: geometry.depth_layers } };
        space.resize(viewport_width, viewport_height);
        space
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Re-derives the column/row counts from the viewport. Never touches cell data; cells past the
    /// new bounds simply become unreachable. Returns true if the size changed.
    pub fn resize(&mut self, viewport_width: u32, viewport_height: u32) -> bool {
        let g = &self.geometry;
        let next = GridSize {
            x: Self::fit(viewport_width, g.label_offset_x, g.cell_width),
            y: Self::fit(viewport_height, g.label_offset_y, g.cell_height),
            z: g.depth_layers,
        };
        let changed = next != self.size;
        self.size = next;
        changed
    }

    fn fit(extent: u32, margin: u32, cell: u32) -> u32 {
        if cell == 0 {
            return 0;
        }
        extent.saturating_sub(margin) / cell
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.x < self.size.x && coord.y < self.size.y && coord.z < self.size.z
    }

    /// Applies a signed delta and clamps each axis independently into bounds. Returns `None` only
    /// for a degenerate grid, where nothing is addressable.
    pub fn offset_clamped(&self, coord: CellCoord, delta: [i32; 3]) -> Option<CellCoord> {
        if self.size.is_degenerate() {
            return None;
        }
        let axes = coord.to_array();
        let mut out = [0u32; 3];
        for (i, slot) in out.iter_mut().enumerate() {
            let max = self.size.axis(i) as i64 - 1;
            *slot = (axes[i] as i64 + delta[i] as i64).clamp(0, max) as u32;
        }
        Some(CellCoord::from_array(out))
    }

    pub fn clamp(&self, coord: CellCoord) -> Option<CellCoord> {
        self.offset_clamped(coord, [0, 0, 0])
    }

    pub fn cell_extent(&self) -> Vec3 {
        Vec3::new(
            self.geometry.cell_width as f32,
            self.geometry.cell_height as f32,
            self.geometry.cell_depth as f32,
        )
    }

    /// Canonical (undistorted) centre of a cell's box.
    pub fn cell_center(&self, coord: CellCoord) -> Vec3 {
        let g = &self.geometry;
        Vec3::new(
            g.label_offset_x as f32 + (coord.x as f32 + 0.5) * g.cell_width as f32,
            -(g.label_offset_y as f32 + (coord.y as f32 + 0.5) * g.cell_height as f32),
            -(coord.z as f32) * g.cell_depth as f32,
        )
    }

    /// Distance from [`grid_center`](Self::grid_center) to the farthest cell centre, which is
    /// always one of the corner cells. Zero for a degenerate grid.
    pub fn bounding_radius(&self) -> f32 {
        let size = self.size;
        if size.x == 0 || size.y == 0 || size.z == 0 {
            return 0.0;
        }
        let center = self.grid_center();
        let mut radius: f32 = 0.0;
        for x in [0, size.x - 1] {
            for y in [0, size.y - 1] {
                for z in [0, size.z - 1] {
                    radius = radius.max(self.cell_center(CellCoord::new(x, y, z)).distance(center));
                }
            }
        }
        radius
    }

    /// Inverse of [`cell_center`](Self::cell_center) for any point inside a cell's canonical box.
    pub fn world_to_cell(&self, point: Vec3) -> Option<CellCoord> {
        let g = &self.geometry;
        if g.cell_width == 0 || g.cell_height == 0 || g.cell_depth == 0 {
            return None;
        }
        let fx = (point.x - g.label_offset_x as f32) / g.cell_width as f32;
        let fy = (-point.y - g.label_offset_y as f32) / g.cell_height as f32;
        let fz = (-point.z / g.cell_depth as f32 + 0.5).floor();
        if fx < 0.0 || fy < 0.0 || fz < 0.0 {
            return None;
        }
        let coord = CellCoord::new(fx.floor() as u32, fy.floor() as u32, fz as u32);
        self.contains(coord).then_some(coord)
    }

    /// Centre of the whole addressable cuboid; the pivot and the cameras orbit around it.
    pub fn grid_center(&self) -> Vec3 {
        let g = &self.geometry;
        let depth_span = self.size.z.saturating_sub(1) as f32 * g.cell_depth as f32;
        Vec3::new(
            g.label_offset_x as f32 + self.size.x as f32 * g.cell_width as f32 * 0.5,
            -(g.label_offset_y as f32 + self.size.y as f32 * g.cell_height as f32 * 0.5),
            -depth_span * 0.5,
        )
    }

    pub fn coords(&self) -> impl Iterator<Item = CellCoord> {
        let size = self.size;
        (0..size.z).flat_map(move |z| {
            (0..size.y).flat_map(move |y| (0..size.x).map(move |x| CellCoord::new(x, y, z)))
        })
    }

    pub fn cell_name(&self, coord: CellCoord) -> String {
        format!("{}{}[{}]", column_label(coord.x), row_label(coord.y), depth_label(coord.z))
    }
}

/// Bijective base-26: 0 -> "A", 25 -> "Z", 26 -> "AA".
pub fn column_label(index: u32) -> String {
    let mut n = index as u64 + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = ((n - 1) % 26) as u8;
        letters.push((b'A' + rem) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

pub fn row_label(index: u32) -> String {
    (index as u64 + 1).to_string()
}

/// Roman numeral of `index + 1`.
pub fn depth_label(index: u32) -> String {
    const NUMERALS: [(u64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut n = index as u64 + 1;
    let mut out = String::new();
    for (value, numeral) in NUMERALS {
        while n >= value {
            out.push_str(numeral);
            n -= value;
        }
    }
    out
}
