use crate::camera_rig::{CameraFrame, ProjectionMode};
use crate::cell::{CellColor, CellCoord, CellRecord, CellStore};
use crate::grid::{column_label, depth_label, row_label, GridSize};
use crate::placement::CellPlacements;
use crate::selection::RegionBounds;
use anyhow::Result;
use glam::{Mat4, Vec3};

const SELECTED_FILL: CellColor = CellColor::rgb(0x8a, 0xb4, 0xf8);
const EDITING_FILL: CellColor = CellColor::rgb(0xff, 0xf2, 0xa8);
const DEFAULT_FILL: CellColor = CellColor::rgb(0xff, 0xff, 0xff);

/// Per-cell draw data. `model` already includes the pivot rotation and the cell box scale.
#[derive(Debug, Clone, Copy)]
pub struct CellInstance<'a> {
    pub coord: CellCoord,
    pub model: Mat4,
    pub fill: CellColor,
    pub record: &'a CellRecord,
    pub selected: bool,
    pub editing: bool,
}

/// Axis labels for the label strips around the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridLabels {
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    pub layers: Vec<String>,
}

impl GridLabels {
    pub fn for_size(size: GridSize) -> Self {
        Self {
            columns: (0..size.x).map(column_label).collect(),
            rows: (0..size.y).map(row_label).collect(),
            layers: (0..size.z).map(depth_label).collect(),
        }
    }
}

/// Read-only view of everything a renderer needs for one frame.
pub struct FrameView<'a> {
    pub frame: u64,
    pub grid: GridSize,
    pub cell_extent: Vec3,
    pub placements: &'a CellPlacements,
    pub store: &'a CellStore,
    pub selection: Option<RegionBounds>,
    pub editing: Option<CellCoord>,
    pub camera: CameraFrame,
    pub labels: &'a GridLabels,
}

impl<'a> FrameView<'a> {
    pub fn mode(&self) -> ProjectionMode {
        self.camera.mode
    }

    pub fn is_stereo(&self) -> bool {
        self.camera.stereo.is_some()
    }

    /// Every placed cell, including empty ones; the grid draws all boxes.
    pub fn cells(&self) -> impl Iterator<Item = CellInstance<'a>> + '_ {
        let scale = Mat4::from_scale(self.cell_extent);
        self.placements.iter().map(move |(coord, position)| {
            let record = self.store.get(coord);
            let selected = self.selection.is_some_and(|b| b.contains(coord));
            let editing = self.editing == Some(coord);
            let fill = if editing {
                EDITING_FILL
            } else if selected {
                SELECTED_FILL
            } else {
                record.background_color.unwrap_or(DEFAULT_FILL)
            };
            CellInstance {
                coord,
                model: self.camera.pivot * Mat4::from_translation(position) * scale,
                fill,
                record,
                selected,
                editing,
            }
        })
    }
}

/// Draws frames. Implementations own their surface and GPU state; the core only hands over a
/// [`FrameView`].
pub trait Renderer {
    fn render(&mut self, frame: &FrameView) -> Result<()>;
}

/// Renderer that draws nothing. Walks the frame so instance construction stays exercised, and
/// reports a summary at debug level.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    frames: u64,
    last_instances: usize,
    last_with_text: usize,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn last_instance_count(&self) -> usize {
        self.last_instances
    }

    pub fn last_text_count(&self) -> usize {
        self.last_with_text
    }
}

impl Renderer for HeadlessRenderer {
    fn render(&mut self, frame: &FrameView) -> Result<()> {
        let mut instances = 0;
        let mut with_text = 0;
        for cell in frame.cells() {
            instances += 1;
            if cell.record.has_content() {
                with_text += 1;
            }
        }
        self.frames += 1;
        self.last_instances = instances;
        self.last_with_text = with_text;
        if frame.frame % 120 == 0 {
            log::debug!(
                "[render] frame {} mode={} grid={}x{}x{} cells={} text={} stereo={}",
                frame.frame,
                frame.mode().label(),
                frame.grid.x,
                frame.grid.y,
                frame.grid.z,
                instances,
                with_text,
                frame.is_stereo()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera_rig::CameraRig;
    use crate::config::CameraConfig;
    use crate::grid::{CoordinateSpace, GridGeometry};
    use winit::dpi::PhysicalSize;

    #[test]
    fn headless_counts_cells_and_highlights_selection() {
        let space = CoordinateSpace::new(GridGeometry::default(), 360, 160);
        let placements = CellPlacements::new(&space);
        let mut store = CellStore::new();
        store.set_text(CellCoord::new(1, 1, 0), "x");
        let rig = CameraRig::new(&CameraConfig::default(), PhysicalSize::new(360, 160), space.grid_center());
        let labels = GridLabels::for_size(space.size());
        let selection = Some(RegionBounds::from_corners(CellCoord::ORIGIN, CellCoord::ORIGIN));
        let view = FrameView {
            frame: 1,
            grid: space.size(),
            cell_extent: space.cell_extent(),
            placements: &placements,
            store: &store,
            selection,
            editing: None,
            camera: rig.frame(),
            labels: &labels,
        };
        let selected: Vec<_> = view.cells().filter(|c| c.selected).map(|c| c.coord).collect();
        assert_eq!(selected, vec![CellCoord::ORIGIN]);

        let mut renderer = HeadlessRenderer::new();
        renderer.render(&view).expect("headless render");
        assert_eq!(renderer.frames_rendered(), 1);
        assert_eq!(renderer.last_instance_count(), placements.len());
        assert_eq!(renderer.last_text_count(), 1);
        assert_eq!(labels.columns, vec!["A", "B", "C"]);
        assert_eq!(labels.layers.first().map(String::as_str), Some("I"));
    }
}
