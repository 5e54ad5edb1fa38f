use crate::cell::{format_number, CellCoord, CellStore};
use crate::grid::CoordinateSpace;
use crate::selection::{RegionBounds, Selection};

#[derive(Debug, Clone, PartialEq)]
pub struct AutoSumResult {
    pub target: CellCoord,
    pub sum: f64,
    pub text: String,
}

/// Sum of every numeric cell in the region; anything non-numeric counts as zero.
pub fn region_sum(store: &CellStore, bounds: &RegionBounds) -> f64 {
    bounds.cells().filter_map(|coord| store.get(coord).numeric_value()).sum()
}

/// The cell directly below the region, in its first column and front layer.
pub fn target_below(space: &CoordinateSpace, bounds: &RegionBounds) -> Option<CellCoord> {
    let below = bounds.max_y.checked_add(1)?;
    let target = CellCoord::new(bounds.min_x, below, bounds.min_z);
    space.contains(target).then_some(target)
}

/// Writes the region sum into the cell below and selects it. Without room below the grid,
/// nothing is written and the selection is left alone.
pub fn apply(store: &mut CellStore, selection: &mut Selection, space: &CoordinateSpace) -> Option<AutoSumResult> {
    let bounds = selection.bounds()?;
    let target = target_below(space, &bounds)?;
    let sum = region_sum(store, &bounds);
    let text = format_number(sum);
    store.set_text(target, text.clone());
    selection.move_to(target);
    log::debug!("[autosum] {} cells -> {target} = {text}", bounds.cell_count());
    Some(AutoSumResult { target, sum, text })
}
