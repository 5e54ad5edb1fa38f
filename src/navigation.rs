use crate::cell::CellCoord;
use crate::grid::CoordinateSpace;
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrowKey {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridAxis {
    Column,
    Row,
    Depth,
}

impl GridAxis {
    fn index(self) -> usize {
        match self {
            GridAxis::Column => 0,
            GridAxis::Row => 1,
            GridAxis::Depth => 2,
        }
    }
}

/// Signed unit step on at most one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellDelta(pub [i32; 3]);

impl CellDelta {
    pub const NONE: CellDelta = CellDelta([0, 0, 0]);

    pub fn along(axis: GridAxis, sign: i32) -> Self {
        let mut delta = [0; 3];
        delta[axis.index()] = sign.signum();
        Self(delta)
    }

    pub fn is_zero(self) -> bool {
        self.0 == [0, 0, 0]
    }
}

/// Decides which grid axis the horizontal arrow keys walk, given the pivot yaw in radians.
/// Returns the axis and the sign that "Right" maps to.
pub trait AxisPolicy: Send + Sync {
    fn horizontal_axis(&self, yaw: f32) -> (GridAxis, i32);
}

/// Left/Right always walk columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedAxisPolicy;

impl AxisPolicy for FixedAxisPolicy {
    fn horizontal_axis(&self, _yaw: f32) -> (GridAxis, i32) {
        (GridAxis::Column, 1)
    }
}

/// Left/Right walk whichever of the column or depth axes currently points most nearly along
/// screen-right once the pivot yaw is applied. Side-on views therefore step through layers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenAlignedPolicy;

impl AxisPolicy for ScreenAlignedPolicy {
    fn horizontal_axis(&self, yaw: f32) -> (GridAxis, i32) {
        let yaw = crate::wrap_angle(yaw);
        // Screen-right components of the rotated column axis (+X) and depth axis (-Z).
        let column = yaw.cos();
        let depth = -yaw.sin();
        if column.abs() >= depth.abs() {
            (GridAxis::Column, if column >= 0.0 { 1 } else { -1 })
        } else {
            (GridAxis::Depth, if depth >= 0.0 { 1 } else { -1 })
        }
    }
}

pub struct NavigationMapper {
    policy: Box<dyn AxisPolicy>,
}

impl Default for NavigationMapper {
    fn default() -> Self {
        Self::new(Box::new(ScreenAlignedPolicy))
    }
}

impl NavigationMapper {
    pub fn new(policy: Box<dyn AxisPolicy>) -> Self {
        Self { policy }
    }

    pub fn set_policy(&mut self, policy: Box<dyn AxisPolicy>) {
        self.policy = policy;
    }

    /// Raw key plus modifier and yaw to a selection-space delta. The depth modifier takes
    /// precedence over rotation: Up/Down walk layers and Left/Right do nothing.
    pub fn delta(&self, key: ArrowKey, depth_modifier: bool, yaw: f32) -> CellDelta {
        if depth_modifier {
            return match key {
                ArrowKey::Up => CellDelta::along(GridAxis::Depth, -1),
                ArrowKey::Down => CellDelta::along(GridAxis::Depth, 1),
                ArrowKey::Left | ArrowKey::Right => CellDelta::NONE,
            };
        }
        match key {
            ArrowKey::Up => CellDelta::along(GridAxis::Row, -1),
            ArrowKey::Down => CellDelta::along(GridAxis::Row, 1),
            ArrowKey::Left | ArrowKey::Right => {
                let (axis, right_sign) = self.policy.horizontal_axis(yaw);
                let sign = if key == ArrowKey::Right { right_sign } else { -right_sign };
                CellDelta::along(axis, sign)
            }
        }
    }

    /// Applies the key to the selection: the reference is the end corner when extending, the
    /// start otherwise. The target is clamped into bounds. Returns the new reference coordinate,
    /// or `None` when nothing happened (no selection, disabled key, degenerate grid).
    pub fn navigate(
        &self,
        selection: &mut Selection,
        space: &CoordinateSpace,
        key: ArrowKey,
        extend: bool,
        depth_modifier: bool,
        yaw: f32,
    ) -> Option<CellCoord> {
        let region = selection.region()?;
        let delta = self.delta(key, depth_modifier, yaw);
        if delta.is_zero() {
            return None;
        }
        let reference = if extend { region.end } else { region.start };
        let target = space.offset_clamped(reference, delta.0)?;
        if extend {
            selection.extend_to(target);
        } else {
            selection.move_to(target);
        }
        Some(target)
    }
}
