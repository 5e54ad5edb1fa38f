use crate::autosum;
use crate::camera::pixels_to_ndc;
use crate::camera_rig::{CameraRig, ModeSwitch, ProjectionMode};
use crate::cell::{CellColor, CellCoord, CellStore, FontFamily};
use crate::config::AppConfig;
use crate::edit::{CommitOutcome, EditState};
use crate::formatting::{self, StyleToggle};
use crate::grid::{CoordinateSpace, GridGeometry};
use crate::hyper::HyperRotation;
use crate::input::{InputBindings, InputEvent, Modifiers, PointerButton, SheetAction, SheetKey};
use crate::navigation::NavigationMapper;
use crate::persistence::{FileSheetStore, PersistenceService};
use crate::picking::pick_cell;
use crate::placement::CellPlacements;
use crate::quantum::QuantumOverlay;
use crate::renderer::{FrameView, GridLabels, Renderer};
use crate::selection::{DragTracker, Selection};
use crate::time::FrameClock;
use anyhow::Result;
use glam::Vec2;
use winit::dpi::PhysicalSize;

const FONT_STEP: i32 = 10;

/// What the primary/secondary pointer is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum PointerGesture {
    #[default]
    Idle,
    /// Drag-select that started on a cell.
    Select,
    /// Press that landed on empty space; releasing without moving clears the selection.
    Empty,
    Rotate { last: Vec2 },
    Pan { last: Vec2 },
}

/// Owns the whole sheet session and routes normalized input into it. Nothing here talks to a
/// window; the shell feeds events in and hands [`FrameView`]s to a renderer.
pub struct SheetController {
    store: CellStore,
    space: CoordinateSpace,
    placements: CellPlacements,
    labels: GridLabels,
    hyper: HyperRotation,
    selection: Selection,
    drag: DragTracker,
    gesture: PointerGesture,
    navigation: NavigationMapper,
    rig: CameraRig,
    edit: EditState,
    quantum: QuantumOverlay,
    clock: FrameClock,
    bindings: InputBindings,
    persistence: Box<dyn PersistenceService>,
    notice: Option<String>,
}

impl SheetController {
    pub fn new(config: &AppConfig, persistence: Box<dyn PersistenceService>) -> Self {
        let geometry = GridGeometry::from(&config.grid);
        let space = CoordinateSpace::new(geometry, config.window.width, config.window.height);
        let viewport = PhysicalSize::new(config.window.width, config.window.height);
        let placements = CellPlacements::new(&space);
        let size = space.size();
        log::info!("[sheet] grid {}x{}x{} ({} cells)", size.x, size.y, size.z, size.cell_count());
        Self {
            store: CellStore::new(),
            labels: GridLabels::for_size(size),
            rig: CameraRig::new(&config.camera, viewport, space.grid_center()),
            hyper: HyperRotation::new(&config.hyper),
            placements,
            space,
            selection: Selection::new(),
            drag: DragTracker::default(),
            gesture: PointerGesture::Idle,
            navigation: NavigationMapper::default(),
            edit: EditState::default(),
            quantum: QuantumOverlay::new(&config.quantum),
            clock: FrameClock::new(),
            bindings: InputBindings::with_overrides(&config.bindings),
            persistence,
            notice: None,
        }
    }

    /// Controller backed by the on-disk store from `config.storage`; autoloads when configured.
    pub fn from_config(config: &AppConfig) -> Self {
        let storage = FileSheetStore::new(&config.storage.directory, &config.storage.autosave_name);
        let mut controller = Self::new(config, Box::new(storage));
        if config.storage.autoload {
            controller.load(None);
        }
        controller
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CellStore {
        &mut self.store
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn placements(&self) -> &CellPlacements {
        &self.placements
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn quantum(&self) -> &QuantumOverlay {
        &self.quantum
    }

    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    pub fn hyper(&self) -> &HyperRotation {
        &self.hyper
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationMapper {
        &mut self.navigation
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Pending blocking message (currently only persistence failures).
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn acknowledge_notice(&mut self) {
        self.notice = None;
    }

    pub fn handle(&mut self, event: &InputEvent) {
        if let InputEvent::Resized { width, height } = event {
            self.resize(*width, *height);
            return;
        }
        if self.notice.is_some() {
            // The notice swallows input until dismissed with Enter or Escape.
            if let InputEvent::Key { key: SheetKey::Enter | SheetKey::Escape, .. } = event {
                self.acknowledge_notice();
            }
            return;
        }
        match event {
            InputEvent::PointerDown { position, button, modifiers } => {
                self.pointer_down(*position, *button, *modifiers)
            }
            InputEvent::PointerMove { position } => self.pointer_move(*position),
            InputEvent::PointerUp { position, button } => self.pointer_up(*position, *button),
            InputEvent::Wheel { delta } => self.rig.apply_wheel(*delta),
            InputEvent::Pinch { delta } => self.rig.apply_pinch(*delta),
            InputEvent::Key { key, modifiers } => self.key(*key, *modifiers),
            InputEvent::Resized { .. } => {}
        }
    }

    /// Cell under a pixel position for the active camera.
    pub fn pick(&self, position: Vec2) -> Option<CellCoord> {
        let ndc = pixels_to_ndc(position, self.rig.viewport())?;
        let (origin, dir) = self.rig.screen_ray(ndc)?;
        pick_cell(origin, dir, self.rig.pivot_matrix(), &self.placements, self.space.cell_extent())
    }

    /// Where the centre of a cell lands on screen, in pixels.
    pub fn screen_position(&self, coord: CellCoord) -> Option<Vec2> {
        let world = self.rig.pivot_matrix().transform_point3(self.placements.position(coord)?);
        let clip = self.rig.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        let viewport = self.rig.viewport();
        Some(Vec2::new((ndc.x + 1.0) * 0.5 * viewport.width as f32, (1.0 - ndc.y) * 0.5 * viewport.height as f32))
    }

    fn pointer_down(&mut self, position: Vec2, button: PointerButton, modifiers: Modifiers) {
        match button {
            PointerButton::Primary if modifiers.command() => {
                self.gesture = PointerGesture::Rotate { last: position };
            }
            PointerButton::Primary => match self.pick(position) {
                Some(coord) => {
                    if self.edit.editing_coord().is_some_and(|editing| editing != coord) {
                        self.commit_edit();
                    }
                    if modifiers.shift() {
                        self.selection.extend_to(coord);
                    } else {
                        self.selection.begin(coord);
                    }
                    self.drag.start();
                    self.gesture = PointerGesture::Select;
                }
                None => self.gesture = PointerGesture::Empty,
            },
            PointerButton::Secondary => self.gesture = PointerGesture::Pan { last: position },
            PointerButton::Middle => {}
        }
    }

    fn pointer_move(&mut self, position: Vec2) {
        match &mut self.gesture {
            PointerGesture::Rotate { last } => {
                let delta = position - *last;
                *last = position;
                self.rig.rotate(delta);
            }
            PointerGesture::Pan { last } => {
                let delta = position - *last;
                *last = position;
                self.rig.pan(delta);
            }
            PointerGesture::Select if self.drag.is_active() => {
                if let Some(coord) = self.pick(position) {
                    let changed = self.selection.extend_to(coord);
                    self.drag.note_extend(changed);
                }
            }
            PointerGesture::Select | PointerGesture::Empty | PointerGesture::Idle => {}
        }
    }

    fn pointer_up(&mut self, position: Vec2, button: PointerButton) {
        let gesture = std::mem::take(&mut self.gesture);
        match (gesture, button) {
            (PointerGesture::Select, PointerButton::Primary) => {
                if !self.drag.finish() {
                    if let Some(coord) = self.pick(position) {
                        self.quantum.observe(coord, &self.store);
                    }
                }
            }
            (PointerGesture::Empty, PointerButton::Primary) => {
                if self.pick(position).is_none() {
                    self.commit_edit();
                    self.selection.clear();
                }
            }
            (PointerGesture::Rotate { .. }, PointerButton::Primary)
            | (PointerGesture::Pan { .. }, PointerButton::Secondary) => {}
            // A release for a different button leaves the running gesture alone.
            (other, _) => self.gesture = other,
        }
    }

    fn key(&mut self, key: SheetKey, modifiers: Modifiers) {
        if let Some(action) = self.bindings.action_for(key, modifiers) {
            self.run_action(action);
            return;
        }
        match key {
            SheetKey::Arrow(arrow) => {
                self.commit_edit();
                self.navigation.navigate(
                    &mut self.selection,
                    &self.space,
                    arrow,
                    modifiers.shift(),
                    modifiers.depth(),
                    self.rig.yaw(),
                );
            }
            SheetKey::Enter => self.enter(),
            SheetKey::Escape => {
                if self.edit.is_editing() {
                    self.cancel_edit();
                } else {
                    self.selection.clear();
                }
            }
            SheetKey::Backspace => {
                self.cancel_edit();
                self.clear_selected_cells();
            }
            SheetKey::Delete => {
                if !self.edit.is_editing() {
                    self.clear_selected_cells();
                }
            }
            SheetKey::Tab => {
                self.commit_edit();
                if let Some(next) = self.selection.start().and_then(|s| self.space.offset_clamped(s, [1, 0, 0])) {
                    self.selection.move_to(next);
                }
            }
            SheetKey::Char(_) if modifiers.command() => {}
            SheetKey::Char(_) => {
                if let Some(c) = key.printable() {
                    self.type_char(c);
                }
            }
            SheetKey::Function(_) => {}
        }
    }

    fn type_char(&mut self, c: char) {
        let mut buf = [0u8; 4];
        let text: &str = c.encode_utf8(&mut buf);
        if self.edit.is_editing() {
            self.edit.append(&mut self.store, text);
        } else if let Some(start) = self.selection.start() {
            self.begin_edit(start, text);
        }
    }

    /// Idle: edit the selection start, seeded with its current text. Editing: commit and move the
    /// edit one row down when there is room.
    fn enter(&mut self) {
        match self.edit.editing_coord() {
            Some(coord) => {
                self.commit_edit();
                if let Some(below) = coord.y.checked_add(1).map(|y| CellCoord::new(coord.x, y, coord.z)) {
                    if self.space.contains(below) {
                        self.selection.move_to(below);
                        self.begin_edit(below, "");
                    }
                }
            }
            None => {
                if let Some(start) = self.selection.start() {
                    let seed = self.store.text(start).to_string();
                    self.begin_edit(start, &seed);
                }
            }
        }
    }

    fn begin_edit(&mut self, coord: CellCoord, seed: &str) {
        if let Some(previous) = self.edit.begin(&mut self.store, coord, seed) {
            self.after_commit(previous);
        }
        self.quantum.hold(coord);
    }

    pub fn commit_edit(&mut self) {
        if let Some(outcome) = self.edit.commit(&mut self.store) {
            self.after_commit(outcome);
        }
    }

    pub fn cancel_edit(&mut self) {
        if self.edit.cancel(&mut self.store).is_some() {
            self.quantum.release();
        }
    }

    fn after_commit(&mut self, outcome: CommitOutcome) {
        self.quantum.release();
        match outcome {
            CommitOutcome::Written { coord, text } => self.quantum.reseed(coord, Some(&text)),
            CommitOutcome::Cleared { coord } => self.quantum.reseed(coord, None),
            CommitOutcome::Untouched { .. } => {}
        }
    }

    fn clear_selected_cells(&mut self) {
        let Some(bounds) = self.selection.bounds() else {
            return;
        };
        for coord in bounds.cells() {
            self.store.clear(coord);
            self.quantum.forget(coord);
        }
    }

    pub fn run_action(&mut self, action: SheetAction) {
        match action {
            SheetAction::ToggleAnaglyph => {
                let switch = self.rig.toggle_anaglyph();
                self.after_mode_switch(switch);
            }
            SheetAction::ToggleHyper => {
                let switch = self.rig.toggle_hyper();
                self.after_mode_switch(switch);
            }
            SheetAction::ToggleQuantum => {
                self.commit_edit();
                self.quantum.toggle(&mut self.store);
            }
            SheetAction::AutoSum => {
                self.commit_edit();
                if let Some(result) = autosum::apply(&mut self.store, &mut self.selection, &self.space) {
                    self.quantum.reseed(result.target, Some(&result.text));
                }
            }
            SheetAction::ToggleBold => {
                formatting::toggle_style(&mut self.store, &self.selection, StyleToggle::Bold);
            }
            SheetAction::ToggleItalic => {
                formatting::toggle_style(&mut self.store, &self.selection, StyleToggle::Italic);
            }
            SheetAction::ToggleStrikethrough => {
                formatting::toggle_style(&mut self.store, &self.selection, StyleToggle::Strikethrough);
            }
            SheetAction::FontLarger => {
                formatting::step_font_size(&mut self.store, &self.selection, FONT_STEP);
            }
            SheetAction::FontSmaller => {
                formatting::step_font_size(&mut self.store, &self.selection, -FONT_STEP);
            }
            SheetAction::Save => self.save(None),
            SheetAction::Load => self.load(None),
            SheetAction::ResetView => self.rig.reset_view(self.space.grid_center()),
        }
    }

    pub fn set_background_color(&mut self, color: Option<CellColor>) -> usize {
        formatting::set_background_color(&mut self.store, &self.selection, color)
    }

    pub fn set_text_color(&mut self, color: Option<CellColor>) -> usize {
        formatting::set_text_color(&mut self.store, &self.selection, color)
    }

    pub fn set_font_family(&mut self, family: FontFamily) -> usize {
        formatting::set_font_family(&mut self.store, &self.selection, family)
    }

    pub fn set_font_size(&mut self, px: u32) -> usize {
        formatting::set_font_size(&mut self.store, &self.selection, px)
    }

    fn after_mode_switch(&mut self, switch: ModeSwitch) {
        if switch.left_hyper() {
            self.placements.restore_canonical(&self.space);
            self.hyper.reset();
        }
    }

    pub fn save(&mut self, name: Option<&str>) {
        self.commit_edit();
        match self.persistence.save(name, &self.store) {
            Ok(snapshot) => log::info!("[storage] saved {} cells", snapshot.cell_count()),
            Err(err) => {
                log::warn!("[storage] save failed: {err:?}");
                self.notice = Some(format!("Save failed: {err:#}"));
            }
        }
    }

    /// Replaces the sheet with a saved one. Failures and missing saves leave the sheet untouched.
    pub fn load(&mut self, name: Option<&str>) {
        let snapshot = match self.persistence.load(name) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                let label = name.unwrap_or("autosave");
                log::info!("[storage] nothing saved under '{label}'");
                self.notice = Some(format!("No saved sheet named '{label}'"));
                return;
            }
            Err(err) => {
                log::warn!("[storage] load failed: {err:?}");
                self.notice = Some(format!("Load failed: {err:#}"));
                return;
            }
        };
        self.cancel_edit();
        snapshot.restore_into(&mut self.store);
        if self.quantum.is_active() {
            self.quantum.activate(&self.store);
        }
        log::info!("[storage] loaded {} cells", self.store.len());
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.space.resize(width, height) {
            let size = self.space.size();
            log::info!("[sheet] grid resized to {}x{}x{}", size.x, size.y, size.z);
            self.placements.rebuild(&self.space);
            self.labels = GridLabels::for_size(size);
            if self.rig.mode() == ProjectionMode::ExtremePerspective {
                self.placements.apply_hyper(&self.space, &self.hyper);
            }
        }
        self.rig.resize(PhysicalSize::new(width, height), self.space.grid_center());
    }

    /// Per-frame update: quantum ticks and the 4D distortion. Returns the new frame number.
    pub fn update(&mut self) -> u64 {
        let frame = self.clock.tick();
        self.quantum.on_frame(frame, &mut self.store);
        if self.rig.mode() == ProjectionMode::ExtremePerspective {
            self.hyper.advance();
            self.placements.apply_hyper(&self.space, &self.hyper);
        }
        frame
    }

    pub fn frame_view(&self) -> FrameView<'_> {
        FrameView {
            frame: self.clock.frame(),
            grid: self.space.size(),
            cell_extent: self.space.cell_extent(),
            placements: &self.placements,
            store: &self.store,
            selection: self.selection.bounds(),
            editing: self.edit.editing_coord(),
            camera: self.rig.frame(),
            labels: &self.labels,
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.render(&self.frame_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SheetSnapshot;
    use anyhow::bail;

    struct FailingStore;

    impl PersistenceService for FailingStore {
        fn save(&mut self, _name: Option<&str>, _store: &CellStore) -> Result<SheetSnapshot> {
            bail!("disk full")
        }
        fn load(&self, _name: Option<&str>) -> Result<Option<SheetSnapshot>> {
            bail!("unreadable")
        }
        fn list(&self) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
        fn delete(&mut self, _name: &str) -> Result<()> {
            Ok(())
        }
    }

    fn key(key: SheetKey) -> InputEvent {
        InputEvent::Key { key, modifiers: Modifiers::empty() }
    }

    #[test]
    fn persistence_failure_blocks_until_acknowledged() {
        let mut sheet = SheetController::new(&AppConfig::default(), Box::new(FailingStore));
        sheet.store_mut().set_text(CellCoord::ORIGIN, "keep");
        sheet.handle(&InputEvent::Key { key: SheetKey::Char('s'), modifiers: Modifiers::CTRL });
        assert!(sheet.notice().is_some_and(|n| n.contains("disk full")));
        sheet.handle(&InputEvent::Key { key: SheetKey::Char('o'), modifiers: Modifiers::CTRL });
        assert_eq!(sheet.store().text(CellCoord::ORIGIN), "keep");
        sheet.handle(&key(SheetKey::Escape));
        assert!(sheet.notice().is_none());
        sheet.handle(&InputEvent::Key { key: SheetKey::Char('o'), modifiers: Modifiers::CTRL });
        assert!(sheet.notice().is_some_and(|n| n.contains("unreadable")));
        assert_eq!(sheet.store().text(CellCoord::ORIGIN), "keep", "in-memory state untouched");
    }

    #[test]
    fn leaving_hyper_restores_canonical_positions() {
        let mut sheet = SheetController::new(&AppConfig::default(), Box::new(FailingStore));
        let coord = CellCoord::new(2, 1, 3);
        let canonical = sheet.space().cell_center(coord);
        sheet.run_action(SheetAction::ToggleHyper);
        for _ in 0..30 {
            sheet.update();
        }
        assert!(sheet.hyper().phase() != 0.0);
        sheet.run_action(SheetAction::ToggleHyper);
        assert_eq!(sheet.rig().mode(), ProjectionMode::Orthographic);
        assert_eq!(sheet.placements().position(coord), Some(canonical));
        assert_eq!(sheet.hyper().phase(), 0.0);
    }

    #[test]
    fn anaglyph_and_hyper_are_exclusive() {
        let mut sheet = SheetController::new(&AppConfig::default(), Box::new(FailingStore));
        sheet.handle(&key(SheetKey::Function(5)));
        assert_eq!(sheet.rig().mode(), ProjectionMode::Perspective);
        sheet.handle(&key(SheetKey::Function(6)));
        assert_eq!(sheet.rig().mode(), ProjectionMode::ExtremePerspective);
        sheet.handle(&key(SheetKey::Function(6)));
        assert_eq!(sheet.rig().mode(), ProjectionMode::Perspective, "returns to the mode before 4D");
    }

    #[test]
    fn resize_rebuilds_placements_and_keeps_data() {
        let mut sheet = SheetController::new(&AppConfig::default(), Box::new(FailingStore));
        let far = CellCoord::new(10, 10, 0);
        sheet.store_mut().set_text(far, "far");
        sheet.handle(&InputEvent::Resized { width: 360, height: 160 });
        assert_eq!(sheet.space().size().x, 3);
        assert!(!sheet.placements().contains(far));
        assert_eq!(sheet.store().text(far), "far");
        assert_eq!(sheet.placements().len() as u64, sheet.space().size().cell_count());
    }
}
