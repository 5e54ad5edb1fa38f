use crate::cell::{format_number, parse_number, CellCoord, CellStore};
use crate::config::QuantumConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantumState {
    pub original_value: f64,
    pub observed: bool,
}

/// Read-side fluctuation of numeric cells. While active, every unobserved numeric cell has its
/// displayed text overwritten with a jittered value on each fluctuation tick; the true value
/// lives only in [`QuantumState::original_value`].
#[derive(Debug)]
pub struct QuantumOverlay {
    active: bool,
    states: BTreeMap<CellCoord, QuantumState>,
    /// Text as typed, restored verbatim for cells that were never observed.
    original_texts: BTreeMap<CellCoord, String>,
    /// Cell under edit; its live buffer must not be overwritten.
    held: Option<CellCoord>,
    rng: StdRng,
    amplitude: f64,
    tick_interval: u64,
}

impl QuantumOverlay {
    pub fn new(config: &QuantumConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            active: false,
            states: BTreeMap::new(),
            original_texts: BTreeMap::new(),
            held: None,
            rng,
            amplitude: config.amplitude.abs(),
            tick_interval: config.tick_interval_frames.max(1),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn state(&self, coord: CellCoord) -> Option<QuantumState> {
        self.states.get(&coord).copied()
    }

    pub fn tracked(&self) -> usize {
        self.states.len()
    }

    /// Every numeric cell starts a fresh, unobserved superposition.
    pub fn activate(&mut self, store: &CellStore) {
        self.states.clear();
        self.original_texts.clear();
        for (coord, value) in store.numeric_cells() {
            self.states.insert(coord, QuantumState { original_value: value, observed: false });
            self.original_texts.insert(coord, store.text(coord).to_string());
        }
        self.active = true;
        log::info!("[quantum] activated with {} numeric cells", self.states.len());
    }

    /// Restores every tracked cell to its original value and forgets all state. Unobserved cells
    /// get their original text back exactly.
    pub fn deactivate(&mut self, store: &mut CellStore) {
        let mut texts = std::mem::take(&mut self.original_texts);
        for (coord, state) in std::mem::take(&mut self.states) {
            let text = match texts.remove(&coord) {
                Some(text) if !state.observed => text,
                _ => format_number(state.original_value),
            };
            store.set_text(coord, text);
        }
        self.held = None;
        self.active = false;
        log::info!("[quantum] deactivated");
    }

    pub fn toggle(&mut self, store: &mut CellStore) {
        if self.active {
            self.deactivate(store);
        } else {
            self.activate(store);
        }
    }

    /// Frame hook; fluctuates only on every `tick_interval`-th frame. Returns whether it did.
    pub fn on_frame(&mut self, frame: u64, store: &mut CellStore) -> bool {
        if !self.active || frame % self.tick_interval != 0 {
            return false;
        }
        self.fluctuate(store);
        true
    }

    pub fn fluctuate(&mut self, store: &mut CellStore) {
        if !self.active {
            return;
        }
        for (coord, state) in self.states.iter() {
            if state.observed || self.held == Some(*coord) {
                continue;
            }
            let jitter = if self.amplitude > 0.0 { self.rng.gen_range(-self.amplitude..=self.amplitude) } else { 0.0 };
            let displayed = state.original_value * (1.0 + jitter);
            store.set_text(*coord, format_fluctuation(displayed, state.original_value));
        }
    }

    /// Collapses an unobserved cell: whatever is showing becomes its value. Returns true if the
    /// cell was collapsed by this call.
    pub fn observe(&mut self, coord: CellCoord, store: &CellStore) -> bool {
        if !self.active {
            return false;
        }
        let Some(state) = self.states.get_mut(&coord) else {
            return false;
        };
        if state.observed {
            return false;
        }
        if let Some(shown) = parse_number(store.text(coord)) {
            state.original_value = shown;
        }
        state.observed = true;
        self.original_texts.remove(&coord);
        log::debug!("[quantum] observed {coord} = {}", state.original_value);
        true
    }

    /// Called after an edit commits while active: numeric text re-enters superposition, anything
    /// else stops being tracked.
    pub fn reseed(&mut self, coord: CellCoord, text: Option<&str>) {
        if !self.active {
            return;
        }
        match text.and_then(|text| parse_number(text).map(|value| (text, value))) {
            Some((text, value)) => {
                self.states.insert(coord, QuantumState { original_value: value, observed: false });
                self.original_texts.insert(coord, text.to_string());
            }
            None => self.forget(coord),
        }
    }

    /// Stops fluctuation on `coord` until [`QuantumOverlay::release`].
    pub fn hold(&mut self, coord: CellCoord) {
        self.held = Some(coord);
    }

    pub fn release(&mut self) {
        self.held = None;
    }

    pub fn forget(&mut self, coord: CellCoord) {
        self.states.remove(&coord);
        self.original_texts.remove(&coord);
    }
}

/// Integral originals stay integral on screen; everything else shows two decimals.
pub fn format_fluctuation(displayed: f64, original: f64) -> String {
    if original.fract() == 0.0 {
        format_number(displayed.round())
    } else {
        format!("{displayed:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay() -> QuantumOverlay {
        QuantumOverlay::new(&QuantumConfig { tick_interval_frames: 10, amplitude: 0.1, seed: Some(7) })
    }

    #[test]
    fn only_numeric_cells_are_tracked() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::new(0, 0, 0), "100");
        store.set_text(CellCoord::new(1, 0, 0), "hello");
        store.set_text(CellCoord::new(2, 0, 0), "12abc");
        let mut quantum = overlay();
        quantum.activate(&store);
        assert_eq!(quantum.tracked(), 1);
        assert_eq!(quantum.state(CellCoord::ORIGIN), Some(QuantumState { original_value: 100.0, observed: false }));
    }

    #[test]
    fn fluctuation_respects_interval_and_amplitude() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "1000");
        let mut quantum = overlay();
        assert!(!quantum.on_frame(10, &mut store), "inactive overlay never ticks");
        quantum.activate(&store);
        assert!(!quantum.on_frame(3, &mut store));
        for frame in (10..500).step_by(10) {
            assert!(quantum.on_frame(frame, &mut store));
            let shown = parse_number(store.text(CellCoord::ORIGIN)).expect("still numeric");
            assert!((900.0..=1100.0).contains(&shown), "{shown} out of range");
            assert_eq!(shown.fract(), 0.0, "integral originals stay integral");
        }
    }

    #[test]
    fn fractional_values_show_two_decimals() {
        assert_eq!(format_fluctuation(4.5678, 4.5), "4.57");
        assert_eq!(format_fluctuation(4.4, 4.0), "4");
    }

    #[test]
    fn observed_cells_stop_fluctuating() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "50");
        let mut quantum = overlay();
        quantum.activate(&store);
        quantum.fluctuate(&mut store);
        assert!(quantum.observe(CellCoord::ORIGIN, &store));
        let locked = store.text(CellCoord::ORIGIN).to_string();
        for _ in 0..20 {
            quantum.fluctuate(&mut store);
        }
        assert_eq!(store.text(CellCoord::ORIGIN), locked);
        assert!(!quantum.observe(CellCoord::ORIGIN, &store), "second observation is a no-op");
    }

    #[test]
    fn held_cell_keeps_its_text() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "500");
        let mut quantum = overlay();
        quantum.activate(&store);
        quantum.hold(CellCoord::ORIGIN);
        store.set_text(CellCoord::ORIGIN, "50");
        quantum.fluctuate(&mut store);
        assert_eq!(store.text(CellCoord::ORIGIN), "50");
        quantum.release();
        quantum.fluctuate(&mut store);
        let shown = parse_number(store.text(CellCoord::ORIGIN)).expect("numeric");
        assert!((450.0..=550.0).contains(&shown));
    }

    #[test]
    fn deactivation_restores_the_original_spelling() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::new(0, 0, 0), "4.50");
        store.set_text(CellCoord::new(1, 0, 0), "007");
        store.set_text(CellCoord::new(2, 0, 0), "80");
        let mut quantum = overlay();
        quantum.activate(&store);
        quantum.fluctuate(&mut store);
        assert!(quantum.observe(CellCoord::new(2, 0, 0), &store));
        let collapsed = store.text(CellCoord::new(2, 0, 0)).to_string();
        quantum.reseed(CellCoord::new(1, 0, 0), Some("0012"));

        quantum.deactivate(&mut store);
        assert_eq!(store.text(CellCoord::new(0, 0, 0)), "4.50");
        assert_eq!(store.text(CellCoord::new(1, 0, 0)), "0012");
        assert_eq!(store.text(CellCoord::new(2, 0, 0)), collapsed, "observed cells keep the collapsed value");
    }

    #[test]
    fn reseed_tracks_numeric_commits_only() {
        let store = CellStore::new();
        let mut quantum = overlay();
        quantum.activate(&store);
        quantum.reseed(CellCoord::ORIGIN, Some("12.5"));
        assert_eq!(quantum.state(CellCoord::ORIGIN), Some(QuantumState { original_value: 12.5, observed: false }));
        quantum.reseed(CellCoord::ORIGIN, Some("text"));
        assert_eq!(quantum.state(CellCoord::ORIGIN), None);
    }
}
