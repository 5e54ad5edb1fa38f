use crate::cell::{CellAttr, CellColor, CellStore, FontFamily, FONT_SIZE_MAX, FONT_SIZE_MIN};
use crate::selection::Selection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleToggle {
    Bold,
    Italic,
    Strikethrough,
}

impl StyleToggle {
    fn attr(self, value: bool) -> CellAttr {
        match self {
            StyleToggle::Bold => CellAttr::Bold(Some(value)),
            StyleToggle::Italic => CellAttr::Italic(Some(value)),
            StyleToggle::Strikethrough => CellAttr::Strikethrough(Some(value)),
        }
    }
}

fn apply_to_selection(store: &mut CellStore, selection: &Selection, attr: CellAttr) -> usize {
    let Some(bounds) = selection.bounds() else {
        return 0;
    };
    let mut touched = 0;
    for coord in bounds.cells() {
        store.set_attr(coord, attr);
        touched += 1;
    }
    touched
}

/// Flips a style across the selection. The new value is the negation of the start cell's
/// effective value, so a mixed selection becomes uniform.
pub fn toggle_style(store: &mut CellStore, selection: &Selection, style: StyleToggle) -> Option<bool> {
    let start = selection.start()?;
    let record = store.get(start);
    let current = match style {
        StyleToggle::Bold => record.is_bold(),
        StyleToggle::Italic => record.is_italic(),
        StyleToggle::Strikethrough => record.is_strikethrough(),
    };
    apply_to_selection(store, selection, style.attr(!current));
    Some(!current)
}

pub fn set_background_color(store: &mut CellStore, selection: &Selection, color: Option<CellColor>) -> usize {
    apply_to_selection(store, selection, CellAttr::BackgroundColor(color))
}

pub fn set_text_color(store: &mut CellStore, selection: &Selection, color: Option<CellColor>) -> usize {
    apply_to_selection(store, selection, CellAttr::TextColor(color))
}

pub fn set_font_family(store: &mut CellStore, selection: &Selection, family: FontFamily) -> usize {
    apply_to_selection(store, selection, CellAttr::FontFamily(Some(family)))
}

pub fn set_font_size(store: &mut CellStore, selection: &Selection, px: u32) -> usize {
    apply_to_selection(store, selection, CellAttr::FontSize(Some(px.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX))))
}

/// Steps the font size from the start cell's effective size.
pub fn step_font_size(store: &mut CellStore, selection: &Selection, delta: i32) -> Option<u32> {
    let start = selection.start()?;
    let current = store.get(start).effective_font_size() as i64;
    let next = (current + delta as i64).clamp(FONT_SIZE_MIN as i64, FONT_SIZE_MAX as i64) as u32;
    set_font_size(store, selection, next);
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{CellCoord, FONT_SIZE_DEFAULT};

    fn region() -> Selection {
        let mut selection = Selection::new();
        selection.begin(CellCoord::new(0, 0, 0));
        selection.extend_to(CellCoord::new(1, 1, 0));
        selection
    }

    #[test]
    fn toggles_follow_the_start_cell() {
        let mut store = CellStore::new();
        let selection = region();
        store.set_attr(CellCoord::new(1, 1, 0), CellAttr::Bold(Some(true)));
        assert_eq!(toggle_style(&mut store, &selection, StyleToggle::Bold), Some(true));
        assert!(selection.bounds().into_iter().flat_map(|b| b.cells()).all(|c| store.get(c).is_bold()));
        assert_eq!(toggle_style(&mut store, &selection, StyleToggle::Bold), Some(false));
        assert!(!store.get(CellCoord::new(1, 1, 0)).is_bold());
    }

    #[test]
    fn formatting_without_text_persists() {
        let mut store = CellStore::new();
        let selection = region();
        assert_eq!(set_background_color(&mut store, &selection, Some(CellColor::rgb(0, 128, 255))), 4);
        let record = store.get(CellCoord::new(1, 0, 0));
        assert!(!record.has_content());
        assert_eq!(record.background_color, Some(CellColor::rgb(0, 128, 255)));
        set_background_color(&mut store, &selection, None);
        assert!(store.is_empty());
    }

    #[test]
    fn font_size_steps_are_clamped() {
        let mut store = CellStore::new();
        let selection = region();
        assert_eq!(step_font_size(&mut store, &selection, 10), Some(FONT_SIZE_DEFAULT + 10));
        assert_eq!(step_font_size(&mut store, &selection, 1000), Some(FONT_SIZE_MAX));
        assert_eq!(step_font_size(&mut store, &selection, -1000), Some(FONT_SIZE_MIN));
        assert_eq!(step_font_size(&mut store, &Selection::new(), 5), None);
    }
}
