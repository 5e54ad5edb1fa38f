use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

pub const FONT_SIZE_MIN: u32 = 20;
pub const FONT_SIZE_MAX: u32 = 300;
pub const FONT_SIZE_DEFAULT: u32 = 100;

/// Integer address of a cell: column, row, depth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl CellCoord {
    pub const ORIGIN: CellCoord = CellCoord { x: 0, y: 0, z: 0 };

    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [u32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array(axes: [u32; 3]) -> Self {
        Self { x: axes[0], y: axes[1], z: axes[2] }
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordParseError(String);

impl fmt::Display for CoordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cell key '{}', expected \"x,y,z\"", self.0)
    }
}

impl std::error::Error for CoordParseError {}

impl FromStr for CellCoord {
    type Err = CoordParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut parts = raw.split(',').map(|part| part.trim().parse::<u32>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), Some(Ok(z)), None) => Ok(Self { x, y, z }),
            _ => Err(CoordParseError(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl CellColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for CellColor {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid colour '{raw}', expected #rrggbb"));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|err| err.to_string());
        Ok(Self { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

impl Serialize for CellColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CellColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    TimesNewRoman,
    Georgia,
    CourierNew,
    Verdana,
}

impl FontFamily {
    pub fn label(self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::Georgia => "Georgia",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Verdana => "Verdana",
        }
    }
}

/// Per-cell attributes. Every field is independently optional: absent text means an empty
/// cell, absent formatting means "use the default", which is not the same as an explicit value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<CellColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<CellColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<FontFamily>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
}

static EMPTY_RECORD: CellRecord = CellRecord {
    text: None,
    background_color: None,
    text_color: None,
    bold: None,
    italic: None,
    strikethrough: None,
    font_family: None,
    font_size: None,
};

impl CellRecord {
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or("")
    }

    pub fn has_content(&self) -> bool {
        !self.text().trim().is_empty()
    }

    pub fn has_formatting(&self) -> bool {
        self.background_color.is_some()
            || self.text_color.is_some()
            || self.bold.is_some()
            || self.italic.is_some()
            || self.strikethrough.is_some()
            || self.font_family.is_some()
            || self.font_size.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none() && !self.has_formatting()
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    pub fn is_strikethrough(&self) -> bool {
        self.strikethrough.unwrap_or(false)
    }

    pub fn effective_font_family(&self) -> FontFamily {
        self.font_family.unwrap_or_default()
    }

    pub fn effective_font_size(&self) -> u32 {
        self.font_size.unwrap_or(FONT_SIZE_DEFAULT)
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.text.as_deref().and_then(parse_number)
    }

    fn apply(&mut self, attr: CellAttr) {
        match attr {
            CellAttr::BackgroundColor(value) => self.background_color = value,
            CellAttr::TextColor(value) => self.text_color = value,
            CellAttr::Bold(value) => self.bold = value,
            CellAttr::Italic(value) => self.italic = value,
            CellAttr::Strikethrough(value) => self.strikethrough = value,
            CellAttr::FontFamily(value) => self.font_family = value,
            CellAttr::FontSize(value) => {
                self.font_size = value.map(|px| px.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX));
            }
        }
    }
}

/// A single formatting attribute write. `None` removes the attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellAttr {
    BackgroundColor(Option<CellColor>),
    TextColor(Option<CellColor>),
    Bold(Option<bool>),
    Italic(Option<bool>),
    Strikethrough(Option<bool>),
    FontFamily(Option<FontFamily>),
    FontSize(Option<u32>),
}

/// Parses the whole string as a finite number. Anything else (including partial numbers such as
/// "12abc", "NaN" or "inf") is not numeric.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

/// Formats a value the way plain double-precision display shows it: integral values without a
/// fractional part.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}

/// Sparse attribute store keyed by coordinate. No bounds checks happen here.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    cells: HashMap<CellCoord, CellRecord>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: CellCoord) -> &CellRecord {
        self.cells.get(&coord).unwrap_or(&EMPTY_RECORD)
    }

    pub fn text(&self, coord: CellCoord) -> &str {
        self.get(coord).text()
    }

    pub fn set_text(&mut self, coord: CellCoord, text: impl Into<String>) {
        self.cells.entry(coord).or_default().text = Some(text.into());
    }

    pub fn set_attr(&mut self, coord: CellCoord, attr: CellAttr) {
        let record = self.cells.entry(coord).or_default();
        record.apply(attr);
        if record.is_empty() {
            self.cells.remove(&coord);
        }
    }

    /// Removes the text only; formatting stays on the cell.
    pub fn clear(&mut self, coord: CellCoord) {
        if let Some(record) = self.cells.get_mut(&coord) {
            record.text = None;
            if record.is_empty() {
                self.cells.remove(&coord);
            }
        }
    }

    pub fn insert_record(&mut self, coord: CellCoord, mut record: CellRecord) {
        record.font_size = record.font_size.map(|px| px.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX));
        if record.is_empty() {
            self.cells.remove(&coord);
        } else {
            self.cells.insert(coord, record);
        }
    }

    pub fn clear_all(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &CellRecord)> + '_ {
        self.cells.iter().map(|(coord, record)| (*coord, record))
    }

    /// Coordinates whose text parses as a finite number.
    pub fn numeric_cells(&self) -> impl Iterator<Item = (CellCoord, f64)> + '_ {
        self.cells.iter().filter_map(|(coord, record)| record.numeric_value().map(|v| (*coord, v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_read_as_empty_records() {
        let store = CellStore::new();
        let record = store.get(CellCoord::new(4, 2, 1));
        assert_eq!(record.text(), "");
        assert!(!record.has_content());
        assert_eq!(record.effective_font_size(), FONT_SIZE_DEFAULT);
        assert_eq!(record.effective_font_family(), FontFamily::Arial);
    }

    #[test]
    fn clear_keeps_formatting() {
        let mut store = CellStore::new();
        let coord = CellCoord::new(1, 1, 0);
        store.set_text(coord, "v");
        store.set_attr(coord, CellAttr::BackgroundColor(Some(CellColor::rgb(255, 0, 0))));
        store.set_attr(coord, CellAttr::Bold(Some(true)));
        store.clear(coord);
        let record = store.get(coord);
        assert_eq!(record.text, None);
        assert_eq!(record.background_color, Some(CellColor::rgb(255, 0, 0)));
        assert!(record.is_bold());
    }

    #[test]
    fn clearing_a_text_only_cell_drops_the_record() {
        let mut store = CellStore::new();
        store.set_text(CellCoord::ORIGIN, "x");
        store.clear(CellCoord::ORIGIN);
        assert!(store.is_empty());
    }

    #[test]
    fn font_size_is_clamped() {
        let mut store = CellStore::new();
        store.set_attr(CellCoord::ORIGIN, CellAttr::FontSize(Some(5)));
        assert_eq!(store.get(CellCoord::ORIGIN).font_size, Some(FONT_SIZE_MIN));
        store.set_attr(CellCoord::ORIGIN, CellAttr::FontSize(Some(900)));
        assert_eq!(store.get(CellCoord::ORIGIN).font_size, Some(FONT_SIZE_MAX));
    }

    #[test]
    fn parse_number_requires_a_full_finite_parse() {
        assert_eq!(parse_number(" 4.5 "), Some(4.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("12abc"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn format_number_keeps_integers_integral() {
        assert_eq!(format_number(7.5), "7.5");
        assert_eq!(format_number(7.0), "7");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn coord_keys_roundtrip_through_strings() {
        let coord = CellCoord::new(3, 14, 2);
        assert_eq!(coord.to_string(), "3,14,2");
        assert_eq!("3,14,2".parse::<CellCoord>(), Ok(coord));
        assert!("3,14".parse::<CellCoord>().is_err());
        assert!("3,-1,0".parse::<CellCoord>().is_err());
    }

    #[test]
    fn colours_parse_hex() {
        let color: CellColor = "#ff8000".parse().expect("colour parses");
        assert_eq!(color, CellColor::rgb(255, 128, 0));
        assert_eq!(color.to_hex(), "#ff8000");
        assert!("orange".parse::<CellColor>().is_err());
    }
}
