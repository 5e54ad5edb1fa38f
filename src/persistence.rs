use crate::cell::{CellColor, CellCoord, CellRecord, CellStore, FontFamily, FONT_SIZE_MAX, FONT_SIZE_MIN};
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Full serialization of the store: one sparse map per attribute, keyed by `"x,y,z"`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetSnapshot {
    #[serde(default = "SheetSnapshot::default_version")]
    pub version: u32,
    #[serde(default)]
    pub text: BTreeMap<String, String>,
    #[serde(default)]
    pub background_color: BTreeMap<String, CellColor>,
    #[serde(default)]
    pub text_color: BTreeMap<String, CellColor>,
    #[serde(default)]
    pub bold: BTreeMap<String, bool>,
    #[serde(default)]
    pub italic: BTreeMap<String, bool>,
    #[serde(default)]
    pub strikethrough: BTreeMap<String, bool>,
    #[serde(default)]
    pub font_family: BTreeMap<String, FontFamily>,
    #[serde(default)]
    pub font_size: BTreeMap<String, u32>,
}

impl SheetSnapshot {
    fn default_version() -> u32 {
        SNAPSHOT_VERSION
    }

    pub fn capture(store: &CellStore) -> Self {
        let mut snapshot = Self { version: SNAPSHOT_VERSION, ..Self::default() };
        for (coord, record) in store.iter() {
            let key = coord.to_string();
            if let Some(text) = &record.text {
                snapshot.text.insert(key.clone(), text.clone());
            }
            if let Some(color) = record.background_color {
                snapshot.background_color.insert(key.clone(), color);
            }
            if let Some(color) = record.text_color {
                snapshot.text_color.insert(key.clone(), color);
            }
            if let Some(value) = record.bold {
                snapshot.bold.insert(key.clone(), value);
            }
            if let Some(value) = record.italic {
                snapshot.italic.insert(key.clone(), value);
            }
            if let Some(value) = record.strikethrough {
                snapshot.strikethrough.insert(key.clone(), value);
            }
            if let Some(family) = record.font_family {
                snapshot.font_family.insert(key.clone(), family);
            }
            if let Some(size) = record.font_size {
                snapshot.font_size.insert(key, size);
            }
        }
        snapshot
    }

    /// Rebuilds the per-cell records. Keys that do not parse as coordinates are skipped with a
    /// warning.
    pub fn records(&self) -> BTreeMap<CellCoord, CellRecord> {
        let mut records: BTreeMap<CellCoord, CellRecord> = BTreeMap::new();
        fn merge<T: Clone>(
            records: &mut BTreeMap<CellCoord, CellRecord>,
            map: &BTreeMap<String, T>,
            set: impl Fn(&mut CellRecord, T),
        ) {
            for (key, value) in map {
                match key.parse::<CellCoord>() {
                    Ok(coord) => set(records.entry(coord).or_default(), value.clone()),
                    Err(err) => log::warn!("[persistence] skipping entry: {err}"),
                }
            }
        }
        merge(&mut records, &self.text, |r, v| r.text = Some(v));
        merge(&mut records, &self.background_color, |r, v| r.background_color = Some(v));
        merge(&mut records, &self.text_color, |r, v| r.text_color = Some(v));
        merge(&mut records, &self.bold, |r, v| r.bold = Some(v));
        merge(&mut records, &self.italic, |r, v| r.italic = Some(v));
        merge(&mut records, &self.strikethrough, |r, v| r.strikethrough = Some(v));
        merge(&mut records, &self.font_family, |r, v| r.font_family = Some(v));
        merge(&mut records, &self.font_size, |r, v| r.font_size = Some(v.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX)));
        records
    }

    /// Replaces the store contents with this snapshot.
    pub fn restore_into(&self, store: &mut CellStore) {
        store.clear_all();
        for (coord, record) in self.records() {
            store.insert_record(coord, record);
        }
    }

    pub fn cell_count(&self) -> usize {
        self.records().len()
    }
}

/// Named save slots. `None` names address the autosave slot.
pub trait PersistenceService {
    fn save(&mut self, name: Option<&str>, store: &CellStore) -> Result<SheetSnapshot>;
    /// `Ok(None)` when the slot does not exist.
    fn load(&self, name: Option<&str>) -> Result<Option<SheetSnapshot>>;
    /// Slot names, sorted.
    fn list(&self) -> Result<Vec<String>>;
    fn delete(&mut self, name: &str) -> Result<()>;
}

/// JSON file per slot under one directory.
#[derive(Debug, Clone)]
pub struct FileSheetStore {
    directory: PathBuf,
    default_name: String,
}

impl FileSheetStore {
    pub fn new(directory: impl Into<PathBuf>, default_name: impl Into<String>) -> Self {
        Self { directory: directory.into(), default_name: default_name.into() }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn slot_path(&self, name: Option<&str>) -> Result<PathBuf> {
        let name = name.unwrap_or(&self.default_name);
        let clean = sanitize_name(name);
        if clean.is_empty() {
            bail!("Invalid save name '{name}'");
        }
        Ok(self.directory.join(format!("{clean}.json")))
    }
}

pub fn sanitize_name(raw: &str) -> String {
    raw.trim().chars().filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_').collect()
}

impl PersistenceService for FileSheetStore {
    fn save(&mut self, name: Option<&str>, store: &CellStore) -> Result<SheetSnapshot> {
        let path = self.slot_path(name)?;
        fs::create_dir_all(&self.directory)
            .with_context(|| format!("Creating save directory {}", self.directory.display()))?;
        let snapshot = SheetSnapshot::capture(store);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json.as_bytes()).with_context(|| format!("Writing save file {}", path.display()))?;
        Ok(snapshot)
    }

    fn load(&self, name: Option<&str>) -> Result<Option<SheetSnapshot>> {
        let path = self.slot_path(name)?;
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path).with_context(|| format!("Reading save file {}", path.display()))?;
        let snapshot = serde_json::from_slice::<SheetSnapshot>(&bytes)
            .with_context(|| format!("Parsing save file {}", path.display()))?;
        if snapshot.version > SNAPSHOT_VERSION {
            bail!("Save file {} has unsupported version {}", path.display(), snapshot.version);
        }
        Ok(Some(snapshot))
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.directory)
            .with_context(|| format!("Listing save directory {}", self.directory.display()))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        let path = self.slot_path(Some(name))?;
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Deleting save file {}", path.display()))?;
        }
        Ok(())
    }
}
