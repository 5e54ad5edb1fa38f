use cubesheet::cell::{CellAttr, CellColor, CellCoord, CellStore, FontFamily};
use cubesheet::config::AppConfig;
use cubesheet::input::{InputEvent, Modifiers, SheetKey};
use cubesheet::persistence::{FileSheetStore, PersistenceService};
use cubesheet::SheetController;
use tempfile::TempDir;

fn styled_store() -> CellStore {
    let mut store = CellStore::new();
    let a = CellCoord::new(0, 0, 0);
    let b = CellCoord::new(3, 2, 4);
    store.set_text(a, "hello");
    store.set_attr(a, CellAttr::Bold(Some(true)));
    store.set_attr(a, CellAttr::FontFamily(Some(FontFamily::Georgia)));
    store.set_attr(a, CellAttr::FontSize(Some(140)));
    store.set_attr(a, CellAttr::TextColor(Some(CellColor::rgb(0x12, 0x34, 0x56))));
    // Format-only cell: no text at all.
    store.set_attr(b, CellAttr::BackgroundColor(Some(CellColor::rgb(0xff, 0, 0))));
    store.set_attr(b, CellAttr::Italic(Some(false)));
    store.set_attr(b, CellAttr::Strikethrough(Some(true)));
    store
}

#[test]
fn file_store_round_trips_every_attribute() {
    let dir = TempDir::new().expect("temp dir");
    let mut storage = FileSheetStore::new(dir.path().join("nested"), "autosave");
    let store = styled_store();

    storage.save(Some("budget"), &store).expect("save");
    storage.save(None, &store).expect("autosave");
    assert_eq!(storage.list().expect("list"), vec!["autosave".to_string(), "budget".to_string()]);

    let snapshot = storage.load(Some("budget")).expect("load").expect("slot exists");
    let mut restored = CellStore::new();
    snapshot.restore_into(&mut restored);
    assert_eq!(restored.len(), store.len());
    for (coord, record) in store.iter() {
        assert_eq!(restored.get(coord), record, "record at {coord} differs");
    }
    assert_eq!(restored.get(CellCoord::new(3, 2, 4)).italic, Some(false), "explicit false survives");

    storage.delete("budget").expect("delete");
    assert_eq!(storage.load(Some("budget")).expect("load after delete"), None);
    assert_eq!(storage.list().expect("list"), vec!["autosave".to_string()]);
}

#[test]
fn corrupt_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    std::fs::write(dir.path().join("broken.json"), b"{ not json").expect("write junk");
    let storage = FileSheetStore::new(dir.path(), "autosave");
    assert!(storage.load(Some("broken")).is_err());
}

#[test]
fn save_and_load_shortcuts_restore_the_sheet() {
    let dir = TempDir::new().expect("temp dir");
    let storage = FileSheetStore::new(dir.path(), "autosave");
    let mut sheet = SheetController::new(&AppConfig::default(), Box::new(storage));
    sheet.store_mut().set_text(CellCoord::new(1, 1, 0), "kept");

    sheet.handle(&InputEvent::Key { key: SheetKey::Char('s'), modifiers: Modifiers::CTRL });
    assert!(sheet.notice().is_none());
    assert!(dir.path().join("autosave.json").exists());

    sheet.store_mut().set_text(CellCoord::new(1, 1, 0), "changed");
    sheet.store_mut().set_text(CellCoord::new(5, 5, 0), "extra");
    sheet.handle(&InputEvent::Key { key: SheetKey::Char('o'), modifiers: Modifiers::META });
    assert_eq!(sheet.store().text(CellCoord::new(1, 1, 0)), "kept");
    assert_eq!(sheet.store().text(CellCoord::new(5, 5, 0)), "");
}

#[test]
fn autoload_reads_the_autosave_slot() {
    let dir = TempDir::new().expect("temp dir");
    let mut storage = FileSheetStore::new(dir.path(), "autosave");
    storage.save(None, &styled_store()).expect("seed autosave");

    let mut config = AppConfig::default();
    config.storage.directory = dir.path().to_path_buf();
    config.storage.autoload = true;
    let sheet = SheetController::from_config(&config);
    assert_eq!(sheet.store().text(CellCoord::ORIGIN), "hello");
    assert!(sheet.notice().is_none());
}

#[test]
fn missing_save_raises_a_notice() {
    let dir = TempDir::new().expect("temp dir");
    let storage = FileSheetStore::new(dir.path(), "autosave");
    let mut sheet = SheetController::new(&AppConfig::default(), Box::new(storage));
    sheet.load(Some("nothing-here"));
    assert!(sheet.notice().is_some_and(|n| n.contains("nothing-here")));
    sheet.acknowledge_notice();
    assert!(sheet.notice().is_none());
}
