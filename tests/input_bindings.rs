use cubesheet::cell::CellCoord;
use cubesheet::config::AppConfig;
use cubesheet::input::{InputBindings, InputEvent, Modifiers, SheetAction, SheetKey};
use cubesheet::persistence::FileSheetStore;
use cubesheet::SheetController;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

#[test]
fn remapped_toggles_override_defaults() {
    let mut temp = NamedTempFile::new().expect("temp app config");
    write!(
        temp,
        r#"{{"bindings":{{"toggle_quantum":["f2"],"toggle_bold":["Ctrl+G"],"warp_drive":["f1"],"autosum":["hyper+q"]}}}}"#
    )
    .expect("write remap config");

    let config = AppConfig::load(temp.path()).expect("config parses");
    let bindings = InputBindings::with_overrides(&config.bindings);

    assert_eq!(bindings.action_for(SheetKey::Function(2), Modifiers::empty()), Some(SheetAction::ToggleQuantum));
    assert_eq!(bindings.action_for(SheetKey::Function(7), Modifiers::empty()), None, "old key is released");
    assert_eq!(bindings.action_for(SheetKey::Char('g'), Modifiers::CTRL), Some(SheetAction::ToggleBold));
    assert_eq!(bindings.action_for(SheetKey::Char('b'), Modifiers::CTRL), None);
    assert_eq!(
        bindings.action_for(SheetKey::Function(8), Modifiers::empty()),
        Some(SheetAction::AutoSum),
        "invalid keys keep the default binding"
    );
    assert_eq!(bindings.action_for(SheetKey::Function(1), Modifiers::empty()), None, "unknown actions are ignored");
}

#[test]
fn controller_uses_configured_bindings() {
    let dir = TempDir::new().expect("temp dir");
    let mut config = AppConfig::default();
    config.bindings.insert("toggle_quantum".into(), vec!["f2".into()]);
    let storage = FileSheetStore::new(dir.path(), "autosave");
    let mut sheet = SheetController::new(&config, Box::new(storage));
    sheet.store_mut().set_text(CellCoord::ORIGIN, "12");

    sheet.handle(&InputEvent::Key { key: SheetKey::Function(7), modifiers: Modifiers::empty() });
    assert!(!sheet.quantum().is_active());
    sheet.handle(&InputEvent::Key { key: SheetKey::Function(2), modifiers: Modifiers::empty() });
    assert!(sheet.quantum().is_active());
    assert_eq!(sheet.quantum().tracked(), 1);
}

#[test]
fn shipped_config_matches_defaults() {
    let config = AppConfig::load("config/app.json").expect("shipped config parses");
    assert_eq!(config.grid.depth_layers, 5);
    let bindings = InputBindings::with_overrides(&config.bindings);
    assert_eq!(bindings.action_for(SheetKey::Function(6), Modifiers::empty()), Some(SheetAction::ToggleHyper));
    assert_eq!(bindings.action_for(SheetKey::Char('s'), Modifiers::CTRL), Some(SheetAction::Save));
}
