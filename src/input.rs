use crate::navigation::ArrowKey;
use bitflags::bitflags;
use glam::Vec2;
use std::collections::HashMap;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL = 0b0010;
        const ALT = 0b0100;
        const META = 0b1000;
    }
}

impl Modifiers {
    pub fn shift(self) -> bool {
        self.contains(Modifiers::SHIFT)
    }

    /// Held to send Up/Down through the depth layers.
    pub fn depth(self) -> bool {
        self.contains(Modifiers::ALT)
    }

    /// Platform command key; turns a left drag into a rotation and keys into shortcuts.
    pub fn command(self) -> bool {
        self.intersects(Modifiers::CTRL | Modifiers::META)
    }

    fn from_winit(state: winit::keyboard::ModifiersState) -> Self {
        let mut mods = Modifiers::empty();
        mods.set(Modifiers::SHIFT, state.shift_key());
        mods.set(Modifiers::CTRL, state.control_key());
        mods.set(Modifiers::ALT, state.alt_key());
        mods.set(Modifiers::META, state.super_key());
        mods
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetKey {
    Arrow(ArrowKey),
    Enter,
    Escape,
    Backspace,
    Delete,
    Tab,
    Function(u8),
    Char(char),
}

impl SheetKey {
    pub fn printable(self) -> Option<char> {
        match self {
            SheetKey::Char(c) if !c.is_control() => Some(c),
            _ => None,
        }
    }
}

/// Normalized input; positions are physical pixels from the top-left of the viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { position: Vec2, button: PointerButton, modifiers: Modifiers },
    PointerMove { position: Vec2 },
    PointerUp { position: Vec2, button: PointerButton },
    Wheel { delta: f32 },
    /// Relative change in two-finger distance.
    Pinch { delta: f32 },
    Key { key: SheetKey, modifiers: Modifiers },
    Resized { width: u32, height: u32 },
}

/// Turns winit window events into [`InputEvent`]s, tracking cursor position and modifier state
/// between events since winit reports them separately.
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    cursor: Vec2,
    modifiers: Modifiers,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn translate(&mut self, ev: &WindowEvent) -> Option<InputEvent> {
        match ev {
            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = Modifiers::from_winit(mods.state());
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
                Some(InputEvent::PointerMove { position: self.cursor })
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return None,
                };
                Some(match state {
                    ElementState::Pressed => {
                        InputEvent::PointerDown { position: self.cursor, button, modifiers: self.modifiers }
                    }
                    ElementState::Released => InputEvent::PointerUp { position: self.cursor, button },
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 40.0,
                };
                Some(InputEvent::Wheel { delta: d })
            }
            WindowEvent::PinchGesture { delta, .. } => Some(InputEvent::Pinch { delta: *delta as f32 }),
            WindowEvent::KeyboardInput { event, .. } if event.state == ElementState::Pressed => {
                sheet_key(&event.logical_key).map(|key| InputEvent::Key { key, modifiers: self.modifiers })
            }
            WindowEvent::Resized(size) => Some(InputEvent::Resized { width: size.width, height: size.height }),
            _ => None,
        }
    }
}

fn sheet_key(key: &Key) -> Option<SheetKey> {
    match key {
        Key::Named(named) => match named {
            NamedKey::ArrowUp => Some(SheetKey::Arrow(ArrowKey::Up)),
            NamedKey::ArrowDown => Some(SheetKey::Arrow(ArrowKey::Down)),
            NamedKey::ArrowLeft => Some(SheetKey::Arrow(ArrowKey::Left)),
            NamedKey::ArrowRight => Some(SheetKey::Arrow(ArrowKey::Right)),
            NamedKey::Enter => Some(SheetKey::Enter),
            NamedKey::Escape => Some(SheetKey::Escape),
            NamedKey::Backspace => Some(SheetKey::Backspace),
            NamedKey::Delete => Some(SheetKey::Delete),
            NamedKey::Tab => Some(SheetKey::Tab),
            NamedKey::Space => Some(SheetKey::Char(' ')),
            NamedKey::F1 => Some(SheetKey::Function(1)),
            NamedKey::F2 => Some(SheetKey::Function(2)),
            NamedKey::F3 => Some(SheetKey::Function(3)),
            NamedKey::F4 => Some(SheetKey::Function(4)),
            NamedKey::F5 => Some(SheetKey::Function(5)),
            NamedKey::F6 => Some(SheetKey::Function(6)),
            NamedKey::F7 => Some(SheetKey::Function(7)),
            NamedKey::F8 => Some(SheetKey::Function(8)),
            NamedKey::F9 => Some(SheetKey::Function(9)),
            NamedKey::F10 => Some(SheetKey::Function(10)),
            NamedKey::F11 => Some(SheetKey::Function(11)),
            NamedKey::F12 => Some(SheetKey::Function(12)),
            _ => None,
        },
        Key::Character(text) => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(SheetKey::Char(c)),
                _ => None,
            }
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SheetAction {
    ToggleAnaglyph,
    ToggleHyper,
    ToggleQuantum,
    AutoSum,
    ToggleBold,
    ToggleItalic,
    ToggleStrikethrough,
    FontLarger,
    FontSmaller,
    Save,
    Load,
    ResetView,
}

impl SheetAction {
    fn from_name(value: &str) -> Option<Self> {
        match value {
            "toggle_anaglyph" => Some(Self::ToggleAnaglyph),
            "toggle_4d" => Some(Self::ToggleHyper),
            "toggle_quantum" => Some(Self::ToggleQuantum),
            "autosum" => Some(Self::AutoSum),
            "toggle_bold" => Some(Self::ToggleBold),
            "toggle_italic" => Some(Self::ToggleItalic),
            "toggle_strikethrough" => Some(Self::ToggleStrikethrough),
            "font_larger" => Some(Self::FontLarger),
            "font_smaller" => Some(Self::FontSmaller),
            "save" => Some(Self::Save),
            "load" => Some(Self::Load),
            "reset_view" => Some(Self::ResetView),
            _ => None,
        }
    }
}

/// A key plus whether the command modifier must be held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyChord {
    key: SheetKey,
    command: bool,
}

impl KeyChord {
    fn normalized(key: SheetKey, command: bool) -> Self {
        let key = match key {
            SheetKey::Char(c) => SheetKey::Char(c.to_ascii_lowercase()),
            other => other,
        };
        Self { key, command }
    }

    fn from_config_value(raw: &str) -> Result<Self, ()> {
        let normalized = raw.trim().to_lowercase();
        let (command, key) = match normalized.rsplit_once('+') {
            Some((prefix, key)) if !key.is_empty() => match prefix {
                "ctrl" | "control" | "cmd" | "meta" => (true, key),
                _ => return Err(()),
            },
            // "ctrl++" style chords: the key itself is '+'.
            Some((prefix, _)) if prefix.ends_with('+') => match prefix.trim_end_matches('+') {
                "ctrl" | "control" | "cmd" | "meta" => (true, "+"),
                _ => return Err(()),
            },
            _ => (false, normalized.as_str()),
        };
        let key = match key {
            "enter" | "return" => SheetKey::Enter,
            "escape" | "esc" => SheetKey::Escape,
            "tab" => SheetKey::Tab,
            "delete" => SheetKey::Delete,
            "backspace" => SheetKey::Backspace,
            "space" => SheetKey::Char(' '),
            f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
                Ok(n @ 1..=12) => SheetKey::Function(n),
                _ => return Err(()),
            },
            single if single.chars().count() == 1 => match single.chars().next() {
                Some(c) => SheetKey::Char(c),
                None => return Err(()),
            },
            _ => return Err(()),
        };
        Ok(Self::normalized(key, command))
    }
}

#[derive(Debug, Clone)]
pub struct InputBindings {
    chord_to_action: HashMap<KeyChord, SheetAction>,
}

impl InputBindings {
    /// Defaults with `overrides` (action name -> key strings) applied on top. Unknown actions or
    /// keys are reported and skipped.
    pub fn with_overrides(overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut action_map = Self::default_action_map();
        for (action_name, keys) in overrides {
            let Some(action) = SheetAction::from_name(&action_name.trim().to_lowercase()) else {
                log::warn!("[input] unknown action '{action_name}', ignoring.");
                continue;
            };
            let mut parsed = Vec::new();
            for key in keys {
                match KeyChord::from_config_value(key) {
                    Ok(chord) => parsed.push(chord),
                    Err(()) => log::warn!("[input] unknown key '{key}' for action '{action_name}', ignoring."),
                }
            }
            if parsed.is_empty() {
                log::warn!("[input] action '{action_name}' has no valid keys, keeping defaults.");
                continue;
            }
            action_map.insert(action, parsed);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<SheetAction, Vec<KeyChord>> {
        use SheetAction::*;
        let plain = |key| vec![KeyChord::normalized(key, false)];
        let command = |c| vec![KeyChord::normalized(SheetKey::Char(c), true)];
        let mut map = HashMap::new();
        map.insert(ToggleAnaglyph, plain(SheetKey::Function(5)));
        map.insert(ToggleHyper, plain(SheetKey::Function(6)));
        map.insert(ToggleQuantum, plain(SheetKey::Function(7)));
        map.insert(AutoSum, plain(SheetKey::Function(8)));
        map.insert(ResetView, plain(SheetKey::Function(9)));
        map.insert(ToggleBold, command('b'));
        map.insert(ToggleItalic, command('i'));
        map.insert(ToggleStrikethrough, command('k'));
        map.insert(FontLarger, command('='));
        map.insert(FontSmaller, command('-'));
        map.insert(Save, command('s'));
        map.insert(Load, command('o'));
        map
    }

    fn from_action_map(action_map: HashMap<SheetAction, Vec<KeyChord>>) -> Self {
        let mut chord_to_action = HashMap::new();
        for (action, chords) in action_map {
            for chord in chords {
                chord_to_action.insert(chord, action);
            }
        }
        Self { chord_to_action }
    }

    pub fn action_for(&self, key: SheetKey, modifiers: Modifiers) -> Option<SheetAction> {
        self.chord_to_action.get(&KeyChord::normalized(key, modifiers.command())).copied()
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_toggles_and_shortcuts() {
        let bindings = InputBindings::default();
        assert_eq!(bindings.action_for(SheetKey::Function(5), Modifiers::empty()), Some(SheetAction::ToggleAnaglyph));
        assert_eq!(bindings.action_for(SheetKey::Char('B'), Modifiers::CTRL), Some(SheetAction::ToggleBold));
        assert_eq!(bindings.action_for(SheetKey::Char('b'), Modifiers::META), Some(SheetAction::ToggleBold));
        assert_eq!(bindings.action_for(SheetKey::Char('b'), Modifiers::empty()), None, "plain letters type");
    }

    #[test]
    fn config_values_parse() {
        assert_eq!(
            KeyChord::from_config_value("Ctrl+Q"),
            Ok(KeyChord { key: SheetKey::Char('q'), command: true })
        );
        assert_eq!(KeyChord::from_config_value("f10"), Ok(KeyChord { key: SheetKey::Function(10), command: false }));
        assert_eq!(KeyChord::from_config_value("ctrl++"), Ok(KeyChord { key: SheetKey::Char('+'), command: true }));
        assert!(KeyChord::from_config_value("hyper+x").is_err());
        assert!(KeyChord::from_config_value("f13").is_err());
    }

    #[test]
    fn named_keys_map_to_sheet_keys() {
        assert_eq!(sheet_key(&Key::Named(NamedKey::ArrowLeft)), Some(SheetKey::Arrow(ArrowKey::Left)));
        assert_eq!(sheet_key(&Key::Named(NamedKey::Space)), Some(SheetKey::Char(' ')));
        assert_eq!(sheet_key(&Key::Character("x".into())), Some(SheetKey::Char('x')));
        assert_eq!(SheetKey::Char('\u{8}').printable(), None);
    }
}
