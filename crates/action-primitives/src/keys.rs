//! Key names accepted by `press_key`, mapped to Windows virtual key codes.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One entry of the key table: virtual key code plus DOM `key` and `code` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDefinition {
    pub windows_virtual_key_code: u32,
    pub key: String,
    pub code: String,
}

fn named(vk: u32, key: &str, code: &str) -> KeyDefinition {
    KeyDefinition {
        windows_virtual_key_code: vk,
        key: key.to_string(),
        code: code.to_string(),
    }
}

static KEYS: Lazy<HashMap<String, KeyDefinition>> = Lazy::new(|| {
    let mut keys = HashMap::new();
    let mut add = |names: &[&str], def: KeyDefinition| {
        for name in names {
            keys.insert(name.to_string(), def.clone());
        }
    };

    add(&["backspace"], named(8, "Backspace", "Backspace"));
    add(&["tab"], named(9, "Tab", "Tab"));
    add(&["enter", "return"], named(13, "Enter", "Enter"));
    add(&["shift"], named(16, "Shift", "ShiftLeft"));
    add(&["control", "ctrl"], named(17, "Control", "ControlLeft"));
    add(&["alt"], named(18, "Alt", "AltLeft"));
    add(&["pause"], named(19, "Pause", "Pause"));
    add(&["capslock"], named(20, "CapsLock", "CapsLock"));
    add(&["escape", "esc"], named(27, "Escape", "Escape"));
    add(&["space", " "], named(32, " ", "Space"));
    add(&["pageup"], named(33, "PageUp", "PageUp"));
    add(&["pagedown"], named(34, "PageDown", "PageDown"));
    add(&["end"], named(35, "End", "End"));
    add(&["home"], named(36, "Home", "Home"));
    add(&["arrowleft", "left"], named(37, "ArrowLeft", "ArrowLeft"));
    add(&["arrowup", "up"], named(38, "ArrowUp", "ArrowUp"));
    add(&["arrowright", "right"], named(39, "ArrowRight", "ArrowRight"));
    add(&["arrowdown", "down"], named(40, "ArrowDown", "ArrowDown"));
    add(&["insert"], named(45, "Insert", "Insert"));
    add(&["delete", "del"], named(46, "Delete", "Delete"));
    add(&["meta", "command"], named(91, "Meta", "MetaLeft"));

    for (offset, digit) in ('0'..='9').enumerate() {
        let key = digit.to_string();
        add(&[key.as_str()], named(48 + offset as u32, &key, &format!("Digit{digit}")));
    }
    for (offset, letter) in ('a'..='z').enumerate() {
        let key = letter.to_string();
        let code = format!("Key{}", letter.to_ascii_uppercase());
        add(&[key.as_str()], named(65 + offset as u32, &key, &code));
    }
    for n in 1..=12u32 {
        let name = format!("F{n}");
        add(&[name.to_ascii_lowercase().as_str()], named(111 + n, &name, &name));
    }
    keys
});

/// Case-insensitive lookup; `None` for names outside the table.
pub fn lookup(name: &str) -> Option<&'static KeyDefinition> {
    KEYS.get(&name.to_ascii_lowercase())
}
