//! Key bindings for the accept and dismiss commands
//!
//! Bindings are written as lowercase names in the config file, optionally
//! prefixed with modifiers: `"tab"`, `"esc"`, `"right"`, `"ctrl-y"`, `"alt-enter"`.

use std::fmt;
use std::str::FromStr;

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

use crate::error::GhostlineError;

/// A key code plus the modifiers that must be held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn tab() -> Self {
        Self::new(KeyCode::Tab, KeyModifiers::NONE)
    }

    pub const fn esc() -> Self {
        Self::new(KeyCode::Esc, KeyModifiers::NONE)
    }

    /// Check whether a key event triggers this binding
    ///
    /// Shift is ignored for character keys since it is already reflected in
    /// the character itself.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        if key.code != self.code {
            return false;
        }
        let mut modifiers = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        modifiers == self.modifiers
    }

    /// Human readable label, e.g. "Tab" or "Ctrl+Y"
    pub fn label(&self) -> String {
        let mut label = String::new();
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            label.push_str("Ctrl+");
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            label.push_str("Alt+");
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            label.push_str("Shift+");
        }
        let key = match self.code {
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            other => format!("{:?}", other),
        };
        label.push_str(&key);
        label
    }
}

fn parse_code(name: &str) -> Option<KeyCode> {
    let code = match name {
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "right" => KeyCode::Right,
        "end" => KeyCode::End,
        "space" => KeyCode::Char(' '),
        _ => {
            if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok())
                && (1..=12).contains(&n)
            {
                return Some(KeyCode::F(n));
            }
            let mut chars = name.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if !c.is_whitespace() => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}

impl FromStr for KeyBinding {
    type Err = GhostlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GhostlineError::InvalidKeyBinding(s.to_string());
        let normalized = s.trim().to_ascii_lowercase();

        let mut modifiers = KeyModifiers::NONE;
        let mut rest = normalized.as_str();
        loop {
            if let Some(r) = rest.strip_prefix("ctrl-") {
                modifiers |= KeyModifiers::CONTROL;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("alt-") {
                modifiers |= KeyModifiers::ALT;
                rest = r;
            } else if let Some(r) = rest.strip_prefix("shift-") {
                modifiers |= KeyModifiers::SHIFT;
                rest = r;
            } else {
                break;
            }
        }

        let code = parse_code(rest).ok_or_else(invalid)?;
        Ok(KeyBinding::new(code, modifiers))
    }
}

impl TryFrom<String> for KeyBinding {
    type Error = GhostlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<KeyBinding> for String {
    fn from(binding: KeyBinding) -> Self {
        binding.to_string()
    }
}

impl fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            f.write_str("shift-")?;
        }
        match self.code {
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::End => f.write_str("end"),
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::F(n) => write!(f, "f{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_parse_plain_keys() {
        assert_eq!("tab".parse::<KeyBinding>().unwrap(), KeyBinding::tab());
        assert_eq!("Esc".parse::<KeyBinding>().unwrap(), KeyBinding::esc());
        assert_eq!(
            "right".parse::<KeyBinding>().unwrap(),
            KeyBinding::new(KeyCode::Right, KeyModifiers::NONE)
        );
        assert_eq!(
            "f2".parse::<KeyBinding>().unwrap(),
            KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE)
        );
    }

    #[test]
    fn test_parse_modifiers() {
        let binding: KeyBinding = "ctrl-alt-y".parse().unwrap();
        assert_eq!(binding.code, KeyCode::Char('y'));
        assert!(binding.modifiers.contains(KeyModifiers::CONTROL));
        assert!(binding.modifiers.contains(KeyModifiers::ALT));
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!("hyper-q".parse::<KeyBinding>().is_err());
        assert!("ctrl-".parse::<KeyBinding>().is_err());
        assert!("f13".parse::<KeyBinding>().is_err());
        assert!("".parse::<KeyBinding>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for name in ["tab", "esc", "right", "ctrl-y", "alt-enter", "f5", "space"] {
            let binding: KeyBinding = name.parse().unwrap();
            assert_eq!(binding.to_string(), name);
        }
    }

    #[test]
    fn test_matches_requires_same_modifiers() {
        let tab = KeyBinding::tab();
        assert!(tab.matches(&key(KeyCode::Tab)));
        assert!(!tab.matches(&KeyEvent::new(KeyCode::Tab, KeyModifiers::CONTROL)));
        assert!(!tab.matches(&key(KeyCode::Esc)));
    }

    #[test]
    fn test_matches_ignores_shift_on_chars() {
        let binding: KeyBinding = "ctrl-y".parse().unwrap();
        assert!(binding.matches(&KeyEvent::new(
            KeyCode::Char('y'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT
        )));
    }

    #[test]
    fn test_labels() {
        assert_eq!(KeyBinding::tab().label(), "Tab");
        assert_eq!("ctrl-y".parse::<KeyBinding>().unwrap().label(), "Ctrl+Y");
        assert_eq!("right".parse::<KeyBinding>().unwrap().label(), "→");
    }
}
