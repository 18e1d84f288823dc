use anyhow::{Context, Result};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};

/// Owns the registration of the single trigger shortcut.
///
/// Must be created, polled and dropped on the same thread: on Windows the
/// hotkey messages are delivered to that thread's message queue.
pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
    shortcut: String,
}

impl HotkeyManager {
    /// Register a shortcut string such as "alt+y"
    pub fn from_shortcut(shortcut: &str) -> Result<Self> {
        let hotkey = parse_shortcut(shortcut)?;
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        manager
            .register(hotkey)
            .with_context(|| format!("Failed to register hotkey {shortcut:?}"))?;

        Ok(Self {
            manager,
            hotkey,
            shortcut: shortcut.to_string(),
        })
    }

    /// Check if the hotkey was pressed since the last call (non-blocking)
    pub fn poll(&self) -> bool {
        pump_messages();

        let receiver = GlobalHotKeyEvent::receiver();
        let mut pressed = false;
        while let Ok(event) = receiver.try_recv() {
            if event.id != self.hotkey.id() {
                tracing::debug!("Ignoring hotkey event for id {}", event.id);
                continue;
            }
            // Releases are reported too
            if let HotKeyState::Pressed = event.state {
                pressed = true;
            }
        }
        pressed
    }

    pub fn shortcut(&self) -> &str {
        &self.shortcut
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        if let Err(e) = self.manager.unregister(self.hotkey) {
            tracing::warn!("Failed to unregister hotkey {}: {}", self.shortcut, e);
        }
    }
}

#[cfg(windows)]
fn pump_messages() {
    use windows::Win32::UI::WindowsAndMessaging::{
        DispatchMessageW, MSG, PM_REMOVE, PeekMessageW, TranslateMessage,
    };

    let mut msg = MSG::default();
    unsafe {
        while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}

#[cfg(not(windows))]
fn pump_messages() {}

/// Parse a shortcut like "alt+y" or "Ctrl+Shift+F9" into a `HotKey`
pub fn parse_shortcut(s: &str) -> Result<HotKey> {
    let mut modifiers = Modifiers::empty();
    let mut key_code: Option<Code> = None;

    for token in s.split('+') {
        let token = token.trim();
        match token.to_lowercase().as_str() {
            "" => anyhow::bail!("empty key in shortcut: {s:?}"),
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "super" | "win" | "windows" | "meta" | "cmd" | "command" => {
                modifiers |= Modifiers::SUPER
            }
            _ => {
                if key_code.is_some() {
                    anyhow::bail!("multiple key codes in shortcut: {s:?}");
                }
                key_code = Some(parse_key_code(token)?);
            }
        }
    }

    let code = key_code.with_context(|| format!("no key code found in shortcut: {s:?}"))?;
    let mods = if modifiers.is_empty() {
        None
    } else {
        Some(modifiers)
    };
    Ok(HotKey::new(mods, code))
}

fn parse_key_code(token: &str) -> Result<Code> {
    let code = match token.to_lowercase().as_str() {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "space" => Code::Space,
        "enter" | "return" => Code::Enter,
        "tab" => Code::Tab,
        "escape" | "esc" => Code::Escape,
        "backspace" => Code::Backspace,
        "delete" | "del" => Code::Delete,
        "insert" | "ins" => Code::Insert,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" | "page up" => Code::PageUp,
        "pagedown" | "page down" => Code::PageDown,
        "up" => Code::ArrowUp,
        "down" => Code::ArrowDown,
        "left" => Code::ArrowLeft,
        "right" => Code::ArrowRight,
        "printscreen" | "print screen" => Code::PrintScreen,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        _ => anyhow::bail!("unknown key: {token:?}"),
    };
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_shortcut() {
        let hotkey = parse_shortcut("alt+y").unwrap();
        assert_eq!(hotkey, HotKey::new(Some(Modifiers::ALT), Code::KeyY));
    }

    #[test]
    fn test_parse_is_case_and_space_insensitive() {
        let hotkey = parse_shortcut(" Ctrl + Shift + F9 ").unwrap();
        assert_eq!(
            hotkey,
            HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::F9)
        );
    }

    #[test]
    fn test_parse_without_modifiers() {
        let hotkey = parse_shortcut("f8").unwrap();
        assert_eq!(hotkey, HotKey::new(None, Code::F8));
    }

    #[test]
    fn test_parse_rejects_bad_shortcuts() {
        assert!(parse_shortcut("alt+shift").is_err());
        assert!(parse_shortcut("alt+y+z").is_err());
        assert!(parse_shortcut("alt+hyper").is_err());
        assert!(parse_shortcut("alt++y").is_err());
    }
}
