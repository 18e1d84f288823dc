use serde::{Deserialize, Serialize};

fn default_shortcut() -> String {
    "alt+y".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Shortcut such as "alt+y" or "ctrl+shift+F9"
    #[serde(default = "default_shortcut")]
    pub shortcut: String,
}

impl HotkeyConfig {
    pub fn from_lookup<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            shortcut: lookup("SHORTCUT")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(default_shortcut),
        }
    }
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            shortcut: default_shortcut(),
        }
    }
}
