//! Keyboard bindings understood by the reference kinds.

/// A key binding definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub shift: bool,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            shift,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Shift+Up").
    pub fn format(&self) -> String {
        if self.shift {
            format!("Shift+{}", self.key)
        } else {
            self.key.to_string()
        }
    }

    /// Check if a key name reported by the canvas matches this binding.
    pub fn matches(&self, key: &str) -> bool {
        let expected = self.format();
        key.eq_ignore_ascii_case(&expected)
    }
}

pub const NEXT_COLOR: Shortcut = Shortcut::new("Up", false, "Next palette color");
pub const PREVIOUS_COLOR: Shortcut = Shortcut::new("Down", false, "Previous palette color");
pub const HIDE: Shortcut = Shortcut::new("H", false, "Hide the cursor");
pub const REMOVE: Shortcut = Shortcut::new("Delete", false, "Remove the cursor");
pub const REMOVE_ALL: Shortcut = Shortcut::new("Delete", true, "Remove every cursor on the canvas");
pub const ADD_POINT: Shortcut = Shortcut::new("A", false, "Record the cursor position");
pub const REMOVE_POINT: Shortcut = Shortcut::new("Z", false, "Forget the last recorded position");
pub const STOP: Shortcut = Shortcut::new("Enter", false, "Stop recording and remove the cursor");

/// Registry of all key bindings.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            NEXT_COLOR,
            PREVIOUS_COLOR,
            HIDE,
            REMOVE,
            REMOVE_ALL,
            ADD_POINT,
            REMOVE_POINT,
            STOP,
        ]
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Cursor Keys ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}
