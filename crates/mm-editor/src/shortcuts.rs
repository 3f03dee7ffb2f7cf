//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomToFit,

    // ── Output ──
    Export,

    // ── Edit ──
    /// Leave text edit mode.
    EndEdit,
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"+"`, `"Escape"`).
    /// Returns `None` if the key combo has no binding. Shift is not
    /// consulted: `+` needs it on most layouts.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        _shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd {
            return match key {
                "e" | "E" => Some(ShortcutAction::Export),
                _ => None,
            };
        }

        if alt {
            return None;
        }

        // ── Single keys ──
        match key {
            "+" | "=" => Some(ShortcutAction::ZoomIn),
            "-" => Some(ShortcutAction::ZoomOut),
            "0" => Some(ShortcutAction::ZoomToFit),
            "Escape" => Some(ShortcutAction::EndEdit),
            _ => None,
        }
    }

    /// Like `resolve`, but while a node's text is being edited every key
    /// belongs to the text field except Escape.
    pub fn resolve_in_context(
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
        editing: bool,
    ) -> Option<ShortcutAction> {
        let action = Self::resolve(key, ctrl, shift, alt, meta)?;
        if editing && action != ShortcutAction::EndEdit {
            return None;
        }
        Some(action)
    }
}
