#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutKey {
    Character(char),
    Enter,
    Escape,
    Delete,
    Backspace,
}

/// Held modifiers. `ctrl` and `meta` are interchangeable as the command modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortcutModifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl ShortcutModifiers {
    pub const fn new(ctrl: bool, shift: bool) -> Self {
        Self {
            ctrl,
            meta: false,
            shift,
        }
    }

    pub const fn meta(shift: bool) -> Self {
        Self {
            ctrl: false,
            meta: true,
            shift,
        }
    }

    pub const fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputContext {
    pub text_edit_active: bool,
    pub in_editor: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    TextCommit,
    TextCancel,
    EditorUndo,
    EditorRedo,
    EditorSelectAll,
    EditorClearSelection,
    EditorDeleteSelection,
}

fn resolve_text_shortcut(key: ShortcutKey, modifiers: ShortcutModifiers) -> Option<ShortcutAction> {
    match (key, modifiers.command()) {
        (ShortcutKey::Enter, true) => Some(ShortcutAction::TextCommit),
        (ShortcutKey::Escape, _) => Some(ShortcutAction::TextCancel),
        _ => None,
    }
}

fn resolve_editor_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
) -> Option<ShortcutAction> {
    let key = match key {
        ShortcutKey::Character(c) => ShortcutKey::Character(c.to_ascii_lowercase()),
        other => other,
    };
    match (key, modifiers.command(), modifiers.shift) {
        (ShortcutKey::Character('z'), true, false) => Some(ShortcutAction::EditorUndo),
        (ShortcutKey::Character('z'), true, true) | (ShortcutKey::Character('y'), true, _) => {
            Some(ShortcutAction::EditorRedo)
        }
        (ShortcutKey::Character('a'), true, _) => Some(ShortcutAction::EditorSelectAll),
        (ShortcutKey::Escape, _, _) => Some(ShortcutAction::EditorClearSelection),
        (ShortcutKey::Delete, false, false) | (ShortcutKey::Backspace, false, false) => {
            Some(ShortcutAction::EditorDeleteSelection)
        }
        _ => None,
    }
}

pub fn resolve_shortcut(
    key: ShortcutKey,
    modifiers: ShortcutModifiers,
    context: InputContext,
) -> Option<ShortcutAction> {
    if context.text_edit_active {
        return resolve_text_shortcut(key, modifiers);
    }

    if context.in_editor {
        return resolve_editor_shortcut(key, modifiers);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const EDITOR: InputContext = InputContext {
        text_edit_active: false,
        in_editor: true,
    };

    #[test]
    fn resolve_shortcut_prioritizes_text_edit_session() {
        let context = InputContext {
            text_edit_active: true,
            in_editor: true,
        };
        assert_eq!(
            resolve_shortcut(ShortcutKey::Enter, ShortcutModifiers::new(true, false), context),
            Some(ShortcutAction::TextCommit)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Enter, ShortcutModifiers::default(), context),
            None
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Escape, ShortcutModifiers::default(), context),
            Some(ShortcutAction::TextCancel)
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('z'),
                ShortcutModifiers::new(true, false),
                context
            ),
            None
        );
    }

    #[test]
    fn resolve_shortcut_maps_history_shortcuts_for_either_command_modifier() {
        for (undo, redo_shift) in [
            (ShortcutModifiers::new(true, false), ShortcutModifiers::new(true, true)),
            (ShortcutModifiers::meta(false), ShortcutModifiers::meta(true)),
        ] {
            assert_eq!(
                resolve_shortcut(ShortcutKey::Character('z'), undo, EDITOR),
                Some(ShortcutAction::EditorUndo)
            );
            assert_eq!(
                resolve_shortcut(ShortcutKey::Character('z'), redo_shift, EDITOR),
                Some(ShortcutAction::EditorRedo)
            );
            assert_eq!(
                resolve_shortcut(ShortcutKey::Character('y'), undo, EDITOR),
                Some(ShortcutAction::EditorRedo)
            );
        }
    }

    #[test]
    fn resolve_shortcut_handles_uppercase_from_shift() {
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('Z'),
                ShortcutModifiers::new(true, true),
                EDITOR
            ),
            Some(ShortcutAction::EditorRedo)
        );
    }

    #[test]
    fn resolve_shortcut_maps_selection_shortcuts() {
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('a'),
                ShortcutModifiers::new(true, false),
                EDITOR
            ),
            Some(ShortcutAction::EditorSelectAll)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Escape, ShortcutModifiers::default(), EDITOR),
            Some(ShortcutAction::EditorClearSelection)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Delete, ShortcutModifiers::default(), EDITOR),
            Some(ShortcutAction::EditorDeleteSelection)
        );
        assert_eq!(
            resolve_shortcut(ShortcutKey::Backspace, ShortcutModifiers::default(), EDITOR),
            Some(ShortcutAction::EditorDeleteSelection)
        );
    }

    #[test]
    fn resolve_shortcut_ignores_plain_letters_and_outside_editor() {
        assert_eq!(
            resolve_shortcut(ShortcutKey::Character('z'), ShortcutModifiers::default(), EDITOR),
            None
        );
        assert_eq!(
            resolve_shortcut(
                ShortcutKey::Character('z'),
                ShortcutModifiers::new(true, false),
                InputContext::default()
            ),
            None
        );
    }
}
