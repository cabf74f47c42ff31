use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Actions produced by key input handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Quit the application.
    Quit,
    /// Add a node from the given palette slot (0-based).
    AddNode(usize),
    /// Trigger a run pass over the current graph.
    Run,
    /// Zoom the viewport in or out by one step.
    ZoomIn,
    ZoomOut,
    /// Pan the viewport by (dx, dy) world cells.
    Pan(i32, i32),
    /// Drop the pending connection, if any.
    Deselect,
    /// No-op.
    None,
}

/// Map a key event to an action.
pub fn map_key(key: KeyEvent) -> InputAction {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputAction::Quit,
        KeyCode::Char('q') => InputAction::Quit,
        KeyCode::Char('r') => InputAction::Run,
        KeyCode::Char('+') | KeyCode::Char('=') => InputAction::ZoomIn,
        KeyCode::Char('-') => InputAction::ZoomOut,
        KeyCode::Esc => InputAction::Deselect,
        KeyCode::Left => InputAction::Pan(2, 0),
        KeyCode::Right => InputAction::Pan(-2, 0),
        KeyCode::Up => InputAction::Pan(0, 1),
        KeyCode::Down => InputAction::Pan(0, -1),
        KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
            InputAction::AddNode(c as usize - '1' as usize)
        }
        _ => InputAction::None,
    }
}
