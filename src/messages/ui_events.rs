//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // Threat list navigation
    CursorUp,
    CursorDown,
    /// Select the highlighted threat (the "click")
    SelectThreat,

    // Explanation panel
    Explain,

    // Popups
    ToggleStats,
    ToggleHelp,
    CloseHelp,

    // System
    Reload,
    Quit,
}

/// Convert a key event to a UiEvent based on which popups are open
pub fn key_to_ui_event(key: KeyEvent, show_help: bool, show_stats: bool) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Any key closes help
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if show_stats {
        return match key.code {
            KeyCode::Esc | KeyCode::Char('s') => Some(UiEvent::ToggleStats),
            KeyCode::Char('q') => Some(UiEvent::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Up | KeyCode::Char('k') => Some(UiEvent::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(UiEvent::CursorDown),
        KeyCode::Enter | KeyCode::Char(' ') => Some(UiEvent::SelectThreat),
        KeyCode::Char('x') => Some(UiEvent::Explain),
        KeyCode::Char('s') => Some(UiEvent::ToggleStats),
        KeyCode::Char('R') => Some(UiEvent::Reload),
        _ => None,
    }
}
