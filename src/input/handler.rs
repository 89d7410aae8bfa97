use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::game::{CollectibleType, Direction, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Move(Direction),
    Start,
    TogglePause,
    ToggleHint,
    Restart,
    UpgradeCapacity,
    SelectNextItem,
    SellSelected,
    Sort(SortKey),
    Search(CollectibleType),
    Quit,
    None,
}

pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    pub fn handle_key_event(&self, key: KeyEvent) -> KeyAction {
        // Handle Ctrl+C
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }

        match key.code {
            // Movement - Arrow keys
            KeyCode::Up => KeyAction::Move(Direction::Up),
            KeyCode::Down => KeyAction::Move(Direction::Down),
            KeyCode::Left => KeyAction::Move(Direction::Left),
            KeyCode::Right => KeyAction::Move(Direction::Right),

            // Movement - WASD
            KeyCode::Char('w') | KeyCode::Char('W') => KeyAction::Move(Direction::Up),
            KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::Move(Direction::Down),
            KeyCode::Char('a') | KeyCode::Char('A') => KeyAction::Move(Direction::Left),
            KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Move(Direction::Right),

            // Controls
            KeyCode::Char(' ') => KeyAction::Start,
            KeyCode::Char('p') | KeyCode::Char('P') => KeyAction::TogglePause,
            KeyCode::Char('h') | KeyCode::Char('H') => KeyAction::ToggleHint,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Restart,

            // Inventory
            KeyCode::Char('u') | KeyCode::Char('U') => KeyAction::UpgradeCapacity,
            KeyCode::Tab => KeyAction::SelectNextItem,
            KeyCode::Char('e') | KeyCode::Char('E') => KeyAction::SellSelected,
            KeyCode::Char('v') | KeyCode::Char('V') => KeyAction::Sort(SortKey::Value),
            KeyCode::Char('g') | KeyCode::Char('G') => KeyAction::Sort(SortKey::Weight),
            KeyCode::Char('t') | KeyCode::Char('T') => KeyAction::Sort(SortKey::CollectedAt),
            KeyCode::Char('y') | KeyCode::Char('Y') => KeyAction::Sort(SortKey::Kind),
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                KeyAction::Search(CollectibleType::ALL[index])
            }

            _ => KeyAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
