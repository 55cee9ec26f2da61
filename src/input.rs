//! The multi-line text area where the snippet is typed or pasted before a
//! run starts.

use crate::helpers::{TAB_WIDTH, cursor_row_col, line_len, line_starts};

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_input::{Input, InputRequest};

pub const SAMPLE_CODE: &str = "function fibonacci(n) {
  if (n <= 1) return n;
  return fibonacci(n - 1) + fibonacci(n - 2);
}

console.log(fibonacci(10)); // 55";

pub const PLACEHOLDER: &str = "Or type your own code here...";

#[derive(Default)]
pub struct InputSurface {
    input: Input,
}

impl InputSurface {
    pub fn new(text: String) -> Self {
        Self {
            input: Input::new(text),
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    /// (row, column) of the cursor, in characters.
    pub fn cursor_row_col(&self) -> (usize, usize) {
        cursor_row_col(&line_starts(self.value()), self.cursor())
    }

    pub fn can_start(&self) -> bool {
        !self.value().trim().is_empty()
    }

    pub fn use_sample(&mut self) {
        self.input = Input::new(SAMPLE_CODE.to_string());
    }

    /// Replaces the indentation key's default with literal spaces.
    pub fn indent(&mut self) {
        for _ in 0..TAB_WIDTH {
            self.input.handle(InputRequest::InsertChar(' '));
        }
    }

    fn set_cursor(&mut self, cursor: usize) {
        self.input = std::mem::take(&mut self.input).with_cursor(cursor);
    }

    fn move_vertical(&mut self, down: bool) {
        let starts = line_starts(self.value());
        let total = self.value().chars().count();
        let (row, col) = cursor_row_col(&starts, self.cursor());

        let target_row = if down {
            if row + 1 >= starts.len() {
                return;
            }
            row + 1
        } else {
            match row.checked_sub(1) {
                Some(r) => r,
                None => return,
            }
        };

        let col = col.min(line_len(&starts, total, target_row));
        self.set_cursor(starts[target_row] + col);
    }

    fn move_line_edge(&mut self, end: bool) {
        let starts = line_starts(self.value());
        let total = self.value().chars().count();
        let (row, _) = cursor_row_col(&starts, self.cursor());

        let target = if end {
            starts[row] + line_len(&starts, total, row)
        } else {
            starts[row]
        };

        self.set_cursor(target);
    }

    /// Applies an editing key. Returns true when the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Tab => self.indent(),
            KeyCode::Enter => {
                self.input.handle(InputRequest::InsertChar('\n'));
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.handle(InputRequest::InsertChar(c));
            }
            KeyCode::Backspace => {
                self.input.handle(InputRequest::DeletePrevChar);
            }
            KeyCode::Delete => {
                self.input.handle(InputRequest::DeleteNextChar);
            }
            KeyCode::Left => {
                self.input.handle(InputRequest::GoToPrevChar);
            }
            KeyCode::Right => {
                self.input.handle(InputRequest::GoToNextChar);
            }
            KeyCode::Up => self.move_vertical(false),
            KeyCode::Down => self.move_vertical(true),
            KeyCode::Home if ctrl => {
                self.input.handle(InputRequest::GoToStart);
            }
            KeyCode::End if ctrl => {
                self.input.handle(InputRequest::GoToEnd);
            }
            KeyCode::Home => self.move_line_edge(false),
            KeyCode::End => self.move_line_edge(true),
            _ => return false,
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn surface(text: &str, cursor: usize) -> InputSurface {
        let mut surface = InputSurface::new(text.to_string());
        surface.set_cursor(cursor);
        surface
    }

    #[test]
    fn test_tab_inserts_four_spaces_at_cursor() {
        let mut surface = surface("abc", 1);

        assert!(surface.handle_key(key(KeyCode::Tab)));
        assert_eq!(surface.value(), "a    bc");
        assert_eq!(surface.cursor(), 5);
    }

    #[test]
    fn test_blank_input_cannot_start() {
        assert!(!InputSurface::default().can_start());
        assert!(!surface("  \n\t ", 0).can_start());
        assert!(surface(" x ", 0).can_start());
    }

    #[test]
    fn test_use_sample_replaces_content() {
        let mut surface = surface("previous text", 3);
        surface.use_sample();

        assert_eq!(surface.value(), SAMPLE_CODE);
        assert!(surface.value().starts_with("function fibonacci(n) {\n"));
        assert_eq!(surface.value().lines().count(), 6);
    }

    #[test]
    fn test_enter_inserts_line_break() {
        let mut surface = surface("ab", 1);
        surface.handle_key(key(KeyCode::Enter));

        assert_eq!(surface.value(), "a\nb");
        assert_eq!(surface.cursor_row_col(), (1, 0));
    }

    #[test]
    fn test_vertical_moves_clamp_column() {
        let mut surface = surface("abcdef\nxy\nlonger line", 5);

        surface.handle_key(key(KeyCode::Down));
        assert_eq!(surface.cursor_row_col(), (1, 2));

        surface.handle_key(key(KeyCode::Down));
        assert_eq!(surface.cursor_row_col(), (2, 2));

        surface.handle_key(key(KeyCode::Down));
        assert_eq!(surface.cursor_row_col(), (2, 2));

        surface.handle_key(key(KeyCode::Up));
        surface.handle_key(key(KeyCode::Up));
        assert_eq!(surface.cursor_row_col(), (0, 2));
    }

    #[test]
    fn test_home_end_work_per_line() {
        let mut surface = surface("one\ntwo", 5);

        surface.handle_key(key(KeyCode::End));
        assert_eq!(surface.cursor(), 7);

        surface.handle_key(key(KeyCode::Home));
        assert_eq!(surface.cursor(), 4);
    }

    #[test]
    fn test_ctrl_chars_not_inserted() {
        let mut surface = surface("a", 1);
        let consumed = surface.handle_key(KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert!(!consumed);
        assert_eq!(surface.value(), "a");
    }
}
