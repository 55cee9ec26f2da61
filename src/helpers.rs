use crate::{
    error::Result,
    highlight::TokenKind,
    types::{CursorStatus, LineRow},
};

use ratatui::prelude::*;
use std::{fs, path::Path};

pub const TAB_WIDTH: usize = 4;

/// Reads a snippet from disk with line endings normalised and tabs expanded.
pub fn load_text_file(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path)?;

    Ok(content
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\t', &" ".repeat(TAB_WIDTH)))
}

/// Character index at which each line of `text` begins.
pub fn line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0];

    for (i, ch) in text.chars().enumerate() {
        if ch == '\n' {
            starts.push(i + 1);
        }
    }

    starts
}

/// Row and column (both in characters) of character index `idx`.
pub fn cursor_row_col(starts: &[usize], idx: usize) -> (usize, usize) {
    let row = starts
        .iter()
        .rposition(|&start| start <= idx)
        .unwrap_or(0);

    (row, idx - starts[row])
}

/// Number of characters on `row`, excluding its line break.
pub fn line_len(starts: &[usize], total_chars: usize, row: usize) -> usize {
    match starts.get(row + 1) {
        Some(next) => next - 1 - starts[row],
        None => total_chars - starts[row],
    }
}

/// Scroll offset that keeps `cursor` within a window of `visible` cells.
pub fn follow_offset(cursor: usize, visible: u16, total: usize) -> u16 {
    let visible = visible.max(1) as usize;
    let max_scroll = total.saturating_sub(visible);
    let desired = cursor.saturating_sub(visible - 1);

    u16::try_from(desired.min(max_scroll)).unwrap_or(u16::MAX)
}

pub fn build_gutter_lines(rows: &[LineRow], width: usize) -> Vec<Line<'static>> {
    rows.iter()
        .map(|row| match row {
            LineRow::Numbered(n) => Line::from(Span::styled(
                format!("{:>width$} ", n),
                Style::default().fg(Color::DarkGray),
            )),
            LineRow::Placeholder(n) => Line::from(Span::styled(
                format!("{:>width$} ", n),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::DIM),
            )),
        })
        .collect()
}

pub fn gutter_width(rows: &[LineRow]) -> usize {
    let widest = rows
        .iter()
        .map(|row| match row {
            LineRow::Numbered(n) | LineRow::Placeholder(n) => *n,
        })
        .max()
        .unwrap_or(1);

    widest.to_string().len().max(2)
}

/// Uncoloured fallback for when the highlighter refuses the text.
pub fn build_plain_lines(text: &str) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| {
            let clean: String = line
                .chars()
                .map(|c| if c.is_control() { '\u{FFFD}' } else { c })
                .collect();

            Line::from(Span::styled(clean, TokenKind::Default.style()))
        })
        .collect()
}

pub fn status_text(language: &str, status: CursorStatus) -> String {
    format!(" {}  Ln {}, Col {} ", language, status.line, status.column)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_starts() {
        assert_eq!(line_starts(""), vec![0]);
        assert_eq!(line_starts("ab\ncd\n"), vec![0, 3, 6]);
    }

    #[test]
    fn test_cursor_row_col() {
        let starts = line_starts("ab\ncd");

        assert_eq!(cursor_row_col(&starts, 0), (0, 0));
        assert_eq!(cursor_row_col(&starts, 2), (0, 2));
        assert_eq!(cursor_row_col(&starts, 3), (1, 0));
        assert_eq!(cursor_row_col(&starts, 5), (1, 2));
    }

    #[test]
    fn test_line_len() {
        let text = "abc\n\nde";
        let starts = line_starts(text);
        let total = text.chars().count();

        assert_eq!(line_len(&starts, total, 0), 3);
        assert_eq!(line_len(&starts, total, 1), 0);
        assert_eq!(line_len(&starts, total, 2), 2);
    }

    #[test]
    fn test_follow_offset() {
        assert_eq!(follow_offset(0, 5, 20), 0);
        assert_eq!(follow_offset(4, 5, 20), 0);
        assert_eq!(follow_offset(7, 5, 20), 3);
        assert_eq!(follow_offset(19, 5, 20), 15);
    }

    #[test]
    fn test_gutter_width_grows() {
        assert_eq!(gutter_width(&[LineRow::Numbered(1)]), 2);
        assert_eq!(gutter_width(&[LineRow::Placeholder(100)]), 3);
    }

    #[test]
    fn test_plain_lines_scrub_control_chars() {
        let lines = build_plain_lines("a\u{1b}b\nc");

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "a\u{FFFD}b");
    }

    #[test]
    fn test_load_text_file_normalises() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snippet.js");
        fs::write(&path, "a\r\n\tb").unwrap();

        assert_eq!(load_text_file(&path).unwrap(), "a\n    b");
    }

    #[test]
    fn test_load_text_file_bare_carriage_returns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classic.js");
        fs::write(&path, "a\rb\r\nc\r").unwrap();

        assert_eq!(load_text_file(&path).unwrap(), "a\nb\nc\n");
    }

    #[test]
    fn test_status_text() {
        let status = CursorStatus { line: 2, column: 2 };
        assert_eq!(status_text("JavaScript", status), " JavaScript  Ln 2, Col 2 ");
    }
}
