//! Derived editor values and gutter alignment.
//!
//! Everything here is computed from the revealed text on demand. The only
//! state is [`ScrollSync`], where the code column leads and the line-number
//! gutter copies its vertical offset.

use crate::{
    config::ScrollConfig,
    scroll::SmoothScroll,
    types::{CursorStatus, LineRow, RunState},
};

use std::time::Instant;
use unicode_width::UnicodeWidthStr;

pub fn line_count(revealed: &str) -> usize {
    revealed.split('\n').count()
}

/// Gutter rows for `revealed`. While a run is in progress and something has
/// been typed, one placeholder row follows the numbered ones.
pub fn line_rows(revealed: &str, state: RunState) -> Vec<LineRow> {
    let count = line_count(revealed);
    let mut rows: Vec<LineRow> = (1..=count).map(LineRow::Numbered).collect();

    if state == RunState::Running && !revealed.is_empty() {
        rows.push(LineRow::Placeholder(count + 1));
    }

    rows
}

pub fn cursor_status(revealed: &str) -> CursorStatus {
    let last = revealed.rsplit('\n').next().unwrap_or("");

    CursorStatus {
        line: line_count(revealed),
        column: last.chars().count(),
    }
}

/// Display column just past the last revealed character.
pub fn trailing_column(revealed: &str) -> u16 {
    let last = revealed.rsplit('\n').next().unwrap_or("");

    u16::try_from(last.width()).unwrap_or(u16::MAX)
}

/// Horizontal offset that keeps the typing position in view with `margin`
/// free columns to its right.
pub fn horizontal_target(revealed: &str, viewport_width: u16, margin: u16) -> u16 {
    trailing_column(revealed)
        .saturating_add(margin)
        .saturating_sub(viewport_width)
}

/// Scroll offsets of the code column and the gutter that mirrors it.
#[derive(Debug, Clone)]
pub struct ScrollSync {
    code_y: u16,
    gutter_y: u16,
    code_x: SmoothScroll,
    margin: u16,
}

impl ScrollSync {
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            code_y: 0,
            gutter_y: 0,
            code_x: SmoothScroll::new(config),
            margin: config.margin,
        }
    }

    pub fn code_offset(&self) -> (u16, u16) {
        (self.code_y, self.code_x.current())
    }

    pub fn gutter_offset(&self) -> u16 {
        self.gutter_y
    }

    /// Every vertical move of the code column lands on the gutter too.
    pub fn set_code_y(&mut self, y: u16) {
        self.code_y = y;
        self.gutter_y = self.code_y;
    }

    pub fn scroll_by(&mut self, delta: i32, total_rows: usize, viewport_height: u16) {
        let max = max_scroll(total_rows, viewport_height) as i32;
        let y = (self.code_y as i32 + delta).clamp(0, max);

        self.set_code_y(y as u16);
    }

    /// Keeps the last line inside the viewport and eases the code column
    /// sideways towards the typing position.
    pub fn follow(&mut self, revealed: &str, viewport: (u16, u16), now: Instant) {
        let (width, height) = viewport;
        let last_row = line_count(revealed).saturating_sub(1);
        let last_row = u16::try_from(last_row).unwrap_or(u16::MAX);
        let height = height.max(1);

        if last_row >= self.code_y.saturating_add(height) {
            self.set_code_y(last_row - height + 1);
        } else if last_row < self.code_y {
            self.set_code_y(last_row);
        }

        let target = horizontal_target(revealed, width, self.margin);
        self.code_x.scroll_to(target, now);
    }

    /// Advances the horizontal animation.
    pub fn update(&mut self, now: Instant) {
        self.code_x.update(now);
    }

    pub fn reset(&mut self) {
        self.set_code_y(0);
        self.code_x.reset();
    }
}

pub fn max_scroll(total_rows: usize, viewport_height: u16) -> u16 {
    let total = u16::try_from(total_rows).unwrap_or(u16::MAX);
    total.saturating_sub(viewport_height)
}
