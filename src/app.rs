use crate::{
    animation::{AnimationDriver, AnimationError, Reveal},
    config::Config,
    helpers::{
        build_gutter_lines, build_plain_lines, follow_offset, gutter_width, line_starts,
        status_text,
    },
    highlight::Highlighter,
    input::{InputSurface, PLACEHOLDER, SAMPLE_CODE},
    sync::{ScrollSync, cursor_status, line_count, line_rows, trailing_column},
    types::{Language, RunState, TextSource},
};

use ratatui::{
    crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind},
    prelude::*,
    widgets::*,
};
use std::time::{Duration, Instant};
use unicode_width::UnicodeWidthStr;

const WHEEL_LINES: i32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

pub struct App {
    config: Config,
    input: InputSurface,
    driver: AnimationDriver,
    highlighter: Box<dyn Highlighter>,
    highlighted: Vec<Line<'static>>,
    highlight_failed: bool,
    sync: ScrollSync,
    language: Language,
    /// Width and height of the code column as last drawn.
    code_viewport: (u16, u16),
}

impl App {
    pub fn new(
        config: Config,
        source: TextSource,
        seed: Option<u64>,
        highlighter: Box<dyn Highlighter>,
    ) -> Self {
        let input = match source {
            TextSource::Fixed(text) => InputSurface::new(text),
            TextSource::Sample => InputSurface::new(SAMPLE_CODE.to_string()),
            TextSource::Empty => InputSurface::default(),
        };

        Self {
            driver: AnimationDriver::new(&config.typing, seed),
            sync: ScrollSync::new(&config.scroll),
            config,
            input,
            highlighter,
            highlighted: Vec::new(),
            highlight_failed: false,
            language: Language::JavaScript,
            code_viewport: (80, 20),
        }
    }

    pub fn state(&self) -> RunState {
        self.driver.state()
    }

    pub fn revealed(&self) -> &str {
        self.driver.revealed()
    }

    #[cfg(test)]
    pub fn input(&self) -> &InputSurface {
        &self.input
    }

    #[cfg(test)]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.driver.next_deadline()
    }

    /// How long the event loop may block before the next frame is due.
    pub fn poll_timeout(&self, now: Instant) -> Duration {
        let frame = self.config.frame_rate();

        match self.driver.next_deadline() {
            Some(due) => due.saturating_duration_since(now).min(frame),
            None => frame,
        }
    }

    pub fn start(&mut self, now: Instant) {
        if !self.input.can_start() {
            return;
        }

        match self.driver.start(self.input.value(), now) {
            Ok(_) => {
                self.highlight_failed = false;
                self.highlighted.clear();
                self.sync.reset();
            }
            Err(AnimationError::EmptySource) | Err(AnimationError::AlreadyRunning) => {
                tracing::debug!("start ignored in state {:?}", self.driver.state());
            }
        }
    }

    /// Back to the input surface with the previous text intact.
    pub fn reset(&mut self) {
        self.driver.reset();
        self.highlighted.clear();
        self.sync.reset();
    }

    /// Fires a due reveal and advances scroll animation.
    pub fn on_frame(&mut self, now: Instant) {
        match self.driver.poll(now) {
            Some(Reveal::Advanced(cursor)) => {
                tracing::trace!(cursor, "revealed character");
                self.refresh(now);
            }
            Some(Reveal::Completed(chars)) => {
                tracing::debug!(chars, "all characters revealed");
                self.refresh(now);
            }
            None => {}
        }

        self.sync.update(now);
    }

    fn refresh(&mut self, now: Instant) {
        let revealed = self.driver.revealed();

        self.highlighted = match self.highlighter.highlight(revealed, self.language) {
            Ok(lines) => lines,
            Err(e) => {
                if !self.highlight_failed {
                    tracing::warn!(error = %e, "highlighting failed, showing plain text");
                    self.highlight_failed = true;
                }

                build_plain_lines(revealed)
            }
        };

        self.sync.follow(revealed, self.code_viewport, now);
    }

    fn scroll(&mut self, delta: i32) {
        let rows = line_count(self.driver.revealed());
        self.sync.scroll_by(delta, rows, self.code_viewport.1);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Esc {
            return Action::Quit;
        }

        match self.driver.state() {
            RunState::Idle => match key.code {
                KeyCode::F(2) => self.input.use_sample(),
                KeyCode::F(5) => self.start(Instant::now()),
                _ => {
                    self.input.handle_key(key);
                }
            },
            RunState::Running | RunState::Completed => {
                let page = self.code_viewport.1.max(1) as i32;

                match key.code {
                    KeyCode::F(6) => self.reset(),
                    KeyCode::Enter | KeyCode::Char('r')
                        if self.driver.state() == RunState::Completed =>
                    {
                        self.reset()
                    }
                    KeyCode::Up => self.scroll(-1),
                    KeyCode::Down => self.scroll(1),
                    KeyCode::PageUp => self.scroll(-page),
                    KeyCode::PageDown => self.scroll(page),
                    _ => {}
                }
            }
        }

        Action::Continue
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.driver.state() == RunState::Idle {
            return;
        }

        match mouse.kind {
            MouseEventKind::ScrollUp => self.scroll(-WHEEL_LINES),
            MouseEventKind::ScrollDown => self.scroll(WHEEL_LINES),
            _ => {}
        }
    }

    pub fn draw_ui(&mut self, f: &mut Frame) {
        match self.driver.state() {
            RunState::Idle => self.draw_input(f),
            RunState::Running | RunState::Completed => self.draw_editor(f),
        }
    }

    fn draw_input(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(5),    // Text area
                Constraint::Length(3), // Buttons
                Constraint::Length(1), // Hint
            ])
            .split(f.area());

        let title = Paragraph::new("Typewriter").alignment(Alignment::Center);
        f.render_widget(title, chunks[0]);

        let block = Block::default().title("Code").borders(Borders::ALL);
        let inner = block.inner(chunks[1]);
        let value = self.input.value();

        let (row, col) = self.input.cursor_row_col();
        let line = value.split('\n').nth(row).unwrap_or("");
        let col_width: String = line.chars().take(col).collect();
        let col_width = col_width.width();
        let line_width = line.width();

        let scroll_y = follow_offset(row, inner.height, line_starts(value).len());
        let scroll_x = follow_offset(col_width, inner.width, line_width + 1);

        let text_area = if value.is_empty() {
            Paragraph::new(Span::styled(
                PLACEHOLDER,
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Paragraph::new(value).scroll((scroll_y, scroll_x))
        };
        f.render_widget(text_area.block(block), chunks[1]);

        let cursor_x = inner.x + (col_width as u16).saturating_sub(scroll_x);
        let cursor_y = inner.y + (row as u16).saturating_sub(scroll_y);
        f.set_cursor_position((cursor_x, cursor_y));

        let buttons = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        let sample = Paragraph::new("[F2] Use Sample Code")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(sample, buttons[0]);

        let start_style = if self.input.can_start() {
            Style::default().fg(Color::Black).bg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let start = Paragraph::new("[F5] Start Typing Effect")
            .alignment(Alignment::Center)
            .style(start_style)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(start, buttons[1]);

        let hint = Paragraph::new("Tab inserts 4 spaces | Esc to quit")
            .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hint, chunks[3]);
    }

    fn draw_editor(&mut self, f: &mut Frame) {
        let state = self.driver.state();
        let completed = state == RunState::Completed;

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1), // File name
                Constraint::Min(3),    // Editor body
                Constraint::Length(1), // Status bar
                Constraint::Length(1), // Hint
            ])
            .split(f.area());

        let header = Paragraph::new(Span::styled(
            format!(" {} ", self.config.ui.file_name),
            Style::default().fg(Color::White).bg(Color::DarkGray),
        ));
        f.render_widget(header, chunks[0]);

        let revealed = self.driver.revealed();
        let rows = line_rows(revealed, state);
        let number_width = gutter_width(&rows);

        let body = Block::default().borders(Borders::ALL);
        let body_inner = body.inner(chunks[1]);
        f.render_widget(body, chunks[1]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(number_width as u16 + 1),
                Constraint::Min(1),
            ])
            .split(body_inner);

        let gutter = Paragraph::new(build_gutter_lines(&rows, number_width))
            .scroll((self.sync.gutter_offset(), 0));
        f.render_widget(gutter, columns[0]);

        let code_area = columns[1];
        self.code_viewport = (code_area.width, code_area.height);

        let (code_y, code_x) = self.sync.code_offset();
        let code = Paragraph::new(self.highlighted.clone()).scroll((code_y, code_x));
        f.render_widget(code, code_area);

        if state == RunState::Running {
            let row = line_count(revealed).saturating_sub(1) as u16;
            let col = trailing_column(revealed);

            if row >= code_y && col >= code_x {
                let (y, x) = (row - code_y, col - code_x);

                if y < code_area.height && x < code_area.width {
                    f.set_cursor_position((code_area.x + x, code_area.y + y));
                }
            }
        }

        if completed {
            let status = Paragraph::new(status_text(
                self.language.label(),
                cursor_status(revealed),
            ))
            .style(Style::default().fg(Color::Black).bg(Color::Cyan));
            f.render_widget(status, chunks[2]);
        }

        let hint = if completed {
            "[Enter] Restart Animation | Esc to quit".to_string()
        } else {
            format!(
                "{}/{} | [F6] Reset | Up/Down/PgUp/PgDn to scroll | Esc to quit",
                self.driver.cursor(),
                self.driver.char_count()
            )
        };
        f.render_widget(
            Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}
