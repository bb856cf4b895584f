use crate::ui::span::SpanLine;
use crate::ui::style::Color;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent,
    KeyCode as CrosstermKeyCode, KeyEvent as CrosstermKeyEvent, KeyEventKind,
    KeyModifiers as CrosstermKeyModifiers, MouseButton, MouseEventKind,
};
use crossterm::style::{
    Attribute, Color as CrosstermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{
    self, BeginSynchronizedUpdate, Clear, ClearType, EndSynchronizedUpdate, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Unknown,
    Char(char),
    Enter,
    Tab,
    BackTab,
    Esc,
    Backspace,
    Delete,
    Home,
    End,
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyModifiers(u8);

impl KeyModifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1 << 0);
    pub const CONTROL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);

    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub col: u16,
    pub row: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    Key(KeyEvent),
    Click(CursorPos),
    Resize(TerminalSize),
    Tick,
}

/// One line of output pinned to a screen position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLine {
    pub row: u16,
    pub col: u16,
    pub spans: SpanLine,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFrame {
    pub lines: Vec<PlacedLine>,
    pub cursor: Option<CursorPos>,
}

impl RenderFrame {
    pub fn push(&mut self, row: u16, col: u16, spans: SpanLine) {
        self.lines.push(PlacedLine { row, col, spans });
    }
}

/// Alternate-screen terminal with raw input and mouse capture.
pub struct Terminal {
    stdout: Stdout,
    size: TerminalSize,
}

impl Terminal {
    pub fn new() -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self {
            stdout: io::stdout(),
            size: TerminalSize { width, height },
        })
    }

    pub fn size(&self) -> TerminalSize {
        self.size
    }

    pub fn enter(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.stdout, EnterAlternateScreen, EnableMouseCapture, Hide)?;
        Ok(())
    }

    pub fn exit(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, DisableMouseCapture, LeaveAlternateScreen, Show)?;
        self.stdout.flush()
    }

    pub fn poll_event(&mut self, timeout: Duration) -> io::Result<TerminalEvent> {
        if !event::poll(timeout)? {
            return Ok(TerminalEvent::Tick);
        }
        match event::read()? {
            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(TerminalEvent::Key(map_key_event(key)))
            }
            CrosstermEvent::Resize(width, height) => {
                let size = TerminalSize { width, height };
                self.size = size;
                Ok(TerminalEvent::Resize(size))
            }
            CrosstermEvent::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => Ok(TerminalEvent::Click(CursorPos {
                    col: mouse.column,
                    row: mouse.row,
                })),
                _ => Ok(TerminalEvent::Tick),
            },
            _ => Ok(TerminalEvent::Tick),
        }
    }

    pub fn render_frame(&mut self, frame: &RenderFrame) -> io::Result<()> {
        queue!(self.stdout, BeginSynchronizedUpdate, Clear(ClearType::All))?;

        for line in &frame.lines {
            if line.row >= self.size.height {
                continue;
            }
            queue!(self.stdout, MoveTo(line.col, line.row))?;
            let max_width = usize::from(self.size.width.saturating_sub(line.col));
            self.queue_spans(&line.spans, max_width)?;
        }

        match frame.cursor {
            Some(cursor) => queue!(self.stdout, MoveTo(cursor.col, cursor.row), Show)?,
            None => queue!(self.stdout, Hide)?,
        }
        queue!(self.stdout, EndSynchronizedUpdate)?;
        self.stdout.flush()
    }

    fn queue_spans(&mut self, spans: &SpanLine, max_width: usize) -> io::Result<()> {
        let mut used = 0usize;
        for span in spans {
            if used >= max_width {
                break;
            }
            let mut text = String::new();
            for ch in span.text.chars() {
                let width = UnicodeWidthChar::width(ch).unwrap_or(0);
                if used + width > max_width {
                    break;
                }
                used += width;
                text.push(ch);
            }

            if let Some(fg) = span.style.color {
                queue!(self.stdout, SetForegroundColor(map_color(fg)))?;
            }
            if let Some(bg) = span.style.background {
                queue!(self.stdout, SetBackgroundColor(map_color(bg)))?;
            }
            if span.style.bold {
                queue!(self.stdout, SetAttribute(Attribute::Bold))?;
            }
            queue!(self.stdout, Print(text))?;
            if !span.style.is_plain() {
                queue!(self.stdout, SetAttribute(Attribute::Reset), ResetColor)?;
            }
        }
        Ok(())
    }
}

fn map_color(color: Color) -> CrosstermColor {
    match color {
        Color::Black => CrosstermColor::Black,
        Color::Cyan => CrosstermColor::Cyan,
        Color::DarkGrey => CrosstermColor::DarkGrey,
    }
}

fn map_key_event(key: CrosstermKeyEvent) -> KeyEvent {
    KeyEvent {
        code: map_key_code(key.code),
        modifiers: map_key_modifiers(key.modifiers),
    }
}

fn map_key_code(code: CrosstermKeyCode) -> KeyCode {
    match code {
        CrosstermKeyCode::Char(ch) => KeyCode::Char(ch),
        CrosstermKeyCode::Enter => KeyCode::Enter,
        CrosstermKeyCode::Tab => KeyCode::Tab,
        CrosstermKeyCode::BackTab => KeyCode::BackTab,
        CrosstermKeyCode::Esc => KeyCode::Esc,
        CrosstermKeyCode::Backspace => KeyCode::Backspace,
        CrosstermKeyCode::Delete => KeyCode::Delete,
        CrosstermKeyCode::Home => KeyCode::Home,
        CrosstermKeyCode::End => KeyCode::End,
        CrosstermKeyCode::Left => KeyCode::Left,
        CrosstermKeyCode::Right => KeyCode::Right,
        CrosstermKeyCode::Up => KeyCode::Up,
        CrosstermKeyCode::Down => KeyCode::Down,
        _ => KeyCode::Unknown,
    }
}

fn map_key_modifiers(modifiers: CrosstermKeyModifiers) -> KeyModifiers {
    let mut out = KeyModifiers::NONE;
    if modifiers.contains(CrosstermKeyModifiers::SHIFT) {
        out.0 |= KeyModifiers::SHIFT.0;
    }
    if modifiers.contains(CrosstermKeyModifiers::CONTROL) {
        out.0 |= KeyModifiers::CONTROL.0;
    }
    if modifiers.contains(CrosstermKeyModifiers::ALT) {
        out.0 |= KeyModifiers::ALT.0;
    }
    out
}
