use crate::ui::span::{Span, SpanLine};
use crate::ui::style::{Color, Style};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Rows the popup frame adds around its items (top and bottom border).
pub const POPUP_CHROME_ROWS: i32 = 2;

/// Draws the suggestion box: a border, one row per item, the active row
/// highlighted. `width` is the full outer width including both borders.
pub fn render_popup(items: &[&str], active: Option<usize>, width: usize) -> Vec<SpanLine> {
    let inner = width.saturating_sub(2);
    let border = Style::new().color(Color::DarkGrey);
    let mut lines = Vec::with_capacity(items.len() + 2);

    lines.push(vec![Span::styled(
        format!("┌{}┐", "─".repeat(inner)),
        border,
    )]);

    for (row, item) in items.iter().enumerate() {
        let style = if active == Some(row) {
            Style::new().color(Color::Black).background(Color::Cyan).bold()
        } else {
            Style::default()
        };
        lines.push(vec![
            Span::styled("│", border),
            Span::styled(pad_to_width(&clip_to_width(item, inner), inner), style),
            Span::styled("│", border),
        ]);
    }

    lines.push(vec![Span::styled(
        format!("└{}┘", "─".repeat(inner)),
        border,
    )]);
    lines
}

/// Cuts `text` so its display width fits `max_width` columns.
pub fn clip_to_width(text: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for ch in text.chars() {
        let width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + width > max_width {
            break;
        }
        used += width;
        out.push(ch);
    }
    out
}

pub fn pad_to_width(text: &str, width: usize) -> String {
    let used = UnicodeWidthStr::width(text);
    let mut out = text.to_string();
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}
