use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use typeahead::core::candidate::RenderId;
use typeahead::core::options::FilterOptions;
use typeahead::runtime::effect::Effect;
use typeahead::runtime::event::FilterEvent;
use typeahead::runtime::intent::Intent;
use typeahead::runtime::registry::Registry;
use typeahead::state::navigation::Direction;
use typeahead::terminal::{
    CursorPos, KeyCode, KeyEvent, KeyModifiers, RenderFrame, Terminal, TerminalEvent, TerminalSize,
};
use typeahead::ui::placement::{AnchorRect, Layout, PopupPlacement, Viewport};
use typeahead::ui::popup_view::{POPUP_CHROME_ROWS, render_popup};
use typeahead::ui::span::Span;
use typeahead::ui::style::{Color, Style};

const INSTANCE_ID: &str = "demo";
const IDLE_TIMEOUT: Duration = Duration::from_millis(250);
const INPUT_COL: u16 = 2;
const PROMPT: &str = "> ";

#[derive(Debug, Parser)]
#[command(name = "typeahead", about = "Interactive autocomplete demo", version)]
struct Args {
    /// Options file (JSON by extension, YAML otherwise)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Comma-separated candidates; replaces the `data` option
    #[arg(long, value_delimiter = ',')]
    data: Vec<String>,

    /// Terminal row of the input line
    #[arg(long, default_value_t = 2)]
    anchor_row: u16,

    /// Write tracing output here (`RUST_LOG` selects levels)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let options = load_options(&args)?;
    let submitted = run(options, args.anchor_row)?;
    if let Some(value) = submitted {
        println!("{value}");
    }
    Ok(())
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("typeahead=debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn load_options(args: &Args) -> Result<FilterOptions> {
    let mut options = match &args.config {
        Some(path) => FilterOptions::load(path)?,
        None => FilterOptions::default(),
    };
    if !args.data.is_empty() {
        options.data = args
            .data
            .iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
    }
    Ok(options)
}

fn run(options: FilterOptions, anchor_row: u16) -> Result<Option<String>> {
    let mut terminal = Terminal::new().context("failed to open terminal")?;
    terminal.enter()?;
    let result = event_loop(&mut terminal, options, anchor_row);
    terminal.exit()?;
    result
}

fn event_loop(
    terminal: &mut Terminal,
    options: FilterOptions,
    anchor_row: u16,
) -> Result<Option<String>> {
    let mut registry = Registry::new();
    let attached = registry.attach(INSTANCE_ID, options);
    debug!(
        install_resize_listener = attached.install_resize_listener,
        "demo instance attached"
    );

    let mut host = HostView::default();
    let now = Instant::now();
    let layout = layout_for(terminal.size(), anchor_row);
    let effects = registry.dispatch(INSTANCE_ID, Intent::Layout(layout), now);
    host.apply(effects);

    let outcome = loop {
        draw(terminal, &registry, &host, anchor_row)?;

        let now = Instant::now();
        let timeout = registry.poll_timeout(now, IDLE_TIMEOUT);
        let event = terminal.poll_event(timeout)?;
        let now = Instant::now();

        match event {
            TerminalEvent::Key(key) => match handle_key(&mut registry, &mut host, key, now) {
                KeyOutcome::Continue => {}
                KeyOutcome::Quit => break None,
                KeyOutcome::Submit => break Some(host.input.clone()),
            },
            TerminalEvent::Click(pos) => {
                handle_click(&mut registry, &mut host, pos, anchor_row, now);
            }
            TerminalEvent::Resize(size) => {
                host.apply(handle_resize(&mut registry, size, anchor_row, now));
            }
            TerminalEvent::Tick => {}
        }

        for (_, effects) in registry.advance(Instant::now()) {
            host.apply(effects);
        }
    };

    if let Some(detached) = registry.detach(INSTANCE_ID) {
        host.apply(detached.effects);
        debug!(
            remove_resize_listener = detached.remove_resize_listener,
            "demo instance detached"
        );
    }
    Ok(outcome)
}

enum KeyOutcome {
    Continue,
    Quit,
    Submit,
}

fn handle_key(
    registry: &mut Registry,
    host: &mut HostView,
    key: KeyEvent,
    now: Instant,
) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }

    let intent = match key.code {
        KeyCode::Char(ch) => {
            host.focused = true;
            host.input.push(ch);
            Intent::Input(host.input.clone())
        }
        KeyCode::Backspace => {
            host.focused = true;
            if host.input.pop().is_none() {
                return KeyOutcome::Continue;
            }
            Intent::Input(host.input.clone())
        }
        KeyCode::Up => Intent::Navigate(Direction::Up),
        KeyCode::Down => Intent::Navigate(Direction::Down),
        KeyCode::Esc => Intent::Cancel,
        KeyCode::Tab | KeyCode::BackTab => {
            host.focused = false;
            Intent::Blur
        }
        KeyCode::Enter => {
            let effects = registry.dispatch(INSTANCE_ID, Intent::Confirm, now);
            let prevented = effects.contains(&Effect::PreventDefault);
            host.apply(effects);
            if prevented {
                return KeyOutcome::Continue;
            }
            info!(value = %host.input, "submitted");
            return KeyOutcome::Submit;
        }
        _ => return KeyOutcome::Continue,
    };

    let effects = registry.dispatch(INSTANCE_ID, intent, now);
    host.apply(effects);
    KeyOutcome::Continue
}

fn handle_click(
    registry: &mut Registry,
    host: &mut HostView,
    pos: CursorPos,
    anchor_row: u16,
    now: Instant,
) {
    if let Some(offset) = host.row_at(pos) {
        let effects = registry.dispatch(INSTANCE_ID, Intent::Click(offset), now);
        host.apply(effects);
        return;
    }

    if pos.row == anchor_row {
        host.focused = true;
        return;
    }

    if host.focused {
        host.focused = false;
        let effects = registry.dispatch(INSTANCE_ID, Intent::Blur, now);
        host.apply(effects);
    }
}

/// The anchor width follows the terminal width, so a resize refreshes the
/// whole layout and not only the viewport.
fn handle_resize(
    registry: &mut Registry,
    size: TerminalSize,
    anchor_row: u16,
    now: Instant,
) -> Vec<Effect> {
    let mut effects: Vec<Effect> = registry
        .resize(viewport_for(size), now)
        .into_iter()
        .flat_map(|(_, effects)| effects)
        .collect();
    effects.extend(registry.dispatch(
        INSTANCE_ID,
        Intent::Layout(layout_for(size, anchor_row)),
        now,
    ));
    effects
}

fn layout_for(size: TerminalSize, anchor_row: u16) -> Layout {
    let width = i32::from(size.width).saturating_sub(i32::from(INPUT_COL) * 2 + 2);
    Layout::new(
        AnchorRect {
            left: i32::from(INPUT_COL),
            top: i32::from(anchor_row),
            width: width.clamp(8, 48),
            height: 1,
        },
        viewport_for(size),
    )
    .with_item_height(1)
    .with_chrome(POPUP_CHROME_ROWS)
}

fn viewport_for(size: TerminalSize) -> Viewport {
    Viewport {
        height: i32::from(size.height),
        scroll_top: 0,
    }
}

/// What the page would show: the input text and the popup as the effects
/// left it.
#[derive(Debug, Default)]
struct HostView {
    input: String,
    focused: bool,
    shown: bool,
    items: Vec<RenderId>,
    active: Option<RenderId>,
    placement: Option<PopupPlacement>,
    last_event: Option<FilterEvent>,
}

impl HostView {
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::ShowPopup => self.shown = true,
                Effect::HidePopup => {
                    self.shown = false;
                    self.items.clear();
                    self.active = None;
                }
                Effect::ShowItems(ids) => self.items = ids,
                Effect::HideItems(ids) => self.items.retain(|id| !ids.contains(id)),
                Effect::SetActive(active) => self.active = active,
                Effect::Reposition(placement) => self.placement = Some(placement),
                Effect::SetInputValue(value) => self.input = value,
                Effect::FocusInput => self.focused = true,
                Effect::PreventDefault => {}
                Effect::Emit(event) => {
                    if let FilterEvent::Selected { selected } = &event {
                        info!(selected = %selected, "selected");
                    }
                    self.last_event = Some(event);
                }
                Effect::Schedule(_) => {}
            }
        }
    }

    /// Maps a screen position to an item offset inside the popup border.
    fn row_at(&self, pos: CursorPos) -> Option<usize> {
        if !self.shown {
            return None;
        }
        let placement = self.placement?;
        let col = i32::from(pos.col);
        if col <= placement.left || col >= placement.left + placement.width - 1 {
            return None;
        }
        let offset = i32::from(pos.row) - placement.top - 1;
        let offset = usize::try_from(offset).ok()?;
        (offset < self.items.len()).then_some(offset)
    }
}

fn draw(
    terminal: &mut Terminal,
    registry: &Registry,
    host: &HostView,
    anchor_row: u16,
) -> Result<()> {
    let mut frame = RenderFrame::default();
    let muted = Style::new().color(Color::DarkGrey);

    frame.push(
        0,
        INPUT_COL,
        vec![Span::styled(
            "type to filter · ↑/↓ move · enter select · tab blur · ctrl+c quit",
            muted,
        )],
    );
    frame.push(
        anchor_row,
        INPUT_COL,
        vec![
            Span::styled(PROMPT, Style::new().color(Color::Cyan).bold()),
            Span::new(host.input.clone()),
        ],
    );

    if let Some(event) = &host.last_event {
        let text = match event {
            FilterEvent::Selected { selected } => format!("selected: {selected}"),
            FilterEvent::InputChanged { value } => format!("input: {value}"),
        };
        let row = terminal.size().height.saturating_sub(1);
        frame.push(row, INPUT_COL, vec![Span::styled(text, muted)]);
    }

    if host.shown
        && let Some(placement) = host.placement
        && let Some(instance) = registry.get(INSTANCE_ID)
    {
        let cache = instance.session().cache();
        let texts: Vec<&str> = host
            .items
            .iter()
            .filter_map(|id| cache.get(*id).map(|candidate| candidate.text()))
            .collect();
        let active = host
            .active
            .and_then(|active| host.items.iter().position(|id| *id == active));
        let width = usize::try_from(placement.width).unwrap_or(0);
        let left = u16::try_from(placement.left).unwrap_or(0);
        for (idx, line) in render_popup(&texts, active, width).into_iter().enumerate() {
            let row = placement.top + i32::try_from(idx).unwrap_or(i32::MAX);
            if let Ok(row) = u16::try_from(row) {
                frame.push(row, left, line);
            }
        }
    }

    if host.focused {
        let col = INPUT_COL as usize + PROMPT.len() + host.input.chars().count();
        frame.cursor = Some(CursorPos {
            col: u16::try_from(col).unwrap_or(u16::MAX),
            row: anchor_row,
        });
    }

    terminal.render_frame(&frame)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{INSTANCE_ID, handle_resize, layout_for};
    use std::time::{Duration, Instant};
    use typeahead::core::options::FilterOptions;
    use typeahead::runtime::effect::Effect;
    use typeahead::runtime::intent::Intent;
    use typeahead::runtime::registry::Registry;
    use typeahead::terminal::TerminalSize;

    #[test]
    fn resize_tracks_new_anchor_width() {
        let mut registry = Registry::new();
        registry.attach(INSTANCE_ID, FilterOptions::new(["apple", "apricot"]));
        let t0 = Instant::now();
        let wide = TerminalSize {
            width: 80,
            height: 24,
        };
        registry.dispatch(INSTANCE_ID, Intent::Layout(layout_for(wide, 2)), t0);
        registry.dispatch(INSTANCE_ID, Intent::Input("ap".to_string()), t0);
        registry.advance(t0 + Duration::from_millis(150));

        let narrow = TerminalSize {
            width: 20,
            height: 24,
        };
        let effects = handle_resize(&mut registry, narrow, 2, t0 + Duration::from_millis(200));
        let last = effects.iter().rev().find_map(|effect| match effect {
            Effect::Reposition(placement) => Some(*placement),
            _ => None,
        });
        let placement = last.expect("reposition after resize");
        assert_eq!(placement.width, layout_for(narrow, 2).anchor.width + 2);
        assert_eq!(placement.width, 16);
    }
}
