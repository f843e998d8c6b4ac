//! Listen command: interactive read-along in the terminal
//!
//! Paragraphs scroll by as a real-time clock plays through the article. The
//! active paragraph is highlighted, the progress bar shows paragraph ticks
//! and accepts clicks, and media keys work where the terminal reports them.

use std::io::{self, Write};
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor::{self, MoveTo},
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};

use readalong::remote::keyboard::{map_key, FocusContext, KeyAction};
use readalong::remote::{ExternalControlBridge, TerminalMediaKeys};
use readalong::render::help::render_help;
use readalong::render::paragraph::wrap;
use readalong::render::progress::{bar_width, fraction_at_column, render_progress_bar, BAR_START_COL};
use readalong::text::segment_lengths;
use readalong::{
    Config, HighlightChange, PlaybackEngine, Resource, SimulatedEngine, SyncEngine, SyncObserver,
    SyncState, TransportCommand,
};

use super::{check_duration, open_store, read_paragraphs, resource_key};

/// Input poll timeout, which is also the clock resolution.
const FRAME: Duration = Duration::from_millis(50);

/// Rows reserved below the text: progress bar and status line.
const FOOTER_ROWS: u16 = 2;

type Listener = SyncEngine<SimulatedEngine, ScreenObserver>;

/// Tracks what the screen should show.
struct ScreenObserver {
    paragraphs: Vec<String>,
    active: Option<usize>,
    /// First paragraph on screen
    top: usize,
    elapsed: String,
    total: String,
    needs_render: bool,
}

impl ScreenObserver {
    fn new(paragraphs: Vec<String>) -> Self {
        Self {
            paragraphs,
            active: None,
            top: 0,
            elapsed: String::new(),
            total: String::new(),
            needs_render: true,
        }
    }
}

impl SyncObserver for ScreenObserver {
    fn on_highlight_change(&mut self, change: HighlightChange) {
        self.active = Some(change.current);
        // The first highlight always brings the paragraph on screen
        if change.scroll_into_view || change.previous.is_none() {
            self.top = change.current;
        }
        self.needs_render = true;
    }

    fn on_time_display_change(&mut self, elapsed: &str, total: &str) {
        if self.elapsed != elapsed || self.total != total {
            self.elapsed = elapsed.to_string();
            self.total = total.to_string();
            self.needs_render = true;
        }
    }
}

/// Raw mode, alternate screen and mouse capture for the lifetime of the guard.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            cursor::Show,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Run the interactive listener.
#[cfg(not(tarpaulin_include))]
pub fn handle(file: &Path, duration: f64, key: Option<String>, store: Option<&Path>) -> Result<()> {
    check_duration(duration)?;
    let config = Config::load()?;
    let paragraphs = read_paragraphs(file)?;
    let key = resource_key(file, key);
    let store = open_store(store, &config, false)?;

    let resource = Resource::new(key, segment_lengths(&paragraphs));
    let mut sync = SyncEngine::new(
        SimulatedEngine::new(),
        ScreenObserver::new(paragraphs),
        store,
        config.sync_options(),
    );
    sync.load(resource);
    sync.transport_mut().engine_mut().load(duration);
    sync.pump();

    let result = {
        let _guard = TerminalGuard::enter()?;
        // Queries the terminal, so it needs raw mode
        let bridge = ExternalControlBridge::new(Some(TerminalMediaKeys::new()));
        tracing::debug!("Media keys active: {}", bridge.is_active());
        run(&mut sync, &bridge)
    };

    sync.transport_mut().pause();
    sync.pump();
    sync.flush_position();
    result
}

#[cfg(not(tarpaulin_include))]
fn run(sync: &mut Listener, bridge: &ExternalControlBridge<TerminalMediaKeys>) -> Result<()> {
    let mut stdout = io::stdout();
    let (mut cols, mut rows) = terminal::size()?;
    let mut show_help = false;
    let mut last_tick = Instant::now();

    loop {
        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_secs_f64();
        last_tick = now;
        sync.transport_mut().engine_mut().advance(elapsed);
        sync.pump();

        if sync.observer().needs_render && !show_help {
            draw(&mut stdout, sync, cols, rows)?;
            sync.observer_mut().needs_render = false;
        }

        if !event::poll(FRAME)? {
            continue;
        }

        match event::read()? {
            Event::Key(key) => {
                if show_help {
                    show_help = false;
                    sync.observer_mut().needs_render = true;
                    continue;
                }
                match handle_key(sync, bridge, &key) {
                    Some(KeyAction::Quit) => return Ok(()),
                    Some(KeyAction::ToggleHelp) => {
                        show_help = true;
                        render_help(&mut stdout, cols, rows)?;
                    }
                    _ => sync.observer_mut().needs_render = true,
                }
            }
            Event::Mouse(mouse) => {
                if let Some(fraction) = progress_click(&mouse, cols, rows) {
                    sync.execute(TransportCommand::SeekFraction(fraction));
                    sync.pump();
                }
            }
            Event::Resize(new_cols, new_rows) => {
                cols = new_cols;
                rows = new_rows;
                if show_help {
                    render_help(&mut stdout, cols, rows)?;
                } else {
                    sync.observer_mut().needs_render = true;
                }
            }
            _ => {}
        }
    }
}

/// Route a key to the media-key bridge first, then to the shortcut map.
///
/// Returns the shortcut action, if the key was one. Transport and rate
/// actions have already been applied.
fn handle_key(
    sync: &mut Listener,
    bridge: &ExternalControlBridge<TerminalMediaKeys>,
    key: &KeyEvent,
) -> Option<KeyAction> {
    if let Some(action) = bridge.handle(key, sync.transport_mut()) {
        tracing::debug!("Media key: {}", action.name());
        sync.pump();
        return None;
    }

    let action = map_key(key, FocusContext::Document)?;
    match action {
        KeyAction::Transport(command) => sync.execute(command),
        KeyAction::RateUp => {
            sync.rate_up();
        }
        KeyAction::RateDown => {
            sync.rate_down();
        }
        KeyAction::ToggleHelp | KeyAction::Quit => {}
    }
    sync.pump();
    Some(action)
}

/// Seek fraction for a left click on the progress bar row.
fn progress_click(mouse: &MouseEvent, cols: u16, rows: u16) -> Option<f64> {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return None;
    }
    if mouse.row != progress_row(rows) {
        return None;
    }
    fraction_at_column(mouse.column, BAR_START_COL, bar_width(cols))
}

fn progress_row(rows: u16) -> u16 {
    rows.saturating_sub(FOOTER_ROWS)
}

fn status_line(sync: &Listener) -> String {
    let state = match sync.state() {
        SyncState::Uninitialized | SyncState::MetadataReady => "Ready",
        SyncState::Playing => "▶ Playing",
        SyncState::Paused => "⏸ Paused",
        SyncState::Ended => "■ Ended",
    };
    let mute = if sync.transport().engine().is_muted() {
        "  muted"
    } else {
        ""
    };
    let segment = match (sync.active_segment(), sync.boundaries()) {
        (Some(i), Some(b)) => format!("  ¶ {}/{}", i + 1, b.len()),
        _ => String::new(),
    };
    format!(
        " {}  {}x{}{}  ? help  q quit",
        state,
        sync.rates().current(),
        mute,
        segment
    )
}

fn draw(out: &mut impl Write, sync: &Listener, cols: u16, rows: u16) -> Result<()> {
    let observer = sync.observer();
    let text_rows = rows.saturating_sub(FOOTER_ROWS) as usize;
    let text_width = (cols as usize).saturating_sub(4);

    queue!(out, Clear(ClearType::All))?;

    let mut row = 0usize;
    for (i, paragraph) in observer.paragraphs.iter().enumerate().skip(observer.top) {
        if row >= text_rows {
            break;
        }
        let active = observer.active == Some(i);
        let (gutter, color) = if active {
            ("▌ ", Color::Yellow)
        } else {
            ("  ", Color::DarkGrey)
        };
        for line in wrap(paragraph, text_width) {
            if row >= text_rows {
                break;
            }
            queue!(out, MoveTo(1, row as u16), SetForegroundColor(color))?;
            if active {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            queue!(
                out,
                Print(gutter),
                Print(line),
                SetAttribute(Attribute::Reset),
                ResetColor
            )?;
            row += 1;
        }
        // Blank line between paragraphs
        row += 1;
    }

    let snapshot = sync.transport().snapshot();
    let total = snapshot.duration.unwrap_or(0.0);
    render_progress_bar(
        out,
        cols,
        progress_row(rows),
        snapshot.current_time,
        total,
        sync.boundaries(),
    )?;

    queue!(
        out,
        MoveTo(0, rows.saturating_sub(1)),
        SetForegroundColor(Color::Grey),
        Print(status_line(sync)),
        ResetColor
    )?;
    out.flush()?;
    Ok(())
}
