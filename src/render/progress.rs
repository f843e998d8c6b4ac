//! Progress bar rendering.
//!
//! Displays playback progress with a tick at every paragraph boundary. The
//! stretch of bar covered by the paragraph being read is drawn brighter than
//! the rest.

use std::io::Write;
use std::ops::Range;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
};

use crate::sync::BoundaryTable;

/// Columns taken by padding and the ` MM:SS/MM:SS` time display.
pub const BAR_CHROME_COLS: usize = 14;

/// Column where the bar itself starts.
pub const BAR_START_COL: u16 = 1;

/// Format a duration in seconds to MM:SS format.
///
/// Unknown durations (negative, NaN, infinite) render as `00:00`.
///
/// # Arguments
/// * `seconds` - Duration in seconds
///
/// # Returns
/// A string in MM:SS format
pub fn format_duration(seconds: f64) -> String {
    let total_secs = if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    };
    let mins = total_secs / 60;
    let secs = total_secs % 60;
    format!("{:02}:{:02}", mins, secs)
}

/// Width of the bar for a terminal `width` columns wide.
pub fn bar_width(width: u16) -> usize {
    (width as usize).saturating_sub(BAR_CHROME_COLS)
}

/// What one column of the bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarCell {
    /// Audio before the playhead
    Played,
    /// Current position
    Playhead,
    /// Audio after the playhead
    Ahead,
    /// End of a paragraph (other than the last)
    Boundary,
}

impl BarCell {
    fn glyph(self) -> char {
        match self {
            BarCell::Played => '━',
            BarCell::Playhead => '⏺',
            BarCell::Ahead => '─',
            BarCell::Boundary => '┊',
        }
    }

    fn color(self, in_active_span: bool) -> Color {
        match (self, in_active_span) {
            (BarCell::Playhead, _) => Color::White,
            (BarCell::Boundary, _) => Color::Yellow,
            (BarCell::Played, true) => Color::Green,
            (BarCell::Played, false) => Color::DarkGreen,
            (BarCell::Ahead, true) => Color::Grey,
            (BarCell::Ahead, false) => Color::DarkGrey,
        }
    }
}

/// Cells of the bar plus the columns spanned by the active paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarLayout {
    pub cells: Vec<BarCell>,
    pub active: Range<usize>,
}

/// Lay out a bar `bar_width` columns wide.
///
/// # Arguments
/// * `bar_width` - Width of the bar in columns
/// * `current_time` - Current playback time
/// * `total_duration` - Total media duration
/// * `table` - Paragraph boundaries, if built yet
pub fn layout_bar(
    bar_width: usize,
    current_time: f64,
    total_duration: f64,
    table: Option<&BoundaryTable>,
) -> BarLayout {
    let known = total_duration.is_finite() && total_duration > 0.0;
    let column_of = |t: f64| -> usize {
        if !known {
            return 0;
        }
        (((t / total_duration).clamp(0.0, 1.0)) * bar_width as f64) as usize
    };

    let playhead = column_of(current_time);
    let mut cells: Vec<BarCell> = (0..bar_width)
        .map(|col| {
            if col < playhead {
                BarCell::Played
            } else {
                BarCell::Ahead
            }
        })
        .collect();

    let mut active = 0..0;
    if let (true, Some(table)) = (known, table) {
        let inner = table.len().saturating_sub(1);
        for &end in &table.ends()[..inner] {
            if let Some(cell) = cells.get_mut(column_of(end)) {
                *cell = BarCell::Boundary;
            }
        }
        if let Some(index) = table.resolve(current_time) {
            let start = table.start_of(index).unwrap_or(0.0);
            let end = table.end_of(index).unwrap_or(total_duration);
            active = column_of(start)..column_of(end).max(column_of(start));
        }
    }

    if let Some(cell) = cells.get_mut(playhead) {
        *cell = BarCell::Playhead;
    }

    BarLayout { cells, active }
}

/// Map a clicked column onto a fraction of the bar.
///
/// Returns `None` when the click is outside the bar.
pub fn fraction_at_column(column: u16, bar_start: u16, bar_width: usize) -> Option<f64> {
    if bar_width == 0 || column < bar_start {
        return None;
    }
    let offset = (column - bar_start) as usize;
    if offset >= bar_width {
        return None;
    }
    Some(offset as f64 / bar_width as f64)
}

/// Render the progress bar with paragraph ticks and the time display.
///
/// # Arguments
/// * `out` - Writer to render into
/// * `width` - Terminal width
/// * `row` - Row to render at (0-indexed)
/// * `current_time` - Current playback time
/// * `total_duration` - Total media duration
/// * `table` - Paragraph boundaries, if built yet
pub fn render_progress_bar(
    out: &mut impl Write,
    width: u16,
    row: u16,
    current_time: f64,
    total_duration: f64,
    table: Option<&BoundaryTable>,
) -> Result<()> {
    let layout = layout_bar(bar_width(width), current_time, total_duration, table);

    queue!(
        out,
        MoveTo(0, row),
        SetBackgroundColor(Color::AnsiValue(236)),
        Print(' ')
    )?;

    let mut run = String::new();
    let mut run_color: Option<Color> = None;
    for (col, cell) in layout.cells.iter().enumerate() {
        let color = cell.color(layout.active.contains(&col));
        if run_color != Some(color) {
            if let Some(previous) = run_color {
                queue!(out, SetForegroundColor(previous), Print(&run))?;
                run.clear();
            }
            run_color = Some(color);
        }
        run.push(cell.glyph());
    }
    if let Some(color) = run_color {
        queue!(out, SetForegroundColor(color), Print(&run))?;
    }

    let time_display = format!(
        " {}/{}",
        format_duration(current_time),
        format_duration(total_duration)
    );
    let used = 1 + layout.cells.len() + time_display.len();
    let padding = " ".repeat((width as usize).saturating_sub(used));
    queue!(
        out,
        SetForegroundColor(Color::Grey),
        Print(time_display),
        Print(padding),
        ResetColor
    )?;

    Ok(())
}
