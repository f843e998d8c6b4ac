//! Help overlay for the interactive listener.
//!
//! The box is built from [`SHORTCUTS`] so it never drifts from the key map.

use std::io::Write;

use anyhow::Result;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use unicode_width::UnicodeWidthStr;

use crate::remote::keyboard::SHORTCUTS;

const TITLE: &str = "readalong - keyboard shortcuts";
const FOOTER: &str = "Press any key to close";

/// Inner width of the help box (between the borders).
pub const HELP_INNER_WIDTH: usize = 40;

/// Width of the help box including borders and margin.
pub const HELP_BOX_WIDTH: usize = HELP_INNER_WIDTH + 4;

fn boxed(content: &str) -> String {
    let pad = HELP_INNER_WIDTH.saturating_sub(content.width());
    format!("  ║{}{}║", content, " ".repeat(pad))
}

fn centered(content: &str) -> String {
    let free = HELP_INNER_WIDTH.saturating_sub(content.width());
    let left = free / 2;
    boxed(&format!("{}{}", " ".repeat(left), content))
}

/// Lines of the help box, top border to bottom border.
pub fn help_lines() -> Vec<String> {
    let rule = "═".repeat(HELP_INNER_WIDTH);
    let mut lines = vec![
        format!("  ╔{}╗", rule),
        centered(TITLE),
        format!("  ╠{}╣", rule),
        boxed(""),
    ];
    for (keys, description) in SHORTCUTS {
        let pad = 12usize.saturating_sub(keys.width());
        lines.push(boxed(&format!(
            "  {}{}{}",
            keys,
            " ".repeat(pad),
            description
        )));
    }
    lines.push(boxed(""));
    lines.push(centered(FOOTER));
    lines.push(format!("  ╚{}╝", rule));
    lines
}

/// Row at which the help box starts so it is vertically centered.
pub fn calc_help_start_row(term_height: u16, line_count: usize) -> u16 {
    term_height.saturating_sub(line_count as u16) / 2
}

/// Column at which the help box starts so it is horizontally centered.
pub fn calc_help_start_col(term_width: u16) -> u16 {
    ((term_width as usize).saturating_sub(HELP_BOX_WIDTH) / 2) as u16
}

/// Clear the screen and draw the help box.
pub fn render_help(out: &mut impl Write, width: u16, height: u16) -> Result<()> {
    let lines = help_lines();
    let start_row = calc_help_start_row(height, lines.len());
    let col = calc_help_start_col(width);

    queue!(out, Clear(ClearType::All))?;
    for (i, line) in lines.iter().enumerate() {
        queue!(
            out,
            MoveTo(col, start_row + i as u16),
            SetForegroundColor(Color::Green),
            Print(line),
            ResetColor,
        )?;
    }
    out.flush()?;
    Ok(())
}
