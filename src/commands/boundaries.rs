//! Boundary table inspection: `boundaries` and `resolve`

use std::path::Path;

use anyhow::Result;

use readalong::render::format_duration;
use readalong::text::segment_lengths;
use readalong::BoundaryTable;

use super::{check_duration, preview, read_paragraphs};

const PREVIEW_CHARS: usize = 48;

fn load_table(file: &Path, duration: f64) -> Result<(Vec<String>, BoundaryTable)> {
    check_duration(duration)?;
    let paragraphs = read_paragraphs(file)?;
    let table = BoundaryTable::build(&segment_lengths(&paragraphs), duration);
    Ok((paragraphs, table))
}

/// Print one row per paragraph with its start, end and length.
pub fn handle_boundaries(file: &Path, duration: f64) -> Result<()> {
    let (paragraphs, table) = load_table(file, duration)?;

    println!("{:>4}  {:>5}  {:>5}  {:>6}  TEXT", "#", "START", "END", "CHARS");
    for (i, paragraph) in paragraphs.iter().enumerate() {
        let start = table.start_of(i).unwrap_or(0.0);
        let end = table.end_of(i).unwrap_or(duration);
        println!(
            "{:>4}  {:>5}  {:>5}  {:>6}  {}",
            i + 1,
            format_duration(start),
            format_duration(end),
            paragraph.chars().count(),
            preview(paragraph, PREVIEW_CHARS)
        );
    }
    println!(
        "{} paragraphs over {}",
        table.len(),
        format_duration(table.duration())
    );
    Ok(())
}

/// Print the paragraph active at each timestamp.
pub fn handle_resolve(file: &Path, duration: f64, at: &[f64]) -> Result<()> {
    let (paragraphs, table) = load_table(file, duration)?;

    for &t in at {
        match table.resolve(t) {
            Some(index) => println!(
                "{} ({:.2}s) -> paragraph {}: {}",
                format_duration(t),
                t,
                index + 1,
                preview(&paragraphs[index], PREVIEW_CHARS)
            ),
            None => println!("{} ({:.2}s) -> no paragraph", format_duration(t), t),
        }
    }
    Ok(())
}
