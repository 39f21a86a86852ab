//! ANSI true-color preview of a grid in the terminal.

use std::io::Write;

use crossterm::queue;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use rand::seq::SliceRandom;

use crate::colormap::Color;
use crate::error::GroveResult;
use crate::grid::Grid;
use crate::seeds::seeded_rng;

/// One color per glyph, taken from `colors` shuffled by `seed` and reused
/// cyclically when there are more glyphs than colors.
pub fn glyph_colors(glyphs: &[char], colors: &[Color], seed: u64) -> Vec<Color> {
    if colors.is_empty() {
        return vec![Color::WHITE; glyphs.len()];
    }

    let mut shuffled = colors.to_vec();
    shuffled.shuffle(&mut seeded_rng(seed));
    (0..glyphs.len()).map(|i| shuffled[i % shuffled.len()]).collect()
}

/// Print `grid` as rows of black glyphs on colored cells. Cell `v` shows
/// `glyphs[v mod len]` on that glyph's color.
pub fn print_pattern<W: Write>(
    out: &mut W,
    grid: &Grid,
    glyphs: &[char],
    colors: &[Color],
    seed: u64,
) -> GroveResult<()> {
    let palette = glyph_colors(glyphs, colors, seed);

    for row in grid.row_slices() {
        for &value in row {
            let (glyph, color) = match glyphs.len() {
                0 => (' ', Color::WHITE),
                n => {
                    let i = value as usize % n;
                    (glyphs[i], palette[i])
                }
            };
            queue!(
                out,
                SetBackgroundColor(TermColor::Rgb {
                    r: color.r,
                    g: color.g,
                    b: color.b
                }),
                SetForegroundColor(TermColor::Black),
                Print(format!(" {}  ", glyph)),
                ResetColor
            )?;
        }
        queue!(out, Print("\n"))?;
    }

    out.flush()?;
    Ok(())
}
