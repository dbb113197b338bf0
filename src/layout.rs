//! Text layout
//!
//! Resolves every character of the composition through the glyph engine and
//! places the resulting pixel boxes on the canvas. The output is a flat list
//! of per-character boxes plus the anchored cell rectangles the renderer and
//! the particle simulation both consume. Layout is recomputed every frame;
//! it has to stay cheap.

use crate::config::grid;
use crate::glyph::{self, GlyphSource, PixelMatrix};
use crate::params::{TextAlign, TypoParams, VerticalAlign};

/// Explicit line break character (pilcrow), interchangeable with '\n'.
pub const LINE_BREAK: char = '\u{00B6}';

const DESCENDERS: &str = "gjpqy";

/// One laid-out character. `matrix` is None for unresolved characters, which
/// render as placeholder outlines of the base grid size.
#[derive(Debug, Clone)]
pub struct CharLayout {
    /// Index into the composition text (chars, not bytes)
    pub index: usize,
    pub ch: char,
    /// Top-left corner in logical pixels, per-index offsets applied
    pub x: f32,
    pub y: f32,
    pub cols: usize,
    pub rows: usize,
    pub matrix: Option<PixelMatrix>,
    pub source: Option<GlyphSource>,
}

/// A single anchored (filled) cell of a laid-out glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRect {
    pub char_index: usize,
    pub row: usize,
    pub col: usize,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Stable identity of a cell across frames, used to key particles.
pub type CellId = (usize, usize, usize);

impl CellRect {
    pub fn id(&self) -> CellId {
        (self.char_index, self.row, self.col)
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.size * 0.5, self.y + self.size * 0.5)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub chars: Vec<CharLayout>,
    /// Bounding size of the laid-out block in logical pixels
    pub width: f32,
    pub height: f32,
}

impl Layout {
    /// Anchored cells of every resolved glyph, in text order.
    pub fn active_cells(&self, cell_size: f32) -> Vec<CellRect> {
        let mut cells = Vec::new();
        for ch in &self.chars {
            let Some(matrix) = &ch.matrix else { continue };
            for (row, bits) in matrix.iter().enumerate() {
                for (col, &bit) in bits.iter().enumerate() {
                    if bit == 1 {
                        cells.push(CellRect {
                            char_index: ch.index,
                            row,
                            col,
                            x: ch.x + col as f32 * cell_size,
                            y: ch.y + row as f32 * cell_size,
                            size: cell_size,
                        });
                    }
                }
            }
        }
        cells
    }

    /// The laid-out character containing a canvas point, if any.
    pub fn char_at(&self, px: f32, py: f32, cell_size: f32) -> Option<&CharLayout> {
        self.chars.iter().rev().find(|c| {
            let w = c.cols as f32 * cell_size;
            let h = c.rows as f32 * cell_size;
            px >= c.x && px < c.x + w && py >= c.y && py < c.y + h
        })
    }
}

struct LinePlan {
    /// (text index, char) of every visible character on the line
    chars: Vec<(usize, char)>,
    width_cells: f32,
    rows: usize,
    drop_rows: usize,
}

/// Lay the composition out inside a viewport. Alignment is applied per line
/// (horizontal) and to the whole block (vertical); per-index grid offsets are
/// added last so dragged characters move with the layout, not against it.
pub fn compose(params: &TypoParams, viewport_w: f32, viewport_h: f32) -> Layout {
    let cell = params.cell_size;
    let lines = plan_lines(params);

    let line_gap = params.line_spacing * cell;
    let block_h: f32 = lines
        .iter()
        .map(|l| (l.rows + l.drop_rows) as f32 * cell)
        .sum::<f32>()
        + line_gap * lines.len().saturating_sub(1) as f32;
    let block_w = lines
        .iter()
        .map(|l| l.width_cells * cell)
        .fold(0.0f32, f32::max);

    let mut y = match params.valign {
        VerticalAlign::Top => 0.0,
        VerticalAlign::Center => (viewport_h - block_h) * 0.5,
        VerticalAlign::Bottom => viewport_h - block_h,
    };

    let mut out = Layout {
        chars: Vec::new(),
        width: block_w,
        height: block_h,
    };

    for line in &lines {
        let line_w = line.width_cells * cell;
        let mut x = match params.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (viewport_w - line_w) * 0.5,
            TextAlign::Right => viewport_w - line_w,
        };

        for &(index, ch) in &line.chars {
            if ch == ' ' {
                x += grid::SPACE_ADVANCE_CELLS as f32 * cell;
                continue;
            }

            let resolved = glyph::resolve(ch, index, params);
            let (cols, rows) = match &resolved {
                Some((m, _)) => (m[0].len(), m.len()),
                None => (grid::BASE_COLS, grid::BASE_ROWS),
            };

            // Baseline sits at the bottom of the tallest glyph on the line;
            // shorter glyphs rest on it, descenders hang below it.
            let mut gy = y + (line.rows.saturating_sub(rows)) as f32 * cell;
            if DESCENDERS.contains(ch) {
                gy += grid::DESCENDER_DROP_ROWS as f32 * cell;
            }
            match params.valign_for(index) {
                Some(VerticalAlign::Top) => gy = y,
                Some(VerticalAlign::Center) => {
                    gy = y + (line.rows.saturating_sub(rows)) as f32 * cell * 0.5;
                }
                Some(VerticalAlign::Bottom) | None => {}
            }

            let pos = params.position(index);
            let (matrix, source) = match resolved {
                Some((m, s)) => (Some(m), Some(s)),
                None => (None, None),
            };
            out.chars.push(CharLayout {
                index,
                ch,
                x: x + pos.x * cell,
                y: gy + pos.y * cell,
                cols,
                rows,
                matrix,
                source,
            });

            x += (cols + 1) as f32 * cell;
        }

        y += (line.rows + line.drop_rows) as f32 * cell + line_gap;
    }

    out
}

fn plan_lines(params: &TypoParams) -> Vec<LinePlan> {
    let blank = || LinePlan {
        chars: Vec::new(),
        width_cells: 0.0,
        rows: grid::BASE_ROWS,
        drop_rows: 0,
    };
    let mut lines = Vec::new();
    let mut line = blank();

    for (index, ch) in params.text.chars().enumerate() {
        if ch == '\n' || ch == LINE_BREAK {
            lines.push(std::mem::replace(&mut line, blank()));
            continue;
        }

        line.chars.push((index, ch));

        if ch == ' ' {
            line.width_cells += grid::SPACE_ADVANCE_CELLS as f32;
            continue;
        }

        let cols = match glyph::resolve(ch, index, params) {
            Some((m, _)) => {
                line.rows = line.rows.max(m.len());
                m[0].len()
            }
            None => grid::BASE_COLS,
        };
        if DESCENDERS.contains(ch) {
            line.drop_rows = line.drop_rows.max(grid::DESCENDER_DROP_ROWS);
        }
        // +1 cell letter spacing, trimmed back off at end of line
        line.width_cells += (cols + 1) as f32;
    }
    lines.push(line);

    for line in &mut lines {
        if line.chars.last().is_some_and(|&(_, c)| c != ' ') {
            line.width_cells -= 1.0;
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params_with(text: &str) -> TypoParams {
        let mut p = TypoParams::default();
        p.set_text(text);
        p
    }

    #[test]
    fn test_single_char_centered() {
        let params = params_with("A");
        let layout = compose(&params, 800.0, 600.0);
        assert_eq!(layout.chars.len(), 1);

        let c = &layout.chars[0];
        assert_eq!(c.cols, 6);
        assert_eq!(c.rows, 11);
        // 6 cols at 16px centered in 800
        assert_eq!(c.x, (800.0 - 96.0) / 2.0);
        assert_eq!(c.y, (600.0 - 176.0) / 2.0);
    }

    #[test]
    fn test_space_advances_without_box() {
        let params = params_with("A A");
        let layout = compose(&params, 800.0, 600.0);
        assert_eq!(layout.chars.len(), 2);

        let gap = layout.chars[1].x - layout.chars[0].x;
        // 6 cols + 1 spacing + 3 space cells = 10 cells
        assert_eq!(gap, 10.0 * 16.0);
    }

    #[test]
    fn test_pilcrow_and_newline_break_lines() {
        for sep in ['\n', LINE_BREAK] {
            let params = params_with(&format!("A{sep}B"));
            let layout = compose(&params, 800.0, 600.0);
            assert_eq!(layout.chars.len(), 2);
            assert!(layout.chars[1].y > layout.chars[0].y);
        }
    }

    #[test]
    fn test_descender_drops_below_baseline() {
        let params = params_with("Ag");
        let layout = compose(&params, 800.0, 600.0);
        let a = &layout.chars[0];
        let g = &layout.chars[1];
        assert_eq!(g.y - a.y, 5.0 * 16.0);
    }

    #[test]
    fn test_unresolved_char_gets_placeholder_box() {
        let params = params_with("@");
        let layout = compose(&params, 800.0, 600.0);
        let c = &layout.chars[0];
        assert!(c.matrix.is_none());
        assert_eq!((c.cols, c.rows), (6, 11));
    }

    #[test]
    fn test_empty_frozen_matrix_falls_back_cleanly() {
        let mut params = params_with("A");
        params.freeze_matrix(0, vec![]);

        let layout = compose(&params, 800.0, 600.0);
        let c = &layout.chars[0];
        // The degenerate matrix is ignored; the glyph resolves normally
        assert!(c.matrix.is_some());
        assert_eq!((c.cols, c.rows), (6, 11));
    }

    #[test]
    fn test_position_offset_moves_glyph_in_grid_units() {
        let mut params = params_with("A");
        let base = compose(&params, 800.0, 600.0).chars[0].x;
        params.set_position(0, 2.0, -1.0);
        let layout = compose(&params, 800.0, 600.0);
        assert_eq!(layout.chars[0].x, base + 2.0 * 16.0);
    }

    #[test]
    fn test_active_cells_match_matrix_population() {
        let params = params_with("A");
        let layout = compose(&params, 800.0, 600.0);
        let cells = layout.active_cells(params.cell_size);

        let matrix = layout.chars[0].matrix.as_ref().unwrap();
        let filled: usize = matrix.iter().flatten().map(|&b| b as usize).sum();
        assert_eq!(cells.len(), filled);
        assert!(cells.iter().all(|c| c.char_index == 0));
    }

    #[test]
    fn test_align_left_and_right() {
        let mut params = params_with("A");
        params.align = TextAlign::Left;
        assert_eq!(compose(&params, 800.0, 600.0).chars[0].x, 0.0);
        params.align = TextAlign::Right;
        assert_eq!(compose(&params, 800.0, 600.0).chars[0].x, 800.0 - 96.0);
    }
}
