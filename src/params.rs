//! Typographic parameter store
//!
//! One struct owns everything the glyph engine reads: the composition text,
//! global weight/height modifiers, layout settings, and the per-index
//! overrides and grid positions. The sequencer writes interpolated values
//! back into the same store, which is what makes transitions re-synthesize
//! the text continuously.
//!
//! Weight/height and a frozen custom matrix are mutually exclusive
//! representations of the same glyph: assigning a new modifier to an index
//! drops its frozen matrix (un-freeze), and a present frozen matrix shadows
//! the modifiers entirely during resolution.

use crate::config::{clamps, grid};
use crate::glyph::{self, PixelMatrix};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    Top,
    #[default]
    Center,
    Bottom,
}

/// Per-index overrides. `custom_matrix` always wins over `w`/`h` when set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_matrix: Option<PixelMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valign: Option<VerticalAlign>,
}

/// Per-index translation in grid units, relative to the layout position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GridPos {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypoParams {
    pub text: String,
    pub weight: f32,
    pub height: f32,
    pub cell_size: f32,
    pub line_spacing: f32,
    pub align: TextAlign,
    pub valign: VerticalAlign,
    pub use_static_font: bool,
    pub overrides: HashMap<usize, CharOverride>,
    pub positions: HashMap<usize, GridPos>,
}

impl Default for TypoParams {
    fn default() -> Self {
        Self {
            text: String::from("HELLO"),
            weight: 0.0,
            height: 0.0,
            cell_size: grid::DEFAULT_CELL_SIZE,
            line_spacing: 0.5,
            align: TextAlign::Center,
            valign: VerticalAlign::Center,
            use_static_font: true,
            overrides: HashMap::new(),
            positions: HashMap::new(),
        }
    }
}

impl TypoParams {
    // =========================================================================
    // Text
    // =========================================================================

    /// Replace the composition text. Any text change snaps characters back to
    /// the layout grid; clearing the text resets all typography settings.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.positions.clear();

        if self.text.is_empty() {
            self.weight = 0.0;
            self.height = 0.0;
            self.overrides.clear();
            self.align = TextAlign::Center;
            self.line_spacing = 0.5;
        }
    }

    pub fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.positions.clear();
    }

    pub fn backspace(&mut self) {
        self.text.pop();
        self.positions.clear();
        if self.text.is_empty() {
            let keep = self.text.clone();
            self.set_text(&keep);
        }
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Effective weight for an index: override wins over the global value.
    pub fn effective_weight(&self, index: usize) -> f32 {
        self.overrides
            .get(&index)
            .and_then(|o| o.w)
            .unwrap_or(self.weight)
    }

    /// Effective height for an index: override wins over the global value.
    pub fn effective_height(&self, index: usize) -> f32 {
        self.overrides
            .get(&index)
            .and_then(|o| o.h)
            .unwrap_or(self.height)
    }

    pub fn set_global_weight(&mut self, value: f32) {
        self.weight = glyph::clamp_weight(value);
    }

    pub fn set_global_height(&mut self, value: f32) {
        self.height = glyph::clamp_height(value);
    }

    pub fn nudge_global_weight(&mut self, steps: f32) {
        self.set_global_weight(self.weight + steps);
    }

    pub fn nudge_global_height(&mut self, steps: f32) {
        self.set_global_height(self.height + steps);
    }

    /// Set a per-index weight. Un-freezes any custom matrix at those indices.
    pub fn set_weight_for(&mut self, indices: &[usize], value: f32) {
        let value = glyph::clamp_weight(value);
        for &idx in indices {
            let entry = self.overrides.entry(idx).or_default();
            entry.custom_matrix = None;
            entry.w = Some(value);
        }
    }

    /// Set a per-index height. Un-freezes any custom matrix at those indices.
    pub fn set_height_for(&mut self, indices: &[usize], value: f32) {
        let value = glyph::clamp_height(value);
        for &idx in indices {
            let entry = self.overrides.entry(idx).or_default();
            entry.custom_matrix = None;
            entry.h = Some(value);
        }
    }

    pub fn set_valign_for(&mut self, indices: &[usize], valign: VerticalAlign) {
        for &idx in indices {
            self.overrides.entry(idx).or_default().valign = Some(valign);
        }
    }

    pub fn valign_for(&self, index: usize) -> Option<VerticalAlign> {
        self.overrides.get(&index).and_then(|o| o.valign)
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }

    /// Drop frozen matrices that are empty or ragged. Hand-edited project
    /// files can carry them; the engine expects rectangular grids.
    pub fn prune_invalid_matrices(&mut self) {
        for entry in self.overrides.values_mut() {
            let degenerate = entry.custom_matrix.as_ref().is_some_and(|m| {
                m.is_empty() || m[0].is_empty() || m.iter().any(|r| r.len() != m[0].len())
            });
            if degenerate {
                entry.custom_matrix = None;
            }
        }
    }

    // =========================================================================
    // Frozen matrices (extrude tool)
    // =========================================================================

    pub fn frozen_matrix(&self, index: usize) -> Option<&PixelMatrix> {
        self.overrides
            .get(&index)
            .and_then(|o| o.custom_matrix.as_ref())
            .filter(|m| !m.is_empty() && !m[0].is_empty())
    }

    pub fn has_frozen_matrix(&self, index: usize) -> bool {
        self.frozen_matrix(index).is_some()
    }

    /// Freeze a literal matrix at an index. The glyph becomes immune to
    /// weight/height changes until a modifier is assigned again.
    pub fn freeze_matrix(&mut self, index: usize, matrix: PixelMatrix) {
        self.overrides.entry(index).or_default().custom_matrix = Some(matrix);
    }

    /// Insert a column right of `col`, copying its cells into the new one.
    pub fn extrude_insert_column(&mut self, index: usize, col: usize) {
        if let Some(matrix) = self.frozen_matrix_mut(index) {
            let cols = matrix[0].len();
            let src = col.min(cols - 1);
            for row in matrix.iter_mut() {
                let v = row[src];
                row.insert(src + 1, v);
            }
        }
    }

    /// Delete the column at `col`. Matrices keep at least one column.
    pub fn extrude_delete_column(&mut self, index: usize, col: usize) {
        if let Some(matrix) = self.frozen_matrix_mut(index) {
            let cols = matrix[0].len();
            if cols > 1 {
                let target = col.min(cols - 1);
                for row in matrix.iter_mut() {
                    row.remove(target);
                }
            }
        }
    }

    /// Insert a row below `row`, copying only the connected run of filled
    /// cells around `col` so a single stroke stretches instead of the whole
    /// row duplicating.
    pub fn extrude_insert_row(&mut self, index: usize, row: usize, col: usize) {
        if let Some(matrix) = self.frozen_matrix_mut(index) {
            let src_idx = row.min(matrix.len() - 1);
            let source = matrix[src_idx].clone();
            let mut new_row = vec![0u8; source.len()];

            if col < source.len() && source[col] == 1 {
                let mut left = col as isize;
                while left >= 0 && source[left as usize] == 1 {
                    new_row[left as usize] = 1;
                    left -= 1;
                }
                let mut right = col + 1;
                while right < source.len() && source[right] == 1 {
                    new_row[right] = 1;
                    right += 1;
                }
            }

            matrix.insert(src_idx + 1, new_row);
        }
    }

    /// Delete the row at `row`. Matrices keep at least one row.
    pub fn extrude_delete_row(&mut self, index: usize, row: usize) {
        if let Some(matrix) = self.frozen_matrix_mut(index) {
            if matrix.len() > 1 {
                let target = row.min(matrix.len() - 1);
                matrix.remove(target);
            }
        }
    }

    fn frozen_matrix_mut(&mut self, index: usize) -> Option<&mut PixelMatrix> {
        self.overrides
            .get_mut(&index)
            .and_then(|o| o.custom_matrix.as_mut())
            .filter(|m| !m.is_empty() && !m[0].is_empty())
    }

    // =========================================================================
    // Positions
    // =========================================================================

    pub fn position(&self, index: usize) -> GridPos {
        self.positions.get(&index).copied().unwrap_or_default()
    }

    pub fn set_position(&mut self, index: usize, x: f32, y: f32) {
        self.positions.insert(index, GridPos { x, y });
    }

    pub fn clear_positions(&mut self) {
        self.positions.clear();
    }

    // =========================================================================
    // Layout settings
    // =========================================================================

    pub fn set_cell_size(&mut self, size: f32) {
        self.cell_size = size.clamp(clamps::CELL_SIZE_MIN, clamps::CELL_SIZE_MAX);
    }

    pub fn set_line_spacing(&mut self, scale: f32) {
        self.line_spacing = scale.clamp(clamps::LINE_SPACING_MIN, clamps::LINE_SPACING_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_weight_unfreezes_matrix() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![vec![1, 0], vec![0, 1]]);
        assert!(params.has_frozen_matrix(0));

        params.set_weight_for(&[0], 3.0);
        assert!(!params.has_frozen_matrix(0));
        assert_eq!(params.effective_weight(0), 3.0);
    }

    #[test]
    fn test_setting_height_unfreezes_matrix() {
        let mut params = TypoParams::default();
        params.freeze_matrix(2, vec![vec![1]]);
        params.set_height_for(&[2], -1.0);
        assert!(!params.has_frozen_matrix(2));
        assert_eq!(params.effective_height(2), -1.0);
    }

    #[test]
    fn test_modifier_clamps() {
        let mut params = TypoParams::default();
        params.set_global_weight(99.0);
        assert_eq!(params.weight, 12.0);
        params.set_global_weight(-99.0);
        assert_eq!(params.weight, -2.0);
        params.set_global_height(99.0);
        assert_eq!(params.height, 22.0);
        params.set_global_height(-99.0);
        assert_eq!(params.height, -6.0);
    }

    #[test]
    fn test_clearing_text_resets_typography() {
        let mut params = TypoParams::default();
        params.set_global_weight(5.0);
        params.set_weight_for(&[1], 2.0);
        params.set_position(1, 3.0, -1.0);
        params.align = TextAlign::Left;

        params.set_text("");
        assert_eq!(params.weight, 0.0);
        assert!(params.overrides.is_empty());
        assert!(params.positions.is_empty());
        assert_eq!(params.align, TextAlign::Center);
    }

    #[test]
    fn test_text_change_clears_positions_only() {
        let mut params = TypoParams::default();
        params.set_global_weight(5.0);
        params.set_position(0, 2.0, 2.0);

        params.set_text("NEW");
        assert!(params.positions.is_empty());
        assert_eq!(params.weight, 5.0);
    }

    #[test]
    fn test_extrude_insert_row_copies_connected_segment() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![vec![1, 1, 0, 1, 1, 1]]);

        params.extrude_insert_row(0, 0, 4);
        let m = params.frozen_matrix(0).unwrap();
        assert_eq!(m.len(), 2);
        // Only the run containing col 4 is copied.
        assert_eq!(m[1], vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn test_extrude_insert_row_on_empty_cell_adds_blank_row() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![vec![1, 0, 1]]);
        params.extrude_insert_row(0, 0, 1);
        let m = params.frozen_matrix(0).unwrap();
        assert_eq!(m[1], vec![0, 0, 0]);
    }

    #[test]
    fn test_degenerate_frozen_matrices_are_ignored() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![]);
        assert!(!params.has_frozen_matrix(0));

        params.freeze_matrix(0, vec![vec![]]);
        assert!(!params.has_frozen_matrix(0));

        params.freeze_matrix(0, vec![vec![1, 0]]);
        assert!(params.has_frozen_matrix(0));
    }

    #[test]
    fn test_prune_drops_empty_and_ragged_matrices() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![]);
        params.freeze_matrix(1, vec![vec![1, 0], vec![1]]);
        params.freeze_matrix(2, vec![vec![1, 1]]);
        params.set_weight_for(&[3], 2.0);

        params.prune_invalid_matrices();
        assert!(params.overrides[&0].custom_matrix.is_none());
        assert!(params.overrides[&1].custom_matrix.is_none());
        assert_eq!(params.frozen_matrix(2), Some(&vec![vec![1, 1]]));
        // Other override kinds are untouched
        assert_eq!(params.effective_weight(3), 2.0);
    }

    #[test]
    fn test_extrude_column_ops() {
        let mut params = TypoParams::default();
        params.freeze_matrix(0, vec![vec![1, 0], vec![0, 1]]);

        params.extrude_insert_column(0, 0);
        assert_eq!(params.frozen_matrix(0).unwrap()[0], vec![1, 1, 0]);

        params.extrude_delete_column(0, 2);
        params.extrude_delete_column(0, 1);
        assert_eq!(params.frozen_matrix(0).unwrap()[0], vec![1]);

        // Never shrinks below one column
        params.extrude_delete_column(0, 0);
        assert_eq!(params.frozen_matrix(0).unwrap()[0], vec![1]);
    }
}
