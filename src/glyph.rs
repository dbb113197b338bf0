//! Glyph synthesis engine
//!
//! Resolves every character occurrence to a binary pixel matrix. Resolution
//! is strictly layered: a frozen custom matrix wins over everything, then the
//! static font table (when static mode is selected), then the procedural
//! letter rules, then the static table again as a fallback for digits and
//! punctuation. Characters in none of those yield `None` and the renderer
//! draws a placeholder.
//!
//! The procedural rules are the font's identity: each letter is a pure
//! function of cell coordinates and effective grid dimensions, so the same
//! parameters always synthesize the same matrix.

use crate::config::{clamps, grid};
use crate::font;
use crate::params::TypoParams;

/// Rectangular binary grid, row-major. All rows have equal length.
pub type PixelMatrix = Vec<Vec<u8>>;

/// Where a resolved matrix came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlyphSource {
    /// Frozen per-index custom matrix (extrude tool / manual edits)
    FrozenCustom,
    /// Static font table, selected explicitly
    StaticFont,
    /// Synthesized from the letter rules
    Procedural,
    /// Static table fallback for non-procedural characters
    FallbackStatic,
}

/// Resolve the matrix for the character at `index`, applying the priority
/// order: frozen custom > static font > procedural > fallback static.
pub fn resolve(ch: char, index: usize, params: &TypoParams) -> Option<(PixelMatrix, GlyphSource)> {
    if let Some(matrix) = params.frozen_matrix(index) {
        return Some((matrix.clone(), GlyphSource::FrozenCustom));
    }

    if params.use_static_font {
        if let Some(matrix) = font::static_glyph(ch) {
            return Some((matrix, GlyphSource::StaticFont));
        }
    }

    if is_procedural(ch) {
        let weight = params.effective_weight(index);
        let height = params.effective_height(index);
        return Some((synthesize(ch, weight, height), GlyphSource::Procedural));
    }

    font::static_glyph(ch).map(|m| (m, GlyphSource::FallbackStatic))
}

/// Characters covered by the procedural rules.
pub fn is_procedural(ch: char) -> bool {
    ch.is_ascii_uppercase()
}

/// Effective grid width for a weight modifier, clamped at the floor.
pub fn effective_cols(weight_mod: f32) -> usize {
    let w = (grid::BASE_COLS as f32 + weight_mod).round() as isize;
    (w.max(grid::MIN_COLS as isize)) as usize
}

/// Effective grid height for a height modifier, clamped at the floor.
pub fn effective_rows(height_mod: f32) -> usize {
    let h = (grid::BASE_ROWS as f32 + height_mod).round() as isize;
    (h.max(grid::MIN_ROWS as isize)) as usize
}

/// Geometry shared by every letter rule. Anchors are derived once per glyph:
/// `mx`/`my` mark the optical middle, `last_x`/`last_y` the far edges.
#[derive(Debug, Clone, Copy)]
pub struct RuleCtx {
    pub w: i32,
    pub h: i32,
    pub mx: i32,
    pub my: i32,
    pub last_x: i32,
    pub last_y: i32,
    /// Only consulted by letters with weight-dependent behavior (V).
    pub weight_mod: f32,
}

/// A letter rule decides a single cell from geometry alone.
pub type LetterRule = fn(&RuleCtx, i32, i32) -> bool;

/// Synthesize the matrix for a procedural letter at the given modifiers.
/// Modifiers are expected pre-clamped to the configured ranges; the dimension
/// floors below keep every rule in-bounds regardless.
pub fn synthesize(ch: char, weight_mod: f32, height_mod: f32) -> PixelMatrix {
    let w = effective_cols(weight_mod);
    let h = effective_rows(height_mod);

    let ctx = RuleCtx {
        w: w as i32,
        h: h as i32,
        mx: ((w as i32) - 1) / 2,
        my: (h as i32) / 2,
        last_x: w as i32 - 1,
        last_y: h as i32 - 1,
        weight_mod,
    };

    let rule = rule_for(ch);
    let mut matrix = Vec::with_capacity(h);
    for y in 0..h as i32 {
        let mut row = Vec::with_capacity(w);
        for x in 0..w as i32 {
            let on = rule.map(|f| f(&ctx, x, y)).unwrap_or(false);
            row.push(on as u8);
        }
        matrix.push(row);
    }
    matrix
}

fn rule_for(ch: char) -> Option<LetterRule> {
    let rule: LetterRule = match ch {
        'A' => letter_a,
        'B' => letter_b,
        'C' => letter_c,
        'D' => letter_d,
        'E' => letter_e,
        'F' => letter_f,
        'G' => letter_g,
        'H' => letter_h,
        'I' => letter_i,
        'J' => letter_j,
        'K' => letter_k,
        'L' => letter_l,
        'M' => letter_m,
        'N' => letter_n,
        'O' => letter_o,
        'P' => letter_p,
        'Q' => letter_q,
        'R' => letter_r,
        'S' => letter_s,
        'T' => letter_t,
        'U' => letter_u,
        'V' => letter_v,
        'W' => letter_w,
        'X' => letter_x,
        'Y' => letter_y,
        'Z' => letter_z,
        _ => return None,
    };
    Some(rule)
}

// ---------------------------------------------------------------------------
// Letter rules
//
// Stems sit at x=0 / x=last_x, crossbars at y=my, diagonals interpolate
// between corner constraints. Junction rows carry explicit pixel lists to
// keep the joints closed as the grid stretches.
// ---------------------------------------------------------------------------

fn letter_a(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 {
        x > 0 && x < c.last_x
    } else if y == 1 {
        x == 0 || x >= c.last_x - 1
    } else if y == c.my {
        x == 0 || x >= 2
    } else if y == c.my + 1 {
        x <= 1 || x == c.last_x
    } else {
        x == 0 || x == c.last_x
    }
}

fn letter_b(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 {
        true
    } else if x == c.last_x {
        y != 0 && y != c.last_y && y != c.my
    } else if y == 0 || y == c.last_y {
        x < c.last_x
    } else if y == c.my {
        x > 1 && x < c.last_x
    } else {
        false
    };
    if x == c.last_x - 1 && (y == 1 || y == c.last_y - 1) {
        on = true;
    }
    if x == 1 && y == c.my + 1 {
        on = true;
    }
    on
}

fn letter_c(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 {
        y > 0 && y < c.last_y
    } else if y == 0 || y == c.last_y {
        x > 0 && x < c.last_x
    } else if x == c.last_x {
        // Open mouth: the right edge breaks around the middle
        y > 0 && y < c.last_y && (y - c.my).abs() > 1
    } else {
        false
    };
    if x == c.last_x - 1 && (y == 1 || y == c.last_y - 1) {
        on = true;
    }
    on
}

fn letter_d(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 {
        true
    } else if y == 0 || y == c.last_y {
        x < c.last_x
    } else if x == c.last_x {
        y > 0 && y < c.last_y
    } else {
        false
    };
    if x == c.last_x - 1 && (y == 1 || y == c.last_y - 1) {
        on = true;
    }
    on
}

fn letter_e(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 || y == c.last_y {
        x > 0
    } else if x == 0 {
        y > 0 && y < c.last_y
    } else if y == 1 || y == c.last_y - 1 {
        x == 1
    } else if y == c.my {
        x == 0 || x > 1
    } else if y == c.my + 1 {
        x == 0 || x == 1
    } else {
        false
    }
}

fn letter_f(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 {
        x > 0
    } else if x == 0 {
        y > 0
    } else if y == 1 {
        x == 1
    } else if y == c.my {
        x == 0 || x > 1
    } else if y == c.my + 1 {
        x == 0 || x == 1
    } else {
        false
    }
}

fn letter_g(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if (y == 0 || y == c.last_y) && x > 0 && x < c.last_x {
        true
    } else if x == 0 && y > 0 && y < c.last_y {
        true
    } else if x == c.last_x && y > 0 && y < c.last_y && y != c.my - 1 {
        true
    } else {
        y == c.my && x > 1
    };
    if y == 1 && x == c.last_x - 1 {
        on = true;
    }
    if y == c.last_y - 1 && x == 1 {
        on = true;
    }
    on
}

fn letter_h(c: &RuleCtx, x: i32, y: i32) -> bool {
    if x == 0 || x == c.last_x {
        true
    } else if y == c.my {
        x > 1
    } else if y == c.my + 1 {
        x == 1
    } else {
        false
    }
}

fn letter_i(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 || y == c.last_y {
        true
    } else if y == 1 || y == c.last_y - 1 {
        x == c.mx + 1
    } else {
        x == c.mx
    }
}

fn letter_j(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 {
        true
    } else if x == c.last_x {
        y < c.last_y
    } else if y == c.last_y {
        x > 0 && x < c.last_x
    } else if x == 0 {
        y >= c.last_y - 3 && y < c.last_y
    } else if x == 1 {
        y == c.last_y - 1
    } else {
        false
    }
}

fn letter_k(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = x == 0; // Stem
    let ky = ((c.h as f32) * 0.55).floor() as i32;
    let kx = 1;

    if y < ky {
        let ratio = y as f32 / ky as f32;
        let tx = (c.last_x as f32 - (c.last_x - kx) as f32 * ratio).round() as i32;
        if x == tx {
            on = true;
        }
    } else {
        let ratio = (y - ky) as f32 / (c.last_y - ky).max(1) as f32;
        let tx = (kx as f32 + (c.last_x - kx) as f32 * ratio).round() as i32;
        if x == tx {
            on = true;
        }
    }
    if y == ky && x == kx {
        on = true;
    }
    on
}

fn letter_l(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 {
        y < c.last_y - 1
    } else if y == c.last_y {
        x > 0
    } else {
        false
    };
    if y == c.last_y - 1 && x <= 1 {
        on = true;
    }
    on
}

fn letter_m(c: &RuleCtx, x: i32, y: i32) -> bool {
    if x == 0 || x == c.last_x {
        true
    } else if y >= 2 && y < c.last_y {
        x == c.mx
    } else if y < 2 {
        (x - c.mx).abs() == 2 - y
    } else {
        false
    }
}

fn letter_n(c: &RuleCtx, x: i32, y: i32) -> bool {
    if x == 0 || x == c.last_x {
        true
    } else if y > 0 && y < c.last_y - 1 {
        let diag_factor = (c.w - 3) as f32 / (c.h - 4) as f32;
        let target_x = 1 + ((y - 1) as f32 * diag_factor).round() as i32;
        x == target_x
    } else {
        false
    }
}

fn letter_o(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 || x == c.last_x {
        y > 1 && y < c.last_y - 1
    } else if y == 0 || y == c.last_y {
        x > 0 && x < c.last_x
    } else {
        false
    };
    // Rounded corner rows are fully anchored at both edges
    if (y == 1 || y == c.last_y - 1) && (x == 0 || x == c.last_x) {
        on = true;
    }
    if y == 1 && x == 1 {
        on = true;
    }
    if y == c.last_y - 1 && x == c.last_x - 1 {
        on = true;
    }
    on
}

fn letter_p(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if y == 0 {
        x > 0 && x < c.last_x
    } else if x == 0 {
        y > 0
    } else if x == c.last_x {
        y > 0 && y < c.my
    } else if y == c.my {
        x > 1 && x < c.last_x
    } else {
        false
    };
    if y == 1 && x == 1 {
        on = true;
    }
    if y == c.my + 1 && x == 1 {
        on = true;
    }
    on
}

fn letter_q(c: &RuleCtx, x: i32, y: i32) -> bool {
    let tail = (x - y == c.last_x - c.last_y) && x >= c.mx;
    if tail {
        return true;
    }
    let mut on = false;
    if x == 0 && y > 0 && y < c.last_y {
        on = true;
    }
    if x == c.last_x && y > 0 && y < c.last_y && y != c.last_y - 1 {
        on = true;
    }
    if y == 0 && x > 0 && x < c.last_x {
        on = true;
    }
    if y == c.last_y && x > 0 && x < c.last_x && x != c.last_x - 1 {
        on = true;
    }
    if x == 1 && y == 1 {
        on = true;
    }
    on
}

fn letter_r(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = false;
    if x == 0 && y > 0 {
        on = true;
    }
    if y == 0 && x > 0 && x < c.last_x {
        on = true;
    }
    if y == c.my && x > 0 && x < c.last_x {
        on = true;
    }
    if x == c.last_x && y > 0 && y < c.my {
        on = true;
    }
    if x == 1 && y == 1 {
        on = true;
    }
    // Leg: diagonal from the bowl joint to the bottom-right corner
    if y > c.my && (y - x == c.last_y - c.last_x) {
        on = true;
    }
    on
}

fn letter_s(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if y == 0 || y == c.last_y || y == c.my {
        x > 0 && x < c.last_x
    } else if x == 0 {
        (y > 0 && y < c.my) || (y > c.my + 1 && y < c.last_y)
    } else if x == c.last_x {
        (y > 0 && y < c.my - 1) || (y > c.my && y < c.last_y)
    } else {
        false
    };
    if y == 1 && x == c.last_x - 1 {
        on = true;
    }
    if y == c.last_y - 1 && x == 1 {
        on = true;
    }
    on
}

fn letter_t(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 {
        true
    } else if y == 1 {
        x == c.mx + 1
    } else {
        x == c.mx
    }
}

fn letter_u(c: &RuleCtx, x: i32, y: i32) -> bool {
    let mut on = if x == 0 || x == c.last_x {
        y < c.last_y - 1
    } else if y == c.last_y {
        x > 0 && x < c.last_x
    } else {
        false
    };
    if y == c.last_y - 1 && (x == 0 || x == c.last_x || x == c.last_x - 1) {
        on = true;
    }
    on
}

fn letter_v(c: &RuleCtx, x: i32, y: i32) -> bool {
    let lx = if y == c.last_y { (c.mx - 1).max(0) } else { 0 };
    let rx = (c.mx + (c.last_y - y)).min(c.last_x);

    let mut on = x == lx || x == rx;

    // High weights close the mouth into a solid wedge
    if c.weight_mod > 6.0 {
        let fill_height = ((c.weight_mod - 4.0) / 2.0).floor() as i32;
        if y > c.last_y - fill_height && x > lx && x < rx {
            on = true;
        }
    }
    on
}

fn letter_w(c: &RuleCtx, x: i32, y: i32) -> bool {
    if x == 0 || x == c.last_x {
        true
    } else if y <= c.last_y - 2 {
        x == c.mx
    } else {
        let offset = y - (c.last_y - 2);
        (x - c.mx).abs() == offset
    }
}

fn letter_x(c: &RuleCtx, x: i32, y: i32) -> bool {
    // Floor/ceil mix reproduces the asymmetric stepping of the base font
    let t = y as f32 / c.last_y as f32;
    let xl = (t * c.last_x as f32).floor() as i32;
    let xr = c.last_x - (t * c.last_x as f32).ceil() as i32;
    x == xl || x == xr
}

fn letter_y(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y < c.my {
        x == 0 || x == c.last_x
    } else if y > c.my {
        x == c.mx
    } else {
        // Junction row, from the base structure [0,1,0,1,1,0]
        x == 1 || x == c.last_x - 1 || x == c.mx + 1
    }
}

fn letter_z(c: &RuleCtx, x: i32, y: i32) -> bool {
    if y == 0 || y == c.last_y {
        true
    } else {
        let range_y = (c.last_y - 2).max(1);
        let progress = (y - 1) as f32 / range_y as f32;
        let target_x = (c.last_x as f32 * (1.0 - progress)).round() as i32;
        x == target_x
    }
}

/// Clamp a weight modifier to the configured range.
pub fn clamp_weight(value: f32) -> f32 {
    value.clamp(clamps::WEIGHT_MIN, clamps::WEIGHT_MAX)
}

/// Clamp a height modifier to the configured range.
pub fn clamp_height(value: f32) -> f32 {
    value.clamp(clamps::HEIGHT_MIN, clamps::HEIGHT_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::TypoParams;

    fn rows_uniform(m: &PixelMatrix) -> bool {
        m.iter().all(|r| r.len() == m[0].len())
    }

    #[test]
    fn test_dimensions_match_modifiers() {
        for w in -4..=14 {
            for h in -8..=24 {
                let wm = clamp_weight(w as f32);
                let hm = clamp_height(h as f32);
                let m = synthesize('H', wm, hm);
                let expect_w = ((6.0 + wm).round() as isize).max(4) as usize;
                let expect_h = ((11.0 + hm).round() as isize).max(5) as usize;
                assert_eq!(m.len(), expect_h, "rows for h={}", hm);
                assert_eq!(m[0].len(), expect_w, "cols for w={}", wm);
                assert!(rows_uniform(&m));
            }
        }
    }

    #[test]
    fn test_all_letters_survive_floor_dimensions() {
        for ch in 'A'..='Z' {
            let m = synthesize(ch, clamps::WEIGHT_MIN, clamps::HEIGHT_MIN);
            assert_eq!(m.len(), 5, "{} at floor height", ch);
            assert_eq!(m[0].len(), 4, "{} at floor width", ch);
            assert!(rows_uniform(&m));
        }
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        for ch in ['A', 'K', 'Q', 'X'] {
            assert_eq!(synthesize(ch, 3.0, 2.0), synthesize(ch, 3.0, 2.0));
        }
    }

    #[test]
    fn test_golden_a_at_base_grid() {
        let m = synthesize('A', 0.0, 0.0);
        let expect = [
            "011110", "100011", "100001", "100001", "100001", "101111", "110001", "100001",
            "100001", "100001", "100001",
        ];
        let got: Vec<String> = m
            .iter()
            .map(|row| row.iter().map(|v| char::from(b'0' + v)).collect())
            .collect();
        assert_eq!(got, expect);
    }

    #[test]
    fn test_v_fills_solid_at_high_weight() {
        let span = |row: &[u8]| {
            let first = row.iter().position(|&v| v == 1);
            let last = row.iter().rposition(|&v| v == 1);
            (first, last)
        };

        // Weight 10: fill height is floor((10 - 4) / 2) = 3, so the rows
        // just above the tip run solid between the two strokes
        let heavy = synthesize('V', 10.0, 0.0);
        let last_y = heavy.len() - 1;
        for y in (last_y - 2)..last_y {
            let row = &heavy[y];
            let (Some(first), Some(last)) = span(row) else {
                panic!("empty row {y} in heavy V");
            };
            assert!(
                row[first..=last].iter().all(|&v| v == 1),
                "gap in heavy V at row {y}"
            );
        }

        // The thin outline keeps its mouth open at the same depth
        let thin = synthesize('V', 0.0, 0.0);
        let row = &thin[thin.len() - 2];
        let (Some(first), Some(last)) = span(row) else {
            panic!("empty row in thin V");
        };
        assert!(row[first..=last].iter().any(|&v| v == 0));
    }

    #[test]
    fn test_frozen_matrix_wins_over_overrides() {
        let mut params = TypoParams::default();
        params.set_text("A");
        let frozen = vec![vec![1, 1], vec![1, 0]];
        params.freeze_matrix(0, frozen.clone());
        // A same-index weight override recorded directly must not shadow the
        // frozen matrix while it is present.
        let (m, source) = resolve('A', 0, &params).unwrap();
        assert_eq!(source, GlyphSource::FrozenCustom);
        assert_eq!(m, frozen);
    }

    #[test]
    fn test_resolution_priority_order() {
        let mut params = TypoParams::default();
        params.set_text("A7@");
        params.use_static_font = false;

        let (_, source) = resolve('A', 0, &params).unwrap();
        assert_eq!(source, GlyphSource::Procedural);

        let (_, source) = resolve('7', 1, &params).unwrap();
        assert_eq!(source, GlyphSource::FallbackStatic);

        assert!(resolve('@', 2, &params).is_none());

        params.use_static_font = true;
        let (_, source) = resolve('A', 0, &params).unwrap();
        assert_eq!(source, GlyphSource::StaticFont);
    }

    #[test]
    fn test_override_weight_feeds_synthesis() {
        let mut params = TypoParams::default();
        params.set_text("AA");
        params.use_static_font = false;
        params.set_weight_for(&[1], 4.0);

        let (plain, _) = resolve('A', 0, &params).unwrap();
        let (wide, _) = resolve('A', 1, &params).unwrap();
        assert_eq!(plain[0].len(), 6);
        assert_eq!(wide[0].len(), 10);
    }
}
