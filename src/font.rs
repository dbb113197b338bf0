//! Static pixel font table
//!
//! Hand-drawn 6x11 glyphs serving two resolution layers: the selectable
//! static font (letters) and the fallback for characters the procedural
//! rules do not cover (digits, punctuation, lowercase descenders). Patterns
//! are stored as string art and expanded to a fresh matrix on every lookup,
//! so callers can mutate their copy freely.

use crate::glyph::PixelMatrix;

/// Look up a static glyph. Returns a defensive copy, or `None` when the
/// character has no table entry.
pub fn static_glyph(ch: char) -> Option<PixelMatrix> {
    pattern(ch).map(expand)
}

/// True when the character has a static table entry.
#[allow(dead_code)]
pub fn has_static_glyph(ch: char) -> bool {
    pattern(ch).is_some()
}

fn expand(rows: &[&str]) -> PixelMatrix {
    rows.iter()
        .map(|row| row.bytes().map(|b| (b == b'X') as u8).collect())
        .collect()
}

#[rustfmt::skip]
fn pattern(ch: char) -> Option<&'static [&'static str]> {
    let rows: &[&str] = match ch {
        'A' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "XXXXXX",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
        ],
        'B' => &[
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
        ],
        'C' => &[
            ".XXXXX",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            ".XXXXX",
        ],
        'D' => &[
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
        ],
        'E' => &[
            "XXXXXX",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "XXXX..",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "XXXXXX",
        ],
        'F' => &[
            "XXXXXX",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "XXXX..",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
        ],
        'G' => &[
            ".XXXXX",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X..XXX",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        'H' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "XXXXXX",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
        ],
        'I' => &[
            "XXXXXX",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "XXXXXX",
        ],
        'J' => &[
            "XXXXXX",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            "X....X",
            ".XXXX.",
        ],
        'K' => &[
            "X....X",
            "X...X.",
            "X..X..",
            "X.X...",
            "XX....",
            "X.X...",
            "X.X...",
            "X..X..",
            "X..X..",
            "X...X.",
            "X....X",
        ],
        'L' => &[
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "XXXXXX",
        ],
        'M' => &[
            "X....X",
            "XX..XX",
            "X.XX.X",
            "X.XX.X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
        ],
        'N' => &[
            "X....X",
            "XX...X",
            "XX...X",
            "X.X..X",
            "X.X..X",
            "X..X.X",
            "X..X.X",
            "X...XX",
            "X...XX",
            "X....X",
            "X....X",
        ],
        'O' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        'P' => &[
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
        ],
        'Q' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X..X.X",
            "X...X.",
            ".XXX.X",
        ],
        'R' => &[
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
            "X.X...",
            "X..X..",
            "X...X.",
            "X....X",
            "X....X",
        ],
        'S' => &[
            ".XXXXX",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            ".XXXX.",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            "XXXXX.",
        ],
        'T' => &[
            "XXXXXX",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
        ],
        'U' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        'V' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".X..X.",
            ".X..X.",
            ".X..X.",
            "..XX..",
            "..XX..",
        ],
        'W' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X.XX.X",
            "XX..XX",
            "X....X",
        ],
        'X' => &[
            "X....X",
            "X....X",
            ".X..X.",
            ".X..X.",
            "..XX..",
            "..XX..",
            "..XX..",
            ".X..X.",
            ".X..X.",
            "X....X",
            "X....X",
        ],
        'Y' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".X..X.",
            "..XX..",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
        ],
        'Z' => &[
            "XXXXXX",
            "....X.",
            "....X.",
            "...X..",
            "..X...",
            "..X...",
            ".X....",
            ".X....",
            "X.....",
            "X.....",
            "XXXXXX",
        ],
        '0' => &[
            ".XXXX.",
            "X....X",
            "X...XX",
            "X..X.X",
            "X..X.X",
            "X.X..X",
            "X.X..X",
            "XX...X",
            "XX...X",
            "X....X",
            ".XXXX.",
        ],
        '1' => &[
            "..X...",
            ".XX...",
            "X.X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "XXXXXX",
        ],
        '2' => &[
            ".XXXX.",
            "X....X",
            ".....X",
            ".....X",
            "....X.",
            "...X..",
            "..X...",
            ".X....",
            "X.....",
            "X.....",
            "XXXXXX",
        ],
        '3' => &[
            ".XXXX.",
            "X....X",
            ".....X",
            ".....X",
            "..XXX.",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            "X....X",
            ".XXXX.",
        ],
        '4' => &[
            "....X.",
            "...XX.",
            "..X.X.",
            ".X..X.",
            "X...X.",
            "XXXXXX",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
        ],
        '5' => &[
            "XXXXXX",
            "X.....",
            "X.....",
            "X.....",
            "XXXXX.",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            "X....X",
            ".XXXX.",
        ],
        '6' => &[
            ".XXXX.",
            "X....X",
            "X.....",
            "X.....",
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        '7' => &[
            "XXXXXX",
            ".....X",
            "....X.",
            "....X.",
            "...X..",
            "...X..",
            "..X...",
            "..X...",
            ".X....",
            ".X....",
            ".X....",
        ],
        '8' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        '9' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            ".XXXXX",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".XXXX.",
        ],
        'g' => &[
            ".XXXX.",
            "X....X",
            "X....X",
            "X....X",
            ".XXXXX",
            ".....X",
            ".....X",
            ".....X",
            "X....X",
            "X....X",
            ".XXXX.",
        ],
        'j' => &[
            "....X.",
            "......",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
            "....X.",
            "X...X.",
            ".XXX..",
        ],
        'p' => &[
            "XXXXX.",
            "X....X",
            "X....X",
            "X....X",
            "XXXXX.",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
            "X.....",
        ],
        'q' => &[
            ".XXXXX",
            "X....X",
            "X....X",
            "X....X",
            ".XXXXX",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
        ],
        'y' => &[
            "X....X",
            "X....X",
            "X....X",
            "X....X",
            ".XXXXX",
            ".....X",
            ".....X",
            ".....X",
            ".....X",
            "X....X",
            ".XXXX.",
        ],
        '.' => &[
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            ".XX...",
            ".XX...",
        ],
        ',' => &[
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "......",
            "..X...",
            "..X...",
            ".X....",
        ],
        '!' => &[
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "..X...",
            "......",
            "..X...",
            "..X...",
        ],
        '?' => &[
            ".XXXX.",
            "X....X",
            ".....X",
            "....X.",
            "...X..",
            "..X...",
            "..X...",
            "..X...",
            "......",
            "..X...",
            "..X...",
        ],
        '-' => &[
            "......",
            "......",
            "......",
            "......",
            "......",
            ".XXXX.",
            "......",
            "......",
            "......",
            "......",
            "......",
        ],
        '\u{00B6}' => &[
            ".XXXXX",
            "XXXX.X",
            "XXXX.X",
            "XXXX.X",
            ".XXX.X",
            "...X.X",
            "...X.X",
            "...X.X",
            "...X.X",
            "...X.X",
            "...X.X",
        ],
        _ => return None,
    };
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_entries_are_6x11() {
        let chars: Vec<char> = ('A'..='Z')
            .chain('0'..='9')
            .chain("gjpqy.,!?-\u{00B6}".chars())
            .collect();
        for ch in chars {
            let m = static_glyph(ch).unwrap_or_else(|| panic!("missing glyph {:?}", ch));
            assert_eq!(m.len(), 11, "{:?} rows", ch);
            assert!(m.iter().all(|r| r.len() == 6), "{:?} cols", ch);
        }
    }

    #[test]
    fn test_unknown_characters_have_no_entry() {
        assert!(static_glyph('@').is_none());
        assert!(static_glyph('~').is_none());
        assert!(static_glyph('z').is_none());
    }

    #[test]
    fn test_lookup_returns_independent_copies() {
        let mut a = static_glyph('A').unwrap();
        a[0][0] = 1;
        let b = static_glyph('A').unwrap();
        assert_eq!(b[0][0], 0);
    }
}
