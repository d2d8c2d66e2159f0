//! Display-width classification for palette characters.
//!
//! Palettes must be single-width so the aspect correction can assume one
//! column pitch. Characters whose East Asian Width is ambiguous or neutral
//! render differently across fonts and terminals, so they are rejected.

use crate::{LutsciiError, Result};
use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidthClass {
    /// East Asian Width `Na` or `H`: one terminal column.
    Narrow,
    /// East Asian Width `W` or `F`: two terminal columns.
    Wide,
}

impl WidthClass {
    /// Number of terminal columns one glyph of this class occupies.
    pub fn multiplier(self) -> u32 {
        match self {
            WidthClass::Narrow => 1,
            WidthClass::Wide => 2,
        }
    }
}

/// Source of width classes. `None` means the width cannot be relied on.
pub trait WidthTable: Send + Sync {
    fn classify(&self, c: char) -> Option<WidthClass>;
}

/// Narrow and halfwidth ranges of the East Asian Width property.
const NARROW_RANGES: &[(u32, u32)] = &[
    (0x0020, 0x007E),
    (0x00A2, 0x00A3),
    (0x00A5, 0x00A6),
    (0x00AC, 0x00AC),
    (0x00AF, 0x00AF),
    (0x20A9, 0x20A9),
    (0x27E6, 0x27ED),
    (0x2985, 0x2986),
    (0xFF61, 0xFFBE),
    (0xFFC2, 0xFFC7),
    (0xFFCA, 0xFFCF),
    (0xFFD2, 0xFFD7),
    (0xFFDA, 0xFFDC),
    (0xFFE8, 0xFFEE),
];

/// Default table: explicit narrow/halfwidth ranges, wide/fullwidth from
/// the `unicode-width` database.
#[derive(Debug, Default, Clone, Copy)]
pub struct EastAsianWidth;

impl WidthTable for EastAsianWidth {
    fn classify(&self, c: char) -> Option<WidthClass> {
        let cp = c as u32;
        if NARROW_RANGES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&cp))
        {
            return Some(WidthClass::Narrow);
        }
        match c.width() {
            Some(2) => Some(WidthClass::Wide),
            _ => None,
        }
    }
}

/// Classify a single character with the default table.
pub fn classify(c: char) -> Result<WidthClass> {
    EastAsianWidth
        .classify(c)
        .ok_or(LutsciiError::UnsupportedWidth(c))
}

/// Shared width class of a palette.
///
/// Fails with `MixedWidth` when two classes are present, with
/// `UnsupportedWidth` when any character has no usable class, and with
/// `EmptyPalette` when there is nothing to classify.
pub fn palette_width(table: &dyn WidthTable, chars: &[char]) -> Result<WidthClass> {
    let mut shared: Option<WidthClass> = None;
    let mut mixed = false;
    for &c in chars {
        let class = table.classify(c).ok_or(LutsciiError::UnsupportedWidth(c))?;
        match shared {
            None => shared = Some(class),
            Some(prev) if prev != class => mixed = true,
            Some(_) => {}
        }
    }
    if mixed {
        return Err(LutsciiError::MixedWidth(chars.iter().collect()));
    }
    shared.ok_or(LutsciiError::EmptyPalette)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_narrow() {
        for c in " .'-:;!~*+em68g#WM@".chars() {
            assert_eq!(classify(c).unwrap(), WidthClass::Narrow, "{c:?}");
        }
    }

    #[test]
    fn halfwidth_katakana_is_narrow() {
        assert_eq!(classify('\u{ff73}').unwrap(), WidthClass::Narrow);
    }

    #[test]
    fn cjk_and_bopomofo_are_wide() {
        assert_eq!(classify('\u{3105}').unwrap(), WidthClass::Wide);
        assert_eq!(classify('\u{4e19}').unwrap(), WidthClass::Wide);
        assert_eq!(classify('\u{ff21}').unwrap(), WidthClass::Wide);
        assert_eq!(WidthClass::Wide.multiplier(), 2);
    }

    #[test]
    fn neutral_and_ambiguous_are_rejected() {
        // U+22D8 is neutral, U+00B7 and U+2591 are ambiguous
        for c in ['\u{22d8}', '\u{00b7}', '\u{2591}'] {
            assert!(matches!(classify(c), Err(LutsciiError::UnsupportedWidth(x)) if x == c));
        }
    }

    #[test]
    fn mixed_palette_is_rejected() {
        let chars: Vec<char> = "\u{ff73}\u{3106}\u{4e19}".chars().collect();
        assert!(matches!(
            palette_width(&EastAsianWidth, &chars),
            Err(LutsciiError::MixedWidth(_))
        ));
    }

    #[test]
    fn empty_palette_has_no_width() {
        assert!(matches!(
            palette_width(&EastAsianWidth, &[]),
            Err(LutsciiError::EmptyPalette)
        ));
    }

    #[test]
    fn custom_table_is_honoured() {
        struct AllWide;
        impl WidthTable for AllWide {
            fn classify(&self, _: char) -> Option<WidthClass> {
                Some(WidthClass::Wide)
            }
        }
        let chars: Vec<char> = " @".chars().collect();
        assert_eq!(palette_width(&AllWide, &chars).unwrap(), WidthClass::Wide);
    }
}
