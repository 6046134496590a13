use unicode_normalization::UnicodeNormalization as _;

/// The advance widths of the printable ASCII range (0x20 through 0x7E) of the regular
/// weight of the proportional face, expressed in units per em. The table is indexed by
/// `codepoint - 0x20`.
#[rustfmt::skip]
const REGULAR_ADVANCE_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

/// The advance width used for characters the face has no dedicated entry for.
const DEFAULT_ADVANCE_WIDTH: u16 = 556;

/// The width measurement table of the single proportional face used throughout the
/// documents. Every wrapping and placement decision in the engine depends on these
/// values, so they must match the metrics the eventual serializer embeds, otherwise the
/// text will visually overflow its boxes.
///
/// The table is plain static data, which makes measurement pure and lets any number of
/// documents be laid out concurrently against the same metrics.
#[derive(Clone, Copy, Debug)]
pub struct FontMetrics {
    /// The number of units per em the advance widths are expressed in.
    units_per_em: u16,
}

impl Default for FontMetrics {
    fn default() -> Self {
        FontMetrics::regular()
    }
}

impl FontMetrics {
    /// The metrics of the regular weight, the only weight the documents use.
    pub const fn regular() -> FontMetrics {
        FontMetrics { units_per_em: 1000 }
    }

    /// Measure the width in points of `text` rendered at `size` points. The text is
    /// NFC-normalized first, so decomposed accent sequences measure the same as their
    /// composed counterparts.
    pub fn measure_width(&self, text: &str, size: f32) -> f32 {
        let total_advance: u32 = text
            .nfc()
            .map(|character| u32::from(self.character_advance(character)))
            .sum();

        total_advance as f32 * size / self.units_per_em as f32
    }

    /// The advance width of a single character in units per em. Accented Latin characters
    /// outside the table fall back to the advance of their base letter, obtained by NFD
    /// decomposition; anything still unknown gets the default advance.
    fn character_advance(&self, character: char) -> u16 {
        if character.is_control() {
            return 0;
        }
        if let Some(width) = ascii_advance(character) {
            return width;
        }

        match character {
            'æ' => 889,
            'ø' => 611,
            'å' => 556,
            'Æ' => 1000,
            'Ø' => 778,
            'Å' => 667,
            _ => {
                // Decompose and measure the base letter, so that for example 'é' takes
                // the advance of 'e'. Combining marks themselves have no advance.
                let base_character = character.nfd().next();
                match base_character.and_then(ascii_advance) {
                    Some(width) => width,
                    None => DEFAULT_ADVANCE_WIDTH,
                }
            }
        }
    }
}

/// Look up the advance of a printable ASCII character in the width table.
fn ascii_advance(character: char) -> Option<u16> {
    let codepoint = character as u32;
    if (0x20..=0x7E).contains(&codepoint) {
        Some(REGULAR_ADVANCE_WIDTHS[(codepoint - 0x20) as usize])
    } else {
        None
    }
}
