//! 8-Pixel-Spaltenfont für die LED-Matrix
//!
//! Jede Spalte ist ein Byte, Bit 0 ist die oberste Zeile.

use crate::config::MAX_COLUMNS;

/// Spaltenpuffer eines gerenderten Textes
pub type Columns = heapless::Vec<u8, MAX_COLUMNS>;

/// Muster für Zeichen ohne Glyphe
pub const PLACEHOLDER: &[u8] = &[0x55, 0x2A, 0x55, 0x2A];

const FONT: &[(char, &[u8])] = &[
    ('A', &[0x7E, 0x11, 0x11, 0x7E]),
    ('B', &[0x7F, 0x49, 0x49, 0x36]),
    ('C', &[0x3E, 0x41, 0x41, 0x22]),
    ('D', &[0x7F, 0x41, 0x41, 0x3E]),
    ('E', &[0x7F, 0x49, 0x49, 0x41]),
    ('F', &[0x7F, 0x09, 0x09, 0x01]),
    ('G', &[0x3E, 0x41, 0x49, 0x3A]),
    ('H', &[0x7F, 0x08, 0x08, 0x7F]),
    ('I', &[0x41, 0x7F, 0x41]),
    ('J', &[0x20, 0x40, 0x40, 0x3F]),
    ('K', &[0x7F, 0x08, 0x14, 0x63]),
    ('L', &[0x7F, 0x40, 0x40, 0x40]),
    ('M', &[0x7F, 0x02, 0x04, 0x02, 0x7F]),
    ('N', &[0x7F, 0x06, 0x18, 0x7F]),
    ('O', &[0x3E, 0x41, 0x41, 0x3E]),
    ('P', &[0x7F, 0x09, 0x09, 0x06]),
    ('Q', &[0x3E, 0x41, 0x51, 0x21, 0x5E]),
    ('R', &[0x7F, 0x09, 0x19, 0x66]),
    ('S', &[0x26, 0x49, 0x49, 0x32]),
    ('T', &[0x01, 0x01, 0x7F, 0x01, 0x01]),
    ('U', &[0x3F, 0x40, 0x40, 0x3F]),
    ('V', &[0x1F, 0x20, 0x40, 0x20, 0x1F]),
    ('W', &[0x3F, 0x40, 0x30, 0x40, 0x3F]),
    ('X', &[0x63, 0x14, 0x08, 0x14, 0x63]),
    ('Y', &[0x03, 0x04, 0x78, 0x04, 0x03]),
    ('Z', &[0x61, 0x51, 0x49, 0x45, 0x43]),
    ('Ä', &[0xFE, 0x11, 0x11, 0xFE]),
    ('Ö', &[0xBE, 0x41, 0x41, 0xBE]),
    ('Ü', &[0xBF, 0x40, 0x40, 0xBF]),
    ('0', &[0x3E, 0x51, 0x49, 0x45, 0x3E]),
    ('1', &[0x42, 0x7F, 0x40]),
    ('2', &[0x62, 0x51, 0x49, 0x46]),
    ('3', &[0x22, 0x49, 0x49, 0x36]),
    ('4', &[0x0F, 0x08, 0x08, 0x7F]),
    ('5', &[0x27, 0x45, 0x45, 0x39]),
    ('6', &[0x3E, 0x49, 0x49, 0x32]),
    ('7', &[0x01, 0x71, 0x09, 0x07]),
    ('8', &[0x36, 0x49, 0x49, 0x36]),
    ('9', &[0x26, 0x49, 0x49, 0x3E]),
    ('!', &[0x5F]),
    ('?', &[0x02, 0x01, 0x59, 0x09, 0x06]),
    (' ', &[0x00, 0x00, 0x00]),
    ('+', &[0x08, 0x1C, 0x08]),
    ('-', &[0x08, 0x08, 0x08]),
    ('.', &[0x40]),
    (':', &[0x24]),
    ('/', &[0x60, 0x18, 0x06, 0x01]),
];

fn lookup(ch: char) -> Option<&'static [u8]> {
    FONT.iter().find(|(c, _)| *c == ch).map(|(_, cols)| *cols)
}

/// Glyphe für ein Zeichen: direkt, sonst als Großbuchstabe, sonst Platzhalter
///
/// Zeichen, deren Großschreibung mehrere Zeichen ergibt (z.B. `ß`), fallen
/// auf den Platzhalter.
pub fn glyph(ch: char) -> &'static [u8] {
    lookup(ch)
        .or_else(|| {
            let mut upper = ch.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(single), None) => lookup(single),
                _ => None,
            }
        })
        .unwrap_or(PLACEHOLDER)
}

/// Hängt die Spalten von `text` an `out` an, je Zeichen gefolgt von einer Leerspalte
///
/// Gibt `false` zurück, wenn der Puffer vorher voll war (Text abgeschnitten).
pub fn push_text(text: &str, out: &mut Columns) -> bool {
    for ch in text.chars() {
        if out.extend_from_slice(glyph(ch)).is_err() || out.push(0).is_err() {
            return false;
        }
    }
    true
}

/// Breite des Textes in Spalten (inkl. Leerspalten)
pub fn text_width(text: &str) -> usize {
    text.chars().map(|ch| glyph(ch).len() + 1).sum()
}
