//! Text encoding for the standard Helvetica fonts
//!
//! Strings are written as hex strings in WinAnsiEncoding so accented
//! Portuguese text survives without embedding a font.

/// Map a character to its WinAnsiEncoding byte, `?` when unmapped
fn win_ansi_byte(c: char) -> u8 {
    match c {
        '\u{20}'..='\u{7E}' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        '\t' => b' ',
        _ => b'?',
    }
}

/// Encode `text` as WinAnsiEncoding bytes
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

/// Encode `text` as a PDF hex string, e.g. `<48656C6C6F>`
pub fn hex_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2 + 2);
    out.push('<');
    for byte in encode_win_ansi(text) {
        out.push_str(&format!("{:02X}", byte));
    }
    out.push('>');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii() {
        assert_eq!(hex_string("Hi"), "<4869>");
        assert_eq!(hex_string(""), "<>");
    }

    #[test]
    fn test_portuguese_accents() {
        // ó = F3, º = BA, ç = E7, ã = E3
        assert_eq!(hex_string("ó"), "<F3>");
        assert_eq!(hex_string("nº"), "<6EBA>");
        assert_eq!(hex_string("ção"), "<E7E36F>");
    }

    #[test]
    fn test_special_and_unmapped() {
        assert_eq!(hex_string("…"), "<85>");
        assert_eq!(hex_string("漢"), "<3F>");
    }
}
