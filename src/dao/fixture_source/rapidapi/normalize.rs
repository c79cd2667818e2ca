/// Characters that only show up when UTF-8 bytes were decoded as Latin-1/Windows-1252.
const MOJIBAKE_MARKERS: [char; 4] = ['Ã', 'Â', 'Ä', 'Å'];

/// Repair text that went through a UTF-8 → Windows-1252 double decode upstream
/// (e.g. `Ã‡alhanoÄŸlu` → `Çalhanoğlu`). Text that does not round-trip cleanly
/// is returned untouched.
pub fn normalize_text(raw: String) -> String {
    if !raw.contains(MOJIBAKE_MARKERS) {
        return raw;
    }

    let bytes: Option<Vec<u8>> = raw.chars().map(to_cp1252_byte).collect();
    match bytes.and_then(|bytes| String::from_utf8(bytes).ok()) {
        Some(repaired) => repaired,
        None => raw,
    }
}

/// Same as [`normalize_text`] for optional fields.
pub fn normalize_opt(raw: Option<String>) -> Option<String> {
    raw.map(normalize_text)
}

fn to_cp1252_byte(ch: char) -> Option<u8> {
    let code = ch as u32;
    if code < 0x80 || (0xA0..=0xFF).contains(&code) {
        return u8::try_from(code).ok();
    }

    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        // Undefined Windows-1252 slots decoded as C1 controls.
        '\u{81}' | '\u{8D}' | '\u{8F}' | '\u{90}' | '\u{9D}' => code as u8,
        _ => return None,
    };
    Some(byte)
}
