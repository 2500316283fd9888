// Copyright (c) 2026 rezky_nightky

use std::char;

/// Alphabet of the studio site's background rain.
pub const STUDIO_GLYPHS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789$+-*/=%\"'#&_(),.;:?!\\|{}<>[]^~";

/// Narrower alphabet used behind the hero page, which composites the rain
/// at opacity 0.05 instead of the studio background's 0.07.
pub const HERO_GLYPHS: &str = "01ABCDEFHIJKLMNOPQRSTUVWXYZ0123456789$+-*/=%";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Studio,
    Hero,
    Binary,
    Hex,
    Digits,
    Ascii,
    Katakana,
    Matrix,
}

impl Preset {
    pub const ALL: [Preset; 8] = [
        Preset::Studio,
        Preset::Hero,
        Preset::Binary,
        Preset::Hex,
        Preset::Digits,
        Preset::Ascii,
        Preset::Katakana,
        Preset::Matrix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Studio => "studio",
            Preset::Hero => "hero",
            Preset::Binary => "binary",
            Preset::Hex => "hex",
            Preset::Digits => "digits",
            Preset::Ascii => "ascii",
            Preset::Katakana => "katakana",
            Preset::Matrix => "matrix",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Preset::Studio => "Uppercase letters, digits and symbols (default)",
            Preset::Hero => "Hero page alphabet (shown there at opacity 0.05)",
            Preset::Binary => "0 and 1 (aliases: bin, 01)",
            Preset::Hex => "0-9 and A-F",
            Preset::Digits => "Digits only",
            Preset::Ascii => "Printable ASCII without space",
            Preset::Katakana => "Half-width katakana",
            Preset::Matrix => "Letters + digits + katakana",
        }
    }

    pub fn glyphs(self) -> Vec<char> {
        let mut out = Vec::new();
        match self {
            Preset::Studio => out.extend(STUDIO_GLYPHS.chars()),
            Preset::Hero => out.extend(HERO_GLYPHS.chars()),
            Preset::Binary => push_range(&mut out, 0x30, 0x31),
            Preset::Hex => {
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0x41, 0x46);
            }
            Preset::Digits => push_range(&mut out, 0x30, 0x39),
            Preset::Ascii => push_range(&mut out, 0x21, 0x7E),
            Preset::Katakana => push_range(&mut out, 0xFF66, 0xFF9D),
            Preset::Matrix => {
                push_range(&mut out, 0x41, 0x5A);
                push_range(&mut out, 0x61, 0x7A);
                push_range(&mut out, 0x30, 0x39);
                push_range(&mut out, 0xFF66, 0xFF9D);
            }
        }
        out
    }
}

pub fn preset_from_str(spec: &str) -> Result<Preset, String> {
    let spec = spec.trim().to_ascii_lowercase();
    match spec.as_str() {
        "studio" | "default" => Ok(Preset::Studio),
        "hero" => Ok(Preset::Hero),
        "bin" | "binary" | "01" => Ok(Preset::Binary),
        "hex" | "hexadecimal" => Ok(Preset::Hex),
        "digits" | "dec" | "decimal" => Ok(Preset::Digits),
        "ascii" => Ok(Preset::Ascii),
        "katakana" => Ok(Preset::Katakana),
        "matrix" => Ok(Preset::Matrix),
        _ => Err(format!(
            "unsupported charset: {} (see --list-charsets)",
            spec
        )),
    }
}

/// Parse a comma-separated list of hex code points, e.g. `30,31,41`.
pub fn parse_user_hex_chars(s: &str) -> Result<Vec<char>, String> {
    let mut out = Vec::new();
    for (i, part) in s.split(',').enumerate() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let v = u32::from_str_radix(part, 16)
            .map_err(|_| format!("invalid hex char at index {}", i + 1))?;
        let ch = char::from_u32(v)
            .ok_or_else(|| format!("invalid unicode scalar at index {}", i + 1))?;
        out.push(ch);
    }
    Ok(out)
}

/// Resolve the `--chars` override. `hex:` switches to code point syntax;
/// anything else is taken literally. Duplicates are kept since they weight
/// the uniform pick, the same as repeating a character in a string.
pub fn custom_glyphs(spec: &str) -> Result<Vec<char>, String> {
    match spec.strip_prefix("hex:") {
        Some(list) => parse_user_hex_chars(list),
        None => Ok(spec.chars().filter(|c| !c.is_control()).collect()),
    }
}

fn push_range(out: &mut Vec<char>, start: u32, end: u32) {
    for v in start..=end {
        if let Some(ch) = char::from_u32(v) {
            out.push(ch);
        }
    }
}
