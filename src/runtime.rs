// Copyright (c) 2026 rezky_nightky

use std::env;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    /// Map a `--colormode` value; 8 and 256 are the same, as are 24 and 32.
    pub fn from_bits(bits: u16) -> Option<ColorMode> {
        match bits {
            0 => Some(ColorMode::Mono),
            16 => Some(ColorMode::Color16),
            8 | 256 => Some(ColorMode::Color256),
            24 | 32 => Some(ColorMode::TrueColor),
            _ => None,
        }
    }
}

pub fn detect_color_mode() -> ColorMode {
    color_mode_from_env(
        &env::var("COLORTERM").unwrap_or_default(),
        &env::var("TERM").unwrap_or_default(),
    )
}

fn color_mode_from_env(colorterm: &str, term: &str) -> ColorMode {
    let colorterm = colorterm.to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = term.to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term.contains("256color") {
        return ColorMode::Color256;
    }
    if term.is_empty() || term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}
