// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;

use crate::charset::Preset;
use crate::surface::Rgb;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  glyphfall --interval-ms 33 --glyph-size 16 --fade 0.05 --reset-pct 2.5 --color #ffffff --opacity 0.5 --charset studio";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    #[value(name = "black")]
    Black,
    #[value(name = "default-background")]
    DefaultBackground,
    #[value(name = "transparent")]
    Transparent,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "glyphfall", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'i',
        long = "interval-ms",
        default_value_t = 33,
        help_heading = "TIMING",
        help = "Milliseconds between redraws (min 1 max 1000)"
    )]
    pub interval_ms: u64,

    #[arg(
        long = "duration",
        help_heading = "TIMING",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        short = 'g',
        long = "glyph-size",
        default_value_t = 16,
        help_heading = "RAIN",
        help = "Virtual pixels per glyph cell; one terminal cell is 16 (min 1 max 64)"
    )]
    pub glyph_size: u32,

    #[arg(
        short = 'f',
        long = "fade",
        default_value_t = 0.05,
        help_heading = "RAIN",
        help = "Trail fade opacity painted each redraw (min 0 max 1)"
    )]
    pub fade: f32,

    #[arg(
        short = 'r',
        long = "reset-pct",
        default_value_t = 2.5,
        help_heading = "RAIN",
        help = "Chance per redraw that a column past the bottom restarts, in percent (min 0 max 100)"
    )]
    pub reset_pct: f64,

    #[arg(
        long = "seed",
        help_heading = "RAIN",
        help = "Seed the random source for a repeatable animation"
    )]
    pub seed: Option<u64>,

    #[arg(
        short = 'c',
        long = "color",
        default_value = "#ffffff",
        help_heading = "APPEARANCE",
        help = "Glyph color as #rrggbb"
    )]
    pub color: Rgb,

    #[arg(
        short = 'o',
        long = "opacity",
        default_value_t = 0.5,
        help_heading = "APPEARANCE",
        help = "Opacity of the rain layer (min 0 max 1)"
    )]
    pub opacity: f32,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Black,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (black, default-background, transparent)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: detected from COLORTERM/TERM"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "charset",
        default_value = "studio",
        help_heading = "CHARSET",
        help = "Charset preset (see --list-charsets)"
    )]
    pub charset: String,

    #[arg(
        long = "chars",
        help_heading = "CHARSET",
        help = "Custom glyphs, literal (\"01\") or hex code points (\"hex:30,31\")"
    )]
    pub chars: Option<String>,

    #[arg(
        short = 'm',
        long = "message",
        help_heading = "GENERAL",
        help = "Foreground message drawn over the rain"
    )]
    pub message: Option<String>,

    #[arg(
        long = "message-no-border",
        help_heading = "GENERAL",
        help = "Draw the message without a border"
    )]
    pub message_no_border: bool,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "log-file",
        help_heading = "GENERAL",
        help = "Write diagnostics to this file (filter with RUST_LOG)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(
        long = "list-charsets",
        help_heading = "HELP",
        help = "List available charset presets and exit"
    )]
    pub list_charsets: bool,

    #[arg(
        long = "info",
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

pub fn print_list_charsets() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE CHARSET PRESETS:\x1b[0m");
    } else {
        println!("AVAILABLE CHARSET PRESETS:");
    }
    println!();
    println!("VALUE        DESCRIPTION");
    for p in Preset::ALL {
        println!("{:<12} {}", p.name(), p.description());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_site_background() {
        let args = Args::try_parse_from(["glyphfall"]).unwrap();
        assert_eq!(args.interval_ms, 33);
        assert_eq!(args.glyph_size, 16);
        assert_eq!(args.fade, 0.05);
        assert_eq!(args.reset_pct, 2.5);
        assert_eq!(args.color, Rgb::WHITE);
        assert_eq!(args.charset, "studio");
        assert_eq!(args.color_bg, ColorBg::Black);
    }

    #[test]
    fn parses_color_and_rejects_garbage() {
        let args = Args::try_parse_from(["glyphfall", "--color", "#00ff41"]).unwrap();
        assert_eq!(args.color, Rgb::new(0, 0xff, 0x41));
        assert!(Args::try_parse_from(["glyphfall", "--color", "green"]).is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
