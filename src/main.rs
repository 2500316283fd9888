// Copyright (c) 2026 rezky_nightky

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use crossterm::style::Color;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use glyphfall::canvas::TerminalSurface;
use glyphfall::charset::{custom_glyphs, preset_from_str};
use glyphfall::config::{
    color_enabled_stdout, print_list_charsets, Args, ColorBg, DEFAULT_PARAMS_USAGE,
};
use glyphfall::frame::Frame;
use glyphfall::overlay::Overlay;
use glyphfall::palette::to_terminal;
use glyphfall::runtime::{detect_color_mode, ColorMode};
use glyphfall::terminal::{restore_terminal_best_effort, Terminal};
use glyphfall::{EffectConfig, RainBackgroundEffect, Rgb};

/// Virtual pixels per terminal cell edge.
const CELL_PX: u32 = 16;
/// Input poll timeout while nothing is scheduled (paused, or no rain).
const IDLE_POLL: Duration = Duration::from_millis(250);

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

#[derive(Error, Debug)]
enum AppError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot open log file {}: {source}", .path.display())]
    LogFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn fail(msg: impl std::fmt::Display) -> ! {
    eprintln!("{}", msg);
    std::process::exit(1);
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        fail(format!("failed to apply {} {} (must be a finite number)", name, v));
    }
    if v < min || v > max {
        fail(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

fn require_u64_range(name: &str, v: u64, min: u64, max: u64) -> u64 {
    if v < min || v > max {
        fail(format!("failed to apply {} {} (min {} max {})", name, v, min, max));
    }
    v
}

/// Everything the host needs, validated once up front.
struct Settings {
    effect: EffectConfig,
    color_mode: ColorMode,
    bg: Option<Color>,
    message: Option<String>,
    message_border: bool,
}

fn settings_from_args(args: &Args) -> Settings {
    let interval_ms = require_u64_range("--interval-ms", args.interval_ms, 1, 1000);
    let glyph_size = require_u64_range("--glyph-size", args.glyph_size as u64, 1, 64) as u32;
    let fade = require_f64_range("--fade", args.fade as f64, 0.0, 1.0) as f32;
    let reset_pct = require_f64_range("--reset-pct", args.reset_pct, 0.0, 100.0);
    let opacity = require_f64_range("--opacity", args.opacity as f64, 0.0, 1.0) as f32;

    let color_mode = match args.colormode {
        Some(bits) => ColorMode::from_bits(bits).unwrap_or_else(|| {
            fail(format!(
                "invalid --colormode: {} (allowed: 0,16,8,256,24,32)",
                bits
            ))
        }),
        None => detect_color_mode(),
    };

    // An empty custom alphabet is passed through; the effect rejects it and
    // the host falls back to running without rain.
    let alphabet = match &args.chars {
        Some(spec) => custom_glyphs(spec).unwrap_or_else(|e| fail(e)),
        None => preset_from_str(&args.charset)
            .unwrap_or_else(|e| fail(e))
            .glyphs(),
    };

    let bg = match args.color_bg {
        ColorBg::Black => to_terminal(color_mode, Rgb::BLACK).or(Some(Color::Black)),
        ColorBg::DefaultBackground | ColorBg::Transparent => None,
    };

    Settings {
        effect: EffectConfig {
            glyph_size,
            alphabet,
            tick_interval: Duration::from_millis(interval_ms),
            trail_fade_alpha: fade,
            reset_probability: reset_pct / 100.0,
            glyph_color: args.color,
            fade_color: Rgb::BLACK,
            overlay_opacity: opacity,
            seed: args.seed,
        },
        color_mode,
        bg,
        message: args.message.clone(),
        message_border: !args.message_no_border,
    }
}

fn init_logging(path: Option<&Path>) -> Result<(), AppError> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,glyphfall=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

/// The mounted page: rain in the back, the message box in front.
struct Scene<'a> {
    settings: &'a Settings,
    rain: Option<RainBackgroundEffect<TerminalSurface>>,
    overlay: Overlay,
    frame: Frame,
}

impl<'a> Scene<'a> {
    fn mount(settings: &'a Settings, cols: u16, rows: u16, now: Instant) -> Self {
        let overlay = settings
            .message
            .as_deref()
            .map(|m| Overlay::layout(m, cols, rows, settings.message_border))
            .unwrap_or_default();

        let mut surface = (cols > 0 && rows > 0).then(|| {
            TerminalSurface::new(
                cols,
                rows,
                CELL_PX,
                Rgb::BLACK,
                settings.bg,
                settings.effect.overlay_opacity,
                settings.color_mode,
            )
        });
        let mut rain = RainBackgroundEffect::new(settings.effect.clone());
        let rain = match rain.initialize(&mut surface, now) {
            Ok(()) => Some(rain),
            Err(e) => {
                warn!(error = %e, cols, rows, "rendering without the rain background");
                None
            }
        };

        Self {
            settings,
            rain,
            overlay,
            frame: Frame::new(cols, rows, settings.bg),
        }
    }

    /// Tear down and mount a fresh instance; a stopped effect never restarts.
    fn remount(&mut self, cols: u16, rows: u16, now: Instant) {
        self.unmount();
        *self = Scene::mount(self.settings, cols, rows, now);
    }

    fn unmount(&mut self) {
        if let Some(rain) = self.rain.as_mut() {
            rain.stop();
            debug!(ticks = rain.ticks(), "rain unmounted");
        }
    }

    fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.rain.as_ref().and_then(|r| r.until_next_tick(now))
    }

    fn pump(&mut self, now: Instant) -> u32 {
        self.rain.as_mut().map_or(0, |r| r.run_due(now))
    }

    fn postpone(&mut self, by: Duration) {
        if let Some(rain) = self.rain.as_mut() {
            rain.postpone(by);
        }
    }

    fn compose(&mut self) {
        if let Some(surface) = self.rain.as_ref().and_then(|r| r.surface()) {
            surface.render(&mut self.frame);
        }
        if !self.overlay.is_empty() {
            let fg = to_terminal(self.settings.color_mode, self.settings.effect.glyph_color);
            self.overlay.draw(&mut self.frame, fg, self.settings.bg);
        }
    }
}

fn install_signal_handlers() {
    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }
}

fn parse_args() -> Args {
    let mut cmd = Args::command()
        .styles(clap_styles())
        .before_help(DEFAULT_PARAMS_USAGE)
        .help_template(if color_enabled_stdout() {
            HELP_TEMPLATE_COLOR
        } else {
            HELP_TEMPLATE_PLAIN
        });
    cmd.build();
    let matches = cmd.get_matches();
    Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
}

fn run(args: Args) -> Result<(), AppError> {
    let settings = settings_from_args(&args);
    init_logging(args.log_file.as_deref())?;

    let duration = args.duration.and_then(|s| {
        if !s.is_finite() || s <= 0.0 {
            return None;
        }
        Some(Duration::from_secs_f64(require_f64_range(
            "--duration",
            s,
            0.1,
            86400.0,
        )))
    });

    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));
    install_signal_handlers();

    let mut term = Terminal::new()?;
    let (w, h) = term.size()?;
    let start = Instant::now();
    let end_time = duration.map(|d| start + d);

    info!(
        cols = w,
        rows = h,
        color_mode = settings.color_mode.label(),
        "host started"
    );
    let mut scene = Scene::mount(&settings, w, h, start);

    let mut running = true;
    let mut paused_at: Option<Instant> = None;

    while running {
        if end_time.is_some_and(|end| Instant::now() >= end) {
            break;
        }
        let mut pending_resize: Option<(u16, u16)> = None;
        let mut restart = false;

        loop {
            while Terminal::poll_event(Duration::ZERO)? {
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => running = false,
                            KeyCode::Char(' ') => restart = true,
                            KeyCode::Char('p') => match paused_at.take() {
                                Some(at) => scene.postpone(Instant::now() - at),
                                None => paused_at = Some(Instant::now()),
                            },
                            _ => {}
                        }
                    }
                    _ => {}
                }
            }

            if !running || restart || pending_resize.is_some() {
                break;
            }

            let now = Instant::now();
            let mut timeout = match paused_at {
                Some(_) => IDLE_POLL,
                None => scene.until_next_tick(now).unwrap_or(IDLE_POLL),
            };
            if timeout.is_zero() {
                break;
            }
            if let Some(end) = end_time {
                if now >= end {
                    break;
                }
                timeout = timeout.min(end - now);
            }
            if !Terminal::poll_event(timeout)? {
                break;
            }
        }

        if !running {
            break;
        }

        let now = Instant::now();
        if let Some((nw, nh)) = pending_resize {
            debug!(cols = nw, rows = nh, "terminal resized; remounting");
            scene.remount(nw, nh, now);
        } else if restart {
            let (cw, ch) = (scene.frame.width, scene.frame.height);
            scene.remount(cw, ch, now);
            paused_at = None;
        }

        if paused_at.is_none() {
            scene.pump(now);
        }
        scene.compose();
        if scene.frame.is_dirty() {
            term.draw(&mut scene.frame)?;
        }
    }

    scene.unmount();
    drop(term);
    info!(elapsed_s = start.elapsed().as_secs_f64(), "host stopped");
    Ok(())
}

fn main() -> ExitCode {
    let args = parse_args();

    if args.list_charsets {
        print_list_charsets();
        return ExitCode::SUCCESS;
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", env!("GLYPHFALL_BUILD"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            restore_terminal_best_effort();
            eprintln!("glyphfall: {}", e);
            ExitCode::FAILURE
        }
    }
}
