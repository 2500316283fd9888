// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use rand::{
    distr::{Distribution, Uniform},
    rngs::StdRng,
    Rng, SeedableRng,
};
use tracing::{debug, info, trace, warn};

use crate::charset::Preset;
use crate::error::{DrawError, EffectError};
use crate::schedule::Interval;
use crate::surface::{Glyph, Mount, Rgb, Surface};

/// Tunables of the rain effect. `Default` reproduces the site's background.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    /// Width and height of one glyph cell in surface pixels.
    pub glyph_size: u32,
    pub alphabet: Vec<char>,
    pub tick_interval: Duration,
    /// Opacity of the full-surface fill painted before each tick's glyphs.
    pub trail_fade_alpha: f32,
    /// Per-tick chance that a column past the bottom edge restarts at the top.
    pub reset_probability: f64,
    pub glyph_color: Rgb,
    pub fade_color: Rgb,
    /// Opacity the host composites the whole surface with: 0.07 behind the
    /// studio page, 0.05 behind the hero page.
    pub overlay_opacity: f32,
    pub seed: Option<u64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            glyph_size: 16,
            alphabet: Preset::Studio.glyphs(),
            tick_interval: Duration::from_millis(33),
            trail_fade_alpha: 0.05,
            reset_probability: 0.025,
            glyph_color: Rgb::WHITE,
            fade_color: Rgb::BLACK,
            overlay_opacity: 0.07,
            seed: None,
        }
    }
}

impl EffectConfig {
    pub fn validate(&self) -> Result<(), EffectError> {
        let invalid = |msg: String| Err(EffectError::InvalidConfiguration(msg));
        if self.alphabet.is_empty() {
            return invalid("glyph alphabet is empty".to_string());
        }
        if self.glyph_size == 0 {
            return invalid("glyph size must be positive".to_string());
        }
        if self.tick_interval.is_zero() {
            return invalid("tick interval must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.trail_fade_alpha) {
            return invalid(format!(
                "trail fade alpha {} (min 0 max 1)",
                self.trail_fade_alpha
            ));
        }
        if !(0.0..=1.0).contains(&self.reset_probability) {
            return invalid(format!(
                "reset probability {} (min 0 max 1)",
                self.reset_probability
            ));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return invalid(format!(
                "overlay opacity {} (min 0 max 1)",
                self.overlay_opacity
            ));
        }
        Ok(())
    }
}

/// One vertical glyph column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColumnState {
    pub column_index: u32,
    /// Row of the next glyph, in glyph-size units. Grows by one per tick
    /// and only drops back to zero once the column is past the bottom edge.
    pub drop_position: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Fresh,
    Running,
    Stopped,
}

/// Falling-glyph background.
///
/// Lifecycle: [`initialize`](Self::initialize) once, then the host pumps
/// [`run_due`](Self::run_due) from its event loop until
/// [`stop`](Self::stop). A stopped instance stays stopped; mount a new one
/// to run again. Dropping the effect stops it.
pub struct RainBackgroundEffect<S: Surface> {
    config: EffectConfig,
    phase: Phase,
    surface: Option<S>,
    height: u32,
    columns: Vec<ColumnState>,
    timer: Option<Interval>,
    rng: StdRng,
    rand_glyph: Option<Uniform<usize>>,
    ticks: u64,
    draw_failures: u64,
}

impl<S: Surface> RainBackgroundEffect<S> {
    pub fn new(config: EffectConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            phase: Phase::Fresh,
            surface: None,
            height: 0,
            columns: Vec::new(),
            timer: None,
            rng,
            rand_glyph: None,
            ticks: 0,
            draw_failures: 0,
        }
    }

    /// Take the surface from `mount`, lay out the columns and start the
    /// tick timer at `now`.
    pub fn initialize<M>(&mut self, mount: &mut M, now: Instant) -> Result<(), EffectError>
    where
        M: Mount<Surface = S>,
    {
        if self.phase != Phase::Fresh {
            return Err(EffectError::AlreadyStarted);
        }
        self.config.validate()?;

        let surface = mount
            .acquire_surface()
            .ok_or(EffectError::SurfaceUnavailable)?;
        let (width, height) = surface.size();
        if width == 0 || height == 0 {
            return Err(EffectError::InvalidConfiguration(format!(
                "surface must be non-empty, got {}x{}",
                width, height
            )));
        }

        let rand_glyph = Uniform::new(0, self.config.alphabet.len())
            .map_err(|e| EffectError::InvalidConfiguration(e.to_string()))?;

        let count = width / self.config.glyph_size;
        self.columns = (0..count)
            .map(|column_index| ColumnState {
                column_index,
                drop_position: 1,
            })
            .collect();
        self.height = height;
        self.surface = Some(surface);
        self.rand_glyph = Some(rand_glyph);
        self.timer = Some(Interval::start(now, self.config.tick_interval));
        self.phase = Phase::Running;

        info!(
            width,
            height,
            columns = count,
            interval_ms = self.config.tick_interval.as_millis() as u64,
            "rain effect started"
        );
        Ok(())
    }

    /// Redraw one frame. Does nothing unless running; never fails.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let (Some(surface), Some(rand_glyph)) = (self.surface.as_mut(), self.rand_glyph.as_ref())
        else {
            return;
        };
        self.ticks += 1;

        let cfg = &self.config;
        if let Err(e) = surface.fade(cfg.fade_color, cfg.trail_fade_alpha) {
            note_draw_failure(&mut self.draw_failures, self.ticks, &e);
        }

        let size = cfg.glyph_size;
        let bottom = self.height as u64;
        for col in &mut self.columns {
            let glyph = Glyph {
                ch: cfg.alphabet[rand_glyph.sample(&mut self.rng)],
                x: col.column_index * size,
                y: col.drop_position.saturating_mul(size as u64),
                size,
                color: cfg.glyph_color,
            };
            if let Err(e) = surface.draw_glyph(&glyph) {
                note_draw_failure(&mut self.draw_failures, self.ticks, &e);
            }

            if glyph.y > bottom && self.rng.random_bool(cfg.reset_probability) {
                col.drop_position = 0;
            }
            col.drop_position = col.drop_position.saturating_add(1);
        }
    }

    /// Run every tick the timer has due at `now`, in order. Returns how many ran.
    pub fn run_due(&mut self, now: Instant) -> u32 {
        if self.phase != Phase::Running {
            return 0;
        }
        let due = self.timer.as_mut().map_or(0, |t| t.poll(now));
        for _ in 0..due {
            self.tick();
        }
        due
    }

    /// Cancel the tick timer. Safe to call any number of times.
    pub fn stop(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            if timer.cancel() {
                debug!(
                    ticks = self.ticks,
                    draw_failures = self.draw_failures,
                    "rain effect stopped"
                );
            }
        }
        if self.phase == Phase::Running {
            self.phase = Phase::Stopped;
        }
    }

    /// Push the next tick back by `by`, for hosts that pause pumping.
    pub fn postpone(&mut self, by: Duration) {
        if let Some(timer) = self.timer.as_mut() {
            timer.delay(by);
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.timer.as_ref().and_then(|t| t.until_next(now))
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    pub fn columns(&self) -> &[ColumnState] {
        &self.columns
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn draw_failures(&self) -> u64 {
        self.draw_failures
    }
}

impl<S: Surface> Drop for RainBackgroundEffect<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

fn note_draw_failure(count: &mut u64, tick: u64, err: &DrawError) {
    *count += 1;
    if *count == 1 || count.is_power_of_two() {
        warn!(tick, failures = *count, error = %err, "draw failed; continuing");
    } else {
        trace!(tick, error = %err, "draw failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::PixelBuffer;

    fn config(seed: u64) -> EffectConfig {
        EffectConfig {
            seed: Some(seed),
            ..EffectConfig::default()
        }
    }

    fn mounted(
        cfg: EffectConfig,
        w: u32,
        h: u32,
    ) -> (RainBackgroundEffect<PixelBuffer>, Instant) {
        let now = Instant::now();
        let mut fx = RainBackgroundEffect::new(cfg);
        fx.initialize(&mut Some(PixelBuffer::new(w, h, Rgb::BLACK)), now)
            .unwrap();
        (fx, now)
    }

    fn drops(fx: &RainBackgroundEffect<PixelBuffer>) -> Vec<u64> {
        fx.columns().iter().map(|c| c.drop_position).collect()
    }

    struct BrokenSurface;

    impl Surface for BrokenSurface {
        fn size(&self) -> (u32, u32) {
            (64, 64)
        }
        fn fade(&mut self, _: Rgb, _: f32) -> Result<(), DrawError> {
            Err(DrawError::Detached)
        }
        fn draw_glyph(&mut self, _: &Glyph) -> Result<(), DrawError> {
            Err(DrawError::Backend("lost context".to_string()))
        }
    }

    #[test]
    fn initialize_lays_out_one_column_per_glyph_width() {
        for (w, h) in [(1, 1), (15, 10), (16, 10), (33, 7), (320, 160), (1921, 1080)] {
            let (fx, _) = mounted(config(1), w, h);
            assert_eq!(fx.columns().len(), (w / 16) as usize);
            for (i, c) in fx.columns().iter().enumerate() {
                assert_eq!(c.column_index, i as u32);
                assert_eq!(c.drop_position, 1);
            }
            assert!(fx.is_running());
        }
    }

    #[test]
    fn drops_advance_by_one_per_tick_without_resets() {
        let cfg = EffectConfig {
            reset_probability: 1.0,
            ..config(2)
        };
        let (mut fx, _) = mounted(cfg, 128, 10_000);
        for n in 1..=50u64 {
            fx.tick();
            assert!(drops(&fx).iter().all(|&d| d == 1 + n));
        }
    }

    #[test]
    fn resets_only_happen_past_the_bottom_edge() {
        let cfg = EffectConfig {
            reset_probability: 0.3,
            ..config(3)
        };
        let (mut fx, _) = mounted(cfg, 256, 64);
        let mut resets = 0;
        for _ in 0..2_000 {
            let before = drops(&fx);
            fx.tick();
            for (prev, now) in before.iter().zip(drops(&fx)) {
                if now == prev + 1 {
                    continue;
                }
                assert_eq!(now, 1);
                assert!(prev * 16 > 64, "reset inside the surface at row {}", prev);
                resets += 1;
            }
        }
        assert!(resets > 0);
    }

    #[test]
    fn one_tick_on_320_by_160_draws_a_glyph_per_column_at_row_16() {
        let (mut fx, _) = mounted(config(4), 320, 160);
        assert_eq!(fx.columns().len(), 20);

        fx.tick();

        let glyphs = fx.surface().unwrap().glyphs();
        assert_eq!(glyphs.len(), 20);
        for (i, g) in glyphs.iter().enumerate() {
            assert_eq!(g.x, i as u32 * 16);
            assert_eq!(g.y, 16);
            assert_eq!(g.size, 16);
            assert_eq!(g.color, Rgb::WHITE);
            assert!(fx.config().alphabet.contains(&g.ch));
        }
        assert!(drops(&fx).iter().all(|&d| d == 2));
        assert_eq!(fx.surface().unwrap().fade_count(), 1);
    }

    #[test]
    fn forced_reset_fires_on_first_tick_past_the_bottom() {
        let cfg = EffectConfig {
            reset_probability: 1.0,
            ..config(5)
        };
        let (mut fx, _) = mounted(cfg, 64, 160);

        // Rows 1..=10 are inside a 160px surface.
        for _ in 0..10 {
            fx.tick();
        }
        assert!(drops(&fx).iter().all(|&d| d == 11));

        fx.tick();
        assert!(drops(&fx).iter().all(|&d| d == 1));
        let last: Vec<u64> = fx.surface_mut().unwrap().take_glyphs()[40..]
            .iter()
            .map(|g| g.y)
            .collect();
        assert_eq!(last, vec![176; 4]);
    }

    #[test]
    fn zero_reset_probability_keeps_falling() {
        let cfg = EffectConfig {
            reset_probability: 0.0,
            ..config(6)
        };
        let (mut fx, _) = mounted(cfg, 32, 16);
        for _ in 0..500 {
            fx.tick();
        }
        assert!(drops(&fx).iter().all(|&d| d == 501));
    }

    #[test]
    fn run_due_ticks_once_per_elapsed_interval() {
        let (mut fx, t0) = mounted(config(7), 64, 64);
        let iv = fx.config().tick_interval;

        assert_eq!(fx.run_due(t0), 0);
        assert_eq!(fx.run_due(t0 + iv), 1);
        assert_eq!(fx.run_due(t0 + iv * 3), 2);
        assert_eq!(fx.ticks(), 3);
        assert!(drops(&fx).iter().all(|&d| d == 4));
        assert_eq!(fx.until_next_tick(t0 + iv * 3), Some(iv));
    }

    #[test]
    fn stop_prevents_any_further_ticks() {
        let (mut fx, t0) = mounted(config(8), 64, 64);
        let iv = fx.config().tick_interval;
        fx.run_due(t0 + iv);
        fx.stop();

        let fades = fx.surface().unwrap().fade_count();
        for n in 2..100 {
            assert_eq!(fx.run_due(t0 + iv * n), 0);
        }
        fx.tick();
        assert_eq!(fx.ticks(), 1);
        assert_eq!(fx.surface().unwrap().fade_count(), fades);
        assert!(!fx.is_running());
        assert_eq!(fx.until_next_tick(t0), None);
    }

    #[test]
    fn stop_is_idempotent() {
        let (mut fx, _) = mounted(config(9), 64, 64);
        fx.stop();
        fx.stop();
        assert!(!fx.is_running());

        let mut fresh: RainBackgroundEffect<PixelBuffer> = RainBackgroundEffect::new(config(9));
        fresh.stop();
        assert!(!fresh.is_running());
    }

    #[test]
    fn stopped_instance_cannot_be_restarted() {
        let (mut fx, now) = mounted(config(10), 64, 64);
        fx.stop();
        let err = fx
            .initialize(&mut Some(PixelBuffer::new(64, 64, Rgb::BLACK)), now)
            .unwrap_err();
        assert_eq!(err, EffectError::AlreadyStarted);
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        let cfg = EffectConfig {
            alphabet: Vec::new(),
            ..config(11)
        };
        let mut fx = RainBackgroundEffect::new(cfg);
        let err = fx
            .initialize(&mut Some(PixelBuffer::new(64, 64, Rgb::BLACK)), Instant::now())
            .unwrap_err();
        assert!(matches!(err, EffectError::InvalidConfiguration(_)));
        assert!(!fx.is_running());
    }

    #[test]
    fn zero_sized_surface_is_rejected() {
        for (w, h) in [(0, 160), (320, 0)] {
            let mut fx = RainBackgroundEffect::new(config(12));
            let err = fx
                .initialize(&mut Some(PixelBuffer::new(w, h, Rgb::BLACK)), Instant::now())
                .unwrap_err();
            assert!(matches!(err, EffectError::InvalidConfiguration(_)));
        }
    }

    #[test]
    fn out_of_range_tunables_are_rejected() {
        let bad = [
            EffectConfig {
                glyph_size: 0,
                ..config(13)
            },
            EffectConfig {
                tick_interval: Duration::ZERO,
                ..config(13)
            },
            EffectConfig {
                trail_fade_alpha: 1.5,
                ..config(13)
            },
            EffectConfig {
                reset_probability: -0.1,
                ..config(13)
            },
            EffectConfig {
                reset_probability: f64::NAN,
                ..config(13)
            },
        ];
        for cfg in bad {
            assert!(matches!(
                cfg.validate(),
                Err(EffectError::InvalidConfiguration(_))
            ));
        }
        assert!(EffectConfig::default().validate().is_ok());
    }

    #[test]
    fn missing_surface_is_reported() {
        let mut fx: RainBackgroundEffect<PixelBuffer> = RainBackgroundEffect::new(config(14));
        let err = fx.initialize(&mut None::<PixelBuffer>, Instant::now()).unwrap_err();
        assert_eq!(err, EffectError::SurfaceUnavailable);
        assert!(!fx.is_running());
    }

    #[test]
    fn draw_errors_are_absorbed_and_ticking_continues() {
        let t0 = Instant::now();
        let mut fx = RainBackgroundEffect::new(config(15));
        fx.initialize(&mut Some(BrokenSurface), t0).unwrap();
        let iv = fx.config().tick_interval;

        assert_eq!(fx.run_due(t0 + iv), 1);
        assert_eq!(fx.run_due(t0 + iv * 2), 1);

        // One fade plus four glyphs per tick.
        assert_eq!(fx.draw_failures(), 10);
        assert!(fx.columns().iter().all(|c| c.drop_position == 3));
        assert!(fx.is_running());
    }

    #[test]
    fn tick_before_initialize_is_a_no_op() {
        let mut fx: RainBackgroundEffect<PixelBuffer> = RainBackgroundEffect::new(config(16));
        fx.tick();
        assert_eq!(fx.ticks(), 0);
        assert!(fx.columns().is_empty());
        assert_eq!(fx.run_due(Instant::now() + Duration::from_secs(5)), 0);
    }

    #[test]
    fn instances_own_independent_state() {
        let (mut a, _) = mounted(config(17), 64, 64);
        let (b, _) = mounted(config(17), 128, 64);
        a.tick();
        a.tick();
        assert!(drops(&a).iter().all(|&d| d == 3));
        assert!(drops(&b).iter().all(|&d| d == 1));
        assert!(b.surface().unwrap().glyphs().is_empty());
    }

    #[test]
    fn postpone_delays_the_next_tick() {
        let (mut fx, t0) = mounted(config(18), 64, 64);
        let iv = fx.config().tick_interval;
        fx.postpone(Duration::from_secs(2));
        assert_eq!(fx.run_due(t0 + iv), 0);
        assert_eq!(fx.run_due(t0 + iv + Duration::from_secs(2)), 1);
    }

    #[test]
    fn dropping_a_running_effect_releases_its_surface() {
        use std::cell::Cell;
        use std::rc::Rc;

        struct Tracked(Rc<Cell<bool>>);

        impl Surface for Tracked {
            fn size(&self) -> (u32, u32) {
                (64, 64)
            }
            fn fade(&mut self, _: Rgb, _: f32) -> Result<(), DrawError> {
                Ok(())
            }
            fn draw_glyph(&mut self, _: &Glyph) -> Result<(), DrawError> {
                Ok(())
            }
        }

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }

        let released = Rc::new(Cell::new(false));
        let mut fx = RainBackgroundEffect::new(config(19));
        fx.initialize(&mut Some(Tracked(Rc::clone(&released))), Instant::now())
            .unwrap();
        assert!(fx.is_running());
        assert!(!released.get());

        drop(fx);
        assert!(released.get());
    }
}
