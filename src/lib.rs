// Copyright (c) 2026 rezky_nightky

//! Falling-glyph ("matrix rain") background effect.
//!
//! The effect itself ([`effect::RainBackgroundEffect`]) draws onto any
//! [`surface::Surface`] and is driven by its host through a cancellable
//! [`schedule::Interval`]. [`buffer::PixelBuffer`] renders headlessly;
//! [`canvas::TerminalSurface`] and [`terminal::Terminal`] put it on a terminal.

pub mod buffer;
pub mod canvas;
pub mod cell;
pub mod charset;
pub mod config;
pub mod effect;
pub mod error;
pub mod frame;
pub mod overlay;
pub mod palette;
pub mod runtime;
pub mod schedule;
pub mod surface;
pub mod terminal;

pub use effect::{ColumnState, EffectConfig, RainBackgroundEffect};
pub use error::{DrawError, EffectError};
pub use surface::{Glyph, Mount, Rgb, Surface};
