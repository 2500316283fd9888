// Copyright (c) 2026 rezky_nightky

//! A [`Surface`] backed by terminal cells.
//!
//! Each terminal cell stands for one `cell_px` x `cell_px` block of virtual
//! pixels, so the effect lays out exactly one column per terminal column when
//! its glyph size equals `cell_px`. Each cell keeps the color it was stamped
//! with and an intensity that fades toward the background; the two are only
//! quantized to the terminal's color mode when rendered into a [`Frame`].

use crossterm::style::Color;

use crate::cell::Cell;
use crate::error::DrawError;
use crate::frame::Frame;
use crate::palette::to_terminal;
use crate::runtime::ColorMode;
use crate::surface::{Glyph, Rgb, Surface};

/// Intensity below which a cell reads as empty.
const VISIBLE_CUTOFF: f32 = 0.05;
/// Mono terminals can't dim, so glyphs vanish once they are half faded.
const MONO_CUTOFF: f32 = 0.5;

#[derive(Clone, Debug)]
pub struct TerminalSurface {
    cols: u16,
    rows: u16,
    cell_px: u32,
    chars: Vec<char>,
    colors: Vec<Rgb>,
    intensity: Vec<f32>,
    stamped: Vec<u64>,
    generation: u64,
    background: Rgb,
    bg: Option<Color>,
    opacity: f32,
    color_mode: ColorMode,
}

impl TerminalSurface {
    pub fn new(
        cols: u16,
        rows: u16,
        cell_px: u32,
        background: Rgb,
        bg: Option<Color>,
        opacity: f32,
        color_mode: ColorMode,
    ) -> Self {
        let len = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            cell_px: cell_px.max(1),
            chars: vec![' '; len],
            colors: vec![background; len],
            intensity: vec![0.0; len],
            stamped: vec![0; len],
            generation: 1,
            background,
            bg,
            opacity: opacity.clamp(0.0, 1.0),
            color_mode,
        }
    }

    /// Cell holding a glyph whose baseline-left corner is at `(x, y)`.
    fn cell_index(&self, x: u32, y: u64) -> Option<usize> {
        let col = x / self.cell_px;
        let row = (y / self.cell_px as u64).checked_sub(1)?;
        if col >= self.cols as u32 || row >= self.rows as u64 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    /// Composite the surface into `frame`, overwriting every cell it covers.
    pub fn render(&self, frame: &mut Frame) {
        let cutoff = if self.color_mode == ColorMode::Mono {
            MONO_CUTOFF
        } else {
            VISIBLE_CUTOFF
        };
        let blank = Cell::blank_with_bg(self.bg);

        for y in 0..self.rows.min(frame.height) {
            for x in 0..self.cols.min(frame.width) {
                let i = y as usize * self.cols as usize + x as usize;
                let ch = self.chars[i];
                let intensity = self.intensity[i];
                if ch == ' ' || intensity < cutoff {
                    frame.set(x, y, blank);
                    continue;
                }

                let shown = self
                    .background
                    .blend(self.colors[i], intensity * self.opacity);
                frame.set(
                    x,
                    y,
                    Cell {
                        ch,
                        fg: to_terminal(self.color_mode, shown),
                        bg: self.bg,
                        bold: self.stamped[i] == self.generation,
                    },
                );
            }
        }
    }
}

impl Surface for TerminalSurface {
    fn size(&self) -> (u32, u32) {
        (
            self.cols as u32 * self.cell_px,
            self.rows as u32 * self.cell_px,
        )
    }

    /// Cells fade toward the surface background; `color` is expected to be it.
    fn fade(&mut self, _color: Rgb, alpha: f32) -> Result<(), DrawError> {
        let keep = 1.0 - alpha.clamp(0.0, 1.0);
        for v in &mut self.intensity {
            *v *= keep;
        }
        self.generation += 1;
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: &Glyph) -> Result<(), DrawError> {
        if let Some(i) = self.cell_index(glyph.x, glyph.y) {
            self.chars[i] = glyph.ch;
            self.colors[i] = glyph.color;
            self.intensity[i] = 1.0;
            self.stamped[i] = self.generation;
        }
        Ok(())
    }
}
