// Copyright (c) 2026 rezky_nightky

//! Headless RGB surface for tests. It logs every glyph it is given, so keep
//! runs short or drain the log with [`PixelBuffer::take_glyphs`].

use crate::error::DrawError;
use crate::surface::{Glyph, Rgb, Surface};

#[derive(Clone, Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgb>,
    glyphs: Vec<Glyph>,
    fades: u64,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, background: Rgb) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            pixels: vec![background; len],
            glyphs: Vec::new(),
            fades: 0,
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Every glyph drawn since the last [`PixelBuffer::take_glyphs`].
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    pub fn take_glyphs(&mut self) -> Vec<Glyph> {
        std::mem::take(&mut self.glyphs)
    }

    pub fn fade_count(&self) -> u64 {
        self.fades
    }
}

impl Surface for PixelBuffer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fade(&mut self, color: Rgb, alpha: f32) -> Result<(), DrawError> {
        for px in &mut self.pixels {
            *px = px.blend(color, alpha);
        }
        self.fades += 1;
        Ok(())
    }

    fn draw_glyph(&mut self, glyph: &Glyph) -> Result<(), DrawError> {
        self.glyphs.push(*glyph);

        // The glyph box spans [y - size, y) vertically; clip it to the buffer.
        let top = glyph.y.saturating_sub(glyph.size as u64);
        let bottom = glyph.y.min(self.height as u64);
        let left = glyph.x.min(self.width);
        let right = glyph.x.saturating_add(glyph.size).min(self.width);
        let width = self.width as usize;
        for y in top..bottom {
            let row = y as usize * width;
            for x in left..right {
                self.pixels[row + x as usize] = glyph.color;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph_at(x: u32, y: u64) -> Glyph {
        Glyph {
            ch: 'A',
            x,
            y,
            size: 2,
            color: Rgb::WHITE,
        }
    }

    #[test]
    fn glyph_paints_the_cell_above_its_baseline() {
        let mut buf = PixelBuffer::new(4, 4, Rgb::BLACK);
        buf.draw_glyph(&glyph_at(2, 2)).unwrap();

        assert_eq!(buf.pixel(2, 0), Some(Rgb::WHITE));
        assert_eq!(buf.pixel(3, 1), Some(Rgb::WHITE));
        assert_eq!(buf.pixel(2, 2), Some(Rgb::BLACK));
        assert_eq!(buf.pixel(1, 0), Some(Rgb::BLACK));
        assert_eq!(buf.glyphs().len(), 1);
    }

    #[test]
    fn glyph_below_the_bottom_edge_is_clipped() {
        let mut buf = PixelBuffer::new(4, 4, Rgb::BLACK);
        buf.draw_glyph(&glyph_at(0, 40)).unwrap();
        buf.draw_glyph(&glyph_at(3, 4)).unwrap();

        assert_eq!(buf.pixel(3, 3), Some(Rgb::WHITE));
        assert_eq!(buf.glyphs().len(), 2);
    }

    #[test]
    fn repeated_fades_darken_without_clearing_at_once() {
        let mut buf = PixelBuffer::new(2, 2, Rgb::BLACK);
        buf.draw_glyph(&glyph_at(0, 2)).unwrap();
        buf.fade(Rgb::BLACK, 0.05).unwrap();

        let after_one = buf.pixel(0, 0).unwrap();
        assert!(after_one.r < 255 && after_one.r > 200);

        for _ in 0..200 {
            buf.fade(Rgb::BLACK, 0.05).unwrap();
        }
        assert!(buf.pixel(0, 0).unwrap().r < after_one.r);
        assert_eq!(buf.fade_count(), 201);
    }

    #[test]
    fn take_glyphs_drains_the_log() {
        let mut buf = PixelBuffer::new(4, 4, Rgb::BLACK);
        buf.draw_glyph(&glyph_at(0, 2)).unwrap();
        buf.draw_glyph(&glyph_at(2, 4)).unwrap();

        assert_eq!(buf.take_glyphs().len(), 2);
        assert!(buf.glyphs().is_empty());
        assert_eq!(buf.pixel(2, 3), Some(Rgb::WHITE));
    }
}
