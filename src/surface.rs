// Copyright (c) 2026 rezky_nightky

use std::str::FromStr;

use crate::error::DrawError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Source-over blend of `top` onto `self` with coverage `alpha` in `[0, 1]`.
    pub fn blend(self, top: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |under: u8, over: u8| {
            let under = under as f32;
            let over = over as f32;
            (under + (over - under) * a).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(mix(self.r, top.r), mix(self.g, top.g), mix(self.b, top.b))
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Accepts `#rrggbb`, `rrggbb` and the `#rgb` shorthand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        let digits: Vec<u8> = hex
            .chars()
            .map(|c| {
                c.to_digit(16)
                    .map(|d| d as u8)
                    .ok_or_else(|| format!("invalid hex color: {}", s))
            })
            .collect::<Result<_, _>>()?;
        match digits.as_slice() {
            [r, g, b] => Ok(Rgb::new(r * 17, g * 17, b * 17)),
            [r1, r0, g1, g0, b1, b0] => Ok(Rgb::new(
                r1 * 16 + r0,
                g1 * 16 + g0,
                b1 * 16 + b0,
            )),
            _ => Err(format!("invalid hex color: {} (expected #rrggbb)", s)),
        }
    }
}

/// One character cell drawn by the effect.
///
/// `x` is the left edge and `y` the baseline, both in surface pixels, so a
/// glyph occupies the `size`-pixel square ending at row `y`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    pub ch: char,
    pub x: u32,
    pub y: u64,
    pub size: u32,
    pub color: Rgb,
}

/// A drawable region owned by exactly one effect instance.
pub trait Surface {
    /// Pixel dimensions, fixed for the lifetime of the surface.
    fn size(&self) -> (u32, u32);

    /// Paint `color` over the whole surface at opacity `alpha`.
    fn fade(&mut self, color: Rgb, alpha: f32) -> Result<(), DrawError>;

    /// Draw a glyph. Glyphs that fall outside the surface are clipped.
    fn draw_glyph(&mut self, glyph: &Glyph) -> Result<(), DrawError>;
}

/// The place a host mounts the effect into.
pub trait Mount {
    type Surface: Surface;

    /// Hand over the surface, or `None` if it is not attached yet.
    fn acquire_surface(&mut self) -> Option<Self::Surface>;
}

/// A surface handed over at most once.
impl<S: Surface> Mount for Option<S> {
    type Surface = S;

    fn acquire_surface(&mut self) -> Option<S> {
        self.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex_colors() {
        assert_eq!("#ffffff".parse::<Rgb>().unwrap(), Rgb::WHITE);
        assert_eq!("00ff7f".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 127));
        assert_eq!("#0f0".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 0));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#gggggg".parse::<Rgb>().is_err());
    }

    #[test]
    fn blend_moves_toward_top_color_by_alpha() {
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 0.0), Rgb::WHITE);
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 1.0), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.blend(Rgb::BLACK, 0.5), Rgb::new(128, 128, 128));
    }

    #[test]
    fn option_mount_hands_surface_over_once() {
        struct Null;
        impl Surface for Null {
            fn size(&self) -> (u32, u32) {
                (1, 1)
            }
            fn fade(&mut self, _: Rgb, _: f32) -> Result<(), DrawError> {
                Ok(())
            }
            fn draw_glyph(&mut self, _: &Glyph) -> Result<(), DrawError> {
                Ok(())
            }
        }

        let mut mount = Some(Null);
        assert!(mount.acquire_surface().is_some());
        assert!(mount.acquire_surface().is_none());
    }
}
