use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{map::lerp::Lerp, Signal};

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color {0:?}, expected #RRGGBB")]
pub struct ParseColorError(String);

impl Rgb {
    pub const GRAY: Self = Self::new(0x80, 0x80, 0x80);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_array(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Lerp for Rgb {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| (a as f64).lerp(&(b as f64), t).round().clamp(0.0, 255.0) as u8;
        Self::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

/// Blend two colors channel by channel. `factor` is clamped to \[0, 1\].
pub fn interpolate_color(color_a: Rgb, color_b: Rgb, factor: f64) -> Rgb {
    let factor = if factor.is_nan() {
        0.0
    } else {
        factor.clamp(0.0, 1.0)
    };
    color_a.lerp(&color_b, factor)
}

/// Continuous color scale over dBm, blending between fixed color stops.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientPalette {
    stops: Vec<(f64, Rgb)>,
    no_signal: Rgb,
}

impl Default for GradientPalette {
    /// Red at -80 dBm through cyan at -30 dBm, one stop per quality tier.
    fn default() -> Self {
        Self::new(vec![
            (-80.0, Rgb::from_u32(0xFF0000)),
            (-70.0, Rgb::from_u32(0xFF4500)),
            (-60.0, Rgb::from_u32(0xFFA500)),
            (-50.0, Rgb::from_u32(0xADFF2F)),
            (-40.0, Rgb::from_u32(0x90EE90)),
            (-30.0, Rgb::from_u32(0x00FFFF)),
        ])
    }
}

impl GradientPalette {
    /// Stops are sorted by dBm; an empty palette renders everything gray.
    pub fn new(mut stops: Vec<(f64, Rgb)>) -> Self {
        stops.retain(|(dbm, _)| dbm.is_finite());
        stops.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            stops,
            no_signal: Rgb::GRAY,
        }
    }

    pub fn stops(&self) -> &[(f64, Rgb)] {
        &self.stops
    }

    pub fn color_at(&self, signal: impl Into<Signal>) -> Rgb {
        let Some(dbm) = signal.into().dbm() else {
            return self.no_signal;
        };
        let (Some(first), Some(last)) = (self.stops.first(), self.stops.last()) else {
            return self.no_signal;
        };
        if dbm <= first.0 {
            return first.1;
        }
        if dbm >= last.0 {
            return last.1;
        }

        self.stops
            .windows(2)
            .find(|pair| dbm <= pair[1].0)
            .map_or(last.1, |pair| {
                let (low, high) = (pair[0], pair[1]);
                interpolate_color(low.1, high.1, (dbm - low.0) / (high.0 - low.0))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color: Rgb = "#ADFF2F".parse().unwrap();
        assert_eq!(color, Rgb::new(0xAD, 0xFF, 0x2F));
        assert_eq!(color.to_string(), "#adff2f");
        assert_eq!("90ee90".parse::<Rgb>().unwrap(), Rgb::from_u32(0x90EE90));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#GGGGGG".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_interpolate_color_ends() {
        let red = Rgb::from_u32(0xFF0000);
        let cyan = Rgb::from_u32(0x00FFFF);
        assert_eq!(interpolate_color(red, cyan, 0.0), red);
        assert_eq!(interpolate_color(red, cyan, 1.0), cyan);
        assert_eq!(interpolate_color(red, cyan, 0.5), Rgb::new(128, 128, 128));
        assert_eq!(interpolate_color(red, cyan, -3.0), red);
        assert_eq!(interpolate_color(red, cyan, 7.0), cyan);
    }

    #[test]
    fn test_interpolate_color_identity() {
        let colors = [Rgb::from_u32(0xFFA500), Rgb::GRAY, Rgb::new(0, 0, 0)];
        for color in colors {
            for i in 0..=20 {
                let factor = i as f64 / 20.0;
                assert_eq!(interpolate_color(color, color, factor), color);
            }
        }
    }

    #[test]
    fn test_gradient_palette() {
        let palette = GradientPalette::default();
        assert_eq!(palette.color_at(-80.0), Rgb::from_u32(0xFF0000));
        assert_eq!(palette.color_at(-95.0), Rgb::from_u32(0xFF0000));
        assert_eq!(palette.color_at(-30.0), Rgb::from_u32(0x00FFFF));
        assert_eq!(palette.color_at(-5.0), Rgb::from_u32(0x00FFFF));
        assert_eq!(palette.color_at(-60.0), Rgb::from_u32(0xFFA500));
        assert_eq!(
            palette.color_at(-75.0),
            interpolate_color(Rgb::from_u32(0xFF0000), Rgb::from_u32(0xFF4500), 0.5)
        );
        assert_eq!(palette.color_at(Signal::NoSignal), Rgb::GRAY);
    }
}
