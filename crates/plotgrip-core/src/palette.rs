//! Shared color palette for interactive objects.
//!
//! Colors requested by objects that are not yet in the palette are appended,
//! so that color cycling (e.g. a cursor stepping through colors with the
//! arrow keys) also visits user-chosen colors.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl ColorRgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    /// Parse `#rrggbb`, `#rrggbbaa` or one of the named palette colors.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(hex) = input.strip_prefix('#') {
            let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
            return match hex.len() {
                6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
                8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
                _ => None,
            };
        }
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(input))
            .map(|(_, color)| *color)
    }
}

impl From<Color> for ColorRgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<ColorRgba> for Color {
    fn from(color: ColorRgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

const NAMED_COLORS: &[(&str, ColorRgba)] = &[
    ("crimson", ColorRgba::rgb(220, 20, 60)),
    ("dimgray", ColorRgba::rgb(105, 105, 105)),
    ("whitesmoke", ColorRgba::rgb(245, 245, 245)),
    ("dodgerblue", ColorRgba::rgb(30, 144, 255)),
    ("lightgreen", ColorRgba::rgb(144, 238, 144)),
    ("black", ColorRgba::rgb(0, 0, 0)),
    ("white", ColorRgba::rgb(255, 255, 255)),
    ("red", ColorRgba::rgb(255, 0, 0)),
    ("green", ColorRgba::rgb(0, 128, 0)),
    ("blue", ColorRgba::rgb(0, 0, 255)),
];

/// Ordered list of colors shared by every object on a board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    colors: Vec<ColorRgba>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: NAMED_COLORS[..5].iter().map(|(_, c)| *c).collect(),
        }
    }
}

impl Palette {
    /// Create the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a palette from explicit colors. Falls back to the default
    /// palette when `colors` is empty.
    pub fn from_colors(colors: Vec<ColorRgba>) -> Self {
        if colors.is_empty() {
            Self::default()
        } else {
            Self { colors }
        }
    }

    /// All colors, in cycling order.
    pub fn colors(&self) -> &[ColorRgba] {
        &self.colors
    }

    /// The color used when an object does not ask for one.
    pub fn default_color(&self) -> ColorRgba {
        self.colors.first().copied().unwrap_or(ColorRgba::black())
    }

    /// Resolve the color an object asked for, adding it to the palette if new.
    pub fn resolve(&mut self, requested: Option<ColorRgba>) -> ColorRgba {
        match requested {
            None => self.default_color(),
            Some(color) => {
                if !self.colors.contains(&color) {
                    self.colors.push(color);
                }
                color
            }
        }
    }

    /// Resolve a color given by name or hex string.
    ///
    /// Unrecognized colors fall back to the default color.
    pub fn resolve_named(&mut self, requested: Option<&str>) -> ColorRgba {
        match requested {
            None => self.default_color(),
            Some(name) => match ColorRgba::parse(name) {
                Some(color) => self.resolve(Some(color)),
                None => {
                    log::warn!("Color {:?} not recognized, falling back to default", name);
                    self.default_color()
                }
            },
        }
    }

    /// Step through the palette from `current` (wrapping around).
    pub fn cycle(&self, current: ColorRgba, step: isize) -> ColorRgba {
        let len = self.colors.len() as isize;
        if len == 0 {
            return current;
        }
        let index = self
            .colors
            .iter()
            .position(|c| *c == current)
            .map_or(0, |i| i as isize);
        self.colors[(index + step).rem_euclid(len) as usize]
    }
}
