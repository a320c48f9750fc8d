//! Ring palettes.
//!
//! A depot's ring color is `palette[position mod len]`, where `position` is
//! the depot's index in the current selection. Removing a depot therefore
//! shifts the colors of every depot after it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("A palette needs at least one color")]
pub struct EmptyPaletteError;

/// Fixed, ordered, non-empty list of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Rgb>", into = "Vec<Rgb>")]
pub struct Palette {
    colors: Vec<Rgb>,
}

const RING_HEX: [u32; 18] = [
    0xef4444, 0x0ea5e9, 0x22c55e, 0xa855f7, 0xf59e0b, 0xe11d48, 0x06b6d4, 0x84cc16, 0xf97316,
    0x8b5cf6, 0x10b981, 0xd946ef, 0xeab308, 0x14b8a6, 0xfb7185, 0x65a30d, 0x1f2937, 0x64748b,
];

/// Number of colors the world view historically used.
pub const WORLD_PALETTE_LEN: usize = 15;

const fn rgb(hex: u32) -> Rgb {
    Rgb::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

impl Palette {
    pub fn new(colors: Vec<Rgb>) -> Result<Self, EmptyPaletteError> {
        if colors.is_empty() {
            return Err(EmptyPaletteError);
        }
        Ok(Self { colors })
    }

    /// The 18-color ring palette.
    pub fn ring() -> Self {
        Self {
            colors: RING_HEX.iter().map(|&h| rgb(h)).collect(),
        }
    }

    /// First 15 colors of the ring palette, as used by the world view.
    pub fn world() -> Self {
        Self {
            colors: RING_HEX[..WORLD_PALETTE_LEN].iter().map(|&h| rgb(h)).collect(),
        }
    }

    /// Color for selection position `index`.
    pub fn color_for(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::ring()
    }
}

impl TryFrom<Vec<Rgb>> for Palette {
    type Error = EmptyPaletteError;

    fn try_from(colors: Vec<Rgb>) -> Result<Self, Self::Error> {
        Self::new(colors)
    }
}

impl From<Palette> for Vec<Rgb> {
    fn from(p: Palette) -> Self {
        p.colors
    }
}
