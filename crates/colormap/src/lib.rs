//! # depomap Colormap
//!
//! Colors for the depot coverage map.
//!
//! Provides the `Rgb` color type with hex (de)serialization, the ring
//! [`Palette`] indexed by selection position, and the [`ReferenceColors`]
//! table of default region fills.
//!
//! ## Usage
//!
//! ```ignore
//! use depomap_colormap::{Palette, ReferenceColors};
//!
//! let ring = Palette::ring().color_for(2);
//! let fill = ReferenceColors::default().get_or_fallback("Şanlıurfa");
//! ```

mod color;
mod palette;
mod reference;

pub use color::{ColorParseError, Rgb};
pub use palette::{EmptyPaletteError, Palette, WORLD_PALETTE_LEN};
pub use reference::{ReferenceColors, FALLBACK_FILL, NEUTRAL_FILL};
