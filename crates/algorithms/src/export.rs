//! Page layout for printed export.
//!
//! The map is rasterized at [`RASTER_SCALE`] × its viewport and placed on
//! an A3 landscape page, scaled to fit inside the margins with its aspect
//! ratio preserved and centered on both axes.

use depomap_core::{Error, Result, Viewport};
use serde::Serialize;

/// A3 landscape, in PostScript points.
pub const A3_LANDSCAPE_PT: (f64, f64) = (1190.55, 841.89);
pub const PAGE_MARGIN_PT: f64 = 24.0;
pub const RASTER_SCALE: f64 = 2.0;

/// Where the raster lands on the page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLayout {
    pub page_width: f64,
    pub page_height: f64,
    /// Raster size in pixels.
    pub image_width: u32,
    pub image_height: u32,
    /// Placement on the page, in points.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Fit a raster of `image_width` × `image_height` into a page.
pub fn fit_to_page(image_width: u32, image_height: u32, page: (f64, f64), margin: f64) -> Result<PageLayout> {
    if image_width == 0 || image_height == 0 {
        return Err(Error::invalid_number("image_size", 0.0, "raster must not be empty"));
    }
    let (page_width, page_height) = page;
    let max_w = page_width - margin * 2.0;
    let max_h = page_height - margin * 2.0;
    if max_w <= 0.0 || max_h <= 0.0 {
        return Err(Error::invalid_number("margin", margin, "leaves no room on the page"));
    }

    let (iw, ih) = (f64::from(image_width), f64::from(image_height));
    let ratio = (max_w / iw).min(max_h / ih);
    let width = iw * ratio;
    let height = ih * ratio;

    Ok(PageLayout {
        page_width,
        page_height,
        image_width,
        image_height,
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
    })
}

/// A3 layout for a map viewport rasterized at [`RASTER_SCALE`].
pub fn a3_layout(viewport: &Viewport) -> Result<PageLayout> {
    let w = (viewport.width * RASTER_SCALE).round();
    let h = (viewport.height * RASTER_SCALE).round();
    if !(w >= 1.0 && h >= 1.0 && w <= f64::from(u32::MAX) && h <= f64::from(u32::MAX)) {
        return Err(Error::invalid_number("viewport.width", viewport.width, "cannot be rasterized"));
    }
    fit_to_page(w as u32, h as u32, A3_LANDSCAPE_PT, PAGE_MARGIN_PT)
}
