//! Bitmap to framebuffer compositing
//!
//! [`composite`] walks every pixel of the destination, not of the source,
//! and maps it back into the source through the offset. Sources that are
//! smaller, larger or placed partly off-screen are therefore clipped for
//! free, and a destination pixel with no source pixel behind it is simply
//! "unset".
//!
//! A mono source contributes the palette foreground where its bit is set.
//! An RGBA source counts as set everywhere it covers and contributes its
//! own color, converted by the surface ([`Surface::color_from_rgb`]).

use crate::bitmap::{Bitmap, Depth};
use crate::surface::Surface;

/// How source pixels combine with the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BlendMode {
    /// Set pixels take the source color, every other pixel the background.
    /// The whole destination is repainted.
    #[default]
    Overwrite,
    /// Set pixels take the source color, the rest is left alone
    Overlay,
    /// Set pixels are XORed with the source color; applying the same
    /// composite twice restores the destination
    Exclusive,
}

/// Colors used for mono sources and for Overwrite's background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette<C> {
    pub foreground: C,
    pub background: C,
}

impl<C> Palette<C> {
    pub const fn new(foreground: C, background: C) -> Self {
        Self {
            foreground,
            background,
        }
    }
}

impl Palette<bool> {
    /// Lit pixels on an unlit background
    pub const MONO: Self = Self::new(true, false);
}

/// Source color behind destination pixel `(x, y)`, `None` if unset
fn source_color<S: Surface>(
    source: &Bitmap<'_>,
    x: u32,
    y: u32,
    x_offset: i32,
    y_offset: i32,
    foreground: S::Color,
) -> Option<S::Color> {
    let sx = u32::try_from(x as i64 - x_offset as i64).ok()?;
    let sy = u32::try_from(y as i64 - y_offset as i64).ok()?;
    match source.depth() {
        Depth::Mono => source.is_set(sx, sy).then_some(foreground),
        Depth::Rgba => source
            .rgba(sx, sy)
            .map(|[r, g, b, _]| S::color_from_rgb([r, g, b])),
    }
}

/// Blend `source`, placed at `(x_offset, y_offset)`, into `dest`
pub fn composite<S: Surface>(
    dest: &mut S,
    source: &Bitmap<'_>,
    mode: BlendMode,
    x_offset: i32,
    y_offset: i32,
    palette: &Palette<S::Color>,
) {
    trace!(
        "Composite {=u32}x{=u32} at ({=i32}, {=i32}) mode {}",
        source.width(),
        source.height(),
        x_offset,
        y_offset,
        mode
    );

    for y in 0..dest.height() {
        for x in 0..dest.width() {
            let color = source_color::<S>(source, x, y, x_offset, y_offset, palette.foreground);
            match (mode, color) {
                (BlendMode::Exclusive, Some(c)) => {
                    if let Some(current) = dest.get(x, y) {
                        dest.put(x, y, current ^ c);
                    }
                }
                (BlendMode::Overwrite, None) => dest.put(x, y, palette.background),
                (BlendMode::Overwrite | BlendMode::Overlay, Some(c)) => dest.put(x, y, c),
                (BlendMode::Exclusive | BlendMode::Overlay, None) => {}
            }
        }
    }
}
