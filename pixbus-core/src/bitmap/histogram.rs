//! Per-channel intensity histograms for RGBA bitmaps

use alloc::boxed::Box;

use super::{Bitmap, BitmapError, Depth};

/// Color channel of an RGBA pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

/// Pixel counts per intensity, one table per channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [[u32; 256]; 3],
}

impl Histogram {
    fn empty() -> Self {
        Self {
            counts: [[0; 256]; 3],
        }
    }

    /// Number of pixels whose `channel` equals `intensity`
    pub fn count(&self, channel: Channel, intensity: u8) -> u32 {
        self.counts[channel as usize][intensity as usize]
    }

    /// Full table for one channel
    pub fn channel(&self, channel: Channel) -> &[u32; 256] {
        &self.counts[channel as usize]
    }
}

impl Bitmap<'_> {
    /// Count every pixel's red, green and blue values
    ///
    /// Only defined for RGBA bitmaps; a 1-bit image has no channels.
    pub fn compute_distribution(&mut self) -> Result<(), BitmapError> {
        if self.depth != Depth::Rgba {
            return Err(BitmapError::WrongDepth);
        }
        if self.is_empty() {
            return Err(BitmapError::Empty);
        }

        let mut histogram = Box::new(Histogram::empty());
        for px in self.pixels.chunks_exact(4) {
            histogram.counts[0][px[0] as usize] += 1;
            histogram.counts[1][px[1] as usize] += 1;
            histogram.counts[2][px[2] as usize] += 1;
        }
        self.histogram = Some(histogram);
        Ok(())
    }

    /// Bucket count for `intensity` on `channel`
    ///
    /// `None` until [`compute_distribution`](Self::compute_distribution)
    /// has run on the current pixels.
    pub fn channel_histogram(&self, channel: Channel, intensity: u8) -> Option<u32> {
        self.histogram
            .as_ref()
            .map(|h| h.count(channel, intensity))
    }

    /// The whole histogram, if computed
    pub fn histogram(&self) -> Option<&Histogram> {
        self.histogram.as_deref()
    }
}
