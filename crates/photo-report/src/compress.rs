//! Size-budget JPEG compression
//!
//! Finds the highest JPEG quality whose output fits a byte budget:
//! 1. Clamp the longer edge to `max_dimension`
//! 2. Bisect quality between `quality_low` and `quality_high`
//! 3. If no quality fits, shrink the photo step by step, encoding at
//!    `quality_low`, until it fits or reaches `min_dimension`

use crate::codec::{ImageCodec, Quality};
use crate::options::CompressionParams;
use crate::types::*;
use std::sync::Arc;

/// A photo encoded as JPEG under a byte budget
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    /// Quality used for the final encoding (0.0..=1.0)
    pub quality: f32,
    pub width: u32,
    pub height: u32,
    pub status: BudgetStatus,
}

impl CompressedImage {
    pub fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    /// The photo is at the resolution floor and still over budget
    pub fn budget_unmet(&self) -> bool {
        self.status == BudgetStatus::BudgetUnmet
    }
}

/// Dimensions after the pre-scale clamp.
///
/// The longer edge becomes exactly `max_dimension`; the other is scaled and
/// rounded to the nearest pixel.
pub fn clamp_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_dimension || longest == 0 {
        return (width, height);
    }
    let scale = max_dimension as f64 / longest as f64;
    let scaled = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    if width >= height {
        (max_dimension, scaled(height))
    } else {
        (scaled(width), max_dimension)
    }
}

/// One fallback step: both dimensions scaled by `factor`, rounded.
///
/// Each dimension above one pixel shrinks by at least one pixel, so the
/// fallback always terminates.
pub fn shrink_dimensions(width: u32, height: u32, factor: f32) -> (u32, u32) {
    let shrink = |v: u32| {
        let scaled = (v as f32 * factor).round() as u32;
        scaled.min(v.saturating_sub(1)).max(1)
    };
    (shrink(width), shrink(height))
}

struct Attempt {
    bytes: Vec<u8>,
    quality: Quality,
}

struct SearchOutcome {
    /// Highest quality that met the budget
    best: Option<Attempt>,
    /// Smallest encoding produced
    smallest: Option<Attempt>,
    encodes: u32,
}

/// Compresses photos to a byte budget with a given codec
pub struct SizeBudgetCompressor<C: ImageCodec> {
    codec: Arc<C>,
    params: CompressionParams,
}

impl<C: ImageCodec> Clone for SizeBudgetCompressor<C> {
    fn clone(&self) -> Self {
        Self {
            codec: Arc::clone(&self.codec),
            params: self.params,
        }
    }
}

impl<C: ImageCodec> SizeBudgetCompressor<C> {
    pub fn new(codec: Arc<C>, params: CompressionParams) -> Self {
        Self { codec, params }
    }

    pub fn params(&self) -> &CompressionParams {
        &self.params
    }

    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    /// Decode `bytes` and compress the result
    pub fn compress_bytes(&self, bytes: &[u8]) -> Result<CompressedImage> {
        let surface = self.codec.decode(bytes)?;
        self.compress_surface(&surface)
    }

    /// Compress on the blocking pool
    pub async fn compress(&self, bytes: Arc<Vec<u8>>) -> Result<CompressedImage> {
        let compressor = self.clone();
        tokio::task::spawn_blocking(move || compressor.compress_bytes(&bytes)).await?
    }

    /// Compress a decoded surface.
    ///
    /// Always yields a usable image unless the encoder fails; an image that
    /// reached the resolution floor without fitting is flagged
    /// [`BudgetStatus::BudgetUnmet`].
    pub fn compress_surface(&self, surface: &C::Surface) -> Result<CompressedImage> {
        let params = &self.params;
        let (source_w, source_h) = self.codec.dimensions(surface);
        let (width, height) = clamp_dimensions(source_w, source_h, params.max_dimension);

        let base = if (width, height) != (source_w, source_h) {
            log::debug!(
                "pre-scaling {}x{} to {}x{}",
                source_w,
                source_h,
                width,
                height
            );
            self.codec.resample(surface, width, height)
        } else {
            surface.clone()
        };

        let outcome = self.bisect_quality(&base)?;
        if let Some(best) = outcome.best {
            log::debug!(
                "{}x{} fits at quality {:.3} ({} bytes, {} encodes)",
                width,
                height,
                best.quality.value(),
                best.bytes.len(),
                outcome.encodes
            );
            return Ok(CompressedImage {
                bytes: best.bytes,
                quality: best.quality.value(),
                width,
                height,
                status: BudgetStatus::Met,
            });
        }

        self.shrink_to_fit(&base, width, height, outcome.smallest)
    }

    /// Quality bisection at fixed resolution.
    ///
    /// Each round encodes once. A fit raises the lower bound and moves towards
    /// `quality_high`; a miss lowers the upper bound and moves towards
    /// `quality_low`.
    fn bisect_quality(&self, surface: &C::Surface) -> Result<SearchOutcome> {
        let params = &self.params;
        let mut low = params.quality_low;
        let mut high = params.quality_high;
        let mut q = params.quality_start;

        let mut outcome = SearchOutcome {
            best: None,
            smallest: None,
            encodes: 0,
        };

        for _ in 0..params.rounds {
            let quality = Quality::new(q);
            let bytes = self.codec.encode_jpeg(surface, quality)?;
            outcome.encodes += 1;
            let size = bytes.len();

            if size <= params.max_bytes {
                let better = outcome
                    .best
                    .as_ref()
                    .is_none_or(|best| quality.value() > best.quality.value());
                if better {
                    outcome.best = Some(Attempt { bytes, quality });
                }
                low = q;
                q = (q + high) / 2.0;
            } else {
                let smaller = outcome
                    .smallest
                    .as_ref()
                    .is_none_or(|smallest| size < smallest.bytes.len());
                if smaller {
                    outcome.smallest = Some(Attempt { bytes, quality });
                }
                high = q;
                q = (q + low) / 2.0;
            }
        }

        Ok(outcome)
    }

    /// Downscale fallback, encoding at `quality_low` on every step
    fn shrink_to_fit(
        &self,
        base: &C::Surface,
        mut width: u32,
        mut height: u32,
        smallest: Option<Attempt>,
    ) -> Result<CompressedImage> {
        let params = &self.params;
        let floor_quality = Quality::new(params.quality_low);

        let mut current = match smallest {
            Some(attempt) => attempt,
            None => Attempt {
                bytes: self.codec.encode_jpeg(base, floor_quality)?,
                quality: floor_quality,
            },
        };

        let mut steps = 0;
        while current.bytes.len() > params.max_bytes
            && (width > params.min_dimension || height > params.min_dimension)
        {
            (width, height) = shrink_dimensions(width, height, params.shrink_factor);
            let scaled = self.codec.resample(base, width, height);
            current = Attempt {
                bytes: self.codec.encode_jpeg(&scaled, floor_quality)?,
                quality: floor_quality,
            };
            steps += 1;
        }

        let status = if current.bytes.len() <= params.max_bytes {
            BudgetStatus::Met
        } else {
            BudgetStatus::BudgetUnmet
        };

        match status {
            BudgetStatus::Met => log::debug!(
                "shrunk to {}x{} in {} step(s) to fit {} bytes",
                width,
                height,
                steps,
                params.max_bytes
            ),
            BudgetStatus::BudgetUnmet => log::warn!(
                "{}x{} still {} bytes over the {} byte budget",
                width,
                height,
                current.bytes.len() - params.max_bytes,
                params.max_bytes
            ),
        }

        Ok(CompressedImage {
            bytes: current.bytes,
            quality: current.quality.value(),
            width,
            height,
            status,
        })
    }
}
