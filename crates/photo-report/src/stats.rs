use crate::document::Document;
use crate::layout::page_count;
use crate::options::ReportOptions;
use crate::types::*;

/// Pagination of a report before anything is compressed
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStatistics {
    pub photos: usize,
    pub photos_per_page: usize,
    pub pages: usize,
    pub photos_on_last_page: usize,
    pub empty_slots: usize,
}

/// Sizes of an assembled report
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionSummary {
    pub total_bytes: usize,
    pub largest_bytes: usize,
    pub average_quality: f32,
    /// Photos left over budget at the resolution floor
    pub budget_unmet: usize,
    /// Photos whose pixel size was reduced
    pub downscaled: usize,
}

/// Calculate pagination statistics for `photo_count` photos
pub fn calculate_statistics(
    photo_count: usize,
    options: &ReportOptions,
) -> Result<ReportStatistics> {
    if photo_count == 0 {
        return Err(ReportError::EmptyReport);
    }

    let per_page = options.photos_per_page.count();
    let pages = page_count(photo_count, options.photos_per_page);
    let photos_on_last_page = match photo_count % per_page {
        0 => per_page,
        remainder => remainder,
    };

    Ok(ReportStatistics {
        photos: photo_count,
        photos_per_page: per_page,
        pages,
        photos_on_last_page,
        empty_slots: per_page - photos_on_last_page,
    })
}

/// Summarize the compressed photos of an assembled document.
///
/// `source_dimensions` gives the original pixel size per photo in report
/// order, to count downscaled photos.
pub fn summarize_compression(
    document: &Document,
    source_dimensions: &[(u32, u32)],
) -> CompressionSummary {
    let mut total_bytes = 0;
    let mut largest_bytes = 0;
    let mut quality_sum = 0.0;
    let mut budget_unmet = 0;
    let mut downscaled = 0;
    let mut count = 0;

    for photo in document.photos() {
        let image = &photo.image;
        total_bytes += image.byte_size();
        largest_bytes = largest_bytes.max(image.byte_size());
        quality_sum += image.quality;
        if image.budget_unmet() {
            budget_unmet += 1;
        }
        if let Some(&source) = source_dimensions.get(photo.order) {
            if (image.width, image.height) != source {
                downscaled += 1;
            }
        }
        count += 1;
    }

    CompressionSummary {
        total_bytes,
        largest_bytes,
        average_quality: if count > 0 {
            quality_sum / count as f32
        } else {
            0.0
        },
        budget_unmet,
        downscaled,
    }
}
