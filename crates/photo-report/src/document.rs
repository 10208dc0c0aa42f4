//! Paginated description of a finished report
//!
//! A [`Document`] holds everything a renderer needs: page geometry, text,
//! placements and the compressed JPEG bytes. It carries no renderer state.

use crate::compress::CompressedImage;
use crate::layout::{PageGeometry, Rect, SlotLayout};
use crate::types::ImageId;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Report id as printed in the header
    pub report_id: String,
    /// Suggested output file name
    pub file_name: String,
    pub geometry: PageGeometry,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub header: PageHeader,
    /// Photos top to bottom
    pub photos: Vec<PlacedPhoto>,
    pub footer: PageFooter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageHeader {
    pub band: Rect,
    pub title: String,
    pub report_label: String,
    pub date_label: String,
    pub logo: Option<HeaderLogo>,
}

/// Logo shared by every page header
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderLogo {
    pub rect: Rect,
    pub image: Arc<CompressedImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageFooter {
    pub band: Rect,
    pub note: String,
    /// "page of total" label
    pub page_label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPhoto {
    pub id: ImageId,
    /// Report order of the item this photo came from
    pub order: usize,
    pub layout: SlotLayout,
    pub image: Arc<CompressedImage>,
}

impl Document {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn photos(&self) -> impl Iterator<Item = &PlacedPhoto> {
        self.pages.iter().flat_map(|page| page.photos.iter())
    }

    pub fn photo_count(&self) -> usize {
        self.photos().count()
    }
}
