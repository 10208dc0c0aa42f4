//! Report assembly
//!
//! This module orchestrates building a report:
//! 1. Validate options, reject empty reports and put items in report order
//! 2. Compress the header logo, if any, and every photo to the byte budget (cached, optionally in parallel)
//! 3. Lay out photos page by page in report order
//! 4. Stamp footers once the page total is known

use crate::cache::CompressionCache;
use crate::codec::ImageCodec;
use crate::compress::{CompressedImage, SizeBudgetCompressor};
use crate::document::{Document, HeaderLogo, Page, PageFooter, PageHeader, PlacedPhoto};
use crate::layout::{self, SlotContent};
use crate::naming::report_file_name;
use crate::options::ReportOptions;
use crate::render::DocumentRenderer;
use crate::session::ReportItem;
use crate::types::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;

/// All-or-nothing cancellation of an assembly.
///
/// Checked after compression and again after rendering. A cancelled
/// render never hands back bytes.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A page before the total page count is known
struct PageDraft {
    header: PageHeader,
    photos: Vec<PlacedPhoto>,
}

/// Builds [`Document`]s from report items
pub struct ReportAssembler<C: ImageCodec> {
    compressor: SizeBudgetCompressor<C>,
    options: ReportOptions,
    cache: Arc<CompressionCache>,
    cancel: CancelToken,
    events: Option<UnboundedSender<ReportEvent>>,
    logo: Option<Arc<Vec<u8>>>,
}

impl<C: ImageCodec> ReportAssembler<C> {
    pub fn new(codec: Arc<C>, options: ReportOptions) -> Self {
        Self {
            compressor: SizeBudgetCompressor::new(codec, options.compression),
            options,
            cache: Arc::new(CompressionCache::new()),
            cancel: CancelToken::new(),
            events: None,
            logo: None,
        }
    }

    /// Share a cache across assemblies
    pub fn with_cache(mut self, cache: Arc<CompressionCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Send progress events to `events`
    pub fn with_events(mut self, events: UnboundedSender<ReportEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Use encoded `bytes` as the header logo instead of `options.logo`
    pub fn with_logo(mut self, bytes: Vec<u8>) -> Self {
        self.logo = Some(Arc::new(bytes));
        self
    }

    pub fn options(&self) -> &ReportOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<CompressionCache> {
        &self.cache
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn emit(&self, event: ReportEvent) {
        if let Some(events) = &self.events {
            // Nobody listening is not an error
            let _ = events.send(event);
        }
    }

    /// Assemble `items` into a paginated document.
    ///
    /// Items are laid out by their `order`, whatever their position in the
    /// slice. Orders must be exactly `0..items.len()` and ids unique.
    pub async fn assemble(&self, items: &[ReportItem]) -> Result<Document> {
        self.options.validate()?;
        if items.is_empty() {
            return Err(ReportError::EmptyReport);
        }
        let items = report_order(items)?;

        let logo = self.compress_logo().await?;
        let compressed = self.compress_all(&items).await?;

        if self.cancel.is_cancelled() {
            log::info!("report assembly cancelled");
            return Err(ReportError::Cancelled);
        }

        let document = self.lay_out(&items, compressed, logo);
        self.emit(ReportEvent::LaidOut {
            pages: document.page_count(),
        });
        log::info!(
            "assembled {} photo(s) on {} page(s)",
            document.photo_count(),
            document.page_count()
        );
        Ok(document)
    }

    /// Assemble and render in one go.
    ///
    /// The renderer is checked before any photo is compressed. Nothing is
    /// returned unless every step succeeds.
    pub async fn render<R: DocumentRenderer>(
        &self,
        items: &[ReportItem],
        renderer: Arc<R>,
    ) -> Result<(Document, Vec<u8>)> {
        renderer.check_available()?;
        let document = self.assemble(items).await?;

        let (document, bytes) = tokio::task::spawn_blocking(move || {
            let bytes = renderer.render(&document)?;
            Ok::<_, ReportError>((document, bytes))
        })
        .await??;

        if self.cancel.is_cancelled() {
            log::info!("report cancelled after rendering; discarding output");
            return Err(ReportError::Cancelled);
        }
        Ok((document, bytes))
    }

    /// Load and compress the header logo.
    ///
    /// In-memory bytes from [`Self::with_logo`] win over `options.logo`.
    async fn compress_logo(&self) -> Result<Option<Arc<CompressedImage>>> {
        let bytes = match (&self.logo, &self.options.logo) {
            (Some(bytes), _) => Arc::clone(bytes),
            (None, Some(path)) => Arc::new(tokio::fs::read(path).await?),
            (None, None) => return Ok(None),
        };
        let image = self.compressor.compress(bytes).await.map_err(|err| match err {
            ReportError::Decode(err) => ReportError::Decode(err.named("logo")),
            other => other,
        })?;
        log::debug!(
            "logo {}x{}, {} bytes",
            image.width,
            image.height,
            image.byte_size()
        );
        Ok(Some(Arc::new(image)))
    }

    /// Compress every item, reusing cached results.
    ///
    /// Results come back indexed like `items`, whatever order the work
    /// finished in.
    async fn compress_all(&self, items: &[ReportItem]) -> Result<Vec<Arc<CompressedImage>>> {
        let params = *self.compressor.params();
        let total = items.len();

        let live: Vec<ImageId> = items.iter().map(ReportItem::id).collect();
        let evicted = self.cache.retain_images(&live);
        if evicted > 0 {
            log::debug!("evicted {} stale compression result(s)", evicted);
        }

        let mut results: Vec<Option<Arc<CompressedImage>>> = vec![None; total];
        let mut pending = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match self.cache.get(&item.source, &params) {
                Some(hit) => {
                    self.emit(ReportEvent::CacheHit { id: item.id() });
                    results[index] = Some(hit);
                }
                None => pending.push(index),
            }
        }

        log::debug!(
            "{} cached, {} to compress",
            total - pending.len(),
            pending.len()
        );
        self.emit(ReportEvent::CompressionStarted { total });

        let mut completed = total - pending.len();
        if self.options.parallel {
            let mut set = JoinSet::new();
            for &index in &pending {
                let compressor = self.compressor.clone();
                let bytes = Arc::clone(&items[index].source.bytes);
                set.spawn_blocking(move || (index, compressor.compress_bytes(&bytes)));
            }
            while let Some(joined) = set.join_next().await {
                let (index, result) = joined?;
                completed += 1;
                results[index] = Some(self.record(&items[index], result?, completed, total));
            }
        } else {
            for &index in &pending {
                let image = self
                    .compressor
                    .compress(Arc::clone(&items[index].source.bytes))
                    .await?;
                completed += 1;
                results[index] = Some(self.record(&items[index], image, completed, total));
            }
        }

        results
            .into_iter()
            .enumerate()
            .map(|(index, image)| {
                image.ok_or_else(|| ReportError::UnknownItem(items[index].id()))
            })
            .collect()
    }

    /// Cache a fresh result and report progress
    fn record(
        &self,
        item: &ReportItem,
        image: CompressedImage,
        completed: usize,
        total: usize,
    ) -> Arc<CompressedImage> {
        let params = self.compressor.params();
        let image = Arc::new(image);
        self.cache.insert(&item.source, params, Arc::clone(&image));
        self.emit(ReportEvent::PhotoCompressed {
            id: item.id(),
            completed,
            total,
            byte_size: image.byte_size(),
            status: image.status,
        });
        if image.budget_unmet() {
            log::warn!(
                "{} is {} bytes, over the {} byte budget",
                item.source.name,
                image.byte_size(),
                params.max_bytes
            );
        }
        image
    }

    fn lay_out(
        &self,
        items: &[ReportItem],
        compressed: Vec<Arc<CompressedImage>>,
        logo: Option<Arc<CompressedImage>>,
    ) -> Document {
        let geometry = &self.options.geometry;
        let photos_per_page = self.options.photos_per_page;
        let text = &self.options.text;
        let report_id = self.options.display_report_id().to_string();
        let date = self.options.resolved_date();

        let header = PageHeader {
            band: layout::header_band(geometry),
            title: text.title.clone(),
            report_label: text.report_label_for(&report_id),
            date_label: text.date_label_for(&date),
            logo: logo.map(|image| HeaderLogo {
                rect: layout::logo_box(geometry, image.width, image.height),
                image,
            }),
        };

        let drafts: Vec<PageDraft> = items
            .chunks(photos_per_page.count())
            .zip(compressed.chunks(photos_per_page.count()))
            .map(|(page_items, page_images)| {
                let contents: Vec<SlotContent<'_>> = page_items
                    .iter()
                    .zip(page_images)
                    .map(|(item, image)| SlotContent {
                        width_px: image.width,
                        height_px: image.height,
                        caption: &item.caption,
                    })
                    .collect();

                let photos = layout::layout_page(geometry, photos_per_page, &contents)
                    .into_iter()
                    .zip(page_items.iter().zip(page_images))
                    .map(|(slot, (item, image))| PlacedPhoto {
                        id: item.id(),
                        order: item.order,
                        layout: slot,
                        image: Arc::clone(image),
                    })
                    .collect();

                PageDraft {
                    header: header.clone(),
                    photos,
                }
            })
            .collect();

        Document {
            file_name: report_file_name(&self.options.report_id),
            report_id,
            geometry: *geometry,
            pages: self.stamp_footers(drafts),
        }
    }

    /// Second pass: number pages now that the total is known
    fn stamp_footers(&self, drafts: Vec<PageDraft>) -> Vec<Page> {
        let total = drafts.len();
        let band = layout::footer_band(&self.options.geometry);
        drafts
            .into_iter()
            .enumerate()
            .map(|(index, draft)| Page {
                number: index + 1,
                header: draft.header,
                photos: draft.photos,
                footer: PageFooter {
                    band,
                    note: self.options.text.footer_note.clone(),
                    page_label: self.options.text.page_label_for(index + 1, total),
                },
            })
            .collect()
    }
}

/// Items sorted by `order`.
///
/// Orders must form `0..len` with no gaps or repeats, and no image may
/// appear twice.
fn report_order(items: &[ReportItem]) -> Result<Vec<ReportItem>> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.id()) {
            return Err(ReportError::InvalidOrder(format!(
                "{} appears more than once",
                item.id()
            )));
        }
    }

    let mut sorted = items.to_vec();
    sorted.sort_by_key(|item| item.order);
    for (index, item) in sorted.iter().enumerate() {
        if item.order != index {
            return Err(ReportError::InvalidOrder(format!(
                "{} has order {}, expected {}",
                item.id(),
                item.order,
                index
            )));
        }
    }
    Ok(sorted)
}
