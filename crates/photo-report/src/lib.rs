mod assemble;
mod cache;
pub mod codec;
mod compress;
pub mod constants;
mod document;
mod io;
pub mod layout;
mod manifest;
mod naming;
mod options;
pub mod render;
mod session;
mod stats;
mod types;

pub use assemble::{CancelToken, ReportAssembler};
pub use cache::CompressionCache;
pub use codec::{ImageCodec, Quality, RasterCodec};
pub use compress::{CompressedImage, SizeBudgetCompressor, clamp_dimensions, shrink_dimensions};
pub use document::*;
pub use io::{save_pdf, write_report};
pub use layout::{PageGeometry, Placement, Rect, SlotLayout};
pub use manifest::{ManifestEntry, load_manifest, parse_manifest};
pub use naming::{report_file_name, sanitize_report_id};
pub use options::*;
pub use render::{DocumentRenderer, PdfRenderer};
pub use session::{ReportItem, ReportSession, SourceImage, ingest};
pub use stats::{CompressionSummary, ReportStatistics, calculate_statistics, summarize_compression};
pub use types::*;
