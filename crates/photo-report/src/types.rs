use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Report has no photos")]
    EmptyReport,
    #[error("Document renderer unavailable: {0}")]
    RendererUnavailable(String),
    #[error("Report assembly cancelled")]
    Cancelled,
    #[error("Unknown report item: {0}")]
    UnknownItem(ImageId),
    #[error("Items are not in report order: {0}")]
    InvalidOrder(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// An input that could not be parsed as an image.
///
/// Decode failures are reported per image; the rest of a batch is unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot decode {name}: {reason}")]
pub struct DecodeError {
    pub name: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            name: "image".to_string(),
            reason: reason.into(),
        }
    }

    /// Attach the original file name to the error
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Opaque identity of an ingested image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImageId(pub u64);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// SHA-256 of an image's encoded bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn of(bytes: &[u8]) -> Self {
        let digest = Sha256::digest(bytes);
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&digest);
        Self(hash)
    }
}

/// Number of photo slots on each report page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhotosPerPage {
    /// One large photo per page
    One,
    /// Two photos stacked vertically (default)
    #[default]
    Two,
}

impl PhotosPerPage {
    pub fn count(self) -> usize {
        match self {
            PhotosPerPage::One => 1,
            PhotosPerPage::Two => 2,
        }
    }

    pub fn from_count(count: usize) -> Option<Self> {
        match count {
            1 => Some(PhotosPerPage::One),
            2 => Some(PhotosPerPage::Two),
            _ => None,
        }
    }
}

/// Whether a compressed image fits its byte budget.
///
/// `BudgetUnmet` is a soft marker: the image is still usable, it was shrunk to
/// the resolution floor and remains larger than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BudgetStatus {
    #[default]
    Met,
    BudgetUnmet,
}

/// Progress events emitted while a report is assembled
#[derive(Debug, Clone, PartialEq)]
pub enum ReportEvent {
    /// Compression started for `total` photos
    CompressionStarted { total: usize },
    /// One photo finished compressing
    PhotoCompressed {
        id: ImageId,
        completed: usize,
        total: usize,
        byte_size: usize,
        status: BudgetStatus,
    },
    /// The compression cache already held a result for this photo
    CacheHit { id: ImageId },
    /// Layout finished with the given page count
    LaidOut { pages: usize },
}
