//! Compressed photos keyed by image and compression parameters

use crate::compress::CompressedImage;
use crate::options::CompressionParams;
use crate::session::SourceImage;
use crate::types::{ContentHash, ImageId};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

type CacheKey = (ImageId, ContentHash, CompressionParams);

/// Thread-safe cache of compression results.
///
/// Source images never change after ingestion, so an entry stays valid until
/// its image leaves the report. A different parameter set is a different key.
/// Keys include the content hash, so sessions that reuse the same ids can
/// share one cache.
#[derive(Debug, Default)]
pub struct CompressionCache {
    entries: Mutex<HashMap<CacheKey, Arc<CompressedImage>>>,
}

impl CompressionCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Arc<CompressedImage>>> {
        // A panic while holding the lock cannot leave a half-written entry
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(
        &self,
        source: &SourceImage,
        params: &CompressionParams,
    ) -> Option<Arc<CompressedImage>> {
        self.lock().get(&(source.id, source.hash, *params)).cloned()
    }

    pub fn insert(
        &self,
        source: &SourceImage,
        params: &CompressionParams,
        image: Arc<CompressedImage>,
    ) {
        self.lock().insert((source.id, source.hash, *params), image);
    }

    /// Drop entries of images that are no longer in the report
    pub fn retain_images(&self, live: &[ImageId]) -> usize {
        let live: HashSet<ImageId> = live.iter().copied().collect();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(id, _, _), _| live.contains(id));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BudgetStatus;

    fn image() -> Arc<CompressedImage> {
        Arc::new(CompressedImage {
            bytes: vec![0xFF, 0xD8],
            quality: 0.9,
            width: 10,
            height: 10,
            status: BudgetStatus::Met,
        })
    }

    fn source(id: u64, bytes: &[u8]) -> SourceImage {
        SourceImage {
            id: ImageId(id),
            name: format!("{}.jpg", id),
            bytes: Arc::new(bytes.to_vec()),
            hash: ContentHash::of(bytes),
            width: 10,
            height: 10,
        }
    }

    #[test]
    fn test_keyed_by_params() {
        let cache = CompressionCache::new();
        let params = CompressionParams::default();
        cache.insert(&source(1, b"one"), &params, image());

        assert!(cache.get(&source(1, b"one"), &params).is_some());
        assert!(cache.get(&source(2, b"one"), &params).is_none());
        assert!(
            cache
                .get(&source(1, b"one"), &CompressionParams::with_max_bytes(500_000))
                .is_none()
        );
    }

    #[test]
    fn test_same_id_different_content_misses() {
        // Two sessions both number their first photo #0
        let cache = CompressionCache::new();
        let params = CompressionParams::default();
        cache.insert(&source(0, b"first session"), &params, image());

        assert!(cache.get(&source(0, b"second session"), &params).is_none());
        assert!(cache.get(&source(0, b"first session"), &params).is_some());
    }

    #[test]
    fn test_retain_images() {
        let cache = CompressionCache::new();
        let params = CompressionParams::default();
        for id in 0..3 {
            cache.insert(&source(id, b"x"), &params, image());
        }
        assert_eq!(cache.retain_images(&[ImageId(0), ImageId(2)]), 1);
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&source(1, b"x"), &params).is_none());
    }
}
