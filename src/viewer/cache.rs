//! LRU cache for rendered pages

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use super::Rotation;
use super::request::RenderParams;
use super::types::PageData;

/// Cache key for rendered pages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Page number (1-based)
    pub page: usize,
    /// Zoom percent
    pub zoom_percent: u16,
    /// View rotation
    pub rotation: Rotation,
}

impl CacheKey {
    /// Create a cache key from render parameters
    #[must_use]
    pub fn from_params(params: &RenderParams) -> Self {
        Self {
            page: params.page,
            zoom_percent: params.zoom_percent,
            rotation: params.rotation,
        }
    }
}

/// LRU cache for rendered page data
pub struct PageCache {
    cache: LruCache<CacheKey, Arc<PageData>>,
}

impl PageCache {
    /// Create a new cache with the given capacity
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).expect("1 is non-zero")),
            ),
        }
    }

    /// Get a cached page, promoting it in the LRU order
    #[must_use]
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<PageData>> {
        self.cache.get(key).cloned()
    }

    /// Check if a key is in the cache without promoting it
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a page into the cache, returning an Arc to the data
    pub fn insert(&mut self, key: CacheKey, data: PageData) -> Arc<PageData> {
        let arc = Arc::new(data);
        self.cache.put(key, arc.clone());
        arc
    }

    /// Clear all cached pages
    pub fn invalidate_all(&mut self) {
        self.cache.clear();
    }

    /// Number of cached pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Cache capacity
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cache.cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::ImageData;
    use super::*;

    fn test_params(page: usize) -> RenderParams {
        RenderParams {
            page,
            zoom_percent: 100,
            rotation: Rotation::None,
        }
    }

    fn test_page_data(page: usize) -> PageData {
        PageData {
            img_data: ImageData {
                pixels: vec![0; 300],
                width_px: 10,
                height_px: 10,
            },
            page,
            zoom_percent: 100,
            rotation: Rotation::None,
            text_lines: vec![],
        }
    }

    #[test]
    fn cache_insert_and_get() {
        let mut cache = PageCache::new(10);
        let key = CacheKey::from_params(&test_params(1));

        cache.insert(key, test_page_data(1));

        assert!(cache.contains(&key));
        assert!(cache.get(&key).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_lru_eviction() {
        let mut cache = PageCache::new(2);

        for page in 1..=3 {
            let key = CacheKey::from_params(&test_params(page));
            cache.insert(key, test_page_data(page));
        }

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&CacheKey::from_params(&test_params(1))));
        assert!(cache.contains(&CacheKey::from_params(&test_params(2))));
        assert!(cache.contains(&CacheKey::from_params(&test_params(3))));
    }

    #[test]
    fn zoom_and_rotation_key_distinct_entries() {
        let mut cache = PageCache::new(10);

        let base = test_params(1);
        let mut zoomed = base;
        zoomed.zoom_percent = 140;
        let mut rotated = base;
        rotated.rotation = Rotation::Clockwise90;

        cache.insert(CacheKey::from_params(&base), test_page_data(1));
        cache.insert(CacheKey::from_params(&zoomed), test_page_data(1));
        cache.insert(CacheKey::from_params(&rotated), test_page_data(1));

        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn cache_invalidate_all() {
        let mut cache = PageCache::new(10);

        for page in 1..=5 {
            let key = CacheKey::from_params(&test_params(page));
            cache.insert(key, test_page_data(page));
        }

        assert_eq!(cache.len(), 5);
        cache.invalidate_all();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let cache = PageCache::new(0);
        assert_eq!(cache.capacity(), 1);
    }
}
