// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: application owned image cache

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use super::bitmap::Bitmap;

/// Decoded images keyed by the application. Handles are shared, so an
/// image removed from the cache stays alive while a brush still holds it.
#[derive(Debug)]
pub struct ImageCache<K> {
    images: HashMap<K, Arc<Bitmap>>,
}

impl<K> Default for ImageCache<K> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> ImageCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `bitmap` under `key` and return its shared handle, replacing
    /// any previous entry.
    pub fn insert(&mut self, key: K, bitmap: Bitmap) -> Arc<Bitmap> {
        let handle = Arc::new(bitmap);
        self.images.insert(key, Arc::clone(&handle));
        handle
    }

    pub fn get(&self, key: &K) -> Option<Arc<Bitmap>> {
        self.images.get(key).cloned()
    }

    /// Return the cached handle, decoding with `load` on a miss. A failed
    /// load caches nothing.
    pub fn get_or_try_insert<E>(
        &mut self,
        key: K,
        load: impl FnOnce() -> std::result::Result<Bitmap, E>,
    ) -> std::result::Result<Arc<Bitmap>, E> {
        if let Some(handle) = self.images.get(&key) {
            return Ok(Arc::clone(handle));
        }
        let bitmap = load()?;
        Ok(self.insert(key, bitmap))
    }

    pub fn remove(&mut self, key: &K) -> Option<Arc<Bitmap>> {
        self.images.remove(key)
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handles_stay_alive() {
        let mut cache = ImageCache::new();
        let handle = cache.insert("logo", Bitmap::new(2, 2));
        assert_eq!(cache.len(), 1);
        let removed = cache.remove(&"logo").unwrap();
        assert!(cache.is_empty());
        assert!(Arc::ptr_eq(&handle, &removed));
        assert_eq!(handle.width(), 2);
    }

    #[test]
    fn load_runs_once() {
        let mut cache: ImageCache<u32> = ImageCache::new();
        let mut calls = 0;
        for _ in 0..3 {
            let r: Result<_, ()> = cache.get_or_try_insert(7, || {
                calls += 1;
                Ok(Bitmap::new(1, 1))
            });
            assert!(r.is_ok());
        }
        assert_eq!(calls, 1);
        assert!(cache.get_or_try_insert(8, || Err("missing")).is_err());
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&8).is_none());
    }
}
