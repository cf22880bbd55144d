// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! LRU cache for derived addresses.
//!
//! Wallet records never change once created, so a `(user, index)` entry is
//! valid forever and needs no TTL or invalidation.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use crate::hd::{Address, AddressIndex};

type CacheKey = (String, AddressIndex);

/// In-process LRU cache of `(user_id, index) → address`.
pub struct AddressCache {
    cache: Option<Mutex<LruCache<CacheKey, Address>>>,
}

impl AddressCache {
    /// A capacity of zero disables caching.
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn get(&self, user_id: &str, index: AddressIndex) -> Option<Address> {
        let mut cache = self.cache.as_ref()?.lock().ok()?;
        cache.get(&(user_id.to_string(), index)).cloned()
    }

    pub fn put(&self, user_id: &str, index: AddressIndex, address: Address) {
        if let Some(Ok(mut cache)) = self.cache.as_ref().map(Mutex::lock) {
            cache.put((user_id.to_string(), index), address);
        }
    }

    pub fn len(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|c| c.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(fill: char) -> Address {
        Address::parse(&format!("0x{}", fill.to_string().repeat(40))).unwrap()
    }

    fn idx(i: u32) -> AddressIndex {
        AddressIndex::new(i).unwrap()
    }

    #[test]
    fn put_and_get() {
        let cache = AddressCache::new(10);
        assert!(cache.get("u1", idx(0)).is_none());

        cache.put("u1", idx(0), addr('a'));
        assert_eq!(cache.get("u1", idx(0)), Some(addr('a')));
        assert!(cache.get("u1", idx(1)).is_none());
        assert!(cache.get("u2", idx(0)).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = AddressCache::new(2);
        cache.put("u1", idx(0), addr('1'));
        cache.put("u1", idx(1), addr('2'));

        // Touch index 0 so index 1 is the eviction candidate.
        assert!(cache.get("u1", idx(0)).is_some());
        cache.put("u1", idx(2), addr('3'));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("u1", idx(0)).is_some());
        assert!(cache.get("u1", idx(1)).is_none());
        assert!(cache.get("u1", idx(2)).is_some());
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let cache = AddressCache::new(0);
        cache.put("u1", idx(0), addr('a'));
        assert!(cache.get("u1", idx(0)).is_none());
        assert!(cache.is_empty());
    }
}
