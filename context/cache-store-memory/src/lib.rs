// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! In-memory cache store implementation for cosgrant.
//!
//! This crate provides `MemoryCacheStore`, a process local key-value store
//! that implements the `CacheStore` trait from `cosgrant_core`.
//!
//! ## Overview
//!
//! Every entry carries its own deadline. Expired entries are never returned
//! and are dropped the next time they are looked up. The store is cheap to
//! clone; clones share the same entries.
//!
//! ## Example
//!
//! ```no_run
//! use cosgrant_core::Context;
//! use cosgrant_cache_store_memory::MemoryCacheStore;
//!
//! let ctx = Context::new().with_cache_store(MemoryCacheStore::default());
//! ```
//!
//! State resets when the process restarts. Use a shared store (for example
//! one backed by Redis) if several processes should reuse one credential.

use async_trait::async_trait;
use bytes::Bytes;
use cosgrant_core::{CacheStore, Result};
use log::debug;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Clone)]
struct Entry {
    value: Bytes,
    deadline: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now < deadline,
            None => true,
        }
    }
}

/// Process local implementation of the `CacheStore` trait.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl Debug for MemoryCacheStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Values may hold credentials, only show how many there are.
        f.debug_struct("MemoryCacheStore")
            .field("entries", &self.lock().len())
            .finish()
    }
}

impl MemoryCacheStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // Entries stay consistent even if a holder panicked, keep serving them.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        let mut entries = self.lock();
        let now = Instant::now();

        match entries.get(key) {
            Some(entry) if entry.is_live(now) => return Ok(Some(entry.value.clone())),
            Some(_) => {}
            None => return Ok(None),
        }

        debug!("cache entry {key} expired");
        entries.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes, ttl: Duration) -> Result<()> {
        // A ttl too large to represent never expires.
        let deadline = Instant::now().checked_add(ttl);
        self.lock()
            .insert(key.to_string(), Entry { value, deadline });
        Ok(())
    }

    async fn forget(&self, key: &str) -> Result<()> {
        self.lock().remove(key);
        Ok(())
    }
}
