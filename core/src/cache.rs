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

//! Single-flight credential cache.

use crate::time::{format_rfc3339, now};
use crate::{Context, Error, Result, SigningCredential};
use bytes::Bytes;
use chrono::TimeDelta;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};

/// Store TTL used for credentials that carry no expiry.
const UNBOUNDED_TTL: Duration = Duration::from_secs(24 * 60 * 60);

type Outcome<C> = Option<Result<Arc<C>>>;

/// CredentialCache holds at most one live credential under a cache key.
///
/// The credential itself lives in the [`CacheStore`](crate::CacheStore) of the
/// [`Context`], serialized as JSON. A credential is served while
/// `now < expires_at - safety_margin`; otherwise exactly one fetch runs and
/// every concurrent caller shares its outcome.
///
/// The fetch runs on its own task. A caller that stops waiting does not
/// cancel it, and its result still lands in the store.
pub struct CredentialCache<C> {
    key: Arc<str>,
    safety_margin: TimeDelta,
    inflight: Arc<Mutex<Option<watch::Receiver<Outcome<C>>>>>,
}

impl<C> Clone for CredentialCache<C> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            safety_margin: self.safety_margin,
            inflight: self.inflight.clone(),
        }
    }
}

impl<C> Debug for CredentialCache<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("key", &self.key)
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}

impl<C> CredentialCache<C>
where
    C: SigningCredential + Serialize + DeserializeOwned,
{
    /// Create a cache storing its credential under `key`, with a 5 minutes
    /// safety margin.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Arc::from(key.into()),
            safety_margin: TimeDelta::minutes(5),
            inflight: Arc::new(Mutex::new(None)),
        }
    }

    /// Set the time kept in reserve before a credential's expiry.
    pub fn with_safety_margin(mut self, margin: TimeDelta) -> Self {
        self.safety_margin = margin;
        self
    }

    /// The key used in the cache store.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The time kept in reserve before a credential's expiry.
    pub fn safety_margin(&self) -> TimeDelta {
        self.safety_margin
    }

    /// Return the cached credential, or fetch a new one with `fetch`.
    ///
    /// - A fresh stored credential is returned without taking any lock.
    /// - If a fetch is already running, wait for its outcome.
    /// - Otherwise start `fetch` and wait for it.
    ///
    /// A fetched credential that has already expired is never stored and
    /// is reported as [`ErrorKind::CredentialExpiredOnIssue`](crate::ErrorKind)
    /// to every waiter.
    pub async fn get_or_fetch<F, Fut>(&self, ctx: &Context, fetch: F) -> Result<Arc<C>>
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<C>> + Send + 'static,
    {
        if let Some(cred) = self.load(ctx, false).await {
            debug!("credential cache hit for {}", self.key);
            return Ok(cred);
        }

        let mut rx = {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some(rx) => {
                    debug!("credential fetch for {} in flight, waiting", self.key);
                    rx.clone()
                }
                None => {
                    // Another caller may have filled the store while we queued.
                    if let Some(cred) = self.load(ctx, true).await {
                        return Ok(cred);
                    }

                    debug!("credential cache miss for {}, fetching", self.key);
                    let (tx, rx) = watch::channel(None);
                    *inflight = Some(rx.clone());

                    let this = self.clone();
                    let ctx = ctx.clone();
                    let task = tokio::spawn(fetch());
                    tokio::spawn(async move {
                        let fetched = match task.await {
                            Ok(res) => res,
                            Err(err) => {
                                Err(Error::unexpected("credential fetch task failed")
                                    .with_source(err))
                            }
                        };
                        let outcome = this.settle(&ctx, fetched).await;
                        *this.inflight.lock().await = None;
                        // Every waiter may have given up already.
                        let _ = tx.send(Some(outcome));
                    });

                    rx
                }
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| Error::unexpected("credential fetch ended without an outcome"))?
            .clone();
        outcome.unwrap_or_else(|| Err(Error::unexpected("credential fetch ended without an outcome")))
    }

    /// Load a fresh credential from the store.
    ///
    /// Store failures are treated as a miss. With `evict`, stale or
    /// undecodable entries are removed as well.
    async fn load(&self, ctx: &Context, evict: bool) -> Option<Arc<C>> {
        let bs = match ctx.cache_get(&self.key).await {
            Ok(Some(bs)) => bs,
            Ok(None) => return None,
            Err(err) => {
                warn!("read credential {} from cache store failed: {err}", self.key);
                return None;
            }
        };

        match serde_json::from_slice::<C>(&bs) {
            Ok(cred) if cred.is_fresh(now(), self.safety_margin) => Some(Arc::new(cred)),
            Ok(cred) => {
                debug!("cached credential is stale: {cred:?}");
                if evict {
                    self.forget(ctx).await;
                }
                None
            }
            Err(err) => {
                warn!("cached credential {} is undecodable: {err}", self.key);
                if evict {
                    self.forget(ctx).await;
                }
                None
            }
        }
    }

    /// Validate a fetch outcome and store it when it's worth keeping.
    async fn settle(&self, ctx: &Context, fetched: Result<C>) -> Result<Arc<C>> {
        let cred = fetched.inspect_err(|err| warn!("fetch credential failed: {err}"))?;
        if !cred.is_valid() {
            return Err(Error::credential_invalid(
                "fetched credential is missing required fields",
            ));
        }

        let now = now();
        let ttl = match cred.expires_at() {
            Some(expires_at) if expires_at <= now => {
                self.forget(ctx).await;
                return Err(Error::credential_expired_on_issue(format!(
                    "credential was issued already expired at {}",
                    format_rfc3339(expires_at)
                )));
            }
            Some(expires_at) => (expires_at - self.safety_margin - now)
                .to_std()
                .ok()
                .filter(|ttl| !ttl.is_zero()),
            None => Some(UNBOUNDED_TTL),
        };

        match ttl {
            Some(ttl) => match serde_json::to_vec(&cred) {
                Ok(bs) => {
                    if let Err(err) = ctx.cache_set(&self.key, Bytes::from(bs), ttl).await {
                        warn!("write credential {} to cache store failed: {err}", self.key);
                    }
                }
                Err(err) => warn!("serialize credential {} failed: {err}", self.key),
            },
            None => debug!(
                "credential {} expires within the safety margin, not caching",
                self.key
            ),
        }

        Ok(Arc::new(cred))
    }

    async fn forget(&self, ctx: &Context) {
        if let Err(err) = ctx.cache_forget(&self.key).await {
            warn!("forget credential {} from cache store failed: {err}", self.key);
        }
    }
}
