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

//! Core components for issuing temporary credentials and signing requests.
//!
//! This crate provides the service-agnostic pieces of cosgrant. Service
//! crates such as `cosgrant-tencent-cos` build on top of it.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending, environment access
//!   and the cache store
//! - **Traits**: Abstract interfaces for credential fetching (`ProvideCredential`) and
//!   credential validation (`SigningCredential`)
//! - **CredentialCache**: Keeps one credential alive in the cache store and makes sure
//!   concurrent callers trigger a single fetch
//!
//! ## Example
//!
//! ```no_run
//! use cosgrant_core::time::{now, DateTime};
//! use cosgrant_core::{Context, CredentialCache, Result, SigningCredential};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct MyCredential {
//!     token: String,
//!     expires_at: DateTime,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.token.is_empty()
//!     }
//!
//!     fn expires_at(&self) -> Option<DateTime> {
//!         Some(self.expires_at)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let cache = CredentialCache::<MyCredential>::new("my-credential");
//!
//! let cred = cache
//!     .get_or_fetch(&ctx, || async {
//!         Ok(MyCredential {
//!             token: "token".to_string(),
//!             expires_at: now() + chrono::TimeDelta::try_hours(2).expect("in bounds"),
//!         })
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: SHA1 and HMAC-SHA1 helpers
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::CacheStore;
pub use context::Context;
pub use context::Env;
pub use context::HttpSend;
pub use context::NoopCacheStore;
pub use context::NoopEnv;
pub use context::NoopHttpSend;
pub use context::OsEnv;
pub use context::StaticEnv;

mod api;
pub use api::{ProvideCredential, SigningCredential};
mod cache;
pub use cache::CredentialCache;
mod error;
pub use error::{Error, ErrorKind, Result};
