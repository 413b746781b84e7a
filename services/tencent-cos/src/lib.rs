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

//! Tencent COS temporary credentials and request signing.
//!
//! [`CredentialBroker`] exchanges a long-lived key pair for a temporary
//! credential scoped to one bucket and prefix, caches it, and signs storage
//! operations with it:
//!
//! ```no_run
//! use cosgrant_core::{Context, Result};
//! use cosgrant_tencent_cos::{Config, CredentialBroker};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let config = Config::from_env(&ctx);
//! let broker = CredentialBroker::new(ctx, config)?;
//!
//! let bundle = broker.authorize_upload().await?;
//! println!("{}", serde_json::to_string(&bundle)?);
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

mod broker;
pub use broker::AuthorizationBundle;
pub use broker::CredentialBroker;

pub mod canonical;

mod config;
pub use config::Config;

mod constants;
pub use constants::{CACHE_KEY, SAFETY_MARGIN, SIGNATURE_VALIDITY};

mod credential;
pub use credential::TemporaryCredential;

pub mod policy;

mod provide_credential;
pub use provide_credential::FederationTokenCredentialProvider;

mod sign_request;
pub use sign_request::RequestSigner;
pub use sign_request::SigningContext;
