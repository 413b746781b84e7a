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

use crate::constants::{CACHE_KEY, SAFETY_MARGIN};
use crate::{Config, FederationTokenCredentialProvider, RequestSigner, SigningContext};
use crate::TemporaryCredential;
use chrono::TimeDelta;
use cosgrant_core::utils::Redact;
use cosgrant_core::{Context, CredentialCache, Error, ProvideCredential, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Everything a remote uploader needs to talk to the bucket directly.
///
/// Serializes as `{"Authorization", "XCosSecurityToken", "bucket", "region"}`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationBundle {
    /// Value of the `Authorization` header.
    #[serde(rename = "Authorization")]
    pub authorization: String,
    /// Value of the `x-cos-security-token` header.
    #[serde(rename = "XCosSecurityToken")]
    pub security_token: String,
    /// Bucket the request targets.
    pub bucket: String,
    /// Region of the bucket.
    pub region: String,
}

impl Debug for AuthorizationBundle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationBundle")
            .field("authorization", &Redact::from(&self.authorization))
            .field("security_token", &Redact::from(&self.security_token))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .finish()
    }
}

type CredentialProvider = Arc<dyn ProvideCredential<Credential = TemporaryCredential>>;

/// CredentialBroker hands out signed authorizations backed by a cached
/// temporary credential.
///
/// Cheap to clone; clones share the credential cache.
#[derive(Clone)]
pub struct CredentialBroker {
    ctx: Context,
    config: Arc<Config>,
    provider: CredentialProvider,
    signer: RequestSigner,
    cache: CredentialCache<TemporaryCredential>,
}

impl Debug for CredentialBroker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialBroker")
            .field("config", &self.config)
            .field("provider", &self.provider)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl CredentialBroker {
    /// Create a broker, failing fast if `config` is incomplete.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        config.validate()?;

        let config = Arc::new(config);
        let margin = TimeDelta::from_std(SAFETY_MARGIN).map_err(|err| {
            Error::unexpected("safety margin is out of range").with_source(err)
        })?;
        Ok(Self {
            ctx,
            provider: Arc::new(FederationTokenCredentialProvider::new(config.clone())),
            config,
            signer: RequestSigner::new(),
            cache: CredentialCache::new(CACHE_KEY).with_safety_margin(margin),
        })
    }

    /// Replace the credential provider.
    pub fn with_provider(
        mut self,
        provider: impl ProvideCredential<Credential = TemporaryCredential>,
    ) -> Self {
        self.provider = Arc::new(provider);
        self
    }

    /// Replace the request signer.
    pub fn with_request_signer(mut self, signer: RequestSigner) -> Self {
        self.signer = signer;
        self
    }

    /// The validated config of this broker.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Authorize `op` against the configured bucket.
    ///
    /// Credential failures are returned as is.
    pub async fn authorize(&self, op: &SigningContext) -> Result<AuthorizationBundle> {
        let provider = self.provider.clone();
        let ctx = self.ctx.clone();
        let cred = self
            .cache
            .get_or_fetch(&self.ctx, move || async move {
                provider.provide_credential(&ctx).await
            })
            .await?;

        let authorization = self.signer.sign(&cred, op)?;
        debug!("authorized {} {}", op.method, op.path);

        Ok(AuthorizationBundle {
            authorization,
            security_token: cred.session_token.clone(),
            bucket: self.config.bucket()?.to_string(),
            region: self.config.region()?.to_string(),
        })
    }

    /// Authorize a form upload, `POST /`.
    pub async fn authorize_upload(&self) -> Result<AuthorizationBundle> {
        self.authorize(&SigningContext::upload()).await
    }
}
