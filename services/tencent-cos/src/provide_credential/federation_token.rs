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

use crate::canonical::canonical_query_string;
use crate::constants::*;
use crate::policy::AccessPolicy;
use crate::{Config, TemporaryCredential};
use async_trait::async_trait;
use bytes::Bytes;
use cosgrant_core::hash::base64_hmac_sha1;
use cosgrant_core::time::{format_rfc3339, from_timestamp, now, DateTime};
use cosgrant_core::utils::Redact;
use cosgrant_core::{Context, Error, ProvideCredential, Result};
use log::debug;
use percent_encoding::percent_decode_str;
use rand::Rng;
use serde::Deserialize;
use std::sync::Arc;

/// FederationTokenCredentialProvider exchanges the long-lived key pair
/// for a temporary credential via `GetFederationToken`.
///
/// Every exchange carries a freshly built [`AccessPolicy`] that limits the
/// credential to the configured bucket and allow prefix.
#[derive(Debug, Clone)]
pub struct FederationTokenCredentialProvider {
    config: Arc<Config>,
    endpoint: Option<String>,
    time: Option<DateTime>,
    nonce: Option<u32>,
}

impl FederationTokenCredentialProvider {
    /// Create a new provider from config.
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            endpoint: None,
            time: None,
            nonce: None,
        }
    }

    /// Send requests to this endpoint instead of the configured one.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Specify the request time.
    ///
    /// # Note
    ///
    /// We should always take current time to request credentials.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce instead of picking a random one.
    ///
    /// Only use this function for testing.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = Some(nonce);
        self
    }

    fn endpoint(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or_else(|| self.config.sts_endpoint())
    }

    /// Build the signed `GetFederationToken` request.
    fn build_request(&self, now: DateTime) -> Result<http::Request<Bytes>> {
        let endpoint = self.endpoint();
        let uri: http::Uri = endpoint.parse()?;
        let host = uri
            .host()
            .ok_or_else(|| Error::config_invalid(format!("endpoint {endpoint} has no host")))?;

        let policy = AccessPolicy::build(
            self.config.bucket()?,
            self.config.region()?,
            self.config.allow_prefix(),
        )?
        .to_json()?;
        debug!("federation policy: {policy}");

        let nonce = self.nonce.unwrap_or_else(|| {
            rand::thread_rng().gen_range(FEDERATION_NONCE_MIN..=FEDERATION_NONCE_MAX)
        });
        let mut params = vec![
            ("Action", FEDERATION_ACTION.to_string()),
            ("Nonce", nonce.to_string()),
            ("Region", String::new()),
            ("SecretId", self.config.secret_id()?.to_string()),
            // One second back so the server never sees a timestamp from its future.
            ("Timestamp", (now.timestamp() - 1).to_string()),
            ("durationSeconds", FEDERATION_DURATION_SECONDS.to_string()),
            ("name", FEDERATION_PRODUCT_NAME.to_string()),
            ("policy", form_urlencoded::byte_serialize(policy.as_bytes()).collect()),
        ];

        let signature = build_signature(
            http::Method::GET,
            host,
            uri.path(),
            &canonical_query_string(params.iter().map(|(k, v)| (*k, v.as_str()))),
            self.config.secret_key()?,
        );
        params.push((
            "Signature",
            form_urlencoded::byte_serialize(signature.as_bytes()).collect(),
        ));

        let url = format!(
            "{}?{}",
            endpoint,
            canonical_query_string(params.iter().map(|(k, v)| (*k, v.as_str())))
        );
        Ok(http::Request::builder()
            .method(http::Method::GET)
            .uri(url)
            .body(Bytes::new())?)
    }
}

#[async_trait]
impl ProvideCredential for FederationTokenCredentialProvider {
    type Credential = TemporaryCredential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Self::Credential> {
        let now = self.time.unwrap_or_else(now);
        let req = self.build_request(now)?;
        debug!(
            "requesting federation token for {:?} from {}",
            Redact::from(&self.config.secret_id),
            self.endpoint()
        );

        let resp = ctx.http_send(req).await?;
        let status = resp.status();
        let body = resp.into_body();

        if !status.is_success() {
            return Err(Error::federation_protocol(format!(
                "federation endpoint returned status {status}: {}",
                String::from_utf8_lossy(&body)
            )));
        }

        let resp: FederationTokenResponse = serde_json::from_slice(&body).map_err(|err| {
            Error::federation_protocol("federation endpoint returned unparsable body")
                .with_source(err)
        })?;
        if resp.code != 0 {
            return Err(Error::federation_protocol(format!(
                "federation endpoint returned code {}: {}",
                resp.code, resp.message
            )));
        }
        let data = resp.data.ok_or_else(|| {
            Error::federation_protocol("federation endpoint response has no data")
        })?;

        let expired_time = data
            .expired_time
            .filter(|v| *v > 0)
            .ok_or_else(|| {
                Error::federation_protocol("federation endpoint response has no expiredTime")
            })?;
        let cred = TemporaryCredential {
            tmp_secret_id: data.credentials.tmp_secret_id,
            tmp_secret_key: data.credentials.tmp_secret_key,
            session_token: data.credentials.session_token,
            issued_at: now,
            expires_at: from_timestamp(expired_time).map_err(|err| {
                Error::federation_protocol("federation endpoint returned invalid expiredTime")
                    .with_source(err)
            })?,
        };
        if cred.tmp_secret_id.is_empty()
            || cred.tmp_secret_key.is_empty()
            || cred.session_token.is_empty()
        {
            return Err(Error::federation_protocol(
                "federation endpoint response has incomplete credentials",
            ));
        }
        if cred.expires_at <= now {
            return Err(Error::credential_expired_on_issue(format!(
                "federation endpoint issued a credential that expired at {}",
                format_rfc3339(cred.expires_at)
            )));
        }

        debug!("federation token issued: {cred:?}");
        Ok(cred)
    }
}

/// Sign `method + host + path + "?" + query` after URL-decoding it once.
///
/// The digest is base64 encoded rather than hex encoded.
fn build_signature(
    method: http::Method,
    host: &str,
    path: &str,
    canonical_query: &str,
    secret_key: &str,
) -> String {
    let raw = format!("{}{host}{path}?{canonical_query}", method.as_str());
    let string_to_sign = percent_decode_str(&raw.replace('+', " "))
        .decode_utf8_lossy()
        .into_owned();
    debug!("federation string to sign: {string_to_sign}");

    base64_hmac_sha1(secret_key.as_bytes(), string_to_sign.as_bytes())
}

#[derive(Default, Debug, Deserialize)]
#[serde(default)]
struct FederationTokenResponse {
    code: i64,
    message: String,
    data: Option<FederationTokenData>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FederationTokenData {
    credentials: FederationTokenCredentials,
    expired_time: Option<i64>,
}

#[derive(Default, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FederationTokenCredentials {
    tmp_secret_id: String,
    tmp_secret_key: String,
    session_token: String,
}
