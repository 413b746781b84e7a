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

use crate::constants::*;
use cosgrant_core::utils::Redact;
use cosgrant_core::{Context, Error, Result};
use std::fmt::{Debug, Formatter};

/// Config for the Tencent COS credential broker.
#[derive(Clone, Default)]
pub struct Config {
    /// Long-lived secret id used to request temporary credentials
    pub secret_id: Option<String>,
    /// Long-lived secret key used to request temporary credentials
    pub secret_key: Option<String>,
    /// Bucket in the form `<name>-<appid>`, for example `examplebucket-1250000000`
    pub bucket: Option<String>,
    /// Region of the bucket, for example `ap-guangzhou`
    pub region: Option<String>,
    /// Objects temporary credentials may touch: `*`, `dir/*` or an exact key.
    ///
    /// Defaults to `*`.
    pub allow_prefix: Option<String>,
    /// Outbound proxy for calls to the federation endpoint
    pub proxy: Option<String>,
    /// Federation token endpoint, defaults to `https://sts.api.qcloud.com/v2/index.php`
    pub sts_endpoint: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("secret_id", &Redact::from(&self.secret_id))
            .field("secret_key", &Redact::from(&self.secret_key))
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("allow_prefix", &self.allow_prefix)
            .field("proxy", &self.proxy)
            .field("sts_endpoint", &self.sts_endpoint)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    pub fn from_env(ctx: &Context) -> Self {
        Self {
            secret_id: ctx
                .env_var(TENCENTCLOUD_SECRET_ID)
                .or_else(|| ctx.env_var(TKE_SECRET_ID)),
            secret_key: ctx
                .env_var(TENCENTCLOUD_SECRET_KEY)
                .or_else(|| ctx.env_var(TKE_SECRET_KEY)),
            bucket: ctx.env_var(TENCENTCLOUD_COS_BUCKET),
            region: ctx
                .env_var(TENCENTCLOUD_REGION)
                .or_else(|| ctx.env_var(TKE_REGION)),
            allow_prefix: ctx.env_var(TENCENTCLOUD_COS_ALLOW_PREFIX),
            proxy: ctx.env_var(TENCENTCLOUD_COS_PROXY),
            sts_endpoint: None,
        }
    }

    /// Use this key pair instead of the configured one.
    pub fn with_secret(mut self, secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        self.secret_id = Some(secret_id.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Check that everything needed to issue credentials is present.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("secret_id", is_blank(&self.secret_id)),
            ("secret_key", is_blank(&self.secret_key)),
            ("bucket", is_blank(&self.bucket)),
            ("region", is_blank(&self.region)),
        ]
        .iter()
        .filter_map(|&(k, v)| if v { Some(k) } else { None })
        .collect::<Vec<_>>()
        .join(", ");

        if !missing.is_empty() {
            return Err(Error::config_invalid(format!(
                "config is not complete: [{missing}] is missing"
            )));
        }

        split_bucket(self.bucket()?)?;
        Ok(())
    }

    /// The configured secret id.
    pub fn secret_id(&self) -> Result<&str> {
        required(&self.secret_id, "secret_id")
    }

    /// The configured secret key.
    pub fn secret_key(&self) -> Result<&str> {
        required(&self.secret_key, "secret_key")
    }

    /// The configured bucket.
    pub fn bucket(&self) -> Result<&str> {
        required(&self.bucket, "bucket")
    }

    /// The configured region.
    pub fn region(&self) -> Result<&str> {
        required(&self.region, "region")
    }

    /// The configured allow prefix, `*` if unset.
    pub fn allow_prefix(&self) -> &str {
        self.allow_prefix
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_ALLOW_PREFIX)
    }

    /// The federation token endpoint.
    pub fn sts_endpoint(&self) -> &str {
        self.sts_endpoint
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(FEDERATION_ENDPOINT)
    }

    /// The storage origin of the bucket, e.g.
    /// `https://examplebucket-1250000000.cos.ap-guangzhou.myqcloud.com`.
    pub fn endpoint(&self) -> Result<String> {
        Ok(format!(
            "https://{}.cos.{}.myqcloud.com",
            self.bucket()?,
            self.region()?
        ))
    }
}

/// Split `<name>-<appid>` into its short name and app id.
///
/// The app id follows the last `-`, the name may contain `-` itself.
pub(crate) fn split_bucket(bucket: &str) -> Result<(&str, &str)> {
    match bucket.rsplit_once('-') {
        Some((name, app_id))
            if !name.is_empty()
                && !app_id.is_empty()
                && app_id.bytes().all(|b| b.is_ascii_digit()) =>
        {
            Ok((name, app_id))
        }
        _ => Err(Error::config_invalid(format!(
            "bucket {bucket} is not in the form <name>-<appid>"
        ))),
    }
}

fn is_blank(v: &Option<String>) -> bool {
    v.as_deref().map_or(true, str::is_empty)
}

fn required<'a>(v: &'a Option<String>, name: &str) -> Result<&'a str> {
    match v.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::config_invalid(format!("{name} is not configured"))),
    }
}
