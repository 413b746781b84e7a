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

//! Reqwest-based HTTP client implementation for cosgrant.
//!
//! This crate provides `ReqwestHttpSend`, an HTTP client that implements
//! the `HttpSend` trait from `cosgrant_core` using the popular reqwest library.
//!
//! ## Example
//!
//! ```no_run
//! use cosgrant_core::Context;
//! use cosgrant_http_send_reqwest::ReqwestHttpSend;
//!
//! # fn example() -> cosgrant_core::Result<()> {
//! // Plain client
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::default());
//!
//! // Route the federation calls through an outbound proxy
//! let ctx = Context::new().with_http_send(ReqwestHttpSend::with_proxy("http://10.0.0.1:3128")?);
//! # Ok(())
//! # }
//! ```
//!
//! Certificate verification is always enabled. Pass a custom
//! [`reqwest::Client`] to [`ReqwestHttpSend::new`] if you need other
//! transport settings.

use async_trait::async_trait;
use bytes::Bytes;
use cosgrant_core::{Error, HttpSend, Result};
use http_body_util::BodyExt;
use log::debug;
use reqwest::{Client, Proxy, Request};

/// Reqwest-based implementation of the `HttpSend` trait.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a new ReqwestHttpSend sending every request through `proxy`.
    pub fn with_proxy(proxy: &str) -> Result<Self> {
        let proxy = Proxy::all(proxy).map_err(|e| {
            Error::config_invalid(format!("invalid proxy url: {proxy}")).with_source(e)
        })?;
        let client = Client::builder()
            .proxy(proxy)
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::unexpected("failed to convert request").with_source(e))?;
        debug!("sending {} {}", req.method(), req.url().host_str().unwrap_or_default());

        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::network("failed to send http request").with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::network("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
