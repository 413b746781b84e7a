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

use crate::canonical::{canonical_header_string, canonical_query_param_string};
use crate::constants::SIGNATURE_VALIDITY;
use crate::TemporaryCredential;
use cosgrant_core::hash::{hex_hmac_sha1, hex_sha1};
use cosgrant_core::time::{now, DateTime};
use cosgrant_core::{Error, Result};
use log::debug;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// SigningContext describes one storage operation to authorize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    /// HTTP method of the operation.
    pub method: http::Method,
    /// Object path as it appears in the request URL, e.g. `/exampleobject.txt`.
    ///
    /// COS verifies signatures over the decoded path, so the path is
    /// percent-decoded once before signing. A key containing a literal `%`
    /// must be passed encoded: `a%20b` becomes `/a%2520b`.
    pub path: String,
    /// Query parameters that will be sent.
    pub query: HashMap<String, String>,
    /// Headers that will be sent.
    pub headers: HashMap<String, String>,
}

impl SigningContext {
    /// Create a context for `method` on `path` without query or headers.
    pub fn new(method: http::Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
        }
    }

    /// `POST /`, the form upload to the bucket root.
    pub fn upload() -> Self {
        Self::new(http::Method::POST, "/")
    }

    /// Add a query parameter.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// RequestSigner computes the `Authorization` value of a storage request.
///
/// Signing is pure: no I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Sign `op` with `cred`.
    ///
    /// The signature is valid for 10 minutes, starting one second before now.
    pub fn sign(&self, cred: &TemporaryCredential, op: &SigningContext) -> Result<String> {
        let missing = [
            ("tmp_secret_id", cred.tmp_secret_id.is_empty()),
            ("tmp_secret_key", cred.tmp_secret_key.is_empty()),
            ("session_token", cred.session_token.is_empty()),
        ]
        .iter()
        .filter_map(|&(k, v)| if v { Some(k) } else { None })
        .collect::<Vec<_>>()
        .join(", ");
        if !missing.is_empty() {
            return Err(Error::credential_invalid(format!(
                "sign request: credential is missing [{missing}]"
            )));
        }

        let now = self.time.unwrap_or_else(now);
        let start = now.timestamp() - 1;
        let end = start + SIGNATURE_VALIDITY.as_secs() as i64;
        let key_time = format!("{start};{end}");

        let sign_key = hex_hmac_sha1(cred.tmp_secret_key.as_bytes(), key_time.as_bytes());

        let params = canonical_query_param_string(&op.query);
        debug!("param list: {}", params.list);
        debug!("param string: {}", params.string);
        let headers = canonical_header_string(&op.headers);
        debug!("header list: {}", headers.list);
        debug!("header string: {}", headers.string);

        let mut http_string = String::new();
        http_string.push_str(&op.method.as_str().to_ascii_lowercase());
        http_string.push('\n');
        http_string.push_str(&normalize_path(&op.path));
        http_string.push('\n');
        http_string.push_str(&params.string);
        http_string.push('\n');
        http_string.push_str(&headers.string);
        http_string.push('\n');
        debug!("http string: {http_string}");

        let mut string_to_sign = String::new();
        string_to_sign.push_str("sha1");
        string_to_sign.push('\n');
        string_to_sign.push_str(&key_time);
        string_to_sign.push('\n');
        string_to_sign.push_str(&hex_sha1(http_string.as_bytes()));
        string_to_sign.push('\n');
        debug!("string_to_sign: {string_to_sign}");

        let signature = hex_hmac_sha1(sign_key.as_bytes(), string_to_sign.as_bytes());

        Ok(format!(
            "q-sign-algorithm=sha1&q-ak={}&q-sign-time={key_time}&q-key-time={key_time}&q-header-list={}&q-url-param-list={}&q-signature={signature}",
            cred.tmp_secret_id, headers.list, params.list
        ))
    }
}

/// Decode the path and make sure it starts with `/`.
fn normalize_path(path: &str) -> String {
    let path = percent_decode_str(path).decode_utf8_lossy();
    if path.starts_with('/') {
        path.into_owned()
    } else {
        format!("/{path}")
    }
}
