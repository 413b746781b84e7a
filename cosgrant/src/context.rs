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

use cosgrant_cache_store_memory::MemoryCacheStore;
use cosgrant_core::{Context, OsEnv, Result};
use cosgrant_http_send_reqwest::ReqwestHttpSend;

/// Create a context with the default components:
///
/// - reqwest for HTTP, through `proxy` if given
/// - the OS environment
/// - an in-memory cache store
pub fn default_context(proxy: Option<&str>) -> Result<Context> {
    let http = match proxy {
        Some(proxy) => ReqwestHttpSend::with_proxy(proxy)?,
        None => ReqwestHttpSend::default(),
    };

    Ok(Context::new()
        .with_http_send(http)
        .with_env(OsEnv)
        .with_cache_store(MemoryCacheStore::default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosgrant_core::ErrorKind;

    #[test]
    fn test_default_context() {
        assert!(default_context(None).is_ok());
        assert!(default_context(Some("http://127.0.0.1:3128")).is_ok());
        assert_eq!(
            default_context(Some("ftp://127.0.0.1:21")).unwrap_err().kind(),
            ErrorKind::ConfigInvalid
        );
    }
}
