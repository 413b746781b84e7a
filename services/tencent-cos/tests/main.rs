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

use async_trait::async_trait;
use bytes::Bytes;
use chrono::TimeDelta;
use cosgrant_cache_store_memory::MemoryCacheStore;
use cosgrant_core::time::{from_timestamp, now};
use cosgrant_core::{CacheStore, Context, Error, ErrorKind, HttpSend, OsEnv, Result, StaticEnv};
use cosgrant_http_send_reqwest::ReqwestHttpSend;
use cosgrant_tencent_cos::{
    Config, CredentialBroker, RequestSigner, SigningContext, TemporaryCredential, CACHE_KEY,
};
use http::StatusCode;
use log::{debug, warn};
use pretty_assertions::assert_eq;
use std::collections::{HashMap, VecDeque};
use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// HttpSend answering federation requests from a script, in order.
#[derive(Debug, Clone, Default)]
struct ScriptedHttpSend {
    responses: Arc<Mutex<VecDeque<(StatusCode, String)>>>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
}

impl ScriptedHttpSend {
    fn new(responses: impl IntoIterator<Item = (StatusCode, String)>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into_iter().collect())),
            ..Default::default()
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HttpSend for ScriptedHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("scripted federation request: {}", req.uri());
        tokio::time::sleep(self.delay).await;

        let next = self.responses.lock().unwrap().pop_front();
        let (status, body) = next.ok_or_else(|| Error::network("connection refused"))?;
        Ok(http::Response::builder()
            .status(status)
            .body(Bytes::from(body))?)
    }
}

fn federation_ok(expires_in: TimeDelta) -> (StatusCode, String) {
    let expired_time = (now() + expires_in).timestamp();
    (
        StatusCode::OK,
        format!(
            r#"{{"code":0,"message":"","data":{{"credentials":{{"sessionToken":"token-{expired_time}","tmpSecretId":"AKIDtmpid","tmpSecretKey":"tmpkey"}},"expiredTime":{expired_time}}}}}"#
        ),
    )
}

fn two_hours() -> TimeDelta {
    TimeDelta::try_hours(2).unwrap()
}

fn test_config() -> Config {
    Config {
        secret_id: Some("AKIDEXAMPLE".to_string()),
        secret_key: Some("secretkey".to_string()),
        bucket: Some("examplebucket-1250000000".to_string()),
        region: Some("ap-guangzhou".to_string()),
        allow_prefix: Some("uploads/*".to_string()),
        ..Default::default()
    }
}

fn test_broker(http: &ScriptedHttpSend, store: &MemoryCacheStore) -> CredentialBroker {
    let _ = env_logger::builder().is_test(true).try_init();
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_cache_store(store.clone());
    CredentialBroker::new(ctx, test_config()).expect("config must be valid")
}

#[tokio::test]
async fn test_authorize_upload() -> Result<()> {
    let http = ScriptedHttpSend::new([federation_ok(two_hours())]);
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let bundle = broker.authorize_upload().await?;
    assert!(bundle
        .authorization
        .starts_with("q-sign-algorithm=sha1&q-ak=AKIDtmpid&q-sign-time="));
    assert!(bundle
        .authorization
        .contains("&q-header-list=&q-url-param-list=&q-signature="));
    assert!(bundle.security_token.starts_with("token-"));
    assert_eq!(bundle.bucket, "examplebucket-1250000000");
    assert_eq!(bundle.region, "ap-guangzhou");

    // The credential is kept in the store for the next caller.
    let cached: TemporaryCredential =
        serde_json::from_slice(&store.get(CACHE_KEY).await?.expect("must be cached"))?;
    assert_eq!(cached.session_token, bundle.security_token);

    broker.authorize_upload().await?;
    assert_eq!(http.calls(), 1);
    Ok(())
}

#[tokio::test]
async fn test_authorize_matches_request_signer() -> Result<()> {
    let http = ScriptedHttpSend::new([federation_ok(two_hours())]);
    let store = MemoryCacheStore::default();
    let signer = RequestSigner::new().with_time(from_timestamp(1_700_000_000)?);
    let broker = test_broker(&http, &store).with_request_signer(signer.clone());

    let op = SigningContext::new(http::Method::PUT, "/uploads/a.txt")
        .with_header("Content-Type", "text/plain")
        .with_query("versionId", "1");
    let bundle = broker.authorize(&op).await?;

    let cred: TemporaryCredential =
        serde_json::from_slice(&store.get(CACHE_KEY).await?.expect("must be cached"))?;
    assert_eq!(bundle.authorization, signer.sign(&cred, &op)?);
    assert!(bundle
        .authorization
        .contains("&q-header-list=content-type&q-url-param-list=versionid&"));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_authorize_fetches_once() -> Result<()> {
    let http = ScriptedHttpSend::new([federation_ok(two_hours())])
        .with_delay(Duration::from_millis(200));
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let mut handles = Vec::new();
    for i in 0..32 {
        let broker = broker.clone();
        handles.push(tokio::spawn(async move {
            let op = SigningContext::new(http::Method::GET, format!("/uploads/{i}.txt"));
            broker.authorize(&op).await
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.expect("task must not panic")?.security_token);
    }

    assert_eq!(http.calls(), 1);
    assert!(tokens.iter().all(|v| v == &tokens[0]));
    Ok(())
}

#[tokio::test]
async fn test_failure_is_propagated_and_not_cached() -> Result<()> {
    let http = ScriptedHttpSend::new([
        (StatusCode::OK, r#"{"code":0,"message":""}"#.to_string()),
        federation_ok(two_hours()),
    ]);
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let err = broker.authorize_upload().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::FederationProtocol);
    assert!(store.get(CACHE_KEY).await?.is_none());

    broker.authorize_upload().await?;
    assert_eq!(http.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_network_failure_is_retryable() -> Result<()> {
    let http = ScriptedHttpSend::default();
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let err = broker.authorize_upload().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert!(err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_expired_on_issue_leaves_cache_empty() -> Result<()> {
    let http = ScriptedHttpSend::new([
        federation_ok(TimeDelta::try_seconds(-10).unwrap()),
        federation_ok(two_hours()),
    ]);
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let err = broker.authorize_upload().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialExpiredOnIssue);
    assert!(store.get(CACHE_KEY).await?.is_none());

    // The next call retries instead of serving the rejected credential.
    broker.authorize_upload().await?;
    assert_eq!(http.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_credential_inside_safety_margin_is_not_cached() -> Result<()> {
    let http = ScriptedHttpSend::new([
        federation_ok(TimeDelta::try_minutes(4).unwrap()),
        federation_ok(two_hours()),
    ]);
    let store = MemoryCacheStore::default();
    let broker = test_broker(&http, &store);

    let first = broker.authorize_upload().await?;
    assert!(store.get(CACHE_KEY).await?.is_none());

    let second = broker.authorize_upload().await?;
    assert_ne!(first.security_token, second.security_token);
    assert_eq!(http.calls(), 2);
    Ok(())
}

#[tokio::test]
async fn test_broker_from_env() -> Result<()> {
    let http = ScriptedHttpSend::new([federation_ok(two_hours())]);
    let ctx = Context::new()
        .with_http_send(http.clone())
        .with_cache_store(MemoryCacheStore::default())
        .with_env(StaticEnv {
            envs: HashMap::from([
                ("TENCENTCLOUD_SECRET_ID".to_string(), "AKIDEXAMPLE".to_string()),
                ("TENCENTCLOUD_SECRET_KEY".to_string(), "secretkey".to_string()),
                ("TENCENTCLOUD_REGION".to_string(), "ap-beijing".to_string()),
                ("TENCENTCLOUD_COS_BUCKET".to_string(), "b-1250000000".to_string()),
            ]),
        });

    let config = Config::from_env(&ctx);
    let bundle = CredentialBroker::new(ctx, config)?.authorize_upload().await?;
    assert_eq!(bundle.bucket, "b-1250000000");
    assert_eq!(bundle.region, "ap-beijing");
    Ok(())
}

#[tokio::test]
async fn test_live_head_object() -> anyhow::Result<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();
    if env::var("COSGRANT_TENCENT_COS_TEST").unwrap_or_default() != "on" {
        warn!("COSGRANT_TENCENT_COS_TEST is not set, skipped");
        return Ok(());
    }

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::from_env(&ctx);
    let http = match config.proxy.as_deref() {
        Some(proxy) => ReqwestHttpSend::with_proxy(proxy)?,
        None => ReqwestHttpSend::default(),
    };
    let ctx = ctx
        .with_http_send(http)
        .with_cache_store(MemoryCacheStore::default());
    let endpoint = config.endpoint()?;
    let broker = CredentialBroker::new(ctx.clone(), config)?;

    let bundle = broker
        .authorize(&SigningContext::new(http::Method::HEAD, "/not_exist_file"))
        .await?;
    debug!("authorized: {bundle:?}");

    let req = http::Request::builder()
        .method(http::Method::HEAD)
        .uri(format!("{endpoint}/not_exist_file"))
        .header(http::header::AUTHORIZATION, &bundle.authorization)
        .header("x-cos-security-token", &bundle.security_token)
        .body(Bytes::new())?;
    let resp = ctx.http_send(req).await?;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    Ok(())
}
