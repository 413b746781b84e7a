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
use chrono::TimeDelta;
use cosgrant_cache_store_memory::MemoryCacheStore;
use cosgrant_core::time::now;
use cosgrant_core::{Context, ProvideCredential, Result};
use cosgrant_tencent_cos::canonical::canonical_header_string;
use cosgrant_tencent_cos::{
    Config, CredentialBroker, RequestSigner, SigningContext, TemporaryCredential,
};
use criterion::criterion_group;
use criterion::criterion_main;
use criterion::Criterion;

criterion_group!(benches, bench);
criterion_main!(benches);

#[derive(Debug)]
struct FixedCredentialProvider(TemporaryCredential);

#[async_trait]
impl ProvideCredential for FixedCredentialProvider {
    type Credential = TemporaryCredential;

    async fn provide_credential(&self, _: &Context) -> Result<Self::Credential> {
        Ok(self.0.clone())
    }
}

fn credential() -> TemporaryCredential {
    let now = now();
    TemporaryCredential {
        tmp_secret_id: "tmp_secret_id".to_string(),
        tmp_secret_key: "tmp_secret_key".to_string(),
        session_token: "session_token".to_string(),
        issued_at: now,
        expires_at: now + TimeDelta::try_hours(2).expect("in bounds"),
    }
}

fn operation() -> SigningContext {
    SigningContext::new(http::Method::PUT, "/uploads/hello.txt")
        .with_query("versionId", "1")
        .with_header("Host", "examplebucket-1250000000.cos.ap-guangzhou.myqcloud.com")
        .with_header("Content-Type", "text/plain")
        .with_header("Content-Length", "11")
}

pub fn bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("tencent_cos");

    group.bench_function("canonical_header_string", |b| {
        let op = operation();
        b.iter(|| canonical_header_string(&op.headers))
    });

    group.bench_function("request_signer", |b| {
        let signer = RequestSigner::new();
        let cred = credential();
        let op = operation();
        b.iter(|| signer.sign(&cred, &op).expect("must success"))
    });

    group.bench_function("broker_cached", |b| {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("must success");

        let ctx = Context::new().with_cache_store(MemoryCacheStore::default());
        let config = Config {
            secret_id: Some("secret_id".to_string()),
            secret_key: Some("secret_key".to_string()),
            bucket: Some("examplebucket-1250000000".to_string()),
            region: Some("ap-guangzhou".to_string()),
            ..Default::default()
        };
        let broker = CredentialBroker::new(ctx, config)
            .expect("config must be valid")
            .with_provider(FixedCredentialProvider(credential()));
        let op = operation();

        b.to_async(&runtime)
            .iter(|| async { broker.authorize(&op).await.expect("must success") })
    });

    group.finish();
}
