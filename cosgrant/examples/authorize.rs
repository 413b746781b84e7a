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

use anyhow::Result;
use cosgrant::tencent::{Config, CredentialBroker, SigningContext};
use cosgrant::{default_context, Context, OsEnv};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    // Load config from TENCENTCLOUD_* env vars, optionally narrowing the
    // objects the credential may touch.
    let mut config = Config::from_env(&Context::new().with_env(OsEnv));
    if let Some(prefix) = std::env::args().nth(1) {
        config.allow_prefix = Some(prefix);
    }

    let ctx = default_context(config.proxy.as_deref())?;
    let endpoint = config.endpoint()?;
    let broker = CredentialBroker::new(ctx, config)?;

    // What a browser needs for a form upload.
    let bundle = broker.authorize_upload().await?;
    println!("{}", serde_json::to_string_pretty(&bundle)?);

    // A single object read, reusing the cached credential.
    let op = SigningContext::new(http::Method::GET, "/hello.txt");
    let bundle = broker.authorize(&op).await?;
    println!("GET {endpoint}/hello.txt");
    println!("Authorization: {}", bundle.authorization);
    println!("x-cos-security-token: {}", bundle.security_token);

    Ok(())
}
