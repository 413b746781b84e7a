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

//! Tencent Cloud COS support with convenience APIs.

pub use cosgrant_tencent_cos::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Context, OsEnv, Result};

/// Create a broker configured from the environment.
///
/// This function creates a broker with:
/// - Config read from `TENCENTCLOUD_*` (or `TKE_*`) env vars
/// - Default context, routed through `TENCENTCLOUD_COS_PROXY` if set
/// - Federation token provider and request signer for COS
///
/// Fails with [`ErrorKind::ConfigInvalid`](crate::ErrorKind) if the
/// environment is incomplete.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> cosgrant::Result<()> {
/// let broker = cosgrant::tencent::default_broker()?;
/// let bundle = broker.authorize_upload().await?;
/// println!("{}", bundle.security_token);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub fn default_broker() -> Result<CredentialBroker> {
    let config = Config::from_env(&Context::new().with_env(OsEnv));
    log::debug!("loaded tencent cos config: {config:?}");

    let ctx = default_context(config.proxy.as_deref())?;
    CredentialBroker::new(ctx, config)
}
