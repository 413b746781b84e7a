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

use crate::time::DateTime;
use crate::{Context, Result};
use std::fmt::Debug;

/// SigningCredential is the credential a signer uses to sign requests.
pub trait SigningCredential: Clone + Debug + Send + Sync + Unpin + 'static {
    /// Check that every field required for signing is present.
    ///
    /// Expiry is not part of this check, see [`SigningCredential::expires_at`].
    fn is_valid(&self) -> bool;

    /// The instant this credential stops being accepted, `None` if it never expires.
    fn expires_at(&self) -> Option<DateTime>;

    /// Check whether the credential is still usable at `now` once `margin`
    /// is kept in reserve for clock skew and in-flight requests.
    fn is_fresh(&self, now: DateTime, margin: chrono::TimeDelta) -> bool {
        if !self.is_valid() {
            return false;
        }
        match self.expires_at() {
            Some(expires_at) => now < expires_at - margin,
            None => true,
        }
    }
}

/// ProvideCredential is the trait used to obtain a fresh credential.
///
/// Service may require different credential to sign the request. A provider
/// either returns a complete credential or an explicit error, never a
/// partially filled value.
#[async_trait::async_trait]
pub trait ProvideCredential: Debug + Send + Sync + Unpin + 'static {
    /// Credential returned by this provider.
    type Credential: Send + Sync + Unpin + 'static;

    /// Fetch a new credential.
    async fn provide_credential(&self, ctx: &Context) -> Result<Self::Credential>;
}
