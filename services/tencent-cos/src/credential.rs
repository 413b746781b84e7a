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

use cosgrant_core::time::DateTime;
use cosgrant_core::utils::Redact;
use cosgrant_core::SigningCredential;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter};

/// Temporary credential issued by the federation token endpoint.
///
/// Never mutated after it's issued, only replaced.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporaryCredential {
    /// Temporary secret id, used as `q-ak`.
    pub tmp_secret_id: String,
    /// Temporary secret key.
    pub tmp_secret_key: String,
    /// Session token, sent as `x-cos-security-token`.
    pub session_token: String,
    /// When the credential was requested.
    pub issued_at: DateTime,
    /// When the credential stops being accepted.
    pub expires_at: DateTime,
}

impl Debug for TemporaryCredential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporaryCredential")
            .field("tmp_secret_id", &Redact::from(&self.tmp_secret_id))
            .field("tmp_secret_key", &Redact::from(&self.tmp_secret_key))
            .field("session_token", &Redact::from(&self.session_token))
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SigningCredential for TemporaryCredential {
    fn is_valid(&self) -> bool {
        !self.tmp_secret_id.is_empty()
            && !self.tmp_secret_key.is_empty()
            && !self.session_token.is_empty()
    }

    fn expires_at(&self) -> Option<DateTime> {
        Some(self.expires_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use cosgrant_core::time::now;

    fn credential(expires_in: TimeDelta) -> TemporaryCredential {
        let now = now();
        TemporaryCredential {
            tmp_secret_id: "AKIDtmpsecretidexample".to_string(),
            tmp_secret_key: "tmpsecretkeyexample".to_string(),
            session_token: "sessiontokenexample".to_string(),
            issued_at: now,
            expires_at: now + expires_in,
        }
    }

    #[test]
    fn test_is_fresh_respects_safety_margin() {
        let margin = TimeDelta::try_minutes(5).unwrap();

        assert!(credential(TimeDelta::try_hours(2).unwrap()).is_fresh(now(), margin));
        // Not expired yet, but inside the margin.
        assert!(!credential(TimeDelta::try_minutes(4).unwrap()).is_fresh(now(), margin));
    }

    #[test]
    fn test_missing_token_is_invalid() {
        let mut cred = credential(TimeDelta::try_hours(2).unwrap());
        cred.session_token = String::new();
        assert!(!cred.is_valid());
    }

    #[test]
    fn test_debug_redacts() {
        let cred = credential(TimeDelta::try_hours(2).unwrap());
        let debug = format!("{cred:?}");
        assert!(debug.contains("AKI***ple"));
        assert!(!debug.contains("tmpsecretkeyexample"));
        assert!(!debug.contains("sessiontokenexample"));
    }
}
