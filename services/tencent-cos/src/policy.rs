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

//! Least-privilege access policy attached to a federation token request.

use crate::config::split_bucket;
use crate::constants::{ALLOWED_ACTIONS, RESOURCE_ENCODE_SET};
use cosgrant_core::Result;
use percent_encoding::utf8_percent_encode;
use serde::Serialize;

/// Policy document sent to the federation token endpoint.
///
/// Built fresh for every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPolicy {
    /// Policy language version, always `2.0`.
    pub version: String,
    /// Statements of this policy.
    #[serde(rename = "statement")]
    pub statements: Vec<Statement>,
}

/// One statement of an [`AccessPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// Action names, in a stable order.
    #[serde(rename = "action")]
    pub actions: Vec<String>,
    /// Whether the statement grants or denies.
    pub effect: Effect,
    /// Who the statement applies to.
    pub principal: Principal,
    /// Resource URNs the statement covers.
    #[serde(rename = "resource")]
    pub resources: Vec<String>,
}

/// Effect of a [`Statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Grant the actions.
    Allow,
    /// Refuse the actions.
    Deny,
}

/// Principal of a [`Statement`]; only the wildcard is ever used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    /// Principals, `["*"]`.
    pub qcs: Vec<String>,
}

impl Principal {
    /// Any principal.
    pub fn wildcard() -> Self {
        Self {
            qcs: vec!["*".to_string()],
        }
    }
}

impl AccessPolicy {
    /// Build the policy for `bucket` (`<name>-<appid>`) in `region`.
    ///
    /// The policy covers exactly two resources: the bucket root and the
    /// bucket root followed by the encoded `allow_prefix`.
    pub fn build(bucket: &str, region: &str, allow_prefix: &str) -> Result<Self> {
        let (name, app_id) = split_bucket(bucket)?;
        let root = format!("qcs::cos:{region}:uid/{app_id}:prefix//{app_id}/{name}/");
        let scoped = format!("{root}{}", resource_url_encode(allow_prefix));

        Ok(Self {
            version: "2.0".to_string(),
            statements: vec![Statement {
                actions: ALLOWED_ACTIONS.iter().map(|v| v.to_string()).collect(),
                effect: Effect::Allow,
                principal: Principal::wildcard(),
                resources: vec![root, scoped],
            }],
        })
    }

    /// Render the policy as compact JSON. Forward slashes stay unescaped.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Percent-encode an object prefix for use inside a resource URN.
///
/// `/ * ! ( ) ~` stay literal, everything outside the unreserved set is
/// encoded.
pub fn resource_url_encode(prefix: &str) -> String {
    utf8_percent_encode(prefix, &RESOURCE_ENCODE_SET).to_string()
}
