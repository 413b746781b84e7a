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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use std::time::Duration;

// Env values used in tencent cos.
pub const TENCENTCLOUD_REGION: &str = "TENCENTCLOUD_REGION";
pub const TKE_REGION: &str = "TKE_REGION";
pub const TENCENTCLOUD_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
pub const TKE_SECRET_ID: &str = "TKE_SECRET_ID";
pub const TENCENTCLOUD_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
pub const TKE_SECRET_KEY: &str = "TKE_SECRET_KEY";
pub const TENCENTCLOUD_COS_BUCKET: &str = "TENCENTCLOUD_COS_BUCKET";
pub const TENCENTCLOUD_COS_ALLOW_PREFIX: &str = "TENCENTCLOUD_COS_ALLOW_PREFIX";
pub const TENCENTCLOUD_COS_PROXY: &str = "TENCENTCLOUD_COS_PROXY";

// Federation token endpoint.
pub const FEDERATION_ENDPOINT: &str = "https://sts.api.qcloud.com/v2/index.php";
pub const FEDERATION_ACTION: &str = "GetFederationToken";
pub const FEDERATION_PRODUCT_NAME: &str = "cos";
pub const FEDERATION_DURATION_SECONDS: u64 = 7200;
pub const FEDERATION_NONCE_MIN: u32 = 10000;
pub const FEDERATION_NONCE_MAX: u32 = 20000;

/// Key of the temporary credential in the cache store.
pub const CACHE_KEY: &str = "qcloud_cos_tempkey";
/// Time kept in reserve before the temporary credential expires.
pub const SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);
/// How long a request signature stays valid.
pub const SIGNATURE_VALIDITY: Duration = Duration::from_secs(600);

/// The allow prefix used when none is configured.
pub const DEFAULT_ALLOW_PREFIX: &str = "*";

/// Object and multipart upload actions granted to temporary credentials.
///
/// Bucket administration and deletes are never granted.
pub const ALLOWED_ACTIONS: &[&str] = &[
    // simple object operations
    "name/cos:PutObject",
    "name/cos:PostObject",
    "name/cos:AppendObject",
    "name/cos:GetObject",
    "name/cos:HeadObject",
    "name/cos:OptionsObject",
    "name/cos:PutObjectCopy",
    "name/cos:PostObjectRestore",
    // multipart upload
    "name/cos:InitiateMultipartUpload",
    "name/cos:ListMultipartUploads",
    "name/cos:ListParts",
    "name/cos:UploadPart",
    "name/cos:CompleteMultipartUpload",
    "name/cos:AbortMultipartUpload",
];

const UNRESERVED: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// AsciiSet for [Tencent UriEncode](https://cloud.tencent.com/document/product/436/7778)
pub static TENCENT_URI_ENCODE_SET: AsciiSet = UNRESERVED;

/// AsciiSet for the object prefix inside a policy resource.
///
/// Resource URNs keep `/ * ! ( ) ~` literal.
pub static RESOURCE_ENCODE_SET: AsciiSet = UNRESERVED
    .remove(b'/')
    .remove(b'*')
    .remove(b'!')
    .remove(b'(')
    .remove(b')');
