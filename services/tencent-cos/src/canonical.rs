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

//! Deterministic canonical forms of query strings and headers.
//!
//! Identical input maps always canonicalize identically, whatever order
//! they were built in.

use crate::constants::TENCENT_URI_ENCODE_SET;
use percent_encoding::utf8_percent_encode;

/// Join `params` as `key=value` pairs with `&`, keys sorted by byte order.
///
/// Keys and values are taken as-is, any encoding is the caller's job.
pub fn canonical_query_string<I, K, V>(params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs = params
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
        .collect::<Vec<_>>();
    pairs.sort();

    join_pairs(&pairs)
}

/// Canonical form of a key-value map as used by request signing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalPairs {
    /// Signed names joined with `;`, for `q-header-list` and `q-url-param-list`.
    pub list: String,
    /// `key=value` pairs joined with `&`.
    pub string: String,
}

/// Canonicalize query parameters for request signing.
pub fn canonical_query_param_string<I, K, V>(query: I) -> CanonicalPairs
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    strict_canonical(query)
}

/// Canonicalize headers for request signing.
pub fn canonical_header_string<I, K, V>(headers: I) -> CanonicalPairs
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    strict_canonical(headers)
}

/// Lowercase keys, strictly encode keys and values, sort.
///
/// Keys compare case-insensitively; equal keys are ordered by value.
fn strict_canonical<I, K, V>(pairs: I) -> CanonicalPairs
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut pairs = pairs
        .into_iter()
        .map(|(k, v)| {
            (
                utf8_percent_encode(&k.as_ref().to_lowercase(), &TENCENT_URI_ENCODE_SET)
                    .to_string(),
                utf8_percent_encode(v.as_ref(), &TENCENT_URI_ENCODE_SET).to_string(),
            )
        })
        .collect::<Vec<_>>();
    pairs.sort();

    CanonicalPairs {
        list: pairs
            .iter()
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(";"),
        string: join_pairs(&pairs),
    }
}

fn join_pairs(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, HashMap};

    #[test]
    fn test_canonical_query_string_sorts_by_bytes() {
        let params = [("b", "2"), ("a", "1"), ("B", "3"), ("Action", "x")];
        assert_eq!(canonical_query_string(params), "Action=x&B=3&a=1&b=2");
    }

    #[test]
    fn test_canonical_query_string_keeps_values() {
        let params = [("policy", "%7B%22version%22%7D"), ("Region", "")];
        assert_eq!(
            canonical_query_string(params),
            "Region=&policy=%7B%22version%22%7D"
        );
    }

    #[test]
    fn test_canonical_query_string_is_order_independent() {
        let forward = vec![("Nonce", "12345"), ("SecretId", "id"), ("Timestamp", "1")];
        let mut backward = forward.clone();
        backward.reverse();

        let from_map = canonical_query_string(forward.iter().copied().collect::<HashMap<_, _>>());
        assert_eq!(canonical_query_string(forward), canonical_query_string(backward));
        assert_eq!(from_map, "Nonce=12345&SecretId=id&Timestamp=1");
    }

    #[test]
    fn test_strict_canonical_lowercases_and_encodes() {
        let headers = [
            ("Host", "examplebucket-1250000000.cos.ap-beijing.myqcloud.com"),
            ("Content-Type", "image/jpeg"),
            ("x-cos-meta-Name", "my file (1)"),
        ];

        let canonical = canonical_header_string(headers);
        assert_eq!(canonical.list, "content-type;host;x-cos-meta-name");
        assert_eq!(
            canonical.string,
            "content-type=image%2Fjpeg&host=examplebucket-1250000000.cos.ap-beijing.myqcloud.com&x-cos-meta-name=my%20file%20%281%29"
        );
    }

    #[test]
    fn test_strict_canonical_sorts_case_insensitively() {
        let query = [("prefix", "a"), ("Max-Keys", "10"), ("delimiter", "/")];

        let canonical = canonical_query_param_string(query);
        assert_eq!(canonical.list, "delimiter;max-keys;prefix");
        assert_eq!(canonical.string, "delimiter=%2F&max-keys=10&prefix=a");
    }

    #[test]
    fn test_strict_canonical_is_order_independent() {
        let mut hashed = HashMap::new();
        let mut ordered = BTreeMap::new();
        for (k, v) in [("uploadId", "1"), ("partNumber", "2"), ("versionId", "v 1")] {
            hashed.insert(k, v);
            ordered.insert(k, v);
        }

        assert_eq!(
            canonical_query_param_string(&hashed),
            canonical_query_param_string(&ordered)
        );
    }

    #[test]
    fn test_strict_canonical_empty() {
        let canonical = canonical_header_string(Vec::<(String, String)>::new());
        assert_eq!(canonical, CanonicalPairs::default());
    }
}
