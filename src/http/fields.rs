// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cookie and form-field fuzzable fields.

use crate::json::embedded::{re_encode_embedded_json, try_decode_embedded_json};
use crate::json::ValueTree;

/// A cookie from the request's `Cookie` header line.
///
/// A cookie whose value holds base64-url-encoded JSON additionally owns
/// the decoded tree, computed eagerly at parse time; mutations to the tree
/// are written back with [`Cookie::sync_embedded`].
#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    pub key: Vec<u8>,
    /// Absent when the segment has no `=` at all; preserved verbatim for
    /// byte-exact reconstruction.
    pub value: Option<Vec<u8>>,
    pub fuzz: bool,
    pub embedded: Option<ValueTree>,
}

impl Cookie {
    pub fn new(key: Vec<u8>, value: Option<Vec<u8>>) -> Self {
        let embedded = value
            .as_deref()
            .filter(|v| !v.is_empty())
            .and_then(|v| std::str::from_utf8(v).ok())
            .and_then(try_decode_embedded_json);
        Self {
            key,
            value,
            fuzz: true,
            embedded,
        }
    }

    /// Write the (possibly mutated) embedded tree back into the value.
    pub fn sync_embedded(&mut self) {
        if let Some(tree) = &self.embedded {
            self.value = Some(re_encode_embedded_json(tree).into_bytes());
        }
    }
}

/// A single key-value pair of a form-urlencoded body. The value is stored
/// decoded and form-encoded once at reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
    pub fuzz: bool,
}

impl FormField {
    pub fn new(key: Vec<u8>, value: Option<Vec<u8>>) -> Self {
        Self {
            key,
            value,
            fuzz: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cookie_with_embedded_json_syncs_value() {
        let mut cookie = Cookie::new(b"session".to_vec(), Some(b"eyIxIjogMn0".to_vec()));
        let tree = cookie.embedded.as_mut().unwrap();
        tree.paths[0].set_leaf(json!(3));
        cookie.sync_embedded();
        assert_eq!(cookie.value.as_deref(), Some(&b"eyIxIjogM30"[..]));
    }

    #[test]
    fn cookie_without_embedded_json_keeps_value() {
        let mut cookie = Cookie::new(b"theme".to_vec(), Some(b"dark0".to_vec()));
        assert!(cookie.embedded.is_none());
        cookie.sync_embedded();
        assert_eq!(cookie.value.as_deref(), Some(&b"dark0"[..]));
    }
}
