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

//! Encoded-payload detector.
//!
//! Recognizes JSON that travels base64-url-encoded inside a cookie or
//! query-parameter value and exposes it as a nested [`ValueTree`].
//! Decode failures are silent: a value that does not decode simply has no
//! embedded tree.

use crate::http::{quote_plus, unquote_plus};
use crate::json::ValueTree;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

// Encoders in the wild disagree on which base64 variant to use in URL
// contexts, and often strip padding. Both engines therefore accept padded
// and unpadded input alike.
const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_allow_trailing_bits(true)
    .with_decode_padding_mode(DecodePaddingMode::Indifferent);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const URL_SAFE_NO_PAD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_encode_padding(false),
);

/// URL-decode `text`, probe it as base64 (standard alphabet first, then
/// URL-safe), and decompose the result if it is valid UTF-8 JSON.
///
/// The standard-then-URL-safe order is observable: a value decodable under
/// both alphabets yields the standard interpretation.
pub fn try_decode_embedded_json(text: &str) -> Option<ValueTree> {
    let unquoted = String::from_utf8(unquote_plus(text.as_bytes())).ok()?;
    let raw = STANDARD_LENIENT
        .decode(unquoted.as_bytes())
        .or_else(|_| URL_SAFE_LENIENT.decode(unquoted.as_bytes()))
        .ok()?;
    let json_text = String::from_utf8(raw).ok()?;
    ValueTree::parse(&json_text).ok()
}

/// Serialize the tree and encode it URL-safe without padding, the form
/// written back into the owning cookie or parameter value.
///
/// Round-trip law: `try_decode_embedded_json(re_encode_embedded_json(t))`
/// equals `t` for any tree obtained from [`try_decode_embedded_json`].
pub fn re_encode_embedded_json(tree: &ValueTree) -> String {
    let encoded = URL_SAFE_NO_PAD.encode(tree.to_canonical_string().as_bytes());
    // The URL-safe alphabet needs no escaping; kept for symmetry with the
    // URL-decode on the way in.
    quote_plus(&encoded)
}
